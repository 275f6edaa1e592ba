//! Import/export of progress documents.
//!
//! The exported document is the state itself as pretty-printed JSON, the
//! same shape that is persisted, so an export can be re-imported or dropped
//! into the data directory by hand.

use roadmap_core::{Catalog, ProgressState, StateError, Time};

/// Why an imported document was refused.
#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    /// Not well-formed JSON
    #[error("could not read file: {0}")]
    Parse(#[source] serde_json::Error),

    /// Well-formed, but not a usable progress document
    #[error("invalid progress file: {0}")]
    Validation(#[from] ValidationError),
}

/// Structural problems with a well-formed document.
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    /// The document has no `weeks` object
    #[error("missing \"weeks\"")]
    MissingWeeks,

    /// A field has the wrong type or a required field is absent
    #[error("{0}")]
    Malformed(#[source] serde_json::Error),

    /// The document does not match the current catalog
    #[error("{0}")]
    Shape(#[from] StateError),
}

/// Serialize state as a pretty-printed document.
///
/// Output is byte-for-byte stable for equal states.
pub fn export_document(state: &ProgressState) -> serde_json::Result<String> {
    serde_json::to_string_pretty(state)
}

/// File name for an export taken at `now`, e.g.
/// `progress-2024-03-04T09-00-00Z.json`.
pub fn export_file_name(now: Time) -> String {
    format!("progress-{}.json", now.format("%Y-%m-%dT%H-%M-%SZ"))
}

/// Parse and validate a document against the catalog.
///
/// The result is a complete replacement state; nothing is merged with the
/// current one.
pub fn import_document(raw: &str, catalog: &Catalog) -> Result<ProgressState, ImportError> {
    let value: serde_json::Value = serde_json::from_str(raw).map_err(ImportError::Parse)?;

    let has_weeks = value
        .get("weeks")
        .map(|weeks| !weeks.is_null())
        .unwrap_or(false);
    if !has_weeks {
        return Err(ValidationError::MissingWeeks.into());
    }

    let state: ProgressState =
        serde_json::from_value(value).map_err(ValidationError::Malformed)?;
    state.validate(catalog).map_err(ValidationError::Shape)?;
    Ok(state)
}
