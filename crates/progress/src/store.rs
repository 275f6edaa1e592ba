//! Progress store - sole owner of the learner's state.
//!
//! Every mutation is a small transaction: the store builds the next
//! snapshot, writes it through to storage, and only then makes it current.
//! A failed write therefore leaves the in-memory state as it was.

use roadmap_core::{Catalog, Clock, ProgressState, StateError};
use roadmap_storage::{Storage, StorageError};
use tracing::{debug, error, info, warn};

use crate::calculator::{self, CalcError, Dashboard};
use crate::codec::{self, ImportError};

/// Key the state document is stored under.
pub const STORAGE_KEY: &str = "learning_dashboard_v1";

/// Name given to a fresh install.
pub const DEFAULT_NAME: &str = "Learner";

/// Store configuration.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Storage key for the state document
    pub storage_key: String,
    /// Name used when state has to be created from scratch
    pub default_name: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            storage_key: STORAGE_KEY.to_string(),
            default_name: DEFAULT_NAME.to_string(),
        }
    }
}

/// Errors surfaced by store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Storage refused the write; in-memory state is unchanged
    #[error("failed to save progress: {0}")]
    Write(#[source] StorageError),

    /// State could not be serialized
    #[error("failed to serialize progress: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Week or task index outside the catalog
    #[error("invalid task reference: {0}")]
    InvalidIndex(#[source] StateError),

    /// Replacement state does not match the catalog
    #[error("invalid progress state: {0}")]
    InvalidState(#[source] StateError),

    /// Imported document was refused
    #[error(transparent)]
    Import(#[from] ImportError),

    /// Derived values could not be computed
    #[error(transparent)]
    Calc(#[from] CalcError),
}

/// Owns the current [`ProgressState`] and writes it through to storage.
pub struct ProgressStore<S: Storage> {
    storage: S,
    catalog: Catalog,
    config: StoreConfig,
    state: ProgressState,
}

enum Loaded {
    Stored(ProgressState),
    Fresh,
    Corrupt(ImportError),
    Undecodable(std::io::Error),
    Unreadable(StorageError),
}

impl<S: Storage> ProgressStore<S> {
    /// Load state with the default configuration and system clock.
    pub async fn load(storage: S, catalog: Catalog) -> Self {
        Self::load_with(storage, catalog, StoreConfig::default(), Clock::default()).await
    }

    /// Load state from storage.
    ///
    /// Never fails: a missing, undecodable, unparseable or mis-shaped document
    /// is replaced by defaults built from the catalog. Fresh and healed
    /// defaults are written back immediately. Defaults are kept in memory only
    /// when the storage itself could not be read, so unreadable data is not
    /// clobbered.
    pub async fn load_with(
        storage: S,
        catalog: Catalog,
        config: StoreConfig,
        clock: Clock,
    ) -> Self {
        let loaded = match storage.get(&config.storage_key).await {
            Ok(Some(raw)) => match codec::import_document(&raw, &catalog) {
                Ok(state) => Loaded::Stored(state),
                Err(e) => Loaded::Corrupt(e),
            },
            Ok(None) => Loaded::Fresh,
            // Bytes that are not UTF-8 were read fine; they are just not a document.
            Err(StorageError::Io(e)) if e.kind() == std::io::ErrorKind::InvalidData => {
                Loaded::Undecodable(e)
            }
            Err(e) => Loaded::Unreadable(e),
        };

        let defaults = || {
            ProgressState::defaults(&catalog, config.default_name.clone(), clock.now())
        };
        let (state, write_back) = match loaded {
            Loaded::Stored(state) => {
                info!(key = %config.storage_key, "loaded stored progress");
                (state, false)
            }
            Loaded::Fresh => {
                info!(key = %config.storage_key, "no stored progress, starting fresh");
                (defaults(), true)
            }
            Loaded::Corrupt(reason) => {
                warn!(
                    key = %config.storage_key,
                    %reason,
                    "stored progress is corrupt, resetting to defaults"
                );
                (defaults(), true)
            }
            Loaded::Undecodable(reason) => {
                warn!(
                    key = %config.storage_key,
                    %reason,
                    "stored progress is not text, resetting to defaults"
                );
                (defaults(), true)
            }
            Loaded::Unreadable(reason) => {
                warn!(
                    key = %config.storage_key,
                    %reason,
                    "could not read stored progress, using defaults"
                );
                (defaults(), false)
            }
        };

        let mut store = Self {
            storage,
            catalog,
            config,
            state,
        };
        if write_back {
            if let Err(e) = store.save().await {
                error!(error = %e, "failed to write initial progress");
            }
        }
        store
    }

    /// Current snapshot.
    pub fn state(&self) -> &ProgressState {
        &self.state
    }

    /// The catalog this store validates against.
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Active configuration.
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Underlying storage.
    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Give back the storage handle.
    pub fn into_storage(self) -> S {
        self.storage
    }

    /// Write the current state to storage.
    pub async fn save(&mut self) -> Result<(), StoreError> {
        let doc = codec::export_document(&self.state)?;
        self.storage
            .set(&self.config.storage_key, &doc)
            .await
            .map_err(StoreError::Write)
    }

    /// Flip one task's completion flag.
    pub async fn toggle_task(
        &mut self,
        week_number: u32,
        task_index: usize,
    ) -> Result<&ProgressState, StoreError> {
        let mut next = self.state.clone();
        let done = next
            .toggle_task(&self.catalog, week_number, task_index)
            .map_err(StoreError::InvalidIndex)?;
        debug!(week = week_number, task = task_index, done, "toggled task");
        self.commit(next).await
    }

    /// Set one task's completion flag.
    pub async fn set_task(
        &mut self,
        week_number: u32,
        task_index: usize,
        done: bool,
    ) -> Result<&ProgressState, StoreError> {
        let mut next = self.state.clone();
        next.set_task(&self.catalog, week_number, task_index, done)
            .map_err(StoreError::InvalidIndex)?;
        debug!(week = week_number, task = task_index, done, "set task");
        self.commit(next).await
    }

    /// Replace the display name. Any string is accepted.
    pub async fn rename(&mut self, name: impl Into<String>) -> Result<&ProgressState, StoreError> {
        let next = ProgressState {
            name: name.into(),
            ..self.state.clone()
        };
        self.commit(next).await
    }

    /// Replace the notes.
    pub async fn set_notes(
        &mut self,
        notes: impl Into<String>,
    ) -> Result<&ProgressState, StoreError> {
        let next = ProgressState {
            notes: notes.into(),
            ..self.state.clone()
        };
        self.commit(next).await
    }

    /// Replace the theme name.
    pub async fn set_theme(
        &mut self,
        theme: impl Into<String>,
    ) -> Result<&ProgressState, StoreError> {
        let next = ProgressState {
            theme: theme.into(),
            ..self.state.clone()
        };
        self.commit(next).await
    }

    /// Clear every task flag. Name, start date, theme and notes are kept.
    ///
    /// Asking the user first is the caller's job.
    pub async fn reset_all(&mut self) -> Result<&ProgressState, StoreError> {
        let mut next = self.state.clone();
        next.reset_weeks(&self.catalog);
        info!("reset all progress");
        self.commit(next).await
    }

    /// Replace the whole state after checking it against the catalog.
    pub async fn replace_state(
        &mut self,
        state: ProgressState,
    ) -> Result<&ProgressState, StoreError> {
        state
            .validate(&self.catalog)
            .map_err(StoreError::InvalidState)?;
        self.commit(state).await
    }

    /// Import a document, replacing the whole state on success.
    pub async fn import_document(&mut self, raw: &str) -> Result<&ProgressState, StoreError> {
        let state = codec::import_document(raw, &self.catalog)?;
        info!(name = %state.name, "imported progress");
        self.replace_state(state).await
    }

    /// Export the current state as a document.
    pub fn export_document(&self) -> Result<String, StoreError> {
        Ok(codec::export_document(&self.state)?)
    }

    /// Derived values for the current state.
    pub fn dashboard(&self) -> Result<Dashboard, StoreError> {
        Ok(calculator::dashboard(&self.catalog, &self.state)?)
    }

    async fn commit(&mut self, next: ProgressState) -> Result<&ProgressState, StoreError> {
        let doc = codec::export_document(&next)?;
        self.storage
            .set(&self.config.storage_key, &doc)
            .await
            .map_err(|e| {
                error!(error = %e, "write-through failed, keeping previous state");
                StoreError::Write(e)
            })?;
        self.state = next;
        Ok(&self.state)
    }
}
