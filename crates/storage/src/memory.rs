//! In-memory storage, for tests and embedders that persist elsewhere.

use std::collections::HashMap;

use async_trait::async_trait;

use super::{Result, Storage};

/// Storage backed by a `HashMap`.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    documents: HashMap<String, String>,
    writes: usize,
}

impl MemoryStorage {
    /// Empty storage.
    pub fn new() -> Self {
        Self::default()
    }

    /// Storage pre-seeded with one document.
    pub fn with_document(key: impl Into<String>, value: impl Into<String>) -> Self {
        let mut documents = HashMap::new();
        documents.insert(key.into(), value.into());
        Self { documents, writes: 0 }
    }

    /// Borrow a stored document without going through the async trait.
    pub fn document(&self, key: &str) -> Option<&str> {
        self.documents.get(key).map(String::as_str)
    }

    /// Number of successful `set` calls.
    pub fn writes(&self) -> usize {
        self.writes
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.documents.get(key).cloned())
    }

    async fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.documents.insert(key.to_string(), value.to_string());
        self.writes += 1;
        Ok(())
    }
}
