//! In-memory backend

use super::KeyValueStore;
use crate::Result;
use parking_lot::RwLock;
use std::collections::HashMap;

/// Process-local backend, one map entry per namespace
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of namespaces holding a value
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn read(&self, namespace: &str) -> Result<Option<String>> {
        Ok(self.entries.read().get(namespace).cloned())
    }

    fn write(&self, namespace: &str, contents: &str) -> Result<()> {
        self.entries
            .write()
            .insert(namespace.to_string(), contents.to_string());
        Ok(())
    }

    fn remove(&self, namespace: &str) -> Result<()> {
        self.entries.write().remove(namespace);
        Ok(())
    }

    fn namespaces(&self) -> Result<Vec<String>> {
        let mut names: Vec<String> = self.entries.read().keys().cloned().collect();
        names.sort();
        Ok(names)
    }
}
