//! Namespaced key/value persistence
//!
//! Every collection the simulator keeps (nodes, transactions, catalog
//! entries, saved queries) is one JSON array stored under one namespace.
//! Readers always fetch the whole collection and writers always replace it:
//!
//! ```text
//! ┌────────────────────┐  get::<T>(ns) / set::<T>(ns, &[T])
//! │       Store        │  (typed handle, JSON encode/decode)
//! └─────────┬──────────┘
//!           │ read(ns) / write(ns, text)
//! ┌─────────┴──────────┐
//! │  dyn KeyValueStore │  MemoryStore | FileStore | DetachedStore
//! └────────────────────┘
//! ```
//!
//! Two writers racing on the same namespace lose updates (last write wins).
//! Nothing above this layer serializes access either.

pub mod file;
pub mod memory;
pub mod namespace;

pub use file::FileStore;
pub use memory::MemoryStore;

use crate::Result;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fmt;
use std::sync::Arc;

/// Raw string-keyed backend
pub trait KeyValueStore: Send + Sync {
    /// Whether a persistent environment is present. When `false` the typed
    /// [`Store`] reads nothing and writes nothing.
    fn available(&self) -> bool {
        true
    }

    /// Read the encoded collection stored under `namespace`
    fn read(&self, namespace: &str) -> Result<Option<String>>;

    /// Replace the encoded collection stored under `namespace`
    fn write(&self, namespace: &str, contents: &str) -> Result<()>;

    /// Drop `namespace` entirely
    fn remove(&self, namespace: &str) -> Result<()>;

    /// All namespaces currently holding a value
    fn namespaces(&self) -> Result<Vec<String>>;
}

/// Backend standing in for "no persistent environment"
///
/// Reads are always empty and writes are silently discarded.
#[derive(Debug, Default, Clone, Copy)]
pub struct DetachedStore;

impl KeyValueStore for DetachedStore {
    fn available(&self) -> bool {
        false
    }

    fn read(&self, _namespace: &str) -> Result<Option<String>> {
        Ok(None)
    }

    fn write(&self, _namespace: &str, _contents: &str) -> Result<()> {
        Ok(())
    }

    fn remove(&self, _namespace: &str) -> Result<()> {
        Ok(())
    }

    fn namespaces(&self) -> Result<Vec<String>> {
        Ok(Vec::new())
    }
}

/// Typed, cloneable handle shared by every coordinator
#[derive(Clone)]
pub struct Store {
    backend: Arc<dyn KeyValueStore>,
}

impl Store {
    /// Wrap a backend
    pub fn new(backend: impl KeyValueStore + 'static) -> Self {
        Self {
            backend: Arc::new(backend),
        }
    }

    /// Fresh in-memory store
    pub fn memory() -> Self {
        Self::new(MemoryStore::new())
    }

    /// Store with no persistent environment
    pub fn detached() -> Self {
        Self::new(DetachedStore)
    }

    pub fn is_available(&self) -> bool {
        self.backend.available()
    }

    /// Load the collection under `namespace`, empty when absent
    pub fn get<T: DeserializeOwned>(&self, namespace: &str) -> Result<Vec<T>> {
        if !self.backend.available() {
            return Ok(Vec::new());
        }
        match self.backend.read(namespace)? {
            Some(text) => Ok(serde_json::from_str(&text)?),
            None => Ok(Vec::new()),
        }
    }

    /// Replace the collection under `namespace`
    pub fn set<T: Serialize>(&self, namespace: &str, items: &[T]) -> Result<()> {
        if !self.backend.available() {
            return Ok(());
        }
        let text = serde_json::to_string(items)?;
        self.backend.write(namespace, &text)
    }

    /// Drop a namespace
    pub fn clear(&self, namespace: &str) -> Result<()> {
        if !self.backend.available() {
            return Ok(());
        }
        self.backend.remove(namespace)
    }

    /// Namespaces currently holding a value
    pub fn namespaces(&self) -> Result<Vec<String>> {
        self.backend.namespaces()
    }
}

impl fmt::Debug for Store {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Store")
            .field("available", &self.backend.available())
            .finish()
    }
}
