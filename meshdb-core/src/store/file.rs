//! File-backed backend
//!
//! Layout: one `<namespace>.json` file per namespace inside the data
//! directory. A write lands in `<namespace>.json.tmp` first and is renamed
//! over the live file, so readers never observe a half-written collection.

use super::KeyValueStore;
use crate::{Error, Result};
use parking_lot::Mutex;
use std::fs;
use std::path::{Path, PathBuf};

const EXTENSION: &str = "json";

/// Backend persisting each namespace as a JSON file
#[derive(Debug)]
pub struct FileStore {
    dir: PathBuf,
    /// Serializes writers inside this process
    write_lock: Mutex<()>,
}

impl FileStore {
    /// Open (creating if needed) a store rooted at `dir`
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        tracing::debug!(dir = %dir.display(), "opened file store");
        Ok(Self {
            dir,
            write_lock: Mutex::new(()),
        })
    }

    /// Root directory of this store
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, namespace: &str) -> Result<PathBuf> {
        validate_namespace(namespace)?;
        Ok(self.dir.join(format!("{namespace}.{EXTENSION}")))
    }
}

/// Namespaces become file names, so only a conservative alphabet is allowed
fn validate_namespace(namespace: &str) -> Result<()> {
    if namespace.is_empty()
        || !namespace
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    {
        return Err(Error::store(format!(
            "invalid namespace '{namespace}': must be alphanumeric with _ or -"
        )));
    }
    Ok(())
}

impl KeyValueStore for FileStore {
    fn read(&self, namespace: &str) -> Result<Option<String>> {
        let path = self.path_for(namespace)?;
        match fs::read_to_string(&path) {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn write(&self, namespace: &str, contents: &str) -> Result<()> {
        let path = self.path_for(namespace)?;
        let tmp = path.with_extension(format!("{EXTENSION}.tmp"));

        let _guard = self.write_lock.lock();
        fs::write(&tmp, contents)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }

    fn remove(&self, namespace: &str) -> Result<()> {
        let path = self.path_for(namespace)?;
        let _guard = self.write_lock.lock();
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn namespaces(&self) -> Result<Vec<String>> {
        let mut names = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some(EXTENSION) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                names.push(stem.to_string());
            }
        }
        names.sort();
        Ok(names)
    }
}
