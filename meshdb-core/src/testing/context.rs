//! TestContext - owns the temporary directory behind a file-backed test

use crate::Result;
use std::path::Path;
use tempfile::TempDir;

/// Temporary directory that lives as long as the test holds the context
///
/// The directory and everything in it are removed on drop.
pub struct TestContext {
    temp_dir: TempDir,
}

impl TestContext {
    /// Create a context with a fresh, existing temporary directory
    pub fn new() -> Result<Self> {
        let temp_dir = TempDir::new()?;
        std::fs::create_dir_all(temp_dir.path())?;
        Ok(Self { temp_dir })
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }
}
