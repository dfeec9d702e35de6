use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A scratch workspace with its own home directory, so config and cache
/// state never leak between tests or into the host system.
pub struct TestEnvironment {
    temp_dir: TempDir,
}

impl TestEnvironment {
    pub fn new() -> Result<Self> {
        let temp_dir = tempfile::tempdir()?;
        fs::create_dir_all(temp_dir.path().join("home"))?;
        Ok(Self { temp_dir })
    }

    /// Working directory for commands under test.
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// The isolated home directory handed to commands via HOME/XDG vars.
    pub fn home(&self) -> PathBuf {
        self.temp_dir.path().join("home")
    }
}
