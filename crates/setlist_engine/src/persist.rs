use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("state directory missing or not writable: {0}")]
    StateDir(String),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

/// Directory holding the client's small state files.
#[derive(Debug, Clone)]
pub struct StateDir {
    dir: PathBuf,
}

impl StateDir {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path(&self) -> &Path {
        &self.dir
    }

    /// Create the directory if missing and make sure it is one.
    pub fn ensure_exists(&self) -> Result<(), PersistError> {
        if self.dir.exists() {
            let meta = fs::metadata(&self.dir).map_err(|e| PersistError::StateDir(e.to_string()))?;
            if !meta.is_dir() {
                return Err(PersistError::StateDir(format!(
                    "{} is not a directory",
                    self.dir.display()
                )));
            }
            Ok(())
        } else {
            fs::create_dir_all(&self.dir).map_err(|e| PersistError::StateDir(e.to_string()))
        }
    }

    /// `Ok(None)` when the file was never written.
    pub fn read_to_string(&self, name: &str) -> Result<Option<String>, PersistError> {
        match fs::read_to_string(self.dir.join(name)) {
            Ok(content) => Ok(Some(content)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    /// Write through a temp file in the same directory, then rename over `name`.
    pub fn write_atomic(&self, name: &str, content: &str) -> Result<PathBuf, PersistError> {
        self.ensure_exists()?;

        let target = self.dir.join(name);
        let mut tmp = NamedTempFile::new_in(&self.dir)?;
        tmp.write_all(content.as_bytes())?;
        tmp.flush()?;
        tmp.as_file_mut().sync_all()?;
        tmp.persist(&target).map_err(|e| PersistError::Io(e.error))?;
        Ok(target)
    }
}
