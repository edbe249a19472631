//! JSON file mirror for the draft buffer.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use academy_core::draft::{DraftMap, DraftPersistence, PersistenceError};

/// Mirrors drafts to a single JSON file.
///
/// Writes go to a sibling temporary file that is then renamed over the
/// target, so a crash mid-write leaves the previous mirror intact.
#[derive(Debug, Clone)]
pub struct JsonFilePersistence {
    path: PathBuf,
}

impl JsonFilePersistence {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl DraftPersistence for JsonFilePersistence {
    fn read(&self) -> Result<DraftMap, PersistenceError> {
        match std::fs::read_to_string(&self.path) {
            Ok(json) => Ok(serde_json::from_str(&json)?),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(DraftMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    fn write(&self, drafts: &DraftMap) -> Result<(), PersistenceError> {
        let json = serde_json::to_vec_pretty(drafts)?;
        let temp = self.temp_path();
        std::fs::write(&temp, json)?;
        std::fs::rename(&temp, &self.path)?;
        tracing::debug!(path = %self.path.display(), courses = drafts.len(), "Drafts persisted");
        Ok(())
    }

    fn clear(&self) -> Result<(), PersistenceError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
