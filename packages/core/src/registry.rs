//! The on-disk ledger of user-created (cloned) dists.
//!
//! A flat JSON list, rewritten wholesale on every mutation. There is no
//! locking; concurrent invocations of the tool can lose updates.

use std::fs;
use std::path::{Path, PathBuf};

use crate::catalog::DistRecord;
use crate::error::{Error, Result};

pub struct CustomRegistry {
    file: PathBuf,
}

impl CustomRegistry {
    pub fn new(file: impl Into<PathBuf>) -> Self {
        Self { file: file.into() }
    }

    pub fn file(&self) -> &Path {
        &self.file
    }

    /// Create the ledger as an empty list if it doesn't exist yet.
    pub fn ensure_exists(&self) -> Result<()> {
        if !self.file.exists() {
            if let Some(parent) = self.file.parent() {
                fs::create_dir_all(parent)
                    .map_err(|e| Error::io("Failed to create config dir", parent, e))?;
            }
            fs::write(&self.file, "[]")
                .map_err(|e| Error::io("Failed to create custom-install ledger", &self.file, e))?;
        }
        Ok(())
    }

    /// Read every custom record. A missing file is an empty list; a present
    /// but unparseable file is an error with the path and parse context.
    pub fn load(&self) -> Result<Vec<DistRecord>> {
        if !self.file.exists() {
            return Ok(Vec::new());
        }

        let content = fs::read_to_string(&self.file)
            .map_err(|e| Error::io("Failed to read custom-install ledger", &self.file, e))?;

        serde_json::from_str(&content).map_err(|e| Error::ConfigMalformed {
            path: self.file.clone(),
            detail: e.to_string(),
        })
    }

    /// Append a record: read the full list, add, write everything back.
    pub fn add(&self, record: DistRecord) -> Result<()> {
        let mut records = self.load()?;
        records.push(record);
        self.write(&records)
    }

    /// Drop the record with the given name, if present. Returns whether a
    /// record was removed.
    pub fn remove(&self, name: &str) -> Result<bool> {
        let mut records = self.load()?;
        let before = records.len();
        records.retain(|r| r.name != name);
        let changed = records.len() != before;
        if changed {
            self.write(&records)?;
        }
        Ok(changed)
    }

    fn write(&self, records: &[DistRecord]) -> Result<()> {
        let content = serde_json::to_string(records).expect("records serialize to JSON");
        fs::write(&self.file, content)
            .map_err(|e| Error::io("Failed to write custom-install ledger", &self.file, e))
    }
}
