//! Orphan and archive-cache reconciliation.
//!
//! An orphan is a subdirectory of the install root that no catalog
//! descriptor accounts for: usually the leftovers of a removed or renamed
//! dist. Detection is advisory; deletion only happens on request.

use regex::Regex;
use std::collections::HashSet;
use std::fs;
use std::path::PathBuf;
use tracing::{debug, warn};

use crate::catalog::Catalog;
use crate::config::Settings;
use crate::error::{Error, Result};
use crate::install::reset_attributes;

/// Directories matching this are module caches, never orphans.
const MODULE_CACHE_PATTERN: &str = r"\.cpanm";

pub struct Reconciler<'a> {
    settings: &'a Settings,
    catalog: &'a Catalog,
}

impl<'a> Reconciler<'a> {
    pub fn new(settings: &'a Settings, catalog: &'a Catalog) -> Self {
        Self { settings, catalog }
    }

    /// Base names of install-root subdirectories that belong to no catalog
    /// descriptor. The archive cache and module caches are excluded.
    pub fn find_orphans(&self) -> Result<Vec<String>> {
        let root = &self.settings.root_dir;
        if !root.exists() {
            return Ok(Vec::new());
        }

        let module_cache = Regex::new(MODULE_CACHE_PATTERN).unwrap();
        let registered: HashSet<PathBuf> = self
            .catalog
            .iter()
            .map(|d| d.install_path.clone())
            .collect();

        let mut orphans = Vec::new();
        let entries =
            fs::read_dir(root).map_err(|e| Error::io("Failed to list install root", root, e))?;
        for entry in entries {
            let entry =
                entry.map_err(|e| Error::io("Failed to list install root", root, e))?;
            let path = entry.path();
            if !path.is_dir() {
                continue;
            }
            if path == self.settings.temp_dir {
                continue;
            }
            if module_cache.is_match(&path.to_string_lossy()) {
                continue;
            }
            if !registered.contains(&path) {
                if let Some(name) = path.file_name() {
                    orphans.push(name.to_string_lossy().into_owned());
                }
            }
        }
        orphans.sort();
        Ok(orphans)
    }

    /// Delete every orphaned directory tree. A directory that resists
    /// deletion is reported and skipped, the rest are still removed.
    /// Returns the number actually removed.
    pub fn clean_orphans(&self) -> Result<usize> {
        let mut removed = 0;
        for orphan in self.find_orphans()? {
            let path = self.settings.root_dir.join(&orphan);
            reset_attributes(&path);
            match fs::remove_dir_all(&path) {
                Ok(()) => {
                    println!("removed orphan {orphan} perl instance");
                    removed += 1;
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "failed to remove orphan");
                    eprintln!("unable to remove orphan {orphan}");
                }
            }
        }
        Ok(removed)
    }

    /// Delete every file directly under the archive cache. Returns whether
    /// anything was removed.
    pub fn clean_archive_cache(&self) -> Result<bool> {
        let cache = &self.settings.temp_dir;
        if !cache.exists() {
            return Ok(false);
        }
        reset_attributes(cache);

        let mut removed = false;
        let entries =
            fs::read_dir(cache).map_err(|e| Error::io("Failed to list archive cache", cache, e))?;
        for entry in entries {
            let entry =
                entry.map_err(|e| Error::io("Failed to list archive cache", cache, e))?;
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            match fs::remove_file(&path) {
                Ok(()) => removed = true,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "failed to remove cached archive");
                }
            }
        }
        Ok(removed)
    }

    /// End-of-command advisory: list orphans unless the invoking operation
    /// asked to bypass (clone and custom-remove legitimately leave the
    /// catalog and disk briefly out of step).
    pub fn shutdown_check(&self, bypass: bool) {
        if bypass {
            return;
        }
        match self.find_orphans() {
            Ok(orphans) if !orphans.is_empty() => {
                eprintln!(
                    "\nWARNING! The following Perl installs have no registered version:\n"
                );
                for orphan in orphans {
                    eprintln!("  {orphan}");
                }
                eprintln!("\nRun 'strawbrew clean orphan' to remove them.");
            }
            Ok(_) => {}
            Err(e) => debug!(error = %e, "orphan check skipped"),
        }
    }
}
