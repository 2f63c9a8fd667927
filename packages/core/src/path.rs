//! PATH mutation and inspection.
//!
//! The PATH value is modeled as an ordered list of semicolon-separated
//! segments. Empty segments are never written back. Matching against a
//! dist's bin directories is exact string equality, nothing fuzzier.

use regex::Regex;
use std::path::Path;

use crate::catalog::{Catalog, PerlDist};
use crate::envstore::{EnvStore, Scope};
use crate::error::Result;

pub const PATH_SEPARATOR: char = ';';

/// Algorithms over the persistent PATH, generic over the store behind them.
pub struct PathController<'a> {
    store: &'a dyn EnvStore,
}

impl<'a> PathController<'a> {
    pub fn new(store: &'a dyn EnvStore) -> Self {
        Self { store }
    }

    /// The raw PATH string for a scope, empty if unset.
    pub fn get(&self, scope: Scope) -> String {
        self.store.get(scope).unwrap_or_default()
    }

    /// Split a PATH value into segments. Empty segments are kept here so
    /// callers can blank entries in place; [`set`](Self::set) drops them.
    pub fn split(value: &str) -> Vec<String> {
        value.split(PATH_SEPARATOR).map(str::to_string).collect()
    }

    /// Join segments, dropping empty ones. Elements may themselves contain
    /// separators (the previous PATH carried as one unit); those are
    /// flattened so no empty segment is ever persisted.
    pub fn join(segments: &[String]) -> String {
        segments
            .iter()
            .flat_map(|s| s.split(PATH_SEPARATOR))
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(&PATH_SEPARATOR.to_string())
    }

    /// Write the machine PATH from a segment list.
    pub fn set(&self, segments: &[String]) -> Result<()> {
        self.store.set_machine(&Self::join(segments))
    }

    /// Append the tool's own bin directory to the machine PATH.
    ///
    /// Strips one trailing separator from the existing value first. Does not
    /// check whether the directory is already present; calling this twice
    /// duplicates the entry.
    pub fn add_tool_bin(&self, bin: &Path) -> Result<()> {
        let mut segments = Vec::new();
        match self.store.get(Scope::Machine) {
            None => segments.push(bin.display().to_string()),
            Some(mut path) => {
                if path.ends_with(PATH_SEPARATOR) {
                    path.pop();
                }
                segments.push(path);
                segments.push(bin.display().to_string());
            }
        }
        self.set(&segments)
    }

    /// Drop every machine PATH segment matching `pattern`.
    pub fn remove_tool_bin(&self, pattern: &Regex) -> Result<()> {
        let path = self.get(Scope::Machine);
        let segments: Vec<String> = Self::split(&path)
            .into_iter()
            .filter(|seg| !pattern.is_match(seg))
            .collect();
        self.set(&segments)
    }

    /// Put a dist's three bin directories at the front of the machine PATH,
    /// ahead of everything already there, so its binaries win the search.
    pub fn add_dist(&self, dist: &PerlDist) -> Result<()> {
        let mut segments: Vec<String> = dist
            .bin_paths()
            .iter()
            .map(|p| p.display().to_string())
            .collect();
        segments.push(self.get(Scope::Machine));
        self.set(&segments)
    }

    /// Blank every segment equal to ANY catalog dist's bin directories, not
    /// just the one believed active — deactivation must work whatever state
    /// PATH is in. Writes back only if `commit`; always returns the joined
    /// result.
    pub fn remove_dists(&self, catalog: &Catalog, commit: bool) -> Result<String> {
        let path = match self.store.get(Scope::Machine) {
            Some(p) => p,
            None => return Ok(String::new()),
        };

        let mut segments = Self::split(&path);
        for dist in catalog.iter() {
            let bins: Vec<String> = dist
                .bin_paths()
                .iter()
                .map(|p| p.display().to_string())
                .collect();
            for seg in segments.iter_mut() {
                if bins.iter().any(|b| b == seg) {
                    seg.clear();
                }
            }
        }
        segments.retain(|s| !s.is_empty());

        if commit {
            self.set(&segments)?;
        }
        Ok(Self::join(&segments))
    }

    /// True if any PATH segment in the scope matches the pattern.
    pub fn scan(&self, pattern: &Regex, scope: Scope) -> bool {
        match self.store.get(scope) {
            Some(path) => path
                .split(PATH_SEPARATOR)
                .any(|seg| pattern.is_match(seg)),
            None => false,
        }
    }
}
