//! Prefix aliases between paths as the server stores them and paths as they
//! are mounted locally.
//!
//! An alias table maps an *alias prefix* (how the server sees a library, e.g.
//! `/usr/src/app/external`) to a *resolved prefix* (where the same files live
//! on this machine, e.g. `/mnt/nas`). Matching is plain string prefix
//! matching, and the first declared pair that matches wins even when a later
//! pair would match a longer prefix.

use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathAliases {
    pairs: Vec<(String, String)>,
}

impl PathAliases {
    pub fn new(pairs: Vec<(String, String)>) -> Self {
        Self { pairs }
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs
            .iter()
            .map(|(alias, resolved)| (alias.as_str(), resolved.as_str()))
    }

    /// Server path -> local path.
    pub fn resolve(&self, path: &str) -> String {
        for (alias, resolved) in self.iter() {
            if let Some(rest) = path.strip_prefix(alias) {
                return format!("{resolved}{rest}");
            }
        }
        path.to_string()
    }

    /// Local path -> server path.
    pub fn unresolve(&self, path: &str) -> String {
        for (alias, resolved) in self.iter() {
            if let Some(rest) = path.strip_prefix(resolved) {
                return format!("{alias}{rest}");
            }
        }
        path.to_string()
    }

    pub fn resolve_path(&self, path: &str) -> PathBuf {
        PathBuf::from(self.resolve(path))
    }

    pub fn unresolve_path(&self, path: &Path) -> String {
        self.unresolve(&path.to_string_lossy())
    }
}
