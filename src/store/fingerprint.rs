//! Modification-time fingerprint of the watched wildcard tree

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use super::loader::collection_files;

/// Last-seen modification time of every root and every collection file under it
///
/// Two fingerprints differ when a file was modified, added or removed, or when a
/// root appeared or vanished.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Fingerprint {
    mtimes: BTreeMap<PathBuf, SystemTime>,
}

impl Fingerprint {
    /// Scan the given roots. Missing roots contribute nothing.
    pub fn scan(roots: &[PathBuf]) -> Self {
        let mut mtimes = BTreeMap::new();
        for root in roots {
            let Some(root_mtime) = modified(root) else {
                continue;
            };
            mtimes.insert(root.clone(), root_mtime);
            for file in collection_files(root) {
                if let Some(mtime) = modified(&file) {
                    mtimes.insert(file, mtime);
                }
            }
        }
        Self { mtimes }
    }

    /// Number of tracked paths
    pub fn len(&self) -> usize {
        self.mtimes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mtimes.is_empty()
    }

    /// Whether a path is tracked
    pub fn tracks(&self, path: &Path) -> bool {
        self.mtimes.contains_key(path)
    }
}

fn modified(path: &Path) -> Option<SystemTime> {
    std::fs::metadata(path).and_then(|m| m.modified()).ok()
}
