//! Collection store: named wildcard collections loaded from disk
//!
//! The store owns a snapshot of every collection found under its root directories.
//! [`CollectionStore::get`] re-fingerprints the roots on each call and rebuilds the
//! snapshot only when a file or directory changed. Rebuilds happen under a lock and
//! the finished snapshot is published as a whole, so readers holding an older
//! `Arc<Snapshot>` are never affected.
//!
//! Roots are given highest priority first. They are loaded in reverse order, so when
//! two roots define the same collection name the higher-priority one wins.

mod collection;
mod fingerprint;
mod loader;
mod paths;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;
use thiserror::Error;

use crate::config::StoreConfig;
use crate::error::Diagnostic;

pub use collection::{is_glob, Alternative, Collection, Collections};
pub use fingerprint::Fingerprint;
pub use loader::{load_file, parse_text, EXTENSIONS};
pub use paths::{discover_roots, discover_roots_with};

/// Placeholder entry shown first in the wildcard dropdown
pub const WILDCARD_PROMPT: &str = "Select the Wildcard to add to the text";

/// Hard failures of the collection store
#[derive(Debug, Error)]
pub enum StoreError {
    /// No root was found and the fallback directory could not be created
    #[error("no usable wildcard directory (fallback {} could not be created)", fallback.display())]
    NotConfigured { fallback: PathBuf },
}

/// An immutable view of every collection at one point in time
#[derive(Debug, Default)]
pub struct Snapshot {
    collections: Collections,
    fingerprint: Fingerprint,
    diagnostics: Vec<Diagnostic>,
}

impl Snapshot {
    /// Load all roots, lowest priority first
    fn load(roots: &[PathBuf], fingerprint: Fingerprint) -> Self {
        let mut collections = Collections::new();
        let mut diagnostics = Vec::new();
        for root in roots.iter().rev() {
            if root.is_dir() {
                loader::load_root(root, &mut collections, &mut diagnostics);
            }
        }
        log::info!(
            "loaded {} wildcard collections from {} directories",
            collections.len(),
            roots.len()
        );
        Self {
            collections,
            fingerprint,
            diagnostics,
        }
    }

    pub fn collections(&self) -> &Collections {
        &self.collections
    }

    pub fn fingerprint(&self) -> &Fingerprint {
        &self.fingerprint
    }

    /// Findings from the load that produced this snapshot
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Sorted collection names
    pub fn names(&self) -> Vec<String> {
        self.collections.names().map(str::to_string).collect()
    }

    /// Dropdown entries: a prompt line followed by `__name__` for each collection
    pub fn wildcard_choices(&self) -> Vec<String> {
        std::iter::once(WILDCARD_PROMPT.to_string())
            .chain(self.collections.names().map(|name| format!("__{}__", name)))
            .collect()
    }
}

/// Cached, self-refreshing collection store
#[derive(Debug, Default)]
pub struct CollectionStore {
    roots: Vec<PathBuf>,
    current: Mutex<Option<Arc<Snapshot>>>,
}

impl CollectionStore {
    /// Create a store over explicit roots, highest priority first
    pub fn new(roots: Vec<PathBuf>) -> Self {
        Self {
            roots,
            current: Mutex::new(None),
        }
    }

    /// Create a store over the roots discovered from `config`
    pub fn from_config(config: &StoreConfig) -> Result<Self, StoreError> {
        discover_roots(config).map(Self::new)
    }

    /// Like [`from_config`](Self::from_config), but degrades to a store with no roots
    pub fn discover_or_empty(config: &StoreConfig) -> Self {
        Self::from_config(config).unwrap_or_else(|err| {
            log::error!("{}; continuing without wildcards", err);
            Self::default()
        })
    }

    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }

    /// Current snapshot, rebuilt first if anything on disk changed
    pub fn get(&self) -> Arc<Snapshot> {
        let fingerprint = Fingerprint::scan(&self.roots);
        let mut current = self.current.lock();
        if let Some(snapshot) = current.as_ref() {
            if snapshot.fingerprint == fingerprint {
                return Arc::clone(snapshot);
            }
        }
        let snapshot = Arc::new(Snapshot::load(&self.roots, fingerprint));
        *current = Some(Arc::clone(&snapshot));
        snapshot
    }

    /// Rebuild the snapshot unconditionally
    pub fn refresh(&self) -> Arc<Snapshot> {
        let fingerprint = Fingerprint::scan(&self.roots);
        let mut current = self.current.lock();
        let snapshot = Arc::new(Snapshot::load(&self.roots, fingerprint));
        *current = Some(Arc::clone(&snapshot));
        snapshot
    }
}

/// Load the collections under `roots` once, without caching
pub fn resolve_collections(roots: &[PathBuf]) -> Collections {
    Snapshot::load(roots, Fingerprint::default()).collections
}

/// Load a single directory, returning the collections and load diagnostics
pub fn load_directory(root: &Path) -> (Collections, Vec<Diagnostic>) {
    let snapshot = Snapshot::load(&[root.to_path_buf()], Fingerprint::default());
    (snapshot.collections, snapshot.diagnostics)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(root: &Path, relative: &str, content: &str) {
        let path = root.join(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(path, content).unwrap();
    }

    #[test]
    fn test_get_is_cached_until_change() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "colors.txt", "red\nblue\n");
        let store = CollectionStore::new(vec![dir.path().to_path_buf()]);

        let first = store.get();
        let second = store.get();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(first.names(), vec!["colors"]);

        write(dir.path(), "shapes.txt", "circle\n");
        let third = store.get();
        assert!(!Arc::ptr_eq(&first, &third));
        assert_eq!(third.names(), vec!["colors", "shapes"]);
    }

    #[test]
    fn test_refresh_always_rebuilds() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "colors.txt", "red\n");
        let store = CollectionStore::new(vec![dir.path().to_path_buf()]);
        let first = store.get();
        let refreshed = store.refresh();
        assert!(!Arc::ptr_eq(&first, &refreshed));
        assert_eq!(refreshed.names(), first.names());
    }

    #[test]
    fn test_empty_store_has_no_collections() {
        let store = CollectionStore::default();
        let snapshot = store.get();
        assert!(snapshot.collections().is_empty());
        assert_eq!(snapshot.wildcard_choices(), vec![WILDCARD_PROMPT.to_string()]);
    }

    #[test]
    fn test_malformed_file_skipped_with_diagnostic() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "good.txt", "ok\n");
        write(dir.path(), "bad.yaml", "key: [unclosed\n");
        let (collections, diagnostics) = load_directory(dir.path());
        assert!(collections.contains("good"));
        assert_eq!(diagnostics.len(), 1);
        assert!(matches!(
            diagnostics[0],
            Diagnostic::MalformedCollectionFile { .. }
        ));
    }

    #[test]
    fn test_priority_root_wins() {
        let high = tempfile::tempdir().unwrap();
        let low = tempfile::tempdir().unwrap();
        write(high.path(), "colors.txt", "from-high\n");
        write(low.path(), "colors.txt", "from-low\n");
        write(low.path(), "extra.txt", "only-low\n");

        let collections =
            resolve_collections(&[high.path().to_path_buf(), low.path().to_path_buf()]);
        assert_eq!(collections.len(), 2);
        let colors = collections.get("colors").unwrap();
        assert_eq!(colors.alternatives()[0].text, "from-high");
    }

    #[test]
    fn test_wildcard_choices_format() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "b.txt", "x\n");
        write(dir.path(), "a/c.txt", "y\n");
        let store = CollectionStore::new(vec![dir.path().to_path_buf()]);
        assert_eq!(
            store.get().wildcard_choices(),
            vec![
                WILDCARD_PROMPT.to_string(),
                "__a/c__".to_string(),
                "__b__".to_string()
            ]
        );
    }
}
