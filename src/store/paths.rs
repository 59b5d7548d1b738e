//! Discovery of wildcard root directories

use std::path::{Path, PathBuf};

use crate::config::StoreConfig;

use super::StoreError;

/// Find the wildcard roots, highest priority first
///
/// Priority:
/// 1. the directory named by the configured environment variable (created if missing)
/// 2. the host default directory (created) and any other host directory that exists
/// 3. the install-relative local directory, if it exists
/// 4. the fallback directory, created only when nothing above produced a root
pub fn discover_roots(config: &StoreConfig) -> Result<Vec<PathBuf>, StoreError> {
    let env_path = std::env::var_os(&config.env_var)
        .filter(|value| !value.is_empty())
        .map(PathBuf::from);
    discover_roots_with(config, env_path)
}

/// Same as [`discover_roots`] with the environment override passed explicitly
pub fn discover_roots_with(
    config: &StoreConfig,
    env_path: Option<PathBuf>,
) -> Result<Vec<PathBuf>, StoreError> {
    let mut roots: Vec<PathBuf> = Vec::new();

    if let Some(path) = env_path {
        if ensure_dir(&path) {
            push_unique(&mut roots, path);
        }
    }

    let host_paths = config.default_path.iter().chain(config.host_paths.iter());
    for path in host_paths {
        let is_default = config.default_path.as_ref() == Some(path);
        if (path.exists() || is_default) && ensure_dir(path) {
            push_unique(&mut roots, path.clone());
        }
    }

    if let Some(local) = &config.local_path {
        if local.is_dir() {
            push_unique(&mut roots, local.clone());
        }
    }

    if roots.is_empty() {
        if !ensure_dir(&config.fallback_path) {
            return Err(StoreError::NotConfigured {
                fallback: config.fallback_path.clone(),
            });
        }
        roots.push(config.fallback_path.clone());
    }

    Ok(roots)
}

fn ensure_dir(path: &Path) -> bool {
    match std::fs::create_dir_all(path) {
        Ok(()) => true,
        Err(err) => {
            log::warn!("cannot use wildcard directory {}: {}", path.display(), err);
            false
        }
    }
}

fn push_unique(roots: &mut Vec<PathBuf>, path: PathBuf) {
    if !roots.contains(&path) {
        roots.push(path);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_path_created_and_first() {
        let dir = tempfile::tempdir().unwrap();
        let env_dir = dir.path().join("from_env");
        let host = dir.path().join("host");
        std::fs::create_dir(&host).unwrap();

        let config = StoreConfig::new().with_host_path(&host);
        let roots = discover_roots_with(&config, Some(env_dir.clone())).unwrap();
        assert_eq!(roots, vec![env_dir.clone(), host]);
        assert!(env_dir.is_dir());
    }

    #[test]
    fn test_missing_host_path_skipped_but_default_created() {
        let dir = tempfile::tempdir().unwrap();
        let default = dir.path().join("default");
        let missing = dir.path().join("missing");

        let config = StoreConfig::new()
            .with_default_path(&default)
            .with_host_path(&missing);
        let roots = discover_roots_with(&config, None).unwrap();
        assert_eq!(roots, vec![default.clone()]);
        assert!(default.is_dir());
        assert!(!missing.exists());
    }

    #[test]
    fn test_duplicates_collapsed() {
        let dir = tempfile::tempdir().unwrap();
        let shared = dir.path().join("shared");
        let config = StoreConfig::new()
            .with_default_path(&shared)
            .with_host_path(&shared);
        let roots = discover_roots_with(&config, Some(shared.clone())).unwrap();
        assert_eq!(roots, vec![shared]);
    }

    #[test]
    fn test_local_path_only_if_present() {
        let dir = tempfile::tempdir().unwrap();
        let local = dir.path().join("local");
        let fallback = dir.path().join("fallback");
        let config = StoreConfig::new()
            .with_local_path(&local)
            .with_fallback_path(&fallback);

        let roots = discover_roots_with(&config, None).unwrap();
        assert_eq!(roots, vec![fallback.clone()]);

        std::fs::create_dir(&local).unwrap();
        let roots = discover_roots_with(&config, None).unwrap();
        assert_eq!(roots, vec![local]);
    }

    #[test]
    fn test_unusable_fallback_is_not_configured() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("file");
        std::fs::write(&blocker, "not a directory").unwrap();
        let config = StoreConfig::new().with_fallback_path(blocker.join("wildcards"));

        let result = discover_roots_with(&config, None);
        assert!(matches!(result, Err(StoreError::NotConfigured { .. })));
    }
}
