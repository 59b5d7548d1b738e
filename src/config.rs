//! Configuration for wildcard discovery and template expansion
//!
//! Settings can be built in code with the builder methods or loaded from a TOML file:
//!
//! ```toml
//! [wildcards]
//! env_var = "LUMI_WILDCARDS_PATH"
//! default_path = "/opt/comfy/wildcards"
//! paths = ["/home/me/wildcards"]
//!
//! [resolver]
//! max_passes = 500
//! joiner = " and "
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

/// Environment variable consulted first for a wildcard directory
pub const DEFAULT_ENV_VAR: &str = "LUMI_WILDCARDS_PATH";

/// Errors that can occur when loading a configuration file
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse config TOML: {0}")]
    ParseError(#[from] toml::de::Error),
}

/// Where the collection store looks for wildcard directories
#[derive(Debug, Clone, PartialEq)]
pub struct StoreConfig {
    /// Environment variable naming an override directory (created if missing)
    pub env_var: String,
    /// Host default directory; always created and used
    pub default_path: Option<PathBuf>,
    /// Additional host-registered directories; used only if they exist
    pub host_paths: Vec<PathBuf>,
    /// Directory shipped next to the installation; used only if it exists
    pub local_path: Option<PathBuf>,
    /// Created and used when nothing else was found
    pub fallback_path: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            env_var: DEFAULT_ENV_VAR.to_string(),
            default_path: None,
            host_paths: Vec::new(),
            local_path: None,
            fallback_path: PathBuf::from("./wildcards"),
        }
    }
}

impl StoreConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the environment variable to consult
    pub fn with_env_var(mut self, name: impl Into<String>) -> Self {
        self.env_var = name.into();
        self
    }

    /// Set the host default directory
    pub fn with_default_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.default_path = Some(path.into());
        self
    }

    /// Register an additional host directory
    pub fn with_host_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.host_paths.push(path.into());
        self
    }

    /// Set the install-relative directory
    pub fn with_local_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.local_path = Some(path.into());
        self
    }

    /// Set the last-resort directory
    pub fn with_fallback_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.fallback_path = path.into();
        self
    }
}

/// Limits and defaults applied while expanding a template
#[derive(Debug, Clone, PartialEq)]
pub struct ResolverConfig {
    /// Maximum number of tokens expanded in one call
    pub max_passes: usize,
    /// Maximum number of bytes expansion may add beyond the template itself
    pub max_length: usize,
    /// Joiner used by multi-pick choices such as `{2$$a|b|c}`
    pub joiner: String,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            max_passes: 1000,
            max_length: 100_000,
            joiner: ", ".to_string(),
        }
    }
}

impl ResolverConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum number of expansion passes
    pub fn with_max_passes(mut self, passes: usize) -> Self {
        self.max_passes = passes;
        self
    }

    /// Set the maximum expanded length
    pub fn with_max_length(mut self, length: usize) -> Self {
        self.max_length = length;
        self
    }

    /// Set the joiner for multi-pick choices
    pub fn with_joiner(mut self, joiner: impl Into<String>) -> Self {
        self.joiner = joiner.into();
        self
    }
}

/// Complete configuration loaded from a file
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LumiConfig {
    pub store: StoreConfig,
    pub resolver: ResolverConfig,
}

/// TOML structure for deserializing configuration files
#[derive(Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct TomlConfig {
    wildcards: Option<TomlWildcards>,
    resolver: Option<TomlResolver>,
}

#[derive(Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct TomlWildcards {
    env_var: Option<String>,
    default_path: Option<PathBuf>,
    #[serde(default)]
    paths: Vec<PathBuf>,
    local_path: Option<PathBuf>,
    fallback_path: Option<PathBuf>,
}

#[derive(Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct TomlResolver {
    max_passes: Option<usize>,
    max_length: Option<usize>,
    joiner: Option<String>,
}

impl LumiConfig {
    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Load configuration from a TOML string; absent keys keep their defaults
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        let parsed: TomlConfig = toml::from_str(content)?;
        let wildcards = parsed.wildcards.unwrap_or_default();
        let resolver = parsed.resolver.unwrap_or_default();

        let store_defaults = StoreConfig::default();
        let store = StoreConfig {
            env_var: wildcards.env_var.unwrap_or(store_defaults.env_var),
            default_path: wildcards.default_path,
            host_paths: wildcards.paths,
            local_path: wildcards.local_path,
            fallback_path: wildcards
                .fallback_path
                .unwrap_or(store_defaults.fallback_path),
        };

        let resolver_defaults = ResolverConfig::default();
        let resolver = ResolverConfig {
            max_passes: resolver.max_passes.unwrap_or(resolver_defaults.max_passes),
            max_length: resolver.max_length.unwrap_or(resolver_defaults.max_length),
            joiner: resolver.joiner.unwrap_or(resolver_defaults.joiner),
        };

        Ok(Self { store, resolver })
    }
}
