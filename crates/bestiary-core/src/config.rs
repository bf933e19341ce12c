//! Configuration structures for the vault-bestiary workspace.
//!
//! This module provides configuration types for all components of the system:
//!
//! - [`ParseConfig`] - Scan coordinator settings (auto-parsing, scope paths, debug)
//! - [`WatchConfig`] - File watcher settings (debouncing, recursion)
//! - [`Config`] - Root configuration combining all settings
//!
//! Persistence of these values is the host's concern; the core components only
//! read the current values. All configuration types implement [`Default`] with
//! values matching a freshly-installed plugin.

use camino::Utf8Path;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Configuration for the scan coordinator and parsing pipeline.
///
/// Controls whether vault notes are parsed automatically, which folder
/// prefixes are in scope, and whether verbose per-file logging is enabled.
///
/// # Scope Semantics
///
/// `scope_paths` holds vault-relative folder prefixes. An empty list, or a
/// list containing the root prefix `"/"`, means every markdown note in the
/// vault qualifies. Otherwise a note qualifies only when its path starts
/// with one of the configured prefixes.
///
/// # Examples
///
/// ```
/// use bestiary_core::ParseConfig;
///
/// let config = ParseConfig::default();
/// assert!(config.auto_parse);
/// assert!(config.scope_paths.is_empty());
/// assert!(!config.debug);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParseConfig {
    /// Whether vault change events trigger automatic re-parsing.
    ///
    /// When disabled, the coordinator ignores metadata, rename, and delete
    /// events entirely; only explicit rescan requests do any work.
    pub auto_parse: bool,

    /// Vault-relative folder prefixes to scan.
    ///
    /// Empty, or containing `"/"`, means the whole vault is in scope.
    pub scope_paths: Vec<String>,

    /// Whether verbose per-file debug logging is enabled.
    pub debug: bool,
}

impl Default for ParseConfig {
    fn default() -> Self {
        Self {
            auto_parse: true,
            scope_paths: Vec::new(),
            debug: false,
        }
    }
}

impl ParseConfig {
    /// Returns `true` if the given vault-relative path falls inside the
    /// configured scope prefixes.
    ///
    /// # Examples
    ///
    /// ```
    /// use bestiary_core::ParseConfig;
    ///
    /// let mut config = ParseConfig::default();
    /// assert!(config.contains_path("anywhere/creature.md"));
    ///
    /// config.scope_paths = vec!["bestiary".to_owned()];
    /// assert!(config.contains_path("bestiary/goblin.md"));
    /// assert!(!config.contains_path("journal/2024.md"));
    /// ```
    #[must_use]
    pub fn contains_path(&self, path: &str) -> bool {
        if self.scope_paths.is_empty() || self.scope_paths.iter().any(|p| p == "/") {
            return true;
        }
        self.scope_paths.iter().any(|p| path.starts_with(p.as_str()))
    }
}

/// Configuration for the vault file watcher.
///
/// Controls how file changes are detected and debounced.
///
/// # Examples
///
/// ```
/// use bestiary_core::WatchConfig;
///
/// let config = WatchConfig::default();
/// assert_eq!(config.debounce_ms, 100);
/// assert!(config.recursive);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct WatchConfig {
    /// Debounce window in milliseconds.
    ///
    /// Multiple file changes within this window are coalesced.
    pub debounce_ms: u64,

    /// Whether to watch subdirectories recursively.
    pub recursive: bool,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 100,
            recursive: true,
        }
    }
}

/// Root configuration for the vault-bestiary system.
///
/// Combines all component configurations into a single structure that can be
/// loaded from a configuration file or constructed programmatically.
///
/// # Examples
///
/// ```
/// use bestiary_core::Config;
///
/// // Create with defaults
/// let config = Config::default();
///
/// // Serialize to JSON
/// let json = serde_json::to_string_pretty(&config).unwrap();
/// assert!(json.contains("auto_parse"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Scan coordinator configuration.
    pub parse: ParseConfig,

    /// File watcher configuration.
    pub watch: WatchConfig,
}

impl Config {
    /// Loads and validates configuration from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read,
    /// [`ConfigError::Parse`] if it is not valid JSON, or a validation
    /// error from [`validate`](Self::validate).
    pub fn load(path: &Utf8Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks option values that deserialization cannot enforce.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidOption`] for an empty scope entry and
    /// [`ConfigError::InvalidPath`] for a scope prefix that is not
    /// vault-relative.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for prefix in &self.parse.scope_paths {
            if prefix.is_empty() {
                return Err(ConfigError::InvalidOption {
                    option: "parse.scope_paths".to_owned(),
                    reason: "must not contain empty entries".to_owned(),
                });
            }
            // "/" is the whole-vault sentinel; any other absolute prefix
            // can never match a vault-relative note path.
            if prefix != "/" && prefix.starts_with('/') {
                return Err(ConfigError::InvalidPath {
                    path: prefix.as_str().into(),
                    reason: "scope prefixes must be vault-relative".to_owned(),
                });
            }
        }
        Ok(())
    }
}
