//! # Bookpedia Configuration
//!
//! Configuration for the catalog client, the search pipeline and storage.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     BOOKPEDIA_API_URL=https://openlibrary.org                          │
//! │     BOOKPEDIA_DB_PATH=/tmp/favorites.db                                │
//! │     BOOKPEDIA_STORAGE=memory                                           │
//! │     BOOKPEDIA_DEBOUNCE_MS=300                                          │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/bookpedia/bookpedia.toml (Linux)                         │
//! │     ~/Library/Application Support/com.bookpedia.app/... (macOS)        │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! [api]
//! base_url = "https://openlibrary.org"
//! covers_url = "https://covers.openlibrary.org"
//! language = "eng"
//! request_timeout_secs = 30
//! connect_timeout_secs = 15
//!
//! [search]
//! debounce_ms = 500
//! min_query_chars = 2
//! default_query = "Kotlin"
//! grace_period_ms = 5000
//!
//! [storage]
//! backend = "sqlite"  # sqlite | memory
//! database_path = "/path/to/favorites.db"
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

use bookpedia_core::{DEFAULT_SEARCH_QUERY, MIN_QUERY_CHARS};
use bookpedia_db::{DbConfig, StoreBackend};

use crate::error::{SyncError, SyncResult};

// =============================================================================
// API Settings
// =============================================================================

/// Catalog API client settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiSettings {
    /// Catalog root, e.g. `https://openlibrary.org`.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Cover image host.
    #[serde(default = "default_covers_url")]
    pub covers_url: String,

    /// Language filter sent with every search.
    #[serde(default = "default_language")]
    pub language: String,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Total request timeout (seconds).
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Connect timeout (seconds).
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,

    /// Result limit for searches. `None` lets the catalog decide.
    #[serde(default)]
    pub search_limit: Option<u32>,
}

fn default_base_url() -> String {
    "https://openlibrary.org".to_string()
}

fn default_covers_url() -> String {
    "https://covers.openlibrary.org".to_string()
}

fn default_language() -> String {
    "eng".to_string()
}

fn default_user_agent() -> String {
    "Bookpedia-App/1.0".to_string()
}

fn default_request_timeout() -> u64 {
    30
}

fn default_connect_timeout() -> u64 {
    15
}

impl Default for ApiSettings {
    fn default() -> Self {
        ApiSettings {
            base_url: default_base_url(),
            covers_url: default_covers_url(),
            language: default_language(),
            user_agent: default_user_agent(),
            request_timeout_secs: default_request_timeout(),
            connect_timeout_secs: default_connect_timeout(),
            search_limit: None,
        }
    }
}

impl ApiSettings {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

// =============================================================================
// Search Settings
// =============================================================================

/// Search pipeline tuning.
///
/// ## Timeline
/// ```text
/// keystrokes:  K  Ko  Kot  Kotl  Kotli  Kotlin
///              │   │   │    │     │      │
///              └───┴───┴────┴─────┴──────┴── debounce_ms ──► search("Kotlin")
///
/// last view detached ── grace_period_ms ──► upstream work stops
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchSettings {
    /// Quiet time before a query settles (milliseconds).
    #[serde(default = "default_debounce")]
    pub debounce_ms: u64,

    /// Shortest query that reaches the catalog.
    #[serde(default = "default_min_query_chars")]
    pub min_query_chars: usize,

    /// Query the search screen opens with.
    #[serde(default = "default_query")]
    pub default_query: String,

    /// How long the machine stays warm after the last view detaches
    /// (milliseconds).
    #[serde(default = "default_grace_period")]
    pub grace_period_ms: u64,
}

fn default_debounce() -> u64 {
    500
}

fn default_min_query_chars() -> usize {
    MIN_QUERY_CHARS
}

fn default_query() -> String {
    DEFAULT_SEARCH_QUERY.to_string()
}

fn default_grace_period() -> u64 {
    5_000
}

impl Default for SearchSettings {
    fn default() -> Self {
        SearchSettings {
            debounce_ms: default_debounce(),
            min_query_chars: default_min_query_chars(),
            default_query: default_query(),
            grace_period_ms: default_grace_period(),
        }
    }
}

impl SearchSettings {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn grace_period(&self) -> Duration {
        Duration::from_millis(self.grace_period_ms)
    }
}

// =============================================================================
// Storage Settings
// =============================================================================

/// Which favorites backend to open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageKind {
    #[default]
    Sqlite,
    Memory,
}

impl std::fmt::Display for StorageKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageKind::Sqlite => write!(f, "sqlite"),
            StorageKind::Memory => write!(f, "memory"),
        }
    }
}

impl std::str::FromStr for StorageKind {
    type Err = SyncError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "sqlite" | "disk" => Ok(StorageKind::Sqlite),
            "memory" | "in-memory" => Ok(StorageKind::Memory),
            other => Err(SyncError::InvalidConfig(format!(
                "Unknown storage backend: '{}'. Valid options: sqlite, memory",
                other
            ))),
        }
    }
}

/// Favorites storage settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StorageSettings {
    #[serde(default)]
    pub backend: StorageKind,

    /// SQLite file. Defaults to the platform data directory.
    #[serde(default)]
    pub database_path: Option<PathBuf>,
}

impl StorageSettings {
    /// Resolves the database file path.
    pub fn resolved_path(&self) -> PathBuf {
        self.database_path
            .clone()
            .or_else(|| {
                directories::ProjectDirs::from("com", "bookpedia", "app")
                    .map(|dirs| dirs.data_dir().join("favorites.db"))
            })
            .unwrap_or_else(|| PathBuf::from("favorites.db"))
    }

    /// The store factory input for these settings.
    pub fn backend(&self) -> StoreBackend {
        match self.backend {
            StorageKind::Sqlite => StoreBackend::Sqlite(DbConfig::new(self.resolved_path())),
            StorageKind::Memory => StoreBackend::Memory,
        }
    }
}

// =============================================================================
// Main Configuration
// =============================================================================

/// Complete Bookpedia configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BookpediaConfig {
    #[serde(default)]
    pub api: ApiSettings,

    #[serde(default)]
    pub search: SearchSettings,

    #[serde(default)]
    pub storage: StorageSettings,
}

impl BookpediaConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (bookpedia.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> SyncResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Loads config or returns default if load fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load config: {}. Using defaults.", e);
            Self::default()
        })
    }

    /// Saves configuration to file.
    pub fn save(&self, config_path: Option<PathBuf>) -> SyncResult<()> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or_else(|| SyncError::ConfigSaveFailed("No config path available".into()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| SyncError::ConfigSaveFailed(e.to_string()))?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents).map_err(|e| SyncError::ConfigSaveFailed(e.to_string()))?;

        info!(?path, "Config saved");
        Ok(())
    }

    /// Validates the configuration.
    pub fn validate(&self) -> SyncResult<()> {
        validate_http_url("base_url", &self.api.base_url)?;
        validate_http_url("covers_url", &self.api.covers_url)?;

        if self.api.language.trim().is_empty() {
            return Err(SyncError::InvalidConfig("language must not be empty".into()));
        }

        if self.api.request_timeout_secs == 0 || self.api.connect_timeout_secs == 0 {
            return Err(SyncError::InvalidConfig(
                "timeouts must be greater than 0".into(),
            ));
        }

        if self.api.search_limit == Some(0) {
            return Err(SyncError::InvalidConfig(
                "search_limit must be greater than 0 when set".into(),
            ));
        }

        if self.search.debounce_ms == 0 || self.search.grace_period_ms == 0 {
            return Err(SyncError::InvalidConfig(
                "debounce_ms and grace_period_ms must be greater than 0".into(),
            ));
        }

        if self.search.min_query_chars == 0 {
            return Err(SyncError::InvalidConfig(
                "min_query_chars must be at least 1".into(),
            ));
        }

        Ok(())
    }

    /// Applies environment variable overrides.
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup("BOOKPEDIA_API_URL") {
            debug!(url = %url, "Overriding API URL from environment");
            self.api.base_url = url;
        }

        if let Some(path) = lookup("BOOKPEDIA_DB_PATH") {
            debug!(path = %path, "Overriding database path from environment");
            self.storage.database_path = Some(PathBuf::from(path));
        }

        if let Some(kind) = lookup("BOOKPEDIA_STORAGE") {
            match kind.parse() {
                Ok(parsed) => self.storage.backend = parsed,
                Err(e) => warn!(error = %e, "Ignoring BOOKPEDIA_STORAGE"),
            }
        }

        if let Some(ms) = lookup("BOOKPEDIA_DEBOUNCE_MS") {
            if let Ok(ms) = ms.parse::<u64>() {
                self.search.debounce_ms = ms;
            }
        }
    }

    /// Returns the default config file path.
    pub fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "bookpedia", "app")
            .map(|dirs| dirs.config_dir().join("bookpedia.toml"))
    }
}

fn validate_http_url(field: &str, value: &str) -> SyncResult<()> {
    let url = Url::parse(value)?;
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(SyncError::InvalidUrl(format!(
            "{} must be http:// or https://, got: {}",
            field, value
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults_match_fixed_constants() {
        let config = BookpediaConfig::default();
        assert_eq!(config.api.base_url, "https://openlibrary.org");
        assert_eq!(config.api.request_timeout(), Duration::from_secs(30));
        assert_eq!(config.api.connect_timeout(), Duration::from_secs(15));
        assert_eq!(config.api.user_agent, "Bookpedia-App/1.0");
        assert_eq!(config.api.language, "eng");
        assert_eq!(config.search.debounce(), Duration::from_millis(500));
        assert_eq!(config.search.grace_period(), Duration::from_secs(5));
        assert_eq!(config.search.min_query_chars, 2);
        assert_eq!(config.search.default_query, "Kotlin");
        assert_eq!(config.storage.backend, StorageKind::Sqlite);
    }

    #[test]
    fn test_config_validation() {
        let mut config = BookpediaConfig::default();
        assert!(config.validate().is_ok());

        config.api.base_url = "ftp://openlibrary.org".into();
        assert!(config.validate().is_err());

        config.api.base_url = "not a url".into();
        assert!(matches!(config.validate(), Err(SyncError::InvalidUrl(_))));

        config.api.base_url = "http://127.0.0.1:8080".into();
        assert!(config.validate().is_ok());

        config.search.debounce_ms = 0;
        assert!(config.validate().is_err());
        config.search.debounce_ms = 500;

        config.api.search_limit = Some(0);
        assert!(config.validate().is_err());
        config.api.search_limit = Some(20);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_storage_kind_parsing() {
        assert_eq!("sqlite".parse::<StorageKind>().unwrap(), StorageKind::Sqlite);
        assert_eq!("MEMORY".parse::<StorageKind>().unwrap(), StorageKind::Memory);
        assert!("redis".parse::<StorageKind>().is_err());
    }

    #[test]
    fn test_overrides() {
        let env: HashMap<&str, &str> = [
            ("BOOKPEDIA_API_URL", "http://localhost:9000"),
            ("BOOKPEDIA_STORAGE", "memory"),
            ("BOOKPEDIA_DEBOUNCE_MS", "250"),
            ("BOOKPEDIA_DB_PATH", "/tmp/books.db"),
        ]
        .into_iter()
        .collect();

        let mut config = BookpediaConfig::default();
        config.apply_overrides(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.api.base_url, "http://localhost:9000");
        assert_eq!(config.storage.backend, StorageKind::Memory);
        assert_eq!(config.search.debounce_ms, 250);
        assert_eq!(
            config.storage.resolved_path(),
            PathBuf::from("/tmp/books.db")
        );
        assert_eq!(config.storage.backend(), StoreBackend::Memory);
    }

    #[test]
    fn test_bad_override_is_ignored() {
        let mut config = BookpediaConfig::default();
        config.apply_overrides(|key| match key {
            "BOOKPEDIA_STORAGE" => Some("tape".into()),
            "BOOKPEDIA_DEBOUNCE_MS" => Some("soon".into()),
            _ => None,
        });
        assert_eq!(config, BookpediaConfig::default());
    }

    #[test]
    fn test_toml_round_trip() {
        let mut config = BookpediaConfig::default();
        config.api.search_limit = Some(40);
        config.storage.backend = StorageKind::Memory;

        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("[api]"));
        assert!(toml_str.contains("[search]"));
        assert!(toml_str.contains("backend = \"memory\""));

        let back: BookpediaConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config: BookpediaConfig = toml::from_str("[search]\ndebounce_ms = 200\n").unwrap();
        assert_eq!(config.search.debounce_ms, 200);
        assert_eq!(config.search.default_query, "Kotlin");
        assert_eq!(config.api, ApiSettings::default());
    }

    #[test]
    fn test_load_from_file() {
        let path = std::env::temp_dir().join(format!(
            "bookpedia-config-{}.toml",
            std::process::id()
        ));
        std::fs::write(&path, "[api]\nsearch_limit = 12\n").unwrap();

        let config = BookpediaConfig::load(Some(path.clone())).unwrap();
        assert_eq!(config.api.search_limit, Some(12));

        std::fs::remove_file(path).ok();
    }
}
