//! Application configuration management.

use serde::Deserialize;

/// Application configuration.
///
/// Every section has defaults, so an empty environment yields a working
/// configuration with the observed 12-hour cache validity.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Result cache configuration.
    #[serde(default)]
    pub cache: CacheConfig,
    /// Row retrieval configuration.
    #[serde(default)]
    pub retrieval: RetrievalConfig,
    /// Report behaviour configuration.
    #[serde(default)]
    pub report: ReportConfig,
    /// Row source configuration.
    #[serde(default)]
    pub source: SourceConfig,
}

/// What a read does when it finds a stale cache entry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StalePolicy {
    /// Rebuild synchronously; the reader waits for the new value.
    #[default]
    Block,
    /// Return the stale value at once and refresh it in the background.
    ServeStale,
}

/// Result cache configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    /// Hours a built entry stays fresh.
    #[serde(default = "default_validity_hours")]
    pub validity_hours: u64,
    /// Maximum number of cached period snapshots.
    #[serde(default = "default_max_capacity")]
    pub max_capacity: u64,
    /// Stale-entry read policy.
    #[serde(default)]
    pub stale_policy: StalePolicy,
    /// Hours the available-filters listing stays fresh.
    #[serde(default = "default_filters_validity_hours")]
    pub filters_validity_hours: u64,
}

fn default_validity_hours() -> u64 {
    12
}

fn default_filters_validity_hours() -> u64 {
    24
}

fn default_max_capacity() -> u64 {
    256
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            validity_hours: default_validity_hours(),
            max_capacity: default_max_capacity(),
            stale_policy: StalePolicy::default(),
            filters_validity_hours: default_filters_validity_hours(),
        }
    }
}

/// Row retrieval configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct RetrievalConfig {
    /// Seconds to wait for the row source before failing the build.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    120
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Report behaviour configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReportConfig {
    /// Expose rows with an unknown category or group in the drill-down.
    #[serde(default)]
    pub unclassified_detail: bool,
}

/// Row source configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct SourceConfig {
    /// Path of the JSON file holding ledger rows.
    #[serde(default = "default_source_path")]
    pub path: String,
    /// Path of the JSON file holding additional-credit rows, if any.
    #[serde(default)]
    pub credits_path: Option<String>,
}

fn default_source_path() -> String {
    "data/ledger_rows.json".to_string()
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            path: default_source_path(),
            credits_path: None,
        }
    }
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(
                config::Environment::with_prefix("BUDGETEXEC")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}
