//! Application configuration management.

use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    /// Ledger configuration.
    #[serde(default)]
    pub ledger: LedgerConfig,
}

/// Ledger configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LedgerConfig {
    /// Number of items committed per chunk in bulk operations.
    #[serde(default = "default_bulk_chunk_size")]
    pub bulk_chunk_size: usize,
    /// Zero-padding width for generated sequence numbers.
    #[serde(default = "default_sequence_padding")]
    pub sequence_padding: u32,
    /// Whether entry numbers include the year segment.
    #[serde(default = "default_include_year")]
    pub include_year_in_entry_numbers: bool,
}

fn default_bulk_chunk_size() -> usize {
    50
}

fn default_sequence_padding() -> u32 {
    5
}

fn default_include_year() -> bool {
    true
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            bulk_chunk_size: default_bulk_chunk_size(),
            sequence_padding: default_sequence_padding(),
            include_year_in_entry_numbers: default_include_year(),
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
            .add_source(config::Environment::with_prefix("TALLY").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}
