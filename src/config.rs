use anyhow::Result;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration structure for brewpass
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BrewpassConfig {
    /// Hosted order store settings
    pub store: StoreConfig,
    /// Scan session behavior
    pub scanner: ScannerConfig,
    /// Observability settings
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StoreConfig {
    /// Base URL of the hosted backend, e.g. https://xyz.supabase.co
    pub url: String,
    /// API key sent as apikey + bearer token (can be set via env var)
    pub api_key: Option<String>,
    /// Table holding the order rows
    pub table: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ScannerConfig {
    /// Ask the operator before validating a decoded payload
    pub confirm_before_validate: bool,
    /// Keep the session alive after a decode instead of stopping
    pub continuous_scan: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ObservabilityConfig {
    /// Log level filter, overridable via RUST_LOG
    pub log_level: String,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            confirm_before_validate: true,
            continuous_scan: false,
        }
    }
}

impl Default for BrewpassConfig {
    fn default() -> Self {
        Self {
            store: StoreConfig {
                url: "http://localhost:54321".to_string(),
                api_key: None, // Read from env var or brewpass.toml
                table: "QRcode".to_string(),
            },
            scanner: ScannerConfig::default(),
            observability: ObservabilityConfig {
                log_level: "info".to_string(),
            },
        }
    }
}

impl BrewpassConfig {
    /// Load configuration with precedence:
    /// 1. Default values
    /// 2. Configuration file (brewpass.toml)
    /// 3. Environment variables (prefixed with BREWPASS_)
    pub fn load() -> Result<Self> {
        let defaults = BrewpassConfig::default();
        let mut builder = Config::builder()
            .set_default("store.url", defaults.store.url.clone())?
            .set_default("store.table", defaults.store.table.clone())?
            .set_default(
                "scanner.confirm_before_validate",
                defaults.scanner.confirm_before_validate,
            )?
            .set_default("scanner.continuous_scan", defaults.scanner.continuous_scan)?
            .set_default(
                "observability.log_level",
                defaults.observability.log_level.clone(),
            )?;

        if Path::new("brewpass.toml").exists() {
            builder = builder.add_source(File::with_name("brewpass"));
        }

        builder = builder.add_source(
            Environment::with_prefix("BREWPASS")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        let mut brewpass_config: BrewpassConfig = config.try_deserialize()?;

        // The key is usually kept out of the config file
        if brewpass_config.store.api_key.is_none() {
            if let Ok(key) = std::env::var("BREWPASS_API_KEY") {
                brewpass_config.store.api_key = Some(key);
            }
        }

        Ok(brewpass_config)
    }

    /// Load .env file if it exists
    pub fn load_env_file() -> Result<()> {
        if Path::new(".env").exists() {
            dotenvy::dotenv()?;
            tracing::info!("Loaded environment variables from .env file");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_target_the_order_table() {
        let config = BrewpassConfig::default();
        assert_eq!(config.store.table, "QRcode");
        assert!(config.scanner.confirm_before_validate);
        assert!(!config.scanner.continuous_scan);
    }
}
