//! Configuration loader with layered sources
//!
//! Loads configuration from multiple sources with the following precedence
//! (highest to lowest):
//! 1. Environment variables (COURTIQ_ACCESS__*)
//! 2. Configuration file (TOML)
//! 3. Default values

use crate::access_control::IdentifierPattern;
use crate::config::types::AppConfig;
use crate::error::ConfigError;
use config::{Config, Environment, File, FileFormat};
use std::path::Path;

/// Default configuration file paths to check (in order)
const DEFAULT_CONFIG_PATHS: &[&str] = &[
    "courtiq-access.toml",
    ".courtiq-access.toml",
    "~/.config/courtiq-access/config.toml",
    "/etc/courtiq-access/config.toml",
];

/// Load configuration from a TOML string (useful for testing)
pub fn load_config_from_str(toml_str: &str) -> Result<AppConfig, ConfigError> {
    let config = Config::builder()
        .add_source(File::from_str(toml_str, FileFormat::Toml))
        .build()
        .map_err(|e| ConfigError::Load(e.to_string()))?;

    let app_config: AppConfig = config
        .try_deserialize()
        .map_err(|e| ConfigError::Load(e.to_string()))?;

    validate_config(&app_config)?;

    Ok(app_config)
}

/// Load configuration from files and environment
pub fn load_config(config_path: Option<&str>) -> Result<AppConfig, ConfigError> {
    let mut builder = Config::builder();

    if let Some(path) = config_path {
        // Explicit path provided - must exist
        if !Path::new(path).exists() {
            return Err(ConfigError::Load(format!(
                "Configuration file not found: {}",
                path
            )));
        }
        builder = builder.add_source(File::new(path, FileFormat::Toml));
    } else {
        // First existing default path wins
        for path in DEFAULT_CONFIG_PATHS {
            let expanded = shellexpand::tilde(path);
            if Path::new(expanded.as_ref()).exists() {
                builder = builder.add_source(File::new(&expanded, FileFormat::Toml));
                break;
            }
        }
    }

    // e.g. COURTIQ_ACCESS__CACHE__TTL_SECS maps to cache.ttl_secs
    builder = builder.add_source(
        Environment::with_prefix("COURTIQ_ACCESS")
            .prefix_separator("__")
            .separator("__")
            .try_parsing(true),
    );

    let config = builder
        .build()
        .map_err(|e| ConfigError::Load(e.to_string()))?;

    let app_config: AppConfig = config
        .try_deserialize()
        .map_err(|e| ConfigError::Load(e.to_string()))?;

    validate_config(&app_config)?;

    Ok(app_config)
}

/// Validate configuration values
fn validate_config(config: &AppConfig) -> Result<(), ConfigError> {
    for (field, value) in [
        ("cache.ttl_secs", config.cache.ttl_secs),
        ("cache.owner_ttl_secs", config.cache.owner_ttl_secs),
        ("cache.denial_ttl_secs", config.cache.denial_ttl_secs),
    ] {
        if value == 0 {
            return Err(ConfigError::Invalid {
                message: format!("{} must be greater than 0", field),
            });
        }
    }

    IdentifierPattern::from_config(config.identifiers.pattern.as_deref())?;

    if let Some(fixtures) = &config.store.fixtures
        && fixtures.trim().is_empty()
    {
        return Err(ConfigError::Missing {
            field: "store.fixtures".to_string(),
        });
    }

    for (operation, spec) in &config.guards {
        spec.validate().map_err(|e| ConfigError::Invalid {
            message: format!("guards.{}: {}", operation, e),
        })?;
    }

    Ok(())
}
