//! Configuration types for courtiq-access
//!
//! This module defines the configuration structure that can be loaded from
//! TOML files and/or environment variables.

use crate::access_control::CacheTtls;
use crate::guard::ConditionSpec;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Access decision cache
    pub cache: CacheConfig,

    /// Identifier validation
    pub identifiers: IdentifierConfig,

    /// Relationship store settings
    pub store: StoreConfig,

    /// Logging configuration
    pub logging: LoggingConfig,

    /// Condition specs keyed by operation name
    pub guards: HashMap<String, ConditionSpec>,
}

/// Access decision cache configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Maximum number of cached decisions (0 disables the cache)
    pub max_entries: usize,

    /// TTL of decisions derived from relationships
    pub ttl_secs: u64,

    /// TTL of owner and PUBLIC grants
    pub owner_ttl_secs: u64,

    /// TTL of PRIVATE and blocked denials
    pub denial_ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_entries: crate::access_control::cache::DEFAULT_MAX_ENTRIES,
            ttl_secs: 300,
            owner_ttl_secs: 86_400,
            denial_ttl_secs: 3_600,
        }
    }
}

impl CacheConfig {
    pub fn ttls(&self) -> CacheTtls {
        CacheTtls {
            decision: Duration::from_secs(self.ttl_secs),
            owner: Duration::from_secs(self.owner_ttl_secs),
            denial: Duration::from_secs(self.denial_ttl_secs),
        }
    }
}

/// Identifier validation configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct IdentifierConfig {
    /// Regex every owner, viewer and relationship id must match
    pub pattern: Option<String>,
}

/// Relationship store configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// JSON file of relationship records for the in-memory store
    pub fixtures: Option<String>,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Output format (pretty, json)
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
        }
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable output
    #[default]
    Pretty,
    /// JSON structured output
    Json,
}
