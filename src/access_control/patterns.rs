//! Identifier validation
//!
//! Identifiers are opaque strings. A deployment backed by a document store
//! can require them to match a regex (e.g. 24 hex digits) before they are
//! used in a relationship query.

use crate::error::ConfigError;
use regex::Regex;

/// Compiled identifier pattern
#[derive(Debug, Clone, Default)]
pub struct IdentifierPattern {
    pattern: Option<CompiledPattern>,
}

#[derive(Debug, Clone)]
struct CompiledPattern {
    source: String,
    regex: Regex,
}

impl IdentifierPattern {
    /// Create a pattern from a regex source
    pub fn new(pattern: &str) -> Result<Self, ConfigError> {
        let regex = Regex::new(pattern).map_err(|e| ConfigError::InvalidPattern {
            pattern: pattern.to_string(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            pattern: Some(CompiledPattern {
                source: pattern.to_string(),
                regex,
            }),
        })
    }

    /// Create from an optional configured pattern
    pub fn from_config(pattern: Option<&str>) -> Result<Self, ConfigError> {
        match pattern {
            Some(p) => Self::new(p),
            None => Ok(Self::any()),
        }
    }

    /// Accept any non-empty identifier
    pub fn any() -> Self {
        Self { pattern: None }
    }

    /// Document-store object ids (24 hex digits)
    pub fn object_id() -> Self {
        Self::new("^[0-9a-fA-F]{24}$").expect("object id pattern is valid")
    }

    /// Check whether an identifier is well formed
    pub fn is_valid(&self, id: &str) -> bool {
        if id.trim().is_empty() {
            return false;
        }
        self.pattern.as_ref().is_none_or(|p| p.regex.is_match(id))
    }

    /// Get the configured regex source, if any
    pub fn source(&self) -> Option<&str> {
        self.pattern.as_ref().map(|p| p.source.as_str())
    }
}
