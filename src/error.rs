//! Error types for courtiq-access
//!
//! This module defines the error hierarchy used throughout the crate.
//! Decision-level denials and validation failures live in [`AccessError`];
//! faults from the relationship store are wrapped, never downgraded.

use thiserror::Error;

/// Top-level application error
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Access error: {0}")]
    Access(#[from] AccessError),

    #[error("Relationship store error: {0}")]
    Store(#[from] StoreError),
}

/// Configuration-related errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(String),

    #[error("Invalid configuration: {message}")]
    Invalid { message: String },

    #[error("Missing required configuration: {field}")]
    Missing { field: String },

    #[error("Invalid regex pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised by a relationship store backend
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Query failed: {0}")]
    Query(String),

    #[error("Invalid relationship record '{id}': {reason}")]
    InvalidRecord { id: String, reason: String },

    #[error("Failed to decode relationships: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Access control errors
///
/// Denials (`AccessDenied`, `ConditionsNotSatisfied`) are decisions, not faults.
/// The caller decides whether to redact or surface them.
#[derive(Error, Debug)]
pub enum AccessError {
    #[error("Access denied")]
    AccessDenied,

    #[error("Entity not found: {0}")]
    EntityNotFound(String),

    #[error("User not found: {0}")]
    UserNotFound(String),

    #[error("Invalid owner ID: '{0}'")]
    InvalidOwnerId(String),

    #[error("Invalid viewer ID: '{0}'")]
    InvalidViewerId(String),

    #[error("Missing required argument: {argument}")]
    MissingArgument { argument: String },

    #[error("Cannot have both existence and non-existence conditions")]
    ConflictingConditions,

    #[error("Conditions not satisfied: {condition}")]
    ConditionsNotSatisfied { condition: String },

    #[error("Unable to resolve current viewer: {0}")]
    Unauthenticated(String),

    #[error("Failed to query relationships: {0}")]
    StoreQueryFailed(#[from] StoreError),
}

impl AccessError {
    pub fn missing_argument(argument: impl Into<String>) -> Self {
        Self::MissingArgument {
            argument: argument.into(),
        }
    }

    pub fn not_satisfied(condition: impl Into<String>) -> Self {
        Self::ConditionsNotSatisfied {
            condition: condition.into(),
        }
    }

    /// Whether this error is a decision-level denial rather than a fault
    pub fn is_denial(&self) -> bool {
        matches!(
            self,
            AccessError::AccessDenied | AccessError::ConditionsNotSatisfied { .. }
        )
    }

    /// Whether this error was detected before touching the store
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            AccessError::MissingArgument { .. }
                | AccessError::ConflictingConditions
                | AccessError::InvalidOwnerId(_)
                | AccessError::InvalidViewerId(_)
        )
    }
}

/// Result type alias for the application
pub type Result<T> = std::result::Result<T, AppError>;

/// Result type alias for access checks and guards
pub type CheckResult<T> = std::result::Result<T, AccessError>;

/// Result type alias for relationship store operations
pub type StoreResult<T> = std::result::Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_denials_are_not_faults() {
        assert!(AccessError::AccessDenied.is_denial());
        assert!(AccessError::not_satisfied("role").is_denial());
        assert!(!AccessError::StoreQueryFailed(StoreError::Query("down".into())).is_denial());
        assert!(!AccessError::missing_argument("receiverId").is_denial());
    }

    #[test]
    fn test_validation_errors() {
        assert!(AccessError::ConflictingConditions.is_validation());
        assert!(AccessError::missing_argument("ofUserId").is_validation());
        assert!(AccessError::InvalidOwnerId("x".into()).is_validation());
        assert!(!AccessError::AccessDenied.is_validation());
    }

    #[test]
    fn test_store_error_wraps() {
        let err: AccessError = StoreError::Query("connection reset".into()).into();
        assert!(matches!(err, AccessError::StoreQueryFailed(_)));
        assert!(err.to_string().contains("connection reset"));

        let err = AccessError::missing_argument("receiverId");
        assert_eq!(err.to_string(), "Missing required argument: receiverId");
    }
}
