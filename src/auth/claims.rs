//! Claims header authentication
//!
//! The API gateway forwards the authenticated user as an `x-user` header:
//! base64-encoded JSON claims carrying the user id under `uid`.

use crate::auth::provider::ViewerResolver;
use crate::error::AccessError;
use crate::request::Request;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde_json::Value;

/// Default header carrying the claims
pub const USER_HEADER: &str = "x-user";

/// Reads the viewer id from a base64 JSON claims header
#[derive(Debug, Clone)]
pub struct ClaimsHeaderViewer {
    header: String,
    claim: String,
}

impl ClaimsHeaderViewer {
    pub fn new() -> Self {
        Self {
            header: USER_HEADER.to_string(),
            claim: "uid".to_string(),
        }
    }

    /// Use a different header and claim name
    pub fn with_names(header: impl Into<String>, claim: impl Into<String>) -> Self {
        Self {
            header: header.into(),
            claim: claim.into(),
        }
    }
}

impl Default for ClaimsHeaderViewer {
    fn default() -> Self {
        Self::new()
    }
}

impl ViewerResolver for ClaimsHeaderViewer {
    fn resolve_viewer(&self, request: &Request) -> Result<String, AccessError> {
        let encoded = request
            .header(&self.header)
            .ok_or_else(|| AccessError::Unauthenticated(format!("no {} header", self.header)))?;

        let decoded = STANDARD
            .decode(encoded.trim())
            .map_err(|e| AccessError::Unauthenticated(format!("malformed claims: {}", e)))?;

        let claims: Value = serde_json::from_slice(&decoded)
            .map_err(|e| AccessError::Unauthenticated(format!("malformed claims: {}", e)))?;

        claims
            .get(&self.claim)
            .and_then(Value::as_str)
            .filter(|uid| !uid.is_empty())
            .map(String::from)
            .ok_or_else(|| AccessError::Unauthenticated(format!("no {} in claims", self.claim)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(json: &str) -> String {
        STANDARD.encode(json)
    }

    #[test]
    fn test_resolves_uid() {
        let request = Request::new().with_header("x-user", encode(r#"{"uid":"user-7","email":"a@b.c"}"#));
        let viewer = ClaimsHeaderViewer::new().resolve_viewer(&request).unwrap();
        assert_eq!(viewer, "user-7");
    }

    #[test]
    fn test_missing_header() {
        let result = ClaimsHeaderViewer::new().resolve_viewer(&Request::new());
        assert!(matches!(result, Err(AccessError::Unauthenticated(_))));
    }

    #[test]
    fn test_malformed_claims() {
        let request = Request::new().with_header("x-user", "%%%not-base64");
        assert!(ClaimsHeaderViewer::new().resolve_viewer(&request).is_err());

        let request = Request::new().with_header("x-user", encode("not json"));
        assert!(ClaimsHeaderViewer::new().resolve_viewer(&request).is_err());
    }

    #[test]
    fn test_empty_uid() {
        let request = Request::new().with_header("x-user", encode(r#"{"uid":""}"#));
        assert!(ClaimsHeaderViewer::new().resolve_viewer(&request).is_err());
    }

    #[test]
    fn test_custom_names() {
        let request = Request::new().with_header("x-claims", encode(r#"{"sub":"u1"}"#));
        let resolver = ClaimsHeaderViewer::with_names("x-claims", "sub");
        assert_eq!(resolver.resolve_viewer(&request).unwrap(), "u1");
    }
}
