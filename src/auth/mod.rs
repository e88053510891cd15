//! Viewer authentication
//!
//! Resolves who is behind a request. The transport decides how identity is
//! carried; this module provides the injection point and the header-based
//! resolver used behind the API gateway.

pub mod claims;
pub mod provider;

pub use claims::ClaimsHeaderViewer;
pub use provider::{SharedViewerResolver, StaticViewer, ViewerResolver};
