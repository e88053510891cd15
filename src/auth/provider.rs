//! Current-viewer resolution
//!
//! Both the policy evaluator and the guard need to know who is making a
//! request. How that identity is established belongs to the transport, so it
//! is injected as a [`ViewerResolver`].

use crate::error::AccessError;
use crate::request::Request;
use std::sync::Arc;

/// Resolves the identity of the viewer behind a request
pub trait ViewerResolver: Send + Sync {
    /// Get the viewer's identifier, or `Unauthenticated`
    fn resolve_viewer(&self, request: &Request) -> Result<String, AccessError>;
}

impl<F> ViewerResolver for F
where
    F: Fn(&Request) -> Result<String, AccessError> + Send + Sync,
{
    fn resolve_viewer(&self, request: &Request) -> Result<String, AccessError> {
        self(request)
    }
}

/// Shared viewer resolver
pub type SharedViewerResolver = Arc<dyn ViewerResolver>;

/// Resolves every request to the same viewer
#[derive(Debug, Clone)]
pub struct StaticViewer {
    viewer_id: String,
}

impl StaticViewer {
    pub fn new(viewer_id: impl Into<String>) -> Self {
        Self {
            viewer_id: viewer_id.into(),
        }
    }
}

impl ViewerResolver for StaticViewer {
    fn resolve_viewer(&self, _request: &Request) -> Result<String, AccessError> {
        Ok(self.viewer_id.clone())
    }
}
