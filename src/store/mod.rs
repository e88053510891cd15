//! Relationship store
//!
//! The document store holding relationship records is an external
//! collaborator; the core only talks to it through [`RelationshipStore`].
//! [`MemoryRelationshipStore`] evaluates filters in process and backs the CLI
//! and the tests.

pub mod memory;

pub use memory::MemoryRelationshipStore;

use crate::error::StoreError;
use crate::filter::Filter;
use crate::model::Relationship;
// async_trait required for dyn-compatibility with Arc<dyn RelationshipStore>
use async_trait::async_trait;
use std::sync::Arc;

/// Query surface over relationship records
///
/// Implementations must not retry or swallow failures; the caller decides
/// what a failed query means.
#[async_trait]
pub trait RelationshipStore: Send + Sync {
    /// Find every record matching `filter`
    async fn find(&self, filter: &Filter) -> Result<Vec<Relationship>, StoreError>;

    /// Count the records matching `filter`
    async fn count(&self, filter: &Filter) -> Result<u64, StoreError>;
}

/// Shared handle to a relationship store
pub type SharedRelationshipStore = Arc<dyn RelationshipStore>;
