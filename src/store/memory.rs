//! In-memory relationship store

use crate::error::StoreError;
use crate::filter::Filter;
use crate::model::Relationship;
use crate::store::RelationshipStore;
use async_trait::async_trait;
use std::path::Path;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{debug, trace};

/// Relationship store backed by a vector of records
#[derive(Debug, Default)]
pub struct MemoryRelationshipStore {
    records: RwLock<Vec<Relationship>>,
}

impl MemoryRelationshipStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store from records, rejecting any that break the role invariant
    pub fn from_records(records: Vec<Relationship>) -> Result<Self, StoreError> {
        for record in &records {
            record.validate()?;
        }
        Ok(Self {
            records: RwLock::new(records),
        })
    }

    /// Load records from a JSON array of relationship documents
    pub fn from_json_str(json: &str) -> Result<Self, StoreError> {
        let records: Vec<Relationship> = serde_json::from_str(json)?;
        Self::from_records(records)
    }

    /// Load records from a JSON fixtures file
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        let store = Self::from_json_str(&contents)?;
        debug!(path = %path.display(), records = store.len(), "Loaded relationship fixtures");
        Ok(store)
    }

    pub fn insert(&self, record: Relationship) -> Result<(), StoreError> {
        record.validate()?;
        self.write_records().push(record);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.read_records().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read_records().is_empty()
    }

    fn read_records(&self) -> RwLockReadGuard<'_, Vec<Relationship>> {
        self.records.read().unwrap_or_else(|poisoned| {
            tracing::warn!("relationship store lock poisoned, recovering");
            poisoned.into_inner()
        })
    }

    fn write_records(&self) -> RwLockWriteGuard<'_, Vec<Relationship>> {
        self.records.write().unwrap_or_else(|poisoned| {
            tracing::warn!("relationship store lock poisoned, recovering");
            poisoned.into_inner()
        })
    }
}

#[async_trait]
impl RelationshipStore for MemoryRelationshipStore {
    async fn find(&self, filter: &Filter) -> Result<Vec<Relationship>, StoreError> {
        let found: Vec<Relationship> = self
            .read_records()
            .iter()
            .filter(|rel| filter.matches(rel))
            .cloned()
            .collect();
        trace!(%filter, found = found.len(), "find");
        Ok(found)
    }

    async fn count(&self, filter: &Filter) -> Result<u64, StoreError> {
        let count = self
            .read_records()
            .iter()
            .filter(|rel| filter.matches(rel))
            .count() as u64;
        trace!(%filter, count, "count");
        Ok(count)
    }
}
