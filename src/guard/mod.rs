//! Request guards
//!
//! A [`Guard`] runs before a protected operation and lets it proceed only
//! when the viewer satisfies the operation's [`ConditionSpec`]:
//!
//! - role and existence conditions are combined into one filter that must
//!   match at least one relationship
//! - non-existence conditions must match none
//!
//! Conflicting conditions and missing arguments are rejected before the
//! store is queried.

pub mod conditions;
pub mod filters;

pub use conditions::{ConditionSpec, ExistenceConditions, NonExistenceConditions, RoleConditions};
pub use filters::ConditionFilterBuilder;

use crate::access_control::IdentifierPattern;
use crate::auth::SharedViewerResolver;
use crate::config::AppConfig;
use crate::error::{AccessError, CheckResult, ConfigError};
use crate::filter::Filter;
use crate::request::Request;
use crate::store::SharedRelationshipStore;
use std::collections::HashMap;
use std::future::Future;
use tracing::{debug, instrument, trace, warn};

/// Evaluates condition specs against the relationship store
pub struct Guard {
    store: SharedRelationshipStore,
    viewer: SharedViewerResolver,
    filters: ConditionFilterBuilder,
    operations: HashMap<String, ConditionSpec>,
}

impl Guard {
    pub fn new(store: SharedRelationshipStore, viewer: SharedViewerResolver) -> Self {
        Self {
            store,
            viewer,
            filters: ConditionFilterBuilder::default(),
            operations: HashMap::new(),
        }
    }

    /// Create a guard from the `[identifiers]` and `[guards]` settings
    pub fn from_config(
        store: SharedRelationshipStore,
        viewer: SharedViewerResolver,
        config: &AppConfig,
    ) -> Result<Self, ConfigError> {
        let identifiers = IdentifierPattern::from_config(config.identifiers.pattern.as_deref())?;
        Ok(Self::new(store, viewer)
            .with_identifier_pattern(identifiers)
            .with_operations(config.guards.clone()))
    }

    pub fn with_identifier_pattern(mut self, identifiers: IdentifierPattern) -> Self {
        self.filters = ConditionFilterBuilder::new(identifiers);
        self
    }

    /// Set the condition spec guarding each named operation
    pub fn with_operations(mut self, operations: HashMap<String, ConditionSpec>) -> Self {
        self.operations = operations;
        self
    }

    /// Spec guarding `operation`, if any
    pub fn spec_for(&self, operation: &str) -> Option<&ConditionSpec> {
        self.operations.get(operation)
    }

    /// Check `spec` for the viewer behind `request`
    #[instrument(
        skip(self, spec, request),
        fields(request_id = %format!("{:x}", rand::random::<u64>()))
    )]
    pub async fn check(&self, spec: &ConditionSpec, request: &Request) -> CheckResult<()> {
        spec.validate()?;
        let viewer_id = self.viewer.resolve_viewer(request)?;

        let role_filter = self
            .filters
            .build_role_filter(spec.roles.as_ref(), &viewer_id, request);
        let existence_filter = self
            .filters
            .build_existence_filter(spec.existence.as_ref(), request);
        let non_existence_filter =
            self.filters
                .build_non_existence_filter(spec.non_existence.as_ref(), &viewer_id, request)?;

        let required = match (role_filter, existence_filter) {
            (Some(roles), Some(existence)) => Some(Filter::And(vec![roles, existence])),
            (roles, existence) => roles.or(existence),
        };

        if let Some(filter) = required {
            debug!(viewer = %viewer_id, %filter, "Checking required relationships");
            if self.store.count(&filter).await? == 0 {
                warn!(viewer = %viewer_id, "Guard denied: required relationship missing");
                return Err(AccessError::not_satisfied("role and existence conditions"));
            }
        }

        if let Some(filter) = non_existence_filter {
            debug!(viewer = %viewer_id, %filter, "Checking forbidden relationships");
            if self.store.count(&filter).await? > 0 {
                warn!(viewer = %viewer_id, "Guard denied: conflicting relationship exists");
                return Err(AccessError::not_satisfied("non-existence conditions"));
            }
        }

        trace!(viewer = %viewer_id, "Guard passed");
        Ok(())
    }

    /// Run `next` if `spec` is satisfied
    pub async fn evaluate<T, E, F, Fut>(
        &self,
        spec: &ConditionSpec,
        request: &Request,
        next: F,
    ) -> Result<T, E>
    where
        E: From<AccessError>,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        self.check(spec, request).await?;
        next().await
    }

    /// Run `next` if the spec configured for `operation` is satisfied
    ///
    /// Operations without a configured spec are not guarded.
    pub async fn evaluate_operation<T, E, F, Fut>(
        &self,
        operation: &str,
        request: &Request,
        next: F,
    ) -> Result<T, E>
    where
        E: From<AccessError>,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        match self.operations.get(operation) {
            Some(spec) => self.evaluate(spec, request, next).await,
            None => {
                trace!(%operation, "No guard configured");
                next().await
            }
        }
    }
}
