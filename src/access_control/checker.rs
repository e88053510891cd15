//! Access checker contract

use crate::access_control::types::{AccessResult, CheckConfig};
use crate::error::CheckResult;
use crate::model::Role;
use async_trait::async_trait;
use std::sync::Arc;

/// Relationship-based access checks
///
/// Callers outside this crate depend on this trait rather than on
/// [`PolicyEvaluator`](crate::access_control::PolicyEvaluator) directly.
#[async_trait]
pub trait Checker: Send + Sync {
    /// Decide whether `viewer` may see a resource owned by `owner`
    async fn check_access(
        &self,
        owner_id: &str,
        viewer_id: &str,
        config: &CheckConfig,
    ) -> CheckResult<AccessResult>;

    /// Whether `user_id` holds `role` on an active relationship with `entity_id`
    async fn has_role(&self, user_id: &str, entity_id: &str, role: Role) -> CheckResult<bool>;

    /// Roles `user_id` holds towards `entity_id`; empty when blocked
    async fn get_roles(&self, user_id: &str, entity_id: &str) -> CheckResult<Vec<Role>>;

    /// Invalidate cached decisions involving any of `user_ids`
    fn clear_cache(&self, user_ids: &[String]);
}

/// Shared access checker
pub type SharedChecker = Arc<dyn Checker>;
