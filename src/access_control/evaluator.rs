//! Policy evaluation
//!
//! [`PolicyEvaluator`] decides whether a viewer may see an owner's resource.
//! Evaluation order:
//!
//! 1. Cached decision for the same owner, viewer and check settings
//! 2. The owner always sees their own resources
//! 3. PUBLIC resources are visible to everyone
//! 4. PRIVATE resources are visible to nobody else
//! 5. Relationships between owner and viewer; any BLOCKED record denies
//! 6. Roles inferred from those relationships, matched against the allowed
//!    roles and the level's qualifying roles
//!
//! Every decision except a store failure is cached.

use crate::access_control::cache::{AccessCache, CacheKey};
use crate::access_control::checker::Checker;
use crate::access_control::patterns::IdentifierPattern;
use crate::access_control::roles::{RoleResolution, RoleResolver};
use crate::access_control::types::{AccessResult, CheckConfig};
use crate::auth::SharedViewerResolver;
use crate::config::AppConfig;
use crate::error::{AccessError, CheckResult, ConfigError};
use crate::filter::Filter;
use crate::model::{AccessLevel, RelationshipStatus, Role};
use crate::request::Request;
use crate::store::SharedRelationshipStore;
use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use std::future::Future;
use std::time::Duration;
use tracing::{debug, trace, warn};

/// How long each kind of decision stays cached
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheTtls {
    /// Decisions derived from relationships
    pub decision: Duration,
    /// Owner and PUBLIC grants
    pub owner: Duration,
    /// PRIVATE and blocked denials
    pub denial: Duration,
}

impl Default for CacheTtls {
    fn default() -> Self {
        Self {
            decision: Duration::from_secs(300),
            owner: Duration::from_secs(86_400),
            denial: Duration::from_secs(3_600),
        }
    }
}

/// Relationship-based access checker fronted by an [`AccessCache`]
pub struct PolicyEvaluator {
    store: SharedRelationshipStore,
    viewer: SharedViewerResolver,
    cache: AccessCache,
    ttls: CacheTtls,
    identifiers: IdentifierPattern,
}

impl PolicyEvaluator {
    /// Create an evaluator with the default cache settings
    pub fn new(store: SharedRelationshipStore, viewer: SharedViewerResolver) -> Self {
        Self {
            store,
            viewer,
            cache: AccessCache::default(),
            ttls: CacheTtls::default(),
            identifiers: IdentifierPattern::any(),
        }
    }

    /// Create an evaluator from the `[cache]` and `[identifiers]` settings
    pub fn from_config(
        store: SharedRelationshipStore,
        viewer: SharedViewerResolver,
        config: &AppConfig,
    ) -> Result<Self, ConfigError> {
        let identifiers = IdentifierPattern::from_config(config.identifiers.pattern.as_deref())?;
        Ok(Self::new(store, viewer)
            .with_cache(AccessCache::new(config.cache.max_entries))
            .with_ttls(config.cache.ttls())
            .with_identifier_pattern(identifiers))
    }

    pub fn with_cache(mut self, cache: AccessCache) -> Self {
        self.cache = cache;
        self
    }

    pub fn with_ttls(mut self, ttls: CacheTtls) -> Self {
        self.ttls = ttls;
        self
    }

    pub fn with_identifier_pattern(mut self, identifiers: IdentifierPattern) -> Self {
        self.identifiers = identifiers;
        self
    }

    pub fn cache(&self) -> &AccessCache {
        &self.cache
    }

    pub fn ttls(&self) -> CacheTtls {
        self.ttls
    }

    /// Gate a field resolver on an access check against `owner_id`
    ///
    /// Granted: runs `next`. Denied, unauthenticated or failed: `Ok(None)`
    /// when `redact_with_null`, else `AccessDenied`.
    pub async fn protect_field<T, E, F, Fut>(
        &self,
        request: &Request,
        owner_id: &str,
        config: &CheckConfig,
        redact_with_null: bool,
        next: F,
    ) -> Result<Option<T>, E>
    where
        E: From<AccessError>,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let denied = || {
            if redact_with_null {
                Ok(None)
            } else {
                Err(E::from(AccessError::AccessDenied))
            }
        };

        let viewer_id = match self.viewer.resolve_viewer(request) {
            Ok(id) => id,
            Err(e) => {
                debug!(owner = %owner_id, error = %e, "No viewer for protected field");
                return denied();
            }
        };

        match self.check_access(owner_id, &viewer_id, config).await {
            Ok(result) if result.has_access => next().await.map(Some),
            Ok(_) => denied(),
            Err(e) => {
                warn!(owner = %owner_id, viewer = %viewer_id, error = %e, "Access check failed, denying field");
                denied()
            }
        }
    }

    fn validate_ids(&self, owner_id: &str, viewer_id: &str) -> CheckResult<()> {
        if !self.identifiers.is_valid(owner_id) {
            return Err(AccessError::InvalidOwnerId(owner_id.to_string()));
        }
        if !self.identifiers.is_valid(viewer_id) {
            return Err(AccessError::InvalidViewerId(viewer_id.to_string()));
        }
        Ok(())
    }

    fn remember(&self, key: CacheKey, result: AccessResult, ttl: Duration) -> AccessResult {
        if !self.cache.set(key, &result, ttl) {
            trace!("Decision not cached");
        }
        result
    }

    /// Filter for the records linking two identities that matter to a decision
    fn linking(a: &str, b: &str, statuses: &[RelationshipStatus]) -> Filter {
        Filter::all_of(vec![Filter::between(a, b), Filter::status_in(statuses)])
    }
}

/// Wall-clock instant `ttl` from now, saturating on overflow
fn expiry_after(ttl: Duration) -> DateTime<Utc> {
    TimeDelta::from_std(ttl)
        .ok()
        .and_then(|delta| Utc::now().checked_add_signed(delta))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

#[async_trait]
impl Checker for PolicyEvaluator {
    async fn check_access(
        &self,
        owner_id: &str,
        viewer_id: &str,
        config: &CheckConfig,
    ) -> CheckResult<AccessResult> {
        let key = CacheKey::new(owner_id, viewer_id, config);
        if let Some(hit) = self.cache.get(&key) {
            trace!(%key, has_access = hit.has_access, "Access cache hit");
            return Ok(hit);
        }

        let level = config.required_level;

        if owner_id == viewer_id {
            trace!(owner = %owner_id, "Viewer is the owner");
            let result = AccessResult::granted(
                AccessLevel::Private,
                vec![Role::Owner],
                expiry_after(self.ttls.owner),
            );
            return Ok(self.remember(key, result, self.ttls.owner));
        }

        match level {
            AccessLevel::Public => {
                trace!(owner = %owner_id, "Public resource");
                let result = AccessResult::granted(
                    AccessLevel::Public,
                    vec![Role::Viewer],
                    expiry_after(self.ttls.owner),
                );
                return Ok(self.remember(key, result, self.ttls.owner));
            }
            AccessLevel::Private => {
                trace!(owner = %owner_id, viewer = %viewer_id, "Private resource");
                let result = AccessResult::denied(Vec::new(), expiry_after(self.ttls.denial));
                return Ok(self.remember(key, result, self.ttls.denial));
            }
            _ => {}
        }

        self.validate_ids(owner_id, viewer_id)?;

        let filter = Self::linking(
            owner_id,
            viewer_id,
            &[RelationshipStatus::Active, RelationshipStatus::Blocked],
        );
        debug!(%filter, "Querying relationships");
        let relationships = self.store.find(&filter).await?;

        let roles = match RoleResolver::resolve(&relationships, viewer_id) {
            RoleResolution::Blocked => {
                debug!(owner = %owner_id, viewer = %viewer_id, "Blocked relationship, denying");
                let result = AccessResult::denied(Vec::new(), expiry_after(self.ttls.denial));
                return Ok(self.remember(key, result, self.ttls.denial));
            }
            RoleResolution::Roles(roles) => roles,
        };

        let allowed = config.allowed_roles.iter().any(|r| roles.contains(r))
            || level.qualifying_roles().iter().any(|r| roles.contains(r));
        let roles: Vec<Role> = roles.into_iter().collect();

        debug!(
            owner = %owner_id,
            viewer = %viewer_id,
            %level,
            ?roles,
            allowed,
            "Access decision"
        );

        let expires_at = expiry_after(self.ttls.decision);
        let result = if allowed {
            AccessResult::granted(level, roles, expires_at)
        } else {
            AccessResult::denied(roles, expires_at)
        };
        Ok(self.remember(key, result, self.ttls.decision))
    }

    async fn has_role(&self, user_id: &str, entity_id: &str, role: Role) -> CheckResult<bool> {
        self.validate_ids(user_id, entity_id)?;
        let filter = Filter::all_of(vec![
            Self::linking(user_id, entity_id, &[RelationshipStatus::Active]),
            Filter::RoleAssigned {
                user_id: user_id.to_string(),
                role,
            },
        ]);
        debug!(%filter, "Counting role assignments");
        Ok(self.store.count(&filter).await? > 0)
    }

    async fn get_roles(&self, user_id: &str, entity_id: &str) -> CheckResult<Vec<Role>> {
        self.validate_ids(user_id, entity_id)?;
        let filter = Self::linking(
            user_id,
            entity_id,
            &[RelationshipStatus::Active, RelationshipStatus::Blocked],
        );
        let relationships = self.store.find(&filter).await?;
        Ok(RoleResolver::resolve(&relationships, user_id).into_roles())
    }

    fn clear_cache(&self, user_ids: &[String]) {
        let removed = self.cache.clear(user_ids);
        debug!(users = user_ids.len(), removed, "Invalidated access decisions");
    }
}
