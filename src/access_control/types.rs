//! Access control types
//!
//! Inputs and outputs of an access check.

use crate::model::{AccessLevel, Role};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Settings for a single access check
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CheckConfig {
    /// Level the resource requires
    pub required_level: AccessLevel,
    /// Roles that grant access on their own (any of them)
    pub allowed_roles: Vec<Role>,
    /// Entity the check is scoped to
    pub entity_id: Option<String>,
    /// Kind of entity (e.g. "MATCH", "CLUB")
    pub entity_type: Option<String>,
}

impl CheckConfig {
    pub fn new(required_level: AccessLevel) -> Self {
        Self {
            required_level,
            ..Default::default()
        }
    }

    pub fn allow_roles(mut self, roles: impl IntoIterator<Item = Role>) -> Self {
        self.allowed_roles.extend(roles);
        self
    }

    pub fn for_entity(mut self, entity_type: impl Into<String>, entity_id: impl Into<String>) -> Self {
        self.entity_type = Some(entity_type.into());
        self.entity_id = Some(entity_id.into());
        self
    }
}

/// Outcome of an access check
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessResult {
    /// Whether access is granted
    pub has_access: bool,
    /// Level granted (PUBLIC on denial)
    pub access_level: AccessLevel,
    /// Roles the viewer holds towards the owner
    pub roles: Vec<Role>,
    /// Whether this result was served from the cache
    pub cached: bool,
    /// When this decision stops being reusable
    pub expires_at: DateTime<Utc>,
}

impl AccessResult {
    pub fn granted(level: AccessLevel, roles: Vec<Role>, expires_at: DateTime<Utc>) -> Self {
        Self {
            has_access: true,
            access_level: level,
            roles,
            cached: false,
            expires_at,
        }
    }

    pub fn denied(roles: Vec<Role>, expires_at: DateTime<Utc>) -> Self {
        Self {
            has_access: false,
            access_level: AccessLevel::Public,
            roles,
            cached: false,
            expires_at,
        }
    }

    pub fn has_role(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }
}
