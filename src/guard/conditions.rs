//! Declarative guard conditions
//!
//! A [`ConditionSpec`] states which relationship facts must or must not hold
//! for the viewer before an operation runs. Specs are read from the
//! `[guards.<operation>]` tables of the configuration:
//!
//! ```toml
//! [guards.accept_friend_request.roles]
//! require_receiver = true
//!
//! [guards.accept_friend_request.existence]
//! relationship_type = "FRIENDSHIP"
//! relationship_status = "PENDING"
//!
//! [guards.send_friend_request.non_existence]
//! no_existing_friendship = true
//! ```

use crate::error::AccessError;
use crate::model::{RelationshipStatus, RelationshipType};
use serde::{Deserialize, Serialize};

/// Positions the viewer must occupy in a matching relationship
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoleConditions {
    /// Viewer (and `ofUserId`, when given) are both participants
    pub require_participants: bool,
    pub require_sender: bool,
    pub require_receiver: bool,
    pub require_student: bool,
    pub require_coach: bool,
}

/// A relationship of this type/status must exist
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExistenceConditions {
    pub relationship_type: Option<RelationshipType>,
    pub relationship_status: Option<RelationshipStatus>,
}

/// Relationships that must not exist yet
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NonExistenceConditions {
    /// No friendship between the viewer and `receiverId`
    pub no_existing_friendship: bool,
    /// The viewer is not already coaching `ofUserId`
    pub not_existing_coach: bool,
    /// The viewer is not already a student of `ofUserId`
    pub not_existing_student: bool,
}

/// Conditions guarding one operation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConditionSpec {
    pub roles: Option<RoleConditions>,
    pub existence: Option<ExistenceConditions>,
    pub non_existence: Option<NonExistenceConditions>,
}

impl ConditionSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_roles(mut self, roles: RoleConditions) -> Self {
        self.roles = Some(roles);
        self
    }

    pub fn with_existence(mut self, existence: ExistenceConditions) -> Self {
        self.existence = Some(existence);
        self
    }

    pub fn with_non_existence(mut self, non_existence: NonExistenceConditions) -> Self {
        self.non_existence = Some(non_existence);
        self
    }

    /// Existence and non-existence conditions cannot be combined
    pub fn validate(&self) -> Result<(), AccessError> {
        if self.existence.is_some() && self.non_existence.is_some() {
            return Err(AccessError::ConflictingConditions);
        }
        Ok(())
    }

    /// Whether the spec places no condition at all
    pub fn is_empty(&self) -> bool {
        self.roles.is_none() && self.existence.is_none() && self.non_existence.is_none()
    }
}
