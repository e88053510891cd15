//! Relationship records

use crate::error::StoreError;
use crate::model::types::{RelationshipStatus, RelationshipType, Role};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A stored fact connecting two identities
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Relationship {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: RelationshipType,
    pub status: RelationshipStatus,
    pub initiator_id: String,
    pub target_id: String,
    #[serde(default)]
    pub roles: Vec<RoleAssignment>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A role explicitly granted to one participant of a relationship
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleAssignment {
    pub user_id: String,
    pub role: String,
    pub granted_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub granted_by: Option<String>,
}

impl RoleAssignment {
    pub fn new(user_id: impl Into<String>, role: Role) -> Self {
        Self {
            user_id: user_id.into(),
            role: role.as_str().to_string(),
            granted_at: Utc::now(),
            expires_at: None,
            granted_by: None,
        }
    }

    pub fn expiring_at(mut self, expires_at: DateTime<Utc>) -> Self {
        self.expires_at = Some(expires_at);
        self
    }

    /// Whether the assignment still holds at `now`
    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_none_or(|expires| expires > now)
    }

    /// Whether this assignment grants `role` to `user_id`
    pub fn grants(&self, user_id: &str, role: Role) -> bool {
        self.user_id == user_id && self.role == role.as_str()
    }
}

impl Relationship {
    /// Create a relationship record with no role assignments
    pub fn new(
        id: impl Into<String>,
        kind: RelationshipType,
        status: RelationshipStatus,
        initiator_id: impl Into<String>,
        target_id: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            kind,
            status,
            initiator_id: initiator_id.into(),
            target_id: target_id.into(),
            roles: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_role(mut self, assignment: RoleAssignment) -> Self {
        self.roles.push(assignment);
        self
    }

    /// Check that every role assignment references one of the two participants
    pub fn validate(&self) -> Result<(), StoreError> {
        if let Some(stray) = self
            .roles
            .iter()
            .find(|a| !self.is_participant(&a.user_id))
        {
            return Err(StoreError::InvalidRecord {
                id: self.id.clone(),
                reason: format!(
                    "role '{}' assigned to non-participant '{}'",
                    stray.role, stray.user_id
                ),
            });
        }
        Ok(())
    }

    pub fn is_participant(&self, user_id: &str) -> bool {
        self.initiator_id == user_id || self.target_id == user_id
    }

    /// Whether this record connects `a` and `b`, in either direction
    pub fn connects(&self, a: &str, b: &str) -> bool {
        (self.initiator_id == a && self.target_id == b)
            || (self.initiator_id == b && self.target_id == a)
    }

    pub fn participant_ids(&self) -> [&str; 2] {
        [self.initiator_id.as_str(), self.target_id.as_str()]
    }

    /// The participant that is not `user_id`
    pub fn counterpart(&self, user_id: &str) -> Option<&str> {
        if self.initiator_id == user_id {
            Some(&self.target_id)
        } else if self.target_id == user_id {
            Some(&self.initiator_id)
        } else {
            None
        }
    }

    /// Holder of an explicit role assignment
    fn holder_of(&self, role: Role) -> Option<&str> {
        self.roles
            .iter()
            .find(|a| a.role == role.as_str())
            .map(|a| a.user_id.as_str())
    }

    /// Coach position of a coachship
    pub fn coach_id(&self) -> Option<&str> {
        if self.kind != RelationshipType::Coachship {
            return None;
        }
        self.holder_of(Role::Coach)
    }

    /// Student position of a coachship
    ///
    /// Falls back to the participant that is not the coach when no explicit
    /// STUDENT assignment exists.
    pub fn student_id(&self) -> Option<&str> {
        if self.kind != RelationshipType::Coachship {
            return None;
        }
        self.holder_of(Role::Student)
            .or_else(|| self.coach_id().and_then(|coach| self.counterpart(coach)))
    }

    pub fn is_blocked(&self) -> bool {
        self.status == RelationshipStatus::Blocked
    }
}
