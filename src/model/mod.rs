//! Relationship data model
//!
//! Records held by the relationship store and the closed vocabularies
//! (types, statuses, roles, access levels) the policy is written in.

pub mod relationship;
pub mod types;

pub use relationship::{Relationship, RoleAssignment};
pub use types::{AccessLevel, RelationshipStatus, RelationshipType, Role};
