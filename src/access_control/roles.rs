//! Role inference
//!
//! Turns the relationship records between two identities into the set of
//! roles one of them (the viewer) holds. Roles come from two places:
//! explicit assignments on a record, and the record's type.

use crate::model::{Relationship, RelationshipType, Role};
use chrono::{DateTime, Utc};
use std::collections::BTreeSet;
use tracing::trace;

/// Outcome of role inference
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoleResolution {
    /// A BLOCKED record exists; no role may grant anything
    Blocked,
    /// Roles held by the viewer, in a stable order
    Roles(BTreeSet<Role>),
}

impl RoleResolution {
    pub fn is_blocked(&self) -> bool {
        matches!(self, RoleResolution::Blocked)
    }

    /// Roles as a vector; empty when blocked
    pub fn into_roles(self) -> Vec<Role> {
        match self {
            RoleResolution::Blocked => Vec::new(),
            RoleResolution::Roles(roles) => roles.into_iter().collect(),
        }
    }
}

/// Stateless role inference over relationship records
#[derive(Debug, Clone, Copy, Default)]
pub struct RoleResolver;

impl RoleResolver {
    /// Infer the roles `viewer` holds through `relationships`
    pub fn resolve(relationships: &[Relationship], viewer: &str) -> RoleResolution {
        Self::resolve_at(relationships, viewer, Utc::now())
    }

    /// Same as [`RoleResolver::resolve`] with an explicit clock for assignment expiry
    pub fn resolve_at(
        relationships: &[Relationship],
        viewer: &str,
        now: DateTime<Utc>,
    ) -> RoleResolution {
        if relationships.iter().any(Relationship::is_blocked) {
            return RoleResolution::Blocked;
        }

        let mut roles = BTreeSet::new();
        for rel in relationships {
            let explicit: Vec<Role> = rel
                .roles
                .iter()
                .filter(|a| a.user_id == viewer && a.is_active_at(now))
                .filter_map(|a| {
                    let role = Role::try_parse(&a.role);
                    if role.is_none() {
                        trace!(relationship = %rel.id, tag = %a.role, "Ignoring unknown role tag");
                    }
                    role
                })
                .collect();

            roles.extend(explicit.iter().copied());
            roles.extend(Self::infer_from_type(rel, viewer, &explicit));
        }

        RoleResolution::Roles(roles)
    }

    /// Roles implied by the relationship type
    fn infer_from_type(rel: &Relationship, viewer: &str, explicit: &[Role]) -> Vec<Role> {
        match rel.kind {
            RelationshipType::Friendship => vec![Role::Friend],
            RelationshipType::ClubMembership => {
                let mut roles = vec![Role::ClubMember];
                roles.extend(
                    explicit
                        .iter()
                        .copied()
                        .filter(|r| matches!(r, Role::ClubAdmin | Role::ClubCoach)),
                );
                roles
            }
            RelationshipType::MatchParticipation => vec![Role::MatchPlayer],
            RelationshipType::DoublesPartnership => vec![Role::DoublesPartner],
            RelationshipType::Coachship => {
                if rel.initiator_id == viewer && explicit.contains(&Role::Coach) {
                    vec![Role::Coach]
                } else if rel.target_id == viewer && explicit.contains(&Role::Student) {
                    vec![Role::Student]
                } else {
                    Vec::new()
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{RelationshipStatus, RoleAssignment};
    use chrono::Duration;

    fn rel(kind: RelationshipType, initiator: &str, target: &str) -> Relationship {
        Relationship::new("r", kind, RelationshipStatus::Active, initiator, target)
    }

    fn roles_of(resolution: RoleResolution) -> Vec<Role> {
        match resolution {
            RoleResolution::Roles(roles) => roles.into_iter().collect(),
            RoleResolution::Blocked => panic!("unexpected block"),
        }
    }

    #[test]
    fn test_type_inference() {
        assert_eq!(
            roles_of(RoleResolver::resolve(&[rel(RelationshipType::Friendship, "a", "b")], "b")),
            vec![Role::Friend]
        );
        assert_eq!(
            roles_of(RoleResolver::resolve(
                &[rel(RelationshipType::MatchParticipation, "a", "b")],
                "b"
            )),
            vec![Role::MatchPlayer]
        );
        assert_eq!(
            roles_of(RoleResolver::resolve(
                &[rel(RelationshipType::DoublesPartnership, "a", "b")],
                "a"
            )),
            vec![Role::DoublesPartner]
        );
    }

    #[test]
    fn test_blocked_short_circuits() {
        let mut blocked = rel(RelationshipType::Friendship, "a", "b");
        blocked.status = RelationshipStatus::Blocked;
        let friendship = rel(RelationshipType::Friendship, "a", "b");

        let resolution = RoleResolver::resolve(&[friendship, blocked], "b");
        assert!(resolution.is_blocked());
        assert!(resolution.into_roles().is_empty());
    }

    #[test]
    fn test_coach_requires_initiation_and_assignment() {
        let coachship = rel(RelationshipType::Coachship, "coach", "pupil")
            .with_role(RoleAssignment::new("coach", Role::Coach));
        assert_eq!(
            roles_of(RoleResolver::resolve(std::slice::from_ref(&coachship), "coach")),
            vec![Role::Coach]
        );
        // The pupil has no explicit assignment, so gets nothing
        assert!(roles_of(RoleResolver::resolve(&[coachship], "pupil")).is_empty());
    }

    #[test]
    fn test_student_assignment() {
        let coachship = rel(RelationshipType::Coachship, "coach", "pupil")
            .with_role(RoleAssignment::new("coach", Role::Coach))
            .with_role(RoleAssignment::new("pupil", Role::Student));
        assert_eq!(
            roles_of(RoleResolver::resolve(&[coachship], "pupil")),
            vec![Role::Student]
        );
    }

    #[test]
    fn test_club_admin_is_added() {
        let membership = rel(RelationshipType::ClubMembership, "club", "member")
            .with_role(RoleAssignment::new("member", Role::ClubAdmin));
        assert_eq!(
            roles_of(RoleResolver::resolve(&[membership], "member")),
            vec![Role::ClubMember, Role::ClubAdmin]
        );
    }

    #[test]
    fn test_union_across_records() {
        let friendship = rel(RelationshipType::Friendship, "owner", "viewer");
        let coachship = rel(RelationshipType::Coachship, "viewer", "owner")
            .with_role(RoleAssignment::new("viewer", Role::Coach));
        assert_eq!(
            roles_of(RoleResolver::resolve(&[friendship, coachship], "viewer")),
            vec![Role::Friend, Role::Coach]
        );
    }

    #[test]
    fn test_expired_and_unknown_assignments_ignored() {
        let now = Utc::now();
        let mut membership = rel(RelationshipType::ClubMembership, "club", "member")
            .with_role(
                RoleAssignment::new("member", Role::ClubAdmin).expiring_at(now - Duration::days(1)),
            );
        membership.roles.push(RoleAssignment {
            role: "GRAND_WIZARD".to_string(),
            ..RoleAssignment::new("member", Role::Viewer)
        });

        assert_eq!(
            roles_of(RoleResolver::resolve_at(&[membership], "member", now)),
            vec![Role::ClubMember]
        );
    }

    #[test]
    fn test_no_relationships() {
        assert!(roles_of(RoleResolver::resolve(&[], "anyone")).is_empty());
    }
}
