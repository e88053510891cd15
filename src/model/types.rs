//! Relationship and access vocabulary
//!
//! Closed sets of relationship types, statuses, roles and access levels.

use crate::request::args;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of relationship connecting two identities
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RelationshipType {
    Friendship,
    Coachship,
    ClubMembership,
    MatchParticipation,
    DoublesPartnership,
}

impl RelationshipType {
    /// Get the relationship type as stored in the document store
    pub const fn as_str(&self) -> &'static str {
        match self {
            RelationshipType::Friendship => "FRIENDSHIP",
            RelationshipType::Coachship => "COACHSHIP",
            RelationshipType::ClubMembership => "CLUB_MEMBERSHIP",
            RelationshipType::MatchParticipation => "MATCH_PARTICIPATION",
            RelationshipType::DoublesPartnership => "DOUBLES_PARTNERSHIP",
        }
    }

    /// Try to parse a relationship type from its stored form
    pub fn try_parse(s: &str) -> Option<Self> {
        match s {
            "FRIENDSHIP" => Some(RelationshipType::Friendship),
            "COACHSHIP" => Some(RelationshipType::Coachship),
            "CLUB_MEMBERSHIP" => Some(RelationshipType::ClubMembership),
            "MATCH_PARTICIPATION" => Some(RelationshipType::MatchParticipation),
            "DOUBLES_PARTNERSHIP" => Some(RelationshipType::DoublesPartnership),
            _ => None,
        }
    }

    /// Name of the request argument that carries a record id of this type
    ///
    /// Only friendships and coachships are addressed by id from requests.
    pub const fn id_argument(&self) -> Option<&'static str> {
        match self {
            RelationshipType::Friendship => Some(args::FRIENDSHIP_ID),
            RelationshipType::Coachship => Some(args::COACHSHIP_ID),
            RelationshipType::ClubMembership
            | RelationshipType::MatchParticipation
            | RelationshipType::DoublesPartnership => None,
        }
    }

    /// Get all relationship types
    pub fn all() -> &'static [RelationshipType] {
        &[
            RelationshipType::Friendship,
            RelationshipType::Coachship,
            RelationshipType::ClubMembership,
            RelationshipType::MatchParticipation,
            RelationshipType::DoublesPartnership,
        ]
    }
}

impl fmt::Display for RelationshipType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Lifecycle status of a relationship
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RelationshipStatus {
    Pending,
    Active,
    Blocked,
    Declined,
    Ended,
}

impl RelationshipStatus {
    pub const fn as_str(&self) -> &'static str {
        match self {
            RelationshipStatus::Pending => "PENDING",
            RelationshipStatus::Active => "ACTIVE",
            RelationshipStatus::Blocked => "BLOCKED",
            RelationshipStatus::Declined => "DECLINED",
            RelationshipStatus::Ended => "ENDED",
        }
    }

    pub fn try_parse(s: &str) -> Option<Self> {
        match s {
            "PENDING" => Some(RelationshipStatus::Pending),
            "ACTIVE" => Some(RelationshipStatus::Active),
            "BLOCKED" => Some(RelationshipStatus::Blocked),
            "DECLINED" => Some(RelationshipStatus::Declined),
            "ENDED" => Some(RelationshipStatus::Ended),
            _ => None,
        }
    }
}

impl fmt::Display for RelationshipStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Standing a viewer holds with respect to an owner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Friend,
    Coach,
    Student,
    ClubMember,
    ClubAdmin,
    ClubCoach,
    MatchPlayer,
    MatchTracker,
    DoublesPartner,
    Owner,
    Admin,
    Viewer,
}

impl Role {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Role::Friend => "FRIEND",
            Role::Coach => "COACH",
            Role::Student => "STUDENT",
            Role::ClubMember => "CLUB_MEMBER",
            Role::ClubAdmin => "CLUB_ADMIN",
            Role::ClubCoach => "CLUB_COACH",
            Role::MatchPlayer => "MATCH_PLAYER",
            Role::MatchTracker => "MATCH_TRACKER",
            Role::DoublesPartner => "DOUBLES_PARTNER",
            Role::Owner => "OWNER",
            Role::Admin => "ADMIN",
            Role::Viewer => "VIEWER",
        }
    }

    /// Try to parse a role tag as stored on a role assignment
    pub fn try_parse(s: &str) -> Option<Self> {
        Self::all().iter().copied().find(|role| role.as_str() == s)
    }

    pub fn all() -> &'static [Role] {
        &[
            Role::Friend,
            Role::Coach,
            Role::Student,
            Role::ClubMember,
            Role::ClubAdmin,
            Role::ClubCoach,
            Role::MatchPlayer,
            Role::MatchTracker,
            Role::DoublesPartner,
            Role::Owner,
            Role::Admin,
            Role::Viewer,
        ]
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Visibility tier a protected resource requires
///
/// Levels are named tiers, not a strength ordering: FRIENDS does not
/// imply COACHES or the other way around.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccessLevel {
    #[default]
    Public,
    Private,
    Friends,
    Coaches,
    ClubMembers,
    MatchParticipants,
    DoublesPartners,
    FriendsAndCoaches,
}

impl AccessLevel {
    pub const fn as_str(&self) -> &'static str {
        match self {
            AccessLevel::Public => "PUBLIC",
            AccessLevel::Private => "PRIVATE",
            AccessLevel::Friends => "FRIENDS",
            AccessLevel::Coaches => "COACHES",
            AccessLevel::ClubMembers => "CLUB_MEMBERS",
            AccessLevel::MatchParticipants => "MATCH_PARTICIPANTS",
            AccessLevel::DoublesPartners => "DOUBLES_PARTNERS",
            AccessLevel::FriendsAndCoaches => "FRIENDS_AND_COACHES",
        }
    }

    pub fn try_parse(s: &str) -> Option<Self> {
        Self::all().iter().copied().find(|level| level.as_str() == s)
    }

    pub fn all() -> &'static [AccessLevel] {
        &[
            AccessLevel::Public,
            AccessLevel::Private,
            AccessLevel::Friends,
            AccessLevel::Coaches,
            AccessLevel::ClubMembers,
            AccessLevel::MatchParticipants,
            AccessLevel::DoublesPartners,
            AccessLevel::FriendsAndCoaches,
        ]
    }

    /// Roles that satisfy this level on their own
    ///
    /// PUBLIC and PRIVATE are decided before any relationship lookup,
    /// so they have no qualifying roles.
    pub const fn qualifying_roles(&self) -> &'static [Role] {
        match self {
            AccessLevel::Public | AccessLevel::Private => &[],
            AccessLevel::Friends => &[Role::Friend],
            AccessLevel::Coaches => &[Role::Coach],
            AccessLevel::ClubMembers => &[Role::ClubMember],
            AccessLevel::MatchParticipants => &[Role::MatchPlayer, Role::MatchTracker],
            AccessLevel::DoublesPartners => &[Role::DoublesPartner],
            AccessLevel::FriendsAndCoaches => &[Role::Friend, Role::Coach],
        }
    }
}

impl fmt::Display for AccessLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
