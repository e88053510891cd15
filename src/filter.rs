//! Typed relationship query predicates
//!
//! Guards and the policy evaluator describe the records they need as a
//! [`Filter`], and stores decide how to run it. [`Filter::matches`] evaluates a
//! filter against an in-memory record; [`Filter::to_query`] renders it in the
//! document-store query dialect for adapters and logs.

use crate::model::{Relationship, RelationshipStatus, RelationshipType, Role};
use serde_json::{Map, Value, json};
use std::fmt;

/// Queryable position on a relationship record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Id,
    Type,
    Status,
    InitiatorId,
    TargetId,
    ParticipantIds,
    SenderId,
    ReceiverId,
    CoachId,
    StudentId,
}

impl Field {
    /// Document key for this field
    pub const fn as_str(&self) -> &'static str {
        match self {
            Field::Id => "_id",
            Field::Type => "type",
            Field::Status => "status",
            Field::InitiatorId => "initiatorId",
            Field::TargetId => "targetId",
            Field::ParticipantIds => "participantIds",
            Field::SenderId => "senderId",
            Field::ReceiverId => "receiverId",
            Field::CoachId => "coachId",
            Field::StudentId => "studentId",
        }
    }

    /// Values a record holds at this position (empty when not applicable)
    fn values<'a>(&self, rel: &'a Relationship) -> Vec<&'a str> {
        match self {
            Field::Id => vec![rel.id.as_str()],
            Field::Type => vec![rel.kind.as_str()],
            Field::Status => vec![rel.status.as_str()],
            Field::InitiatorId | Field::SenderId => vec![rel.initiator_id.as_str()],
            Field::TargetId | Field::ReceiverId => vec![rel.target_id.as_str()],
            Field::ParticipantIds => rel.participant_ids().to_vec(),
            Field::CoachId => rel.coach_id().into_iter().collect(),
            Field::StudentId => rel.student_id().into_iter().collect(),
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Query predicate over relationship records
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Filter {
    /// Field equals the value (for multi-valued fields: contains it)
    Eq(Field, String),
    /// Multi-valued field contains every value
    All(Field, Vec<String>),
    /// Field equals one of the values
    In(Field, Vec<String>),
    /// An explicit role assignment grants `role` to `user_id`
    RoleAssigned { user_id: String, role: Role },
    /// Every sub-filter holds; an empty list matches everything
    And(Vec<Filter>),
    /// At least one sub-filter holds; an empty list matches nothing
    Or(Vec<Filter>),
}

impl Filter {
    pub fn eq(field: Field, value: impl Into<String>) -> Self {
        Filter::Eq(field, value.into())
    }

    pub fn of_type(kind: RelationshipType) -> Self {
        Filter::eq(Field::Type, kind.as_str())
    }

    pub fn with_status(status: RelationshipStatus) -> Self {
        Filter::eq(Field::Status, status.as_str())
    }

    pub fn status_in(statuses: &[RelationshipStatus]) -> Self {
        Filter::In(
            Field::Status,
            statuses.iter().map(|s| s.as_str().to_string()).collect(),
        )
    }

    pub fn participants<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Filter::All(Field::ParticipantIds, ids.into_iter().map(Into::into).collect())
    }

    /// Records connecting `a` and `b` in either direction
    pub fn between(a: &str, b: &str) -> Self {
        Filter::Or(vec![
            Filter::And(vec![
                Filter::eq(Field::InitiatorId, a),
                Filter::eq(Field::TargetId, b),
            ]),
            Filter::And(vec![
                Filter::eq(Field::InitiatorId, b),
                Filter::eq(Field::TargetId, a),
            ]),
        ])
    }

    /// Conjunction of `filters`, collapsing a single clause
    pub fn all_of(mut filters: Vec<Filter>) -> Self {
        if filters.len() == 1 {
            filters.remove(0)
        } else {
            Filter::And(filters)
        }
    }

    /// Disjunction of `filters`, collapsing a single clause
    pub fn any_of(mut filters: Vec<Filter>) -> Self {
        if filters.len() == 1 {
            filters.remove(0)
        } else {
            Filter::Or(filters)
        }
    }

    /// Evaluate the predicate against a record
    pub fn matches(&self, rel: &Relationship) -> bool {
        match self {
            Filter::Eq(field, value) => field.values(rel).contains(&value.as_str()),
            Filter::All(field, wanted) => {
                let held = field.values(rel);
                wanted.iter().all(|w| held.contains(&w.as_str()))
            }
            Filter::In(field, options) => field
                .values(rel)
                .iter()
                .any(|held| options.iter().any(|o| o == held)),
            Filter::RoleAssigned { user_id, role } => {
                rel.roles.iter().any(|a| a.grants(user_id, *role))
            }
            Filter::And(filters) => filters.iter().all(|f| f.matches(rel)),
            Filter::Or(filters) => filters.iter().any(|f| f.matches(rel)),
        }
    }

    /// Render the predicate as a document-store query
    pub fn to_query(&self) -> Value {
        match self {
            Filter::Eq(field, value) => json!({ field.as_str(): value }),
            Filter::All(field, values) => json!({ field.as_str(): { "$all": values } }),
            Filter::In(field, values) => json!({ field.as_str(): { "$in": values } }),
            Filter::RoleAssigned { user_id, role } => json!({
                "roles": { "$elemMatch": { "userId": user_id, "role": role.as_str() } }
            }),
            Filter::And(filters) if filters.is_empty() => Value::Object(Map::new()),
            Filter::And(filters) => {
                json!({ "$and": filters.iter().map(Filter::to_query).collect::<Vec<_>>() })
            }
            // Matches nothing, like the in-memory evaluation
            Filter::Or(filters) if filters.is_empty() => {
                json!({ Field::Id.as_str(): { "$in": [] } })
            }
            Filter::Or(filters) => {
                json!({ "$or": filters.iter().map(Filter::to_query).collect::<Vec<_>>() })
            }
        }
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_query())
    }
}
