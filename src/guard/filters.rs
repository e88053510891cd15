//! Condition-to-filter compilation
//!
//! Turns each category of a [`ConditionSpec`](super::ConditionSpec) into a
//! relationship [`Filter`], reading the arguments of the guarded request.

use crate::access_control::IdentifierPattern;
use crate::error::{AccessError, CheckResult};
use crate::filter::{Field, Filter};
use crate::guard::conditions::{ExistenceConditions, NonExistenceConditions, RoleConditions};
use crate::model::RelationshipType;
use crate::request::{Request, args};
use tracing::trace;

/// Builds relationship filters from guard conditions
#[derive(Debug, Clone, Default)]
pub struct ConditionFilterBuilder {
    identifiers: IdentifierPattern,
}

impl ConditionFilterBuilder {
    pub fn new(identifiers: IdentifierPattern) -> Self {
        Self { identifiers }
    }

    /// Filter requiring the viewer to hold the given positions
    pub fn build_role_filter(
        &self,
        roles: Option<&RoleConditions>,
        viewer_id: &str,
        request: &Request,
    ) -> Option<Filter> {
        let roles = roles?;
        let mut clauses = Vec::new();

        if roles.require_participants {
            let mut ids = vec![viewer_id.to_string()];
            if let Some(other) = request.arg_str(args::OF_USER_ID) {
                ids.push(other.to_string());
            }
            clauses.push(Filter::All(Field::ParticipantIds, ids));
        }
        if roles.require_sender {
            clauses.push(Filter::eq(Field::SenderId, viewer_id));
        }
        if roles.require_receiver {
            clauses.push(Filter::eq(Field::ReceiverId, viewer_id));
        }
        if roles.require_student {
            clauses.push(Filter::eq(Field::StudentId, viewer_id));
        }
        if roles.require_coach {
            clauses.push(Filter::eq(Field::CoachId, viewer_id));
        }

        Some(Filter::And(clauses))
    }

    /// Filter requiring a relationship of the given type and status
    ///
    /// When the type names an id argument (`friendshipId`, `coachshipId`), a
    /// well-formed id narrows the filter to that record.
    pub fn build_existence_filter(
        &self,
        existence: Option<&ExistenceConditions>,
        request: &Request,
    ) -> Option<Filter> {
        let existence = existence?;
        let mut clauses = Vec::new();

        if let Some(kind) = existence.relationship_type {
            if let Some(id) = self.record_id(kind, request) {
                clauses.push(Filter::eq(Field::Id, id));
            }
            clauses.push(Filter::of_type(kind));
        }
        if let Some(status) = existence.relationship_status {
            clauses.push(Filter::with_status(status));
        }

        Some(Filter::And(clauses))
    }

    /// Filter matching any relationship that must not exist
    ///
    /// Fails with `MissingArgument` when a condition needs an argument the
    /// request does not carry. A block with no condition set builds nothing.
    pub fn build_non_existence_filter(
        &self,
        non_existence: Option<&NonExistenceConditions>,
        viewer_id: &str,
        request: &Request,
    ) -> CheckResult<Option<Filter>> {
        let Some(non_existence) = non_existence else {
            return Ok(None);
        };
        let mut clauses = Vec::new();

        if non_existence.no_existing_friendship {
            let receiver = required_arg(request, args::RECEIVER_ID)?;
            clauses.push(Filter::And(vec![
                Filter::of_type(RelationshipType::Friendship),
                Filter::participants([viewer_id, receiver]),
            ]));
        }
        if non_existence.not_existing_coach {
            let student = required_arg(request, args::OF_USER_ID)?;
            clauses.push(Filter::And(vec![
                Filter::of_type(RelationshipType::Coachship),
                Filter::eq(Field::CoachId, viewer_id),
                Filter::eq(Field::StudentId, student),
            ]));
        }
        if non_existence.not_existing_student {
            let coach = required_arg(request, args::OF_USER_ID)?;
            clauses.push(Filter::And(vec![
                Filter::of_type(RelationshipType::Coachship),
                Filter::eq(Field::CoachId, coach),
                Filter::eq(Field::StudentId, viewer_id),
            ]));
        }

        if clauses.is_empty() {
            trace!("Non-existence block sets no condition");
            return Ok(None);
        }
        Ok(Some(Filter::any_of(clauses)))
    }

    fn record_id<'a>(&self, kind: RelationshipType, request: &'a Request) -> Option<&'a str> {
        let id = request.arg_str(kind.id_argument()?)?;
        if !self.identifiers.is_valid(id) {
            trace!(%id, "Ignoring malformed relationship id");
            return None;
        }
        Some(id)
    }
}

fn required_arg<'a>(request: &'a Request, name: &str) -> CheckResult<&'a str> {
    request
        .arg_str(name)
        .ok_or_else(|| AccessError::missing_argument(name))
}
