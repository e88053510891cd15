//! Guard evaluation tests

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use courtiq_access::auth::{ClaimsHeaderViewer, StaticViewer};
use courtiq_access::config::load_config_from_str;
use courtiq_access::error::{AccessError, StoreError};
use courtiq_access::filter::Filter;
use courtiq_access::guard::{
    ConditionSpec, ExistenceConditions, Guard, NonExistenceConditions, RoleConditions,
};
use courtiq_access::model::{Relationship, RelationshipStatus, RelationshipType, Role, RoleAssignment};
use courtiq_access::request::Request;
use courtiq_access::store::{MemoryRelationshipStore, RelationshipStore};
use rstest::rstest;
use serde_json::json;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

const FRIENDSHIP_ID: &str = "65f1a2b3c4d5e6f708091a2b";
const COACHSHIP_ID: &str = "65f1a2b3c4d5e6f708091a2c";

/// Store wrapper counting queries
struct CountingStore {
    inner: MemoryRelationshipStore,
    queries: AtomicUsize,
}

impl CountingStore {
    fn new(records: Vec<Relationship>) -> Arc<Self> {
        Arc::new(Self {
            inner: MemoryRelationshipStore::from_records(records).unwrap(),
            queries: AtomicUsize::new(0),
        })
    }

    fn queries(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RelationshipStore for CountingStore {
    async fn find(&self, filter: &Filter) -> Result<Vec<Relationship>, StoreError> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        self.inner.find(filter).await
    }

    async fn count(&self, filter: &Filter) -> Result<u64, StoreError> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        self.inner.count(filter).await
    }
}

fn fixtures() -> Vec<Relationship> {
    vec![
        Relationship::new(
            FRIENDSHIP_ID,
            RelationshipType::Friendship,
            RelationshipStatus::Pending,
            "alice",
            "bob",
        ),
        Relationship::new(
            COACHSHIP_ID,
            RelationshipType::Coachship,
            RelationshipStatus::Active,
            "carol",
            "dave",
        )
        .with_role(RoleAssignment::new("carol", Role::Coach))
        .with_role(RoleAssignment::new("dave", Role::Student)),
    ]
}

fn guard_for(viewer: &str) -> (Guard, Arc<CountingStore>) {
    let store = CountingStore::new(fixtures());
    let guard = Guard::new(store.clone(), Arc::new(StaticViewer::new(viewer)));
    (guard, store)
}

fn accept_friend_request() -> ConditionSpec {
    ConditionSpec::new()
        .with_roles(RoleConditions {
            require_receiver: true,
            ..Default::default()
        })
        .with_existence(ExistenceConditions {
            relationship_type: Some(RelationshipType::Friendship),
            relationship_status: Some(RelationshipStatus::Pending),
        })
}

fn no_friendship() -> ConditionSpec {
    ConditionSpec::new().with_non_existence(NonExistenceConditions {
        no_existing_friendship: true,
        ..Default::default()
    })
}

#[rstest]
#[case("bob", true)]
#[case("alice", false)]
#[case("carol", false)]
#[tokio::test]
async fn test_only_receiver_accepts(#[case] viewer: &str, #[case] allowed: bool) {
    let (guard, _) = guard_for(viewer);
    let request = Request::from_args(json!({ "friendshipId": FRIENDSHIP_ID }));

    let result = guard.check(&accept_friend_request(), &request).await;
    assert_eq!(result.is_ok(), allowed, "viewer {}", viewer);
}

#[tokio::test]
async fn test_existence_scoped_to_requested_record() {
    let (guard, _) = guard_for("bob");
    let request = Request::from_args(json!({ "friendshipId": "65f1a2b3c4d5e6f708091aff" }));

    let err = guard
        .check(&accept_friend_request(), &request)
        .await
        .unwrap_err();
    assert!(matches!(err, AccessError::ConditionsNotSatisfied { .. }));
    assert!(err.is_denial());
}

#[tokio::test]
async fn test_conflicting_spec_rejected_before_store() {
    let (guard, store) = guard_for("bob");
    let spec = accept_friend_request().with_non_existence(NonExistenceConditions {
        no_existing_friendship: true,
        ..Default::default()
    });
    let request = Request::from_args(json!({ "receiverId": "alice" }));

    let err = guard.check(&spec, &request).await.unwrap_err();
    assert!(matches!(err, AccessError::ConflictingConditions));
    assert_eq!(store.queries(), 0);
}

#[tokio::test]
async fn test_missing_receiver_rejected_before_store() {
    let (guard, store) = guard_for("bob");

    let err = guard.check(&no_friendship(), &Request::new()).await.unwrap_err();
    assert!(matches!(err, AccessError::MissingArgument { ref argument } if argument == "receiverId"));
    assert!(err.is_validation());
    assert_eq!(store.queries(), 0);
}

#[rstest]
#[case("alice", "bob", false)]
#[case("bob", "alice", false)]
#[case("bob", "carol", true)]
#[tokio::test]
async fn test_no_existing_friendship(
    #[case] viewer: &str,
    #[case] receiver: &str,
    #[case] allowed: bool,
) {
    let (guard, store) = guard_for(viewer);
    let request = Request::from_args(json!({ "receiverId": receiver }));

    let result = guard.check(&no_friendship(), &request).await;
    assert_eq!(result.is_ok(), allowed);
    assert_eq!(store.queries(), 1);
}

#[tokio::test]
async fn test_empty_non_existence_block_is_not_queried() {
    let (guard, store) = guard_for("alice");
    let spec = ConditionSpec::new().with_non_existence(NonExistenceConditions::default());
    let request = Request::from_args(json!({ "receiverId": "bob" }));

    assert!(guard.check(&spec, &request).await.is_ok());
    assert_eq!(store.queries(), 0);
}

#[tokio::test]
async fn test_configured_empty_non_existence_block() {
    let config = load_config_from_str(
        r#"
[guards.send_friend_request.non_existence]
"#,
    )
    .unwrap();
    let store = CountingStore::new(fixtures());
    let guard = Guard::from_config(store.clone(), Arc::new(StaticViewer::new("alice")), &config)
        .unwrap();
    let request = Request::from_args(json!({ "receiverId": "bob" }));

    let sent: Result<&str, AccessError> = guard
        .evaluate_operation("send_friend_request", &request, || async { Ok("sent") })
        .await;
    assert_eq!(sent.unwrap(), "sent");
    assert_eq!(store.queries(), 0);
}

#[rstest]
#[case("carol", "dave", false, true)]
#[case("dave", "carol", true, false)]
#[case("eve", "dave", true, true)]
#[tokio::test]
async fn test_coachship_non_existence(
    #[case] viewer: &str,
    #[case] of_user: &str,
    #[case] may_become_coach: bool,
    #[case] may_become_student: bool,
) {
    let (guard, _) = guard_for(viewer);
    let request = Request::from_args(json!({ "ofUserId": of_user }));

    let not_coach = ConditionSpec::new().with_non_existence(NonExistenceConditions {
        not_existing_coach: true,
        ..Default::default()
    });
    let not_student = ConditionSpec::new().with_non_existence(NonExistenceConditions {
        not_existing_student: true,
        ..Default::default()
    });

    assert_eq!(
        guard.check(&not_coach, &request).await.is_ok(),
        may_become_coach
    );
    assert_eq!(
        guard.check(&not_student, &request).await.is_ok(),
        may_become_student
    );
}

#[rstest]
#[case("carol", true)]
#[case("dave", false)]
#[tokio::test]
async fn test_require_coach_with_participant(#[case] viewer: &str, #[case] allowed: bool) {
    let (guard, _) = guard_for(viewer);
    let spec = ConditionSpec::new().with_roles(RoleConditions {
        require_participants: true,
        require_coach: true,
        ..Default::default()
    });
    let request = Request::from_args(json!({ "ofUserId": "dave" }));

    assert_eq!(guard.check(&spec, &request).await.is_ok(), allowed);
}

#[tokio::test]
async fn test_evaluate_does_not_run_next_on_denial() {
    let (guard, _) = guard_for("alice");
    let ran = AtomicUsize::new(0);
    let request = Request::from_args(json!({ "receiverId": "bob" }));

    let result: Result<(), AccessError> = guard
        .evaluate(&no_friendship(), &request, || async {
            ran.fetch_add(1, Ordering::SeqCst);
            Ok(())
        })
        .await;

    assert!(result.is_err());
    assert_eq!(ran.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_unauthenticated_viewer() {
    let store = CountingStore::new(fixtures());
    let guard = Guard::new(store.clone(), Arc::new(ClaimsHeaderViewer::new()));

    let err = guard
        .check(&accept_friend_request(), &Request::new())
        .await
        .unwrap_err();
    assert!(matches!(err, AccessError::Unauthenticated(_)));
    assert_eq!(store.queries(), 0);
}

#[tokio::test]
async fn test_viewer_from_claims_header() {
    let store = CountingStore::new(fixtures());
    let guard = Guard::new(store, Arc::new(ClaimsHeaderViewer::new()));
    let request = Request::from_args(json!({ "friendshipId": FRIENDSHIP_ID }))
        .with_header("x-user", STANDARD.encode(r#"{"uid":"bob"}"#));

    assert!(guard.check(&accept_friend_request(), &request).await.is_ok());
}

#[tokio::test]
async fn test_configured_operations() {
    let config = load_config_from_str(
        r#"
[identifiers]
pattern = "^[0-9a-f]{24}$"

[guards.accept_friend_request.roles]
require_receiver = true

[guards.accept_friend_request.existence]
relationship_type = "FRIENDSHIP"
relationship_status = "PENDING"
"#,
    )
    .unwrap();

    let store = CountingStore::new(fixtures());
    let guard = Guard::from_config(store, Arc::new(StaticViewer::new("alice")), &config).unwrap();
    let request = Request::from_args(json!({ "friendshipId": FRIENDSHIP_ID }));

    let accept: Result<&str, AccessError> = guard
        .evaluate_operation("accept_friend_request", &request, || async { Ok("accepted") })
        .await;
    assert!(matches!(accept, Err(AccessError::ConditionsNotSatisfied { .. })));

    let list: Result<&str, AccessError> = guard
        .evaluate_operation("list_friends", &request, || async { Ok("listed") })
        .await;
    assert_eq!(list.unwrap(), "listed");
}
