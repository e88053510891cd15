//! Configuration loading tests

use courtiq_access::config::{LogFormat, load_config_from_str};
use courtiq_access::error::ConfigError;
use courtiq_access::model::{RelationshipStatus, RelationshipType};

const MINIMAL_CONFIG: &str = r#"
[logging]
level = "debug"
"#;

const FULL_CONFIG: &str = r#"
[cache]
max_entries = 500
ttl_secs = 120
owner_ttl_secs = 7200
denial_ttl_secs = 600

[identifiers]
pattern = "^[0-9a-f]{24}$"

[store]
fixtures = "fixtures/relationships.json"

[logging]
level = "warn"
format = "json"

[guards.accept_friend_request.roles]
require_receiver = true

[guards.accept_friend_request.existence]
relationship_type = "FRIENDSHIP"
relationship_status = "PENDING"

[guards.send_friend_request.non_existence]
no_existing_friendship = true

[guards.view_student_progress.roles]
require_participants = true
require_coach = true
"#;

#[test]
fn test_minimal_config() {
    let config = load_config_from_str(MINIMAL_CONFIG).unwrap();

    assert_eq!(config.logging.level, "debug");
    assert_eq!(config.logging.format, LogFormat::Pretty);
    assert_eq!(config.cache.max_entries, 10_000);
    assert_eq!(config.cache.ttl_secs, 300);
    assert_eq!(config.cache.owner_ttl_secs, 86_400);
    assert_eq!(config.cache.denial_ttl_secs, 3_600);
    assert!(config.guards.is_empty());
}

#[test]
fn test_full_config() {
    let config = load_config_from_str(FULL_CONFIG).unwrap();

    // Cache
    assert_eq!(config.cache.max_entries, 500);
    let ttls = config.cache.ttls();
    assert_eq!(ttls.decision.as_secs(), 120);
    assert_eq!(ttls.owner.as_secs(), 7200);
    assert_eq!(ttls.denial.as_secs(), 600);

    // Identifiers and store
    assert_eq!(config.identifiers.pattern.as_deref(), Some("^[0-9a-f]{24}$"));
    assert_eq!(
        config.store.fixtures.as_deref(),
        Some("fixtures/relationships.json")
    );

    // Logging
    assert_eq!(config.logging.format, LogFormat::Json);

    // Guards
    assert_eq!(config.guards.len(), 3);
    let accept = &config.guards["accept_friend_request"];
    assert!(accept.roles.unwrap().require_receiver);
    let existence = accept.existence.unwrap();
    assert_eq!(existence.relationship_type, Some(RelationshipType::Friendship));
    assert_eq!(existence.relationship_status, Some(RelationshipStatus::Pending));

    let send = &config.guards["send_friend_request"];
    assert!(send.roles.is_none());
    assert!(send.non_existence.unwrap().no_existing_friendship);

    let progress = config.guards["view_student_progress"].roles.unwrap();
    assert!(progress.require_participants);
    assert!(progress.require_coach);
    assert!(!progress.require_student);
}

#[test]
fn test_unknown_relationship_type_rejected() {
    let toml = r#"
[guards.broken.existence]
relationship_type = "ACQUAINTANCE"
"#;

    let result = load_config_from_str(toml);
    assert!(matches!(result, Err(ConfigError::Load(_))));
}

#[test]
fn test_zero_ttl_rejected() {
    let toml = r#"
[cache]
ttl_secs = 0
"#;

    let result = load_config_from_str(toml);
    assert!(matches!(result, Err(ConfigError::Invalid { .. })));
}

#[test]
fn test_zero_capacity_allowed() {
    let toml = r#"
[cache]
max_entries = 0
"#;

    let config = load_config_from_str(toml).unwrap();
    assert_eq!(config.cache.max_entries, 0);
}

#[test]
fn test_conflicting_guard_rejected() {
    let toml = r#"
[guards.broken.existence]
relationship_type = "COACHSHIP"

[guards.broken.non_existence]
not_existing_coach = true
"#;

    let result = load_config_from_str(toml);
    assert!(matches!(result, Err(ConfigError::Invalid { .. })));
}

#[test]
fn test_missing_explicit_config_file() {
    use courtiq_access::config::load_config;

    let result = load_config(Some("/nonexistent/courtiq-access.toml"));
    assert!(matches!(result, Err(ConfigError::Load(msg)) if msg.contains("not found")));
}

#[test]
#[serial_test::serial]
fn test_load_config_from_file() {
    use courtiq_access::config::load_config;
    use std::fs;
    use tempfile::tempdir;

    let dir = tempdir().unwrap();
    let config_path = dir.path().join("courtiq-access.toml");
    fs::write(&config_path, FULL_CONFIG).unwrap();

    let config = load_config(Some(config_path.to_str().unwrap())).unwrap();
    assert_eq!(config.cache.max_entries, 500);
    assert_eq!(config.guards.len(), 3);
}

#[test]
#[serial_test::serial]
fn test_env_var_overrides_file() {
    use courtiq_access::config::load_config;
    use std::env;
    use std::fs;
    use tempfile::tempdir;

    let dir = tempdir().unwrap();
    let config_path = dir.path().join("courtiq-access.toml");
    let config_content = r#"
[cache]
ttl_secs = 120
max_entries = 500
"#;
    fs::write(&config_path, config_content).unwrap();

    unsafe {
        env::set_var("COURTIQ_ACCESS__CACHE__TTL_SECS", "45");
        env::set_var("COURTIQ_ACCESS__LOGGING__FORMAT", "json");
    }

    let config = load_config(Some(config_path.to_str().unwrap()));

    // Cleanup before asserting so a failure doesn't leak into other tests
    unsafe {
        env::remove_var("COURTIQ_ACCESS__CACHE__TTL_SECS");
        env::remove_var("COURTIQ_ACCESS__LOGGING__FORMAT");
    }

    let config = config.unwrap();
    assert_eq!(config.cache.ttl_secs, 45);
    assert_eq!(config.cache.max_entries, 500);
    assert_eq!(config.logging.format, LogFormat::Json);
}

#[test]
#[serial_test::serial]
fn test_env_var_invalid_value_rejected() {
    use courtiq_access::config::load_config;
    use std::env;
    use std::fs;
    use tempfile::tempdir;

    let dir = tempdir().unwrap();
    let config_path = dir.path().join("courtiq-access.toml");
    fs::write(&config_path, "").unwrap();

    unsafe {
        env::set_var("COURTIQ_ACCESS__CACHE__DENIAL_TTL_SECS", "0");
    }

    let result = load_config(Some(config_path.to_str().unwrap()));

    unsafe {
        env::remove_var("COURTIQ_ACCESS__CACHE__DENIAL_TTL_SECS");
    }

    assert!(matches!(result, Err(ConfigError::Invalid { .. })));
}
