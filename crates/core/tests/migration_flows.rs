//! End-to-end tests for the migration trigger flows.
//!
//! These tests exercise the real `TriggerRouter` with:
//! - A `FixtureDirectory` loaded from a TOML file with bcrypt password hashes
//! - Trigger events deserialized from the JSON shape the user pool sends
//!
//! No network I/O.

use std::path::Path;

use serde_json::json;
use tempfile::TempDir;

use poolbridge_core::directory::FixtureDirectory;
use poolbridge_core::errors::MigrationError;
use poolbridge_core::models::{FinalUserStatus, MessageAction, MigrationTriggerEvent};
use poolbridge_core::router::TriggerRouter;

// ===========================================================================
// Helpers
// ===========================================================================

fn write_fixture(dir: &Path) -> std::path::PathBuf {
    let alice_hash = bcrypt::hash("correct123", 4).unwrap();
    let carol_hash = bcrypt::hash("carolpw", 4).unwrap();
    let content = format!(
        r#"
[users.alice]
password_hash = "{alice_hash}"

[users.alice.attributes]
email = "a@x.com"
preferred_username = "alice"
sub = "123"

[users.bob.attributes]
email = "b@y.com"
preferred_username = "bob"

[users.carol]
password_hash = "{carol_hash}"

[users.carol.attributes]
preferred_username = "carol"
sub = "789"
"#
    );
    let path = dir.join("users.toml");
    std::fs::write(&path, content).unwrap();
    path
}

fn router() -> (TempDir, TriggerRouter<FixtureDirectory>) {
    let dir = tempfile::tempdir().unwrap();
    let path = write_fixture(dir.path());
    let directory = FixtureDirectory::load(path).unwrap();
    (dir, TriggerRouter::new(directory))
}

fn pool_event(trigger_source: &str, user_name: &str, password: Option<&str>) -> MigrationTriggerEvent {
    let mut request = json!({ "validationData": null });
    if let Some(pw) = password {
        request["password"] = json!(pw);
    }
    serde_json::from_value(json!({
        "version": "1",
        "triggerSource": trigger_source,
        "region": "eu-west-1",
        "userPoolId": "eu-west-1_NewPool",
        "userName": user_name,
        "callerContext": { "awsSdkVersion": "aws-sdk-unknown-unknown", "clientId": "newclient" },
        "request": request,
        "response": {
            "userAttributes": null,
            "finalUserStatus": null,
            "messageAction": null,
            "desiredDeliveryMediums": null,
            "forceAliasCreation": null
        }
    }))
    .unwrap()
}

// ===========================================================================
// Scenarios
// ===========================================================================

#[tokio::test]
async fn authentication_migrates_and_confirms_user() {
    let (_dir, router) = router();
    let event = pool_event("UserMigration_Authentication", "alice", Some("correct123"));

    let result = router.handle(event).await.unwrap();
    let attrs = result.response.user_attributes.clone().unwrap();

    assert_eq!(attrs.len(), 3);
    assert_eq!(attrs["email"], "a@x.com");
    assert_eq!(attrs["preferred_username"], "alice");
    assert_eq!(attrs["custom:old_sub"], "123");
    assert!(!attrs.contains_key("sub"));
    assert_eq!(
        result.response.final_user_status,
        Some(FinalUserStatus::Confirmed)
    );
    assert_eq!(result.response.message_action, Some(MessageAction::Suppress));

    // Everything outside `response` is handed back untouched.
    assert_eq!(result.user_pool_id.as_deref(), Some("eu-west-1_NewPool"));
    assert_eq!(result.request.password.as_deref(), Some("correct123"));

    let wire = serde_json::to_value(&result).unwrap();
    assert_eq!(wire["response"]["finalUserStatus"], "CONFIRMED");
    assert_eq!(wire["response"]["messageAction"], "SUPPRESS");
    assert_eq!(wire["triggerSource"], "UserMigration_Authentication");
}

#[tokio::test]
async fn wrong_password_is_bad_credentials() {
    let (_dir, router) = router();
    let event = pool_event("UserMigration_Authentication", "alice", Some("wrong"));

    let result = router.handle(event).await;
    assert_eq!(result, Err(MigrationError::BadCredentials));
}

#[tokio::test]
async fn unknown_user_is_indistinguishable_from_wrong_password() {
    let (_dir, router) = router();

    let unknown = router
        .handle(pool_event("UserMigration_Authentication", "mallory", Some("correct123")))
        .await
        .unwrap_err();
    let wrong = router
        .handle(pool_event("UserMigration_Authentication", "alice", Some("nope")))
        .await
        .unwrap_err();

    assert_eq!(unknown, wrong);
    assert_eq!(unknown.to_string(), wrong.to_string());
}

#[tokio::test]
async fn forgot_password_migrates_without_confirming() {
    let (_dir, router) = router();
    let event = pool_event("UserMigration_ForgotPassword", "bob", None);

    let result = router.handle(event).await.unwrap();
    let attrs = result.response.user_attributes.clone().unwrap();

    assert_eq!(attrs.len(), 2);
    assert_eq!(attrs["email"], "b@y.com");
    assert_eq!(attrs["preferred_username"], "bob");
    assert!(!attrs.contains_key("custom:old_sub"));
    assert_eq!(result.response.final_user_status, None);
    assert_eq!(result.response.message_action, Some(MessageAction::Suppress));

    let wire = serde_json::to_value(&result).unwrap();
    assert!(wire["response"].get("finalUserStatus").is_none());
}

#[tokio::test]
async fn forgot_password_for_unknown_user_fails() {
    let (_dir, router) = router();
    let result = router
        .handle(pool_event("UserMigration_ForgotPassword", "mallory", None))
        .await;
    assert_eq!(result, Err(MigrationError::BadCredentials));
}

#[tokio::test]
async fn unsupported_trigger_source_fails() {
    let (_dir, router) = router();
    let result = router
        .handle(pool_event("SomethingElse", "alice", Some("correct123")))
        .await;
    assert_eq!(result, Err(MigrationError::UnsupportedTriggerSource));
}

#[tokio::test]
async fn record_without_email_fails_mapping() {
    let (_dir, router) = router();

    let signin = router
        .handle(pool_event("UserMigration_Authentication", "carol", Some("carolpw")))
        .await;
    assert_eq!(signin, Err(MigrationError::MissingRequiredAttribute));

    let reset = router
        .handle(pool_event("UserMigration_ForgotPassword", "carol", None))
        .await;
    assert_eq!(reset, Err(MigrationError::MissingRequiredAttribute));
}
