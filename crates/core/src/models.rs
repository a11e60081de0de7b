//! Domain model types used throughout poolbridge.
//!
//! The trigger event types mirror the JSON shape the identity pool sends to a
//! user migration function, so an event deserializes, gets its `response`
//! filled in, and serializes back unchanged otherwise.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Attribute set written to the new pool for a migrated user.
pub type AttributeSet = HashMap<String, String>;

// ---------------------------------------------------------------------------
// Legacy user
// ---------------------------------------------------------------------------

/// A user record read from the legacy directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegacyUser {
    user_name: String,
    attributes: HashMap<String, Option<String>>,
}

impl LegacyUser {
    pub fn new(user_name: impl Into<String>, attributes: HashMap<String, Option<String>>) -> Self {
        Self {
            user_name: user_name.into(),
            attributes,
        }
    }

    pub fn user_name(&self) -> &str {
        &self.user_name
    }

    pub fn attributes(&self) -> &HashMap<String, Option<String>> {
        &self.attributes
    }

    /// Value of an attribute, treating a present-but-valueless entry as absent.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).and_then(|v| v.as_deref())
    }
}

// ---------------------------------------------------------------------------
// Trigger kind
// ---------------------------------------------------------------------------

/// Trigger source sent for a sign-in by an unknown user.
pub const TRIGGER_AUTHENTICATION: &str = "UserMigration_Authentication";

/// Trigger source sent for a forgot-password request by an unknown user.
pub const TRIGGER_FORGOT_PASSWORD: &str = "UserMigration_ForgotPassword";

/// Which migration flow an invocation belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerKind {
    Authentication,
    ForgotPassword,
    Other,
}

impl TriggerKind {
    /// Classify a raw `triggerSource` string.
    pub fn from_source(source: &str) -> Self {
        match source {
            TRIGGER_AUTHENTICATION => Self::Authentication,
            TRIGGER_FORGOT_PASSWORD => Self::ForgotPassword,
            _ => Self::Other,
        }
    }
}

impl std::fmt::Display for TriggerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Authentication => write!(f, "authentication"),
            Self::ForgotPassword => write!(f, "forgot_password"),
            Self::Other => write!(f, "other"),
        }
    }
}

// ---------------------------------------------------------------------------
// Trigger event
// ---------------------------------------------------------------------------

/// A user migration trigger event, as delivered by the new identity pool.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MigrationTriggerEvent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    /// Raw trigger source, e.g. `UserMigration_Authentication`.
    #[serde(default)]
    pub trigger_source: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_pool_id: Option<String>,

    #[serde(default)]
    pub user_name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caller_context: Option<serde_json::Value>,

    #[serde(default)]
    pub request: MigrationRequest,

    #[serde(default)]
    pub response: MigrationResponse,
}

impl MigrationTriggerEvent {
    pub fn trigger_kind(&self) -> TriggerKind {
        TriggerKind::from_source(&self.trigger_source)
    }
}

/// Request half of the trigger event.
#[derive(Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MigrationRequest {
    /// Only present for the authentication flow.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation_data: Option<HashMap<String, String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_metadata: Option<HashMap<String, String>>,
}

// Keep the password out of `{:?}` output.
impl std::fmt::Debug for MigrationRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MigrationRequest")
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("validation_data", &self.validation_data)
            .field("client_metadata", &self.client_metadata)
            .finish()
    }
}

/// Response half of the trigger event, filled in by the router.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MigrationResponse {
    #[serde(default)]
    pub user_attributes: Option<AttributeSet>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub final_user_status: Option<FinalUserStatus>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_action: Option<MessageAction>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub desired_delivery_mediums: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub force_alias_creation: Option<bool>,
}

/// Status the new pool assigns to the migrated user.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FinalUserStatus {
    Confirmed,
}

/// Whether the new pool sends its welcome message to the migrated user.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MessageAction {
    Suppress,
}
