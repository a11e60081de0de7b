//! Trigger response assembly.

use crate::models::{AttributeSet, FinalUserStatus, MessageAction, MigrationResponse};

/// The two flows that produce a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowKind {
    Authentication,
    ForgotPassword,
}

impl std::fmt::Display for FlowKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Authentication => write!(f, "authentication"),
            Self::ForgotPassword => write!(f, "forgot_password"),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ResponseBuilder;

impl ResponseBuilder {
    /// Build the response for a successful flow.
    ///
    /// Only a sign-in with a verified password confirms the user; a
    /// forgot-password migration leaves the status to the reset flow.
    pub fn build(&self, flow: FlowKind, attributes: AttributeSet) -> MigrationResponse {
        let final_user_status = match flow {
            FlowKind::Authentication => Some(FinalUserStatus::Confirmed),
            FlowKind::ForgotPassword => None,
        };

        MigrationResponse {
            user_attributes: Some(attributes),
            final_user_status,
            message_action: Some(MessageAction::Suppress),
            ..Default::default()
        }
    }
}
