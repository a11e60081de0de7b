//! Migration trigger dispatch.
//!
//! [`TriggerRouter::handle`] is the single entry point for an invocation.
//! It selects exactly one flow from the trigger kind and returns exactly one
//! outcome: the event with its response filled in, or a [`MigrationError`].
//! Each `match` arm evaluates to that outcome, so no flow can run after
//! another one has already produced a result.

use tracing::{debug, info, instrument, warn};

use crate::directory::LegacyDirectory;
use crate::errors::MigrationError;
use crate::mapper::AttributeMapper;
use crate::models::{LegacyUser, MigrationResponse, MigrationTriggerEvent, TriggerKind};
use crate::response::{FlowKind, ResponseBuilder};

/// Dispatches migration trigger events against a legacy directory.
#[derive(Debug, Clone)]
pub struct TriggerRouter<D> {
    directory: D,
    mapper: AttributeMapper,
    builder: ResponseBuilder,
}

impl<D: LegacyDirectory> TriggerRouter<D> {
    pub fn new(directory: D) -> Self {
        Self {
            directory,
            mapper: AttributeMapper,
            builder: ResponseBuilder,
        }
    }

    pub fn directory(&self) -> &D {
        &self.directory
    }

    /// Run the flow for `event` and produce the terminal signal.
    ///
    /// On failure the event is dropped, so a caller can never hand back a
    /// partially populated response.
    #[instrument(
        skip(self, event),
        fields(trigger_source = %event.trigger_source, user = %event.user_name)
    )]
    pub async fn handle(
        &self,
        mut event: MigrationTriggerEvent,
    ) -> Result<MigrationTriggerEvent, MigrationError> {
        let kind = event.trigger_kind();
        debug!(kind = %kind, "dispatching migration trigger");

        let outcome = match kind {
            TriggerKind::Authentication => self.on_authentication(&event).await,
            TriggerKind::ForgotPassword => self.on_forgot_password(&event).await,
            TriggerKind::Other => Err(MigrationError::UnsupportedTriggerSource),
        };

        match outcome {
            Ok(response) => {
                info!(
                    final_user_status = ?response.final_user_status,
                    attributes = response.user_attributes.as_ref().map_or(0, |a| a.len()),
                    "migration trigger succeeded"
                );
                event.response = response;
                Ok(event)
            }
            Err(reason) => {
                warn!(reason = reason.code(), "migration trigger failed");
                Err(reason)
            }
        }
    }

    async fn on_authentication(
        &self,
        event: &MigrationTriggerEvent,
    ) -> Result<MigrationResponse, MigrationError> {
        let password = event
            .request
            .password
            .as_deref()
            .ok_or(MigrationError::BadCredentials)?;

        let user = self
            .directory
            .authenticate(&event.user_name, password)
            .await
            .ok_or(MigrationError::BadCredentials)?;

        self.respond(FlowKind::Authentication, &user)
    }

    async fn on_forgot_password(
        &self,
        event: &MigrationTriggerEvent,
    ) -> Result<MigrationResponse, MigrationError> {
        let user = self
            .directory
            .lookup(&event.user_name)
            .await
            .ok_or(MigrationError::BadCredentials)?;

        self.respond(FlowKind::ForgotPassword, &user)
    }

    fn respond(&self, flow: FlowKind, user: &LegacyUser) -> Result<MigrationResponse, MigrationError> {
        let attributes = self.mapper.map(user)?;
        debug!(flow = %flow, user = user.user_name(), "building migration response");
        Ok(self.builder.build(flow, attributes))
    }
}
