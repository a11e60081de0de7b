//! poolbridge user migration function entry point.
//!
//! Reads configuration from the environment once at cold start, then for
//! every invocation connects to the legacy pool and runs the trigger router.

#![recursion_limit = "256"]

use std::sync::Arc;

use anyhow::{Context, Result};
use lambda_runtime::{service_fn, Diagnostic, Error, LambdaEvent};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use poolbridge_core::config::BridgeConfig;
use poolbridge_core::directory::credentials::session_name_for;
use poolbridge_core::directory::CognitoDirectory;
use poolbridge_core::errors::MigrationError;
use poolbridge_core::models::MigrationTriggerEvent;
use poolbridge_core::router::TriggerRouter;

#[tokio::main]
async fn main() -> Result<(), Error> {
    let config = load_config()?;

    let filter = EnvFilter::try_new(&config.logging.log_level).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(false)
        .without_time()
        .init();

    info!(
        version = env!("CARGO_PKG_VERSION"),
        region = %config.legacy.region,
        user_pool_id = %config.legacy.user_pool_id,
        assume_role = config.legacy.role_arn.is_some(),
        "poolbridge migration function starting"
    );

    let config = Arc::new(config);
    lambda_runtime::run(service_fn(move |event: LambdaEvent<MigrationTriggerEvent>| {
        let config = Arc::clone(&config);
        async move { handle(&config, event).await }
    }))
    .await
}

fn load_config() -> Result<BridgeConfig> {
    let config = BridgeConfig::from_env().context("failed to read configuration from environment")?;
    config.validate().context("configuration validation failed")?;
    Ok(config)
}

async fn handle(
    config: &BridgeConfig,
    event: LambdaEvent<MigrationTriggerEvent>,
) -> Result<MigrationTriggerEvent, Diagnostic> {
    let (payload, context) = event.into_parts();

    // Assumed-role sessions are named after the invocation so the legacy
    // account's CloudTrail can be correlated with this function's logs.
    let session_name = session_name_for(&context.request_id);
    let credentials = config.legacy.credential_source(&session_name);
    let directory = CognitoDirectory::connect(&config.legacy, &credentials).await;

    let router = TriggerRouter::new(directory);
    match router.handle(payload).await {
        Ok(event) => Ok(event),
        Err(reason) => {
            warn!(request_id = %context.request_id, reason = reason.code(), "rejecting migration");
            Err(rejection(reason))
        }
    }
}

/// Failure reported to the runtime: the reason code becomes the error type and
/// the generic message is what the end user sees.
fn rejection(reason: MigrationError) -> Diagnostic {
    Diagnostic {
        error_type: reason.code().to_string(),
        error_message: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejection_carries_reason_code() {
        let diagnostic = rejection(MigrationError::BadCredentials);
        assert_eq!(diagnostic.error_type, "BadCredentials");
        assert_eq!(diagnostic.error_message, "Bad credentials");

        let diagnostic = rejection(MigrationError::MissingRequiredAttribute);
        assert_eq!(diagnostic.error_type, "MissingRequiredAttribute");
        assert_eq!(diagnostic.error_message, "Missing required attribute");

        let diagnostic = rejection(MigrationError::UnsupportedTriggerSource);
        assert_eq!(diagnostic.error_type, "UnsupportedTriggerSource");
        assert_eq!(diagnostic.error_message, "Bad triggerSource");
    }
}
