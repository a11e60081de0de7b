//! Credentials used to reach the legacy user pool.
//!
//! By default the ambient credential chain of the process is used. When the
//! legacy pool lives in another account, a role there is assumed with a
//! per-invocation session name and an optional external id.

use aws_config::sts::AssumeRoleProvider;
use aws_config::{BehaviorVersion, SdkConfig};
use aws_sdk_cognitoidentityprovider::config::Region;
use tracing::{debug, info};

/// Where the legacy directory client gets its AWS credentials.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialSource {
    /// The default credential chain (function role, env, profile).
    Ambient,
    /// Temporary credentials from `sts:AssumeRole`.
    AssumeRole {
        role_arn: String,
        external_id: Option<String>,
        session_name: String,
    },
}

impl CredentialSource {
    /// Load an SDK configuration for `region` using this credential source.
    pub async fn load_sdk_config(&self, region: &str) -> SdkConfig {
        let region = Region::new(region.to_string());
        let base = aws_config::defaults(BehaviorVersion::latest())
            .region(region.clone())
            .load()
            .await;

        match self {
            Self::Ambient => {
                debug!(region = %region, "using ambient credentials for legacy pool");
                base
            }
            Self::AssumeRole {
                role_arn,
                external_id,
                session_name,
            } => {
                info!(
                    role_arn = %role_arn,
                    session_name = %session_name,
                    external_id = external_id.is_some(),
                    "assuming role for legacy pool"
                );
                let mut builder = AssumeRoleProvider::builder(role_arn.clone())
                    .session_name(session_name.clone())
                    .region(region.clone())
                    .configure(&base);
                if let Some(id) = external_id {
                    builder = builder.external_id(id.clone());
                }
                let provider = builder.build().await;

                aws_config::defaults(BehaviorVersion::latest())
                    .region(region)
                    .credentials_provider(provider)
                    .load()
                    .await
            }
        }
    }
}

/// Turn an arbitrary invocation id into a valid STS role session name
/// (`[\w+=,.@-]`, 2 to 64 characters).
pub fn session_name_for(invocation_id: &str) -> String {
    let mut name: String = invocation_id
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || "+=,.@-_".contains(*c))
        .take(64)
        .collect();
    if name.len() < 2 {
        name = "poolbridge".to_string();
    }
    name
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_name_keeps_request_id() {
        let id = "c6af9ac6-7b61-11e6-9a41-93e812345678";
        assert_eq!(session_name_for(id), id);
    }

    #[test]
    fn test_session_name_sanitized() {
        assert_eq!(session_name_for("abc/def ghi"), "abcdefghi");
        assert_eq!(session_name_for(""), "poolbridge");
        assert_eq!(session_name_for(&"x".repeat(100)).len(), 64);
    }
}
