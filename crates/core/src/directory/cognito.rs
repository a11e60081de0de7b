//! Legacy directory backed by a Cognito user pool.

use std::collections::HashMap;

use aws_sdk_cognitoidentityprovider::error::DisplayErrorContext;
use aws_sdk_cognitoidentityprovider::types::AuthFlowType;
use aws_sdk_cognitoidentityprovider::Client;
use tracing::{debug, info, instrument, warn};

use super::credentials::CredentialSource;
use super::LegacyDirectory;
use crate::config::LegacyDirectoryConfig;
use crate::errors::DirectoryError;
use crate::models::LegacyUser;

/// Client for the legacy user pool's admin API.
#[derive(Debug, Clone)]
pub struct CognitoDirectory {
    client: Client,
    user_pool_id: String,
    client_id: String,
}

impl CognitoDirectory {
    /// Wrap an already configured SDK client.
    pub fn new(client: Client, user_pool_id: impl Into<String>, client_id: impl Into<String>) -> Self {
        let directory = Self {
            client,
            user_pool_id: user_pool_id.into(),
            client_id: client_id.into(),
        };
        info!(
            user_pool_id = %directory.user_pool_id,
            client_id = %directory.client_id,
            "created CognitoDirectory"
        );
        directory
    }

    /// Build a client for the configured legacy pool.
    pub async fn connect(config: &LegacyDirectoryConfig, credentials: &CredentialSource) -> Self {
        let sdk_config = credentials.load_sdk_config(&config.region).await;
        Self::new(
            Client::new(&sdk_config),
            config.user_pool_id.clone(),
            config.client_id.clone(),
        )
    }

    #[instrument(skip(self, password), fields(user_pool_id = %self.user_pool_id))]
    async fn try_authenticate(
        &self,
        username: &str,
        password: &str,
    ) -> Result<LegacyUser, DirectoryError> {
        let output = self
            .client
            .admin_initiate_auth()
            .user_pool_id(&self.user_pool_id)
            .client_id(&self.client_id)
            .auth_flow(AuthFlowType::AdminUserPasswordAuth)
            .auth_parameters("USERNAME", username)
            .auth_parameters("PASSWORD", password)
            .send()
            .await
            .map_err(|e| match e.as_service_error() {
                Some(se) if se.is_not_authorized_exception() || se.is_user_not_found_exception() => {
                    DirectoryError::AuthenticationFailed {
                        username: username.to_string(),
                        detail: se.to_string(),
                    }
                }
                _ => DirectoryError::Service(DisplayErrorContext(&e).to_string()),
            })?;

        // A challenge (MFA, forced password change) still means the password
        // was accepted.
        debug!(
            challenge = ?output.challenge_name(),
            "legacy pool accepted password"
        );

        self.try_lookup(username).await
    }

    #[instrument(skip(self), fields(user_pool_id = %self.user_pool_id))]
    async fn try_lookup(&self, username: &str) -> Result<LegacyUser, DirectoryError> {
        let output = self
            .client
            .admin_get_user()
            .user_pool_id(&self.user_pool_id)
            .username(username)
            .send()
            .await
            .map_err(|e| match e.as_service_error() {
                Some(se) if se.is_user_not_found_exception() => {
                    DirectoryError::UserNotFound(username.to_string())
                }
                _ => DirectoryError::Service(DisplayErrorContext(&e).to_string()),
            })?;

        let user = user_from_attributes(
            output.username(),
            output
                .user_attributes()
                .iter()
                .map(|a| (a.name().to_string(), a.value().map(str::to_string))),
        );
        debug!(
            username = user.user_name(),
            attributes = user.attributes().len(),
            "fetched legacy user"
        );
        Ok(user)
    }
}

impl LegacyDirectory for CognitoDirectory {
    async fn authenticate(&self, username: &str, password: &str) -> Option<LegacyUser> {
        match self.try_authenticate(username, password).await {
            Ok(user) => Some(user),
            Err(e) => {
                warn!(username, error = %e, "legacy authentication failed");
                None
            }
        }
    }

    async fn lookup(&self, username: &str) -> Option<LegacyUser> {
        match self.try_lookup(username).await {
            Ok(user) => Some(user),
            Err(e) => {
                warn!(username, error = %e, "legacy lookup failed");
                None
            }
        }
    }
}

/// Fold the flat name/value list returned by the pool into a [`LegacyUser`].
///
/// A repeated name keeps its last value.
pub fn user_from_attributes(
    username: &str,
    pairs: impl IntoIterator<Item = (String, Option<String>)>,
) -> LegacyUser {
    let attributes: HashMap<String, Option<String>> = pairs.into_iter().collect();
    LegacyUser::new(username, attributes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_from_attributes() {
        let user = user_from_attributes(
            "alice",
            vec![
                ("sub".to_string(), Some("123".to_string())),
                ("email".to_string(), Some("old@x.com".to_string())),
                ("email".to_string(), Some("a@x.com".to_string())),
                ("locale".to_string(), None),
            ],
        );

        assert_eq!(user.user_name(), "alice");
        assert_eq!(user.attribute("sub"), Some("123"));
        assert_eq!(user.attribute("email"), Some("a@x.com"));
        assert!(user.attributes().contains_key("locale"));
        assert_eq!(user.attributes().len(), 3);
    }

    #[test]
    fn test_user_from_no_attributes() {
        let user = user_from_attributes("bob", Vec::new());
        assert_eq!(user.user_name(), "bob");
        assert!(user.attributes().is_empty());
    }
}
