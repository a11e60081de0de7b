//! Configuration for poolbridge.
//!
//! The function reads its settings from environment variables via
//! [`BridgeConfig::from_env`]. Operator tooling reads a TOML file instead;
//! there the external id is stored as an `_env` field naming the variable
//! that holds it, resolved by [`BridgeConfig::resolve_env_vars`].

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::directory::CredentialSource;
use crate::errors::ConfigError;

/// Environment variable names read by [`BridgeConfig::from_env`].
pub mod env {
    pub const REGION: &str = "OLD_USER_POOL_REGION";
    pub const FALLBACK_REGION: &str = "AWS_REGION";
    pub const USER_POOL_ID: &str = "OLD_USER_POOL_ID";
    pub const CLIENT_ID: &str = "OLD_CLIENT_ID";
    pub const ROLE_ARN: &str = "OLD_ROLE_ARN";
    pub const EXTERNAL_ID: &str = "OLD_EXTERNAL_ID";
    pub const LOG_LEVEL: &str = "LOG_LEVEL";
}

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Top-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BridgeConfig {
    /// Legacy user pool connection settings.
    pub legacy: LegacyDirectoryConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

// ---------------------------------------------------------------------------
// Legacy directory
// ---------------------------------------------------------------------------

/// Connection settings for the legacy user pool.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct LegacyDirectoryConfig {
    /// Region the legacy pool is deployed in.
    pub region: String,

    /// Legacy pool id, e.g. `eu-west-1_AbCdEf123`.
    pub user_pool_id: String,

    /// App client id in the legacy pool with the admin password flow enabled.
    pub client_id: String,

    /// Role to assume when the legacy pool lives in another account.
    #[serde(default)]
    pub role_arn: Option<String>,

    /// Environment variable holding the external id for the role trust policy.
    #[serde(default)]
    pub external_id_env: Option<String>,

    /// Resolved external id.
    #[serde(skip)]
    pub external_id: Option<String>,
}

impl LegacyDirectoryConfig {
    /// Credential source for one invocation.
    pub fn credential_source(&self, session_name: &str) -> CredentialSource {
        match &self.role_arn {
            Some(role_arn) => CredentialSource::AssumeRole {
                role_arn: role_arn.clone(),
                external_id: self.external_id.clone(),
                session_name: session_name.to_string(),
            },
            None => CredentialSource::Ambient,
        }
    }
}

// ---------------------------------------------------------------------------
// Logging
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Minimum tracing level or filter directive.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_log_level() -> String {
    "info".into()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

// ---------------------------------------------------------------------------
// Loading & resolving
// ---------------------------------------------------------------------------

impl BridgeConfig {
    /// Build the configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build the configuration from an arbitrary variable source.
    ///
    /// Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.is_empty());
        let require = |name: &str, field: &str| {
            get(name).ok_or_else(|| ConfigError::EnvVarMissing {
                var: name.to_string(),
                field: field.to_string(),
            })
        };

        let region = match get(env::REGION) {
            Some(region) => region,
            None => require(env::FALLBACK_REGION, "legacy.region")?,
        };

        let role_arn = get(env::ROLE_ARN);
        let external_id = match (role_arn.as_ref(), get(env::EXTERNAL_ID)) {
            (None, Some(_)) => {
                warn!(
                    var = env::EXTERNAL_ID,
                    "external id set without a role ARN, ignoring it"
                );
                None
            }
            (_, external_id) => external_id,
        };

        let config = Self {
            legacy: LegacyDirectoryConfig {
                region,
                user_pool_id: require(env::USER_POOL_ID, "legacy.user_pool_id")?,
                client_id: require(env::CLIENT_ID, "legacy.client_id")?,
                role_arn,
                external_id_env: None,
                external_id,
            },
            logging: LoggingConfig {
                log_level: get(env::LOG_LEVEL).unwrap_or_else(default_log_level),
            },
        };

        debug!("configuration read from environment");
        Ok(config)
    }

    /// Load a [`BridgeConfig`] from a TOML file at the given path.
    ///
    /// This does **not** resolve environment variables -- call
    /// [`resolve_env_vars`](Self::resolve_env_vars) afterwards.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        info!(path = %path.display(), "loading configuration");

        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.display().to_string()));
        }

        let contents = std::fs::read_to_string(path)?;
        let config: BridgeConfig =
            toml::from_str(&contents).map_err(|e| ConfigError::ParseError(e.to_string()))?;

        debug!("configuration parsed successfully");
        Ok(config)
    }

    /// Resolve `*_env` fields from environment variables.
    ///
    /// A referenced variable that is missing is an error: assuming the role
    /// without its external id would fail later with a less useful message.
    pub fn resolve_env_vars(&mut self) -> Result<(), ConfigError> {
        if let Some(ref env_name) = self.legacy.external_id_env {
            match std::env::var(env_name) {
                Ok(val) if !val.is_empty() => {
                    debug!(env_name, "resolved legacy.external_id_env");
                    self.legacy.external_id = Some(val);
                }
                _ => {
                    return Err(ConfigError::EnvVarMissing {
                        var: env_name.clone(),
                        field: "legacy.external_id_env".into(),
                    });
                }
            }
        }
        Ok(())
    }

    /// Validate that all required fields are present and sane.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let legacy = &self.legacy;

        if legacy.region.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "legacy.region".into(),
                detail: "region must not be empty".into(),
            });
        }
        if legacy.user_pool_id.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "legacy.user_pool_id".into(),
                detail: "user pool id must not be empty".into(),
            });
        }
        match legacy.user_pool_id.split_once('_') {
            Some((region, id)) if is_region_name(region) && is_pool_suffix(id) => {
                if region != legacy.region {
                    return Err(ConfigError::InvalidValue {
                        field: "legacy.user_pool_id".into(),
                        detail: format!(
                            "user pool id prefix '{}' does not match region '{}'",
                            region, legacy.region
                        ),
                    });
                }
            }
            _ => {
                return Err(ConfigError::InvalidValue {
                    field: "legacy.user_pool_id".into(),
                    detail: "user pool id must be in '<region>_<id>' format".into(),
                });
            }
        }
        if legacy.client_id.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "legacy.client_id".into(),
                detail: "client id must not be empty".into(),
            });
        }
        if let Some(ref arn) = legacy.role_arn {
            if !arn.starts_with("arn:") {
                return Err(ConfigError::InvalidValue {
                    field: "legacy.role_arn".into(),
                    detail: "role ARN must start with 'arn:'".into(),
                });
            }
        }
        if legacy.role_arn.is_none()
            && (legacy.external_id.is_some() || legacy.external_id_env.is_some())
        {
            return Err(ConfigError::InvalidValue {
                field: "legacy.external_id".into(),
                detail: "an external id requires a role ARN".into(),
            });
        }

        Ok(())
    }

    /// Convenience: load, resolve, and validate in one call.
    pub fn load_and_resolve<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let mut config = Self::load_from_file(path)?;
        config.resolve_env_vars()?;
        config.validate()?;
        Ok(config)
    }
}

/// `eu-west-1` style: lowercase letters, digits and `-`.
fn is_region_name(s: &str) -> bool {
    !s.is_empty()
        && s
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
}

/// The part of a pool id after the region: ASCII letters and digits.
fn is_pool_suffix(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_alphanumeric())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn sample_toml() -> &'static str {
        r#"
[legacy]
region = "eu-west-1"
user_pool_id = "eu-west-1_OldPool1"
client_id = "3n4b5urk1ft4fl3mg5e62d9ado"
role_arn = "arn:aws:iam::123456789012:role/legacy-pool-reader"

[logging]
log_level = "debug"
"#
    }

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| vars.get(name).cloned()
    }

    #[test]
    fn test_parse_full_config() {
        let config: BridgeConfig = toml::from_str(sample_toml()).expect("failed to parse toml");
        assert_eq!(config.legacy.region, "eu-west-1");
        assert_eq!(config.legacy.user_pool_id, "eu-west-1_OldPool1");
        assert_eq!(config.logging.log_level, "debug");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("poolbridge.toml");
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(sample_toml().as_bytes()).unwrap();

        let config = BridgeConfig::load_from_file(&path).expect("load_from_file failed");
        assert_eq!(config.legacy.client_id, "3n4b5urk1ft4fl3mg5e62d9ado");
    }

    #[test]
    fn test_file_not_found() {
        let result = BridgeConfig::load_from_file("/nonexistent/poolbridge.toml");
        assert!(matches!(result, Err(ConfigError::FileNotFound(_))));
    }

    #[test]
    fn test_defaults() {
        let minimal = r#"
[legacy]
region = "us-east-1"
user_pool_id = "us-east-1_abc"
client_id = "client"
"#;
        let config: BridgeConfig = toml::from_str(minimal).unwrap();
        assert_eq!(config.logging.log_level, "info");
        assert!(config.legacy.role_arn.is_none());
        assert_eq!(
            config.legacy.credential_source("req-1"),
            CredentialSource::Ambient
        );
    }

    #[test]
    fn test_from_lookup() {
        let config = BridgeConfig::from_lookup(lookup_from(&[
            ("OLD_USER_POOL_REGION", "eu-west-1"),
            ("AWS_REGION", "us-east-1"),
            ("OLD_USER_POOL_ID", "eu-west-1_OldPool1"),
            ("OLD_CLIENT_ID", "client"),
            ("OLD_ROLE_ARN", "arn:aws:iam::123456789012:role/reader"),
            ("OLD_EXTERNAL_ID", "ext-42"),
        ]))
        .unwrap();

        assert_eq!(config.legacy.region, "eu-west-1");
        assert_eq!(config.logging.log_level, "info");
        assert_eq!(
            config.legacy.credential_source("req-1"),
            CredentialSource::AssumeRole {
                role_arn: "arn:aws:iam::123456789012:role/reader".into(),
                external_id: Some("ext-42".into()),
                session_name: "req-1".into(),
            }
        );
    }

    #[test]
    fn test_from_lookup_region_fallback() {
        let config = BridgeConfig::from_lookup(lookup_from(&[
            ("OLD_USER_POOL_REGION", ""),
            ("AWS_REGION", "us-east-1"),
            ("OLD_USER_POOL_ID", "us-east-1_abc"),
            ("OLD_CLIENT_ID", "client"),
        ]))
        .unwrap();
        assert_eq!(config.legacy.region, "us-east-1");
        assert!(config.legacy.role_arn.is_none());
    }

    #[test]
    fn test_from_lookup_missing_pool_id() {
        let result = BridgeConfig::from_lookup(lookup_from(&[
            ("AWS_REGION", "us-east-1"),
            ("OLD_CLIENT_ID", "client"),
        ]));
        assert!(matches!(
            result,
            Err(ConfigError::EnvVarMissing { ref var, .. }) if var == "OLD_USER_POOL_ID"
        ));
    }

    #[test]
    fn test_validate_rejects_bad_pool_id() {
        let mut config: BridgeConfig = toml::from_str(sample_toml()).unwrap();
        config.legacy.user_pool_id = "<OLD_USER_POOL_ID>".into();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { ref field, .. }) if field == "legacy.user_pool_id"
        ));
    }

    #[test]
    fn test_validate_pool_id_shape() {
        let mut config: BridgeConfig = toml::from_str(sample_toml()).unwrap();
        for bad in [
            "eu-west-1_",
            "_OldPool1",
            "eu-west-1_Old-Pool",
            "EU-WEST-1_OldPool1",
            "eu west 1_OldPool1",
        ] {
            config.legacy.user_pool_id = bad.into();
            assert!(config.validate().is_err(), "accepted {}", bad);
        }

        config.legacy.user_pool_id = "eu-west-1_AbCdEf123".into();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_region_mismatch() {
        let mut config: BridgeConfig = toml::from_str(sample_toml()).unwrap();
        config.legacy.user_pool_id = "us-east-1_OldPool1".into();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { ref field, ref detail })
                if field == "legacy.user_pool_id" && detail.contains("us-east-1")
        ));
    }

    #[test]
    fn test_from_lookup_ignores_external_id_without_role() {
        let config = BridgeConfig::from_lookup(lookup_from(&[
            ("AWS_REGION", "us-east-1"),
            ("OLD_USER_POOL_ID", "us-east-1_abc"),
            ("OLD_CLIENT_ID", "client"),
            ("OLD_EXTERNAL_ID", "ext-42"),
        ]))
        .unwrap();

        assert!(config.legacy.external_id.is_none());
        assert!(config.validate().is_ok());
        assert_eq!(
            config.legacy.credential_source("req-1"),
            CredentialSource::Ambient
        );
    }

    #[test]
    fn test_validate_rejects_bad_role_arn() {
        let mut config: BridgeConfig = toml::from_str(sample_toml()).unwrap();
        config.legacy.role_arn = Some("legacy-pool-reader".into());
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { ref field, .. }) if field == "legacy.role_arn"
        ));
    }

    #[test]
    fn test_validate_rejects_external_id_without_role() {
        let mut config: BridgeConfig = toml::from_str(sample_toml()).unwrap();
        config.legacy.role_arn = None;
        config.legacy.external_id = Some("ext".into());
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { ref field, .. }) if field == "legacy.external_id"
        ));
    }

    #[test]
    fn test_resolve_env_vars() {
        std::env::set_var("POOLBRIDGE_TEST_EXTERNAL_ID", "ext-99");

        let mut config: BridgeConfig = toml::from_str(sample_toml()).unwrap();
        config.legacy.external_id_env = Some("POOLBRIDGE_TEST_EXTERNAL_ID".into());
        config.resolve_env_vars().unwrap();
        assert_eq!(config.legacy.external_id.as_deref(), Some("ext-99"));

        config.legacy.external_id_env = Some("POOLBRIDGE_TEST_UNSET_VAR".into());
        assert!(matches!(
            config.resolve_env_vars(),
            Err(ConfigError::EnvVarMissing { .. })
        ));

        std::env::remove_var("POOLBRIDGE_TEST_EXTERNAL_ID");
    }
}
