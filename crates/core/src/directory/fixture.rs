//! TOML fixture file acting as a legacy directory.
//!
//! Lets operators replay trigger events without touching the legacy pool.
//! The file format:
//!
//! ```toml
//! [users.alice]
//! password_hash = "$2b$10$..."   # bcrypt
//!
//! [users.alice.attributes]
//! email = "a@x.com"
//! preferred_username = "alice"
//! sub = "123"
//! ```

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::LegacyDirectory;
use crate::errors::DirectoryError;
use crate::models::LegacyUser;

/// A single user entry in the fixture file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixtureUser {
    /// bcrypt hash of the legacy password. Users without one cannot sign in.
    #[serde(default)]
    pub password_hash: Option<String>,

    #[serde(default)]
    pub attributes: HashMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
struct FixtureFileData {
    #[serde(default)]
    users: HashMap<String, FixtureUser>,
}

/// In-memory legacy directory loaded from a fixture file.
#[derive(Debug, Clone, Default)]
pub struct FixtureDirectory {
    users: HashMap<String, FixtureUser>,
}

impl FixtureDirectory {
    pub fn new(users: HashMap<String, FixtureUser>) -> Self {
        Self { users }
    }

    /// Load the fixture file from disk.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, DirectoryError> {
        let path = path.as_ref();
        info!(path = %path.display(), "loading legacy directory fixture");

        if !path.exists() {
            return Err(DirectoryError::FixtureError {
                path: path.display().to_string(),
                detail: "file not found".into(),
            });
        }

        let contents = std::fs::read_to_string(path)?;
        let data: FixtureFileData =
            toml::from_str(&contents).map_err(|e| DirectoryError::FixtureError {
                path: path.display().to_string(),
                detail: e.to_string(),
            })?;

        debug!(count = data.users.len(), "loaded fixture users");
        Ok(Self::new(data.users))
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    fn try_lookup(&self, username: &str) -> Result<LegacyUser, DirectoryError> {
        let entry = self
            .users
            .get(username)
            .ok_or_else(|| DirectoryError::UserNotFound(username.to_string()))?;

        let attributes = entry
            .attributes
            .iter()
            .map(|(k, v)| (k.clone(), Some(v.clone())))
            .collect();
        Ok(LegacyUser::new(username, attributes))
    }

    fn try_authenticate(&self, username: &str, password: &str) -> Result<LegacyUser, DirectoryError> {
        let entry = self
            .users
            .get(username)
            .ok_or_else(|| DirectoryError::UserNotFound(username.to_string()))?;

        let hash = entry
            .password_hash
            .as_deref()
            .ok_or_else(|| DirectoryError::AuthenticationFailed {
                username: username.to_string(),
                detail: "no password set".into(),
            })?;

        if !bcrypt::verify(password, hash)? {
            return Err(DirectoryError::AuthenticationFailed {
                username: username.to_string(),
                detail: "password mismatch".into(),
            });
        }

        self.try_lookup(username)
    }
}

impl LegacyDirectory for FixtureDirectory {
    async fn authenticate(&self, username: &str, password: &str) -> Option<LegacyUser> {
        match self.try_authenticate(username, password) {
            Ok(user) => Some(user),
            Err(e) => {
                warn!(username, error = %e, "fixture authentication failed");
                None
            }
        }
    }

    async fn lookup(&self, username: &str) -> Option<LegacyUser> {
        match self.try_lookup(username) {
            Ok(user) => Some(user),
            Err(e) => {
                warn!(username, error = %e, "fixture lookup failed");
                None
            }
        }
    }
}
