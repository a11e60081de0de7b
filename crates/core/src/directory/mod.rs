//! Legacy identity directory access.
//!
//! The router only sees the [`LegacyDirectory`] trait. Every failure inside
//! an implementation (wrong password, unknown user, network error) is logged
//! there and surfaces as `None`, so callers cannot tell them apart.
//!
//! Implementations:
//! - [`CognitoDirectory`]: the legacy Cognito user pool (production)
//! - [`FixtureDirectory`]: users loaded from a TOML file (offline dry runs)

pub mod cognito;
pub mod credentials;
pub mod fixture;

use std::future::Future;

use crate::models::LegacyUser;

pub use cognito::CognitoDirectory;
pub use credentials::CredentialSource;
pub use fixture::FixtureDirectory;

/// The two legacy directory operations the migration flows need.
pub trait LegacyDirectory {
    /// Verify `password` for `username`, then fetch the full record.
    fn authenticate(
        &self,
        username: &str,
        password: &str,
    ) -> impl Future<Output = Option<LegacyUser>> + Send;

    /// Fetch the record for `username` without checking a password.
    fn lookup(&self, username: &str) -> impl Future<Output = Option<LegacyUser>> + Send;
}
