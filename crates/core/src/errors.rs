//! Error types for the poolbridge core library.
//!
//! Each subsystem has its own error type derived with `thiserror`.
//! [`MigrationError`] is special: it is the failure signal handed back to the
//! identity pool, so it carries a reason code and nothing else.

use thiserror::Error;

// ---------------------------------------------------------------------------
// Migration signal
// ---------------------------------------------------------------------------

/// Terminal failure of a single migration trigger invocation.
///
/// The messages are deliberately generic: they are shown to the end user by
/// the identity pool and must not reveal whether a username exists.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum MigrationError {
    /// Password authentication failed, or the user is unknown.
    #[error("Bad credentials")]
    BadCredentials,

    /// The legacy record lacks `email` or `preferred_username`.
    #[error("Missing required attribute")]
    MissingRequiredAttribute,

    /// The trigger source is neither of the two migration flows.
    #[error("Bad triggerSource")]
    UnsupportedTriggerSource,
}

impl MigrationError {
    /// Stable reason code, suitable for metrics filters and log queries.
    pub fn code(&self) -> &'static str {
        match self {
            Self::BadCredentials => "BadCredentials",
            Self::MissingRequiredAttribute => "MissingRequiredAttribute",
            Self::UnsupportedTriggerSource => "UnsupportedTriggerSource",
        }
    }
}

impl From<MappingError> for MigrationError {
    fn from(err: MappingError) -> Self {
        match err {
            MappingError::MissingRequiredAttribute(_) => Self::MissingRequiredAttribute,
        }
    }
}

// ---------------------------------------------------------------------------
// Attribute mapping errors
// ---------------------------------------------------------------------------

/// Errors from converting a legacy record into new-pool attributes.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MappingError {
    /// A required attribute is absent or empty in the legacy record.
    #[error("legacy record is missing required attribute '{0}'")]
    MissingRequiredAttribute(String),
}

// ---------------------------------------------------------------------------
// Legacy directory errors
// ---------------------------------------------------------------------------

/// Errors raised inside a legacy directory client.
///
/// These never leave the directory boundary: clients log them and report the
/// user as not found.
#[derive(Debug, Error)]
pub enum DirectoryError {
    /// The directory rejected the username/password pair.
    #[error("authentication rejected for user '{username}': {detail}")]
    AuthenticationFailed { username: String, detail: String },

    /// The directory has no record for the username.
    #[error("user '{0}' not found in legacy directory")]
    UserNotFound(String),

    /// Transport or service failure talking to the directory.
    #[error("legacy directory service error: {0}")]
    Service(String),

    /// The fixture file could not be loaded.
    #[error("fixture file error at '{path}': {detail}")]
    FixtureError { path: String, detail: String },

    /// A stored password hash could not be checked.
    #[error("password hash error: {0}")]
    HashError(#[from] bcrypt::BcryptError),

    /// Generic I/O wrapper.
    #[error("directory I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

// ---------------------------------------------------------------------------
// Configuration errors
// ---------------------------------------------------------------------------

/// Errors from configuration loading and validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file not found.
    #[error("configuration file not found: {0}")]
    FileNotFound(String),

    /// TOML parse error.
    #[error("configuration parse error: {0}")]
    ParseError(String),

    /// A required environment variable is not set.
    #[error("required environment variable '{var}' is not set (referenced by config field '{field}')")]
    EnvVarMissing { var: String, field: String },

    /// A config value is invalid.
    #[error("invalid configuration value for '{field}': {detail}")]
    InvalidValue { field: String, detail: String },

    /// Generic I/O error reading the config file.
    #[error("configuration I/O error: {0}")]
    IoError(#[from] std::io::Error),
}
