//! poolbridge core library.
//!
//! This crate provides the pieces of a lazy user migration trigger:
//! configuration, the legacy directory clients, attribute mapping, response
//! assembly, and the trigger router that ties them together.

pub mod config;
pub mod directory;
pub mod errors;
pub mod mapper;
pub mod models;
pub mod response;
pub mod router;

// Re-exports for convenience.
pub use config::BridgeConfig;
pub use directory::{CognitoDirectory, FixtureDirectory, LegacyDirectory};
pub use errors::MigrationError;
pub use mapper::AttributeMapper;
pub use models::{LegacyUser, MigrationTriggerEvent};
pub use response::ResponseBuilder;
pub use router::TriggerRouter;
