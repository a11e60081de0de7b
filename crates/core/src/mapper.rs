//! Legacy record to new-pool attribute mapping.
//!
//! The new pool needs `email` and `preferred_username` to create the user,
//! and owns its own `sub`. The legacy `sub` survives as `custom:old_sub` so
//! downstream systems keyed on it can still find the user.

use tracing::{debug, warn};

use crate::errors::MappingError;
use crate::models::{AttributeSet, LegacyUser};

/// Attributes that must be present and non-empty in every legacy record.
pub const REQUIRED_ATTRIBUTES: [&str; 2] = ["email", "preferred_username"];

/// Legacy unique identifier; never copied to the new pool under this name.
pub const LEGACY_SUB: &str = "sub";

/// Custom attribute that carries the legacy `sub`.
pub const OLD_SUB_ATTRIBUTE: &str = "custom:old_sub";

/// Maps legacy user records onto the new pool's attribute schema.
#[derive(Debug, Clone, Copy, Default)]
pub struct AttributeMapper;

impl AttributeMapper {
    /// Build the attribute set for `user`.
    ///
    /// Fails before producing any output when a required attribute is absent.
    pub fn map(&self, user: &LegacyUser) -> Result<AttributeSet, MappingError> {
        for name in REQUIRED_ATTRIBUTES {
            match user.attribute(name) {
                Some(value) if !value.is_empty() => {}
                _ => {
                    warn!(
                        user = user.user_name(),
                        attribute = name,
                        "legacy record is missing a required attribute"
                    );
                    return Err(MappingError::MissingRequiredAttribute(name.to_string()));
                }
            }
        }

        let mut attributes: AttributeSet = user
            .attributes()
            .iter()
            .filter_map(|(name, value)| value.as_ref().map(|v| (name.clone(), v.clone())))
            .collect();

        if let Some(old_sub) = attributes.remove(LEGACY_SUB) {
            attributes.insert(OLD_SUB_ATTRIBUTE.to_string(), old_sub);
        }

        debug!(
            user = user.user_name(),
            count = attributes.len(),
            "mapped legacy attributes"
        );
        Ok(attributes)
    }
}
