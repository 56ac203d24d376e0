//! Document provider configuration module.

use super::{ConfigResult, Validate};
use crate::error::config::ConfigError;
use crate::provider::local::DEFAULT_MIME_TYPE;
use serde::{Deserialize, Serialize};

/// Document provider configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProviderConfig {
    /// Authority used in URIs of the local document provider
    pub authority: String,

    /// MIME type given to files created through a provider
    pub default_mime_type: String,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            authority: "local".to_string(),
            default_mime_type: DEFAULT_MIME_TYPE.to_string(),
        }
    }
}

impl Validate for ProviderConfig {
    fn validate(&self) -> ConfigResult<()> {
        if self.authority.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "provider.authority must not be empty".to_string(),
            ));
        }

        if self.authority.contains(['/', '\\']) {
            return Err(ConfigError::ValidationError(format!(
                "provider.authority must not contain a separator: {}",
                self.authority
            )));
        }

        if !self.default_mime_type.contains('/') {
            return Err(ConfigError::ValidationError(format!(
                "provider.default_mime_type is not a MIME type: {}",
                self.default_mime_type
            )));
        }

        Ok(())
    }
}
