//! Configuration management for the Death Star pipeline

use crate::error::{DeathStarError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeathStarConfig {
    #[serde(default)]
    pub fingerprint: FingerprintConfig,

    #[serde(default)]
    pub mail: MailConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FingerprintConfig {
    /// Salt the fingerprint with the normalized company name to reduce
    /// cross-list collisions when two leads share an inbox.
    #[serde(default)]
    pub salt_with_company: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MailConfig {
    /// Drafts subfolder name inside the outbox directory
    #[serde(default = "default_drafts_subfolder")]
    pub drafts_subfolder: String,
}

fn default_drafts_subfolder() -> String {
    crate::paths::DRAFTS_SUBFOLDER.to_string()
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            drafts_subfolder: default_drafts_subfolder(),
        }
    }
}

impl Default for DeathStarConfig {
    fn default() -> Self {
        Self {
            fingerprint: FingerprintConfig::default(),
            mail: MailConfig::default(),
        }
    }
}

impl DeathStarConfig {
    /// Load configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| DeathStarError::Config(format!("Failed to read config file: {}", e)))?;

        Self::from_json_str(&content)
    }

    /// Load configuration from a JSON string
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: DeathStarConfig = serde_json::from_str(json)
            .map_err(|e| DeathStarError::Config(format!("Failed to parse config: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.mail.drafts_subfolder.trim().is_empty() {
            return Err(DeathStarError::Config(
                "Drafts subfolder name must not be empty".to_string(),
            ));
        }

        if self.mail.drafts_subfolder.contains(['/', '\\']) {
            return Err(DeathStarError::Config(
                "Drafts subfolder must be a plain directory name".to_string(),
            ));
        }

        Ok(())
    }
}
