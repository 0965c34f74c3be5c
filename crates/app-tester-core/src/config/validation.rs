//! Configuration validation

use tracing::debug;

use crate::error::{ConfigError, Result};

use super::types::TesterConfig;

/// Validate configuration
pub fn validate_config(config: &TesterConfig) -> Result<()> {
    debug!("validating configuration");

    require_non_empty("sdk.url", &config.sdk.url)?;
    require_non_empty("sdk.name", &config.sdk.name)?;

    if config.workdir.as_os_str().is_empty() {
        return Err(ConfigError::InvalidValue {
            field: "workdir".to_string(),
            message: "workdir cannot be empty".to_string(),
        }
        .into());
    }

    debug!("configuration validation passed");
    Ok(())
}

fn require_non_empty(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(ConfigError::InvalidValue {
            field: field.to_string(),
            message: format!("{field} cannot be empty"),
        }
        .into());
    }
    Ok(())
}
