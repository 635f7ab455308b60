//! Configuration validation

use tracing::debug;

use crate::error::{ConfigError, Result};

use super::types::Config;

/// Validate configuration
pub fn validate_config(config: &Config) -> Result<()> {
    debug!("validating configuration");
    validate_packages(config)?;
    debug!("configuration validation passed");
    Ok(())
}

fn validate_packages(config: &Config) -> Result<()> {
    if config.packages.unzip_program.trim().is_empty() {
        return Err(ConfigError::InvalidValue {
            field: "packages.unzip_program".to_string(),
            message: "unzip program cannot be empty".to_string(),
        });
    }

    if config
        .packages
        .extract_dir
        .as_ref()
        .is_some_and(|dir| dir.as_os_str().is_empty())
    {
        return Err(ConfigError::InvalidValue {
            field: "packages.extract_dir".to_string(),
            message: "extract directory cannot be empty".to_string(),
        });
    }

    Ok(())
}
