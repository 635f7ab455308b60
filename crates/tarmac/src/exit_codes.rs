//! Exit codes for the CLI

use tarmac_core::ConfigError;
use tarmac_packages::PackageError;

/// General error
pub const ERROR: i32 = 1;

/// Configuration error
pub const CONFIG_ERROR: i32 = 2;

/// The input is not a valid application package
pub const INVALID_PACKAGE: i32 = 3;

/// External tool failed
pub const TOOL_ERROR: i32 = 4;

/// Map an error to the process exit code
pub fn for_error(err: &anyhow::Error) -> i32 {
    if err.downcast_ref::<ConfigError>().is_some() {
        return CONFIG_ERROR;
    }

    match err.downcast_ref::<PackageError>() {
        Some(PackageError::InvalidPackage { .. }) => INVALID_PACKAGE,
        Some(PackageError::CommandFailed { .. }) => TOOL_ERROR,
        _ => ERROR,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_exit_code_mapping() {
        let invalid = anyhow::Error::new(PackageError::InvalidPackage {
            path: PathBuf::from("App.ipa"),
            reason: "not a zip".to_string(),
        });
        assert_eq!(for_error(&invalid), INVALID_PACKAGE);

        let tool = anyhow::Error::new(PackageError::CommandFailed {
            command: "unzip".to_string(),
            status: 9,
            stderr: String::new(),
        });
        assert_eq!(for_error(&tool), TOOL_ERROR);

        let config = anyhow::Error::new(ConfigError::NotFound(PathBuf::from(".")));
        assert_eq!(for_error(&config), CONFIG_ERROR);

        assert_eq!(for_error(&anyhow::anyhow!("boom")), ERROR);
    }
}
