//! Error types for signing models

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for signing operations
pub type Result<T> = std::result::Result<T, SigningError>;

/// Signing-related errors
#[derive(Debug, Error)]
pub enum SigningError {
    /// Provisioning profile could not be decoded
    #[error("Provisioning profile error: {0}")]
    ProvisioningProfile(String),

    /// Provisioning profile file could not be read
    #[error("Failed to read provisioning profile {path}: {source}")]
    ProfileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Certificate could not be decoded
    #[error("Certificate error: {0}")]
    Certificate(String),

    /// Property list error
    #[error("Property list error: {0}")]
    Plist(#[from] plist::Error),
}
