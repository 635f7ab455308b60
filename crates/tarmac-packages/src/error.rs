//! Package error types

use std::path::PathBuf;

use tarmac_signing::SigningError;
use thiserror::Error;

/// Package inspection errors
#[derive(Debug, Error)]
pub enum PackageError {
    /// The file is not a readable application package
    #[error("Not a valid iOS application package at {path}: {reason}")]
    InvalidPackage { path: PathBuf, reason: String },

    /// No archive entry matched the requested bundle file
    #[error("File {pattern} not found in {path}")]
    FileNotFound { pattern: String, path: PathBuf },

    /// Required Info.plist key is missing
    #[error("Missing {0} in Info.plist")]
    MissingKey(String),

    /// External decompression utility failed
    #[error("Command '{command}' failed with exit code {status}: {stderr}")]
    CommandFailed {
        command: String,
        status: i32,
        stderr: String,
    },

    /// Zip error
    #[error("Zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// Property list error
    #[error("Property list error: {0}")]
    Plist(#[from] plist::Error),

    /// Embedded signing material could not be decoded
    #[error(transparent)]
    Signing(#[from] SigningError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for package operations
pub type Result<T> = std::result::Result<T, PackageError>;
