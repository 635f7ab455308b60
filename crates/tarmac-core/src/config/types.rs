//! Configuration types

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::defaults::DEFAULT_UNZIP_PROGRAM;

/// Main configuration for Tarmac
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Version of the config schema
    #[serde(rename = "$schema", skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,

    /// Package inspection settings
    pub packages: PackagesConfig,
}

/// Package inspection settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PackagesConfig {
    /// External unzip-compatible program used for entries the zip reader
    /// cannot decode
    pub unzip_program: String,

    /// Default target directory for `ipa extract`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extract_dir: Option<PathBuf>,
}

impl Default for PackagesConfig {
    fn default() -> Self {
        Self {
            unzip_program: DEFAULT_UNZIP_PROGRAM.to_string(),
            extract_dir: None,
        }
    }
}
