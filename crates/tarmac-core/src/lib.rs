//! Tarmac Core - Shared foundations for the Tarmac tools
//!
//! This crate provides configuration discovery, loading and validation, and
//! the configuration error type.

pub mod config;
pub mod error;

pub use config::{load_config, load_config_or_default, Config, PackagesConfig};
pub use error::{ConfigError, Result};
