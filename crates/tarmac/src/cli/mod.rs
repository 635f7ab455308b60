//! CLI definition and command handling

pub mod commands;
pub mod output;

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::debug;

use commands::{InitCommand, IpaCommand};
use tarmac_core::Config;

/// Tarmac - Mobile build and release tooling
#[derive(Debug, Parser)]
#[command(name = "tarmac")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Output format
    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,

    /// Working directory
    #[arg(short = 'C', long, global = true)]
    pub directory: Option<PathBuf>,

    /// Configuration file (defaults to searching the working directory)
    #[arg(long, global = true, env = "TARMAC_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Output format for CLI
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output
    #[default]
    Text,
    /// JSON output
    Json,
}

/// Available commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Write a default Tarmac configuration
    Init(InitCommand),

    /// Inspect iOS application packages
    Ipa(IpaCommand),
}

impl Cli {
    /// Execute the CLI command
    pub fn execute(self) -> anyhow::Result<()> {
        // Change to specified directory if provided
        if let Some(dir) = &self.directory {
            std::env::set_current_dir(dir)
                .with_context(|| format!("Failed to change directory to {}", dir.display()))?;
        }

        match self.command {
            Commands::Init(ref cmd) => cmd.execute(&self),
            Commands::Ipa(ref cmd) => cmd.execute(&self),
        }
    }

    /// Load the explicit config file, or search from the working directory
    pub fn load_config(&self) -> anyhow::Result<Config> {
        if let Some(path) = &self.config {
            return Ok(tarmac_core::load_config(path)?);
        }

        let cwd = std::env::current_dir()?;
        let (config, path) = tarmac_core::load_config_or_default(&cwd)?;
        if let Some(path) = &path {
            debug!(path = %path.display(), "using config file");
        }
        Ok(config)
    }
}
