//! Init command

use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use console::style;
use serde_json::json;
use tracing::info;

use tarmac_core::config::defaults::{default_config_toml, DEFAULT_CONFIG_TOML};

use crate::cli::{output, Cli, OutputFormat};

/// Write a default Tarmac configuration
#[derive(Debug, Args)]
pub struct InitCommand {
    /// Force overwrite existing configuration
    #[arg(short, long)]
    pub force: bool,

    /// Output file path
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

impl InitCommand {
    /// Execute the init command
    pub fn execute(&self, cli: &Cli) -> anyhow::Result<()> {
        info!(force = self.force, "executing init command");
        let config_path = match &self.output {
            Some(path) => path.clone(),
            None => std::env::current_dir()?.join(DEFAULT_CONFIG_TOML),
        };

        if config_path.exists() && !self.force {
            anyhow::bail!(
                "Configuration file already exists at {}. Use --force to overwrite.",
                config_path.display()
            );
        }

        std::fs::write(&config_path, default_config_toml())
            .with_context(|| format!("Failed to write {}", config_path.display()))?;
        info!(path = %config_path.display(), "wrote default config");

        match cli.format {
            OutputFormat::Json => {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&json!({
                        "success": true,
                        "path": config_path.display().to_string(),
                    }))?
                );
            }
            OutputFormat::Text => {
                if !cli.quiet {
                    output::success(&format!(
                        "Created {}",
                        style(config_path.display()).cyan()
                    ));
                }
            }
        }

        Ok(())
    }
}
