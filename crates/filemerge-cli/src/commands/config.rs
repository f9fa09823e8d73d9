//! Config command - View and validate filemerge configuration
//!
//! Provides the `filemerge config` CLI command which:
//! 1. Shows the effective configuration (YAML or JSON)
//! 2. Prints the configuration file path
//! 3. Validates the configuration file and reports errors

use std::path::Path;

use anyhow::{Context, Result};
use clap::Subcommand;
use tracing::info;

use crate::output::{get_formatter, OutputFormat};

/// Config subcommands
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Display the effective configuration
    Show,
    /// Print the configuration file path
    Path,
    /// Validate the configuration file
    Validate,
}

impl ConfigCommand {
    /// Execute the config command
    pub async fn execute(&self, format: OutputFormat, config_path: Option<&Path>) -> Result<()> {
        match self {
            ConfigCommand::Show => self.execute_show(format, config_path).await,
            ConfigCommand::Path => self.execute_path(format, config_path).await,
            ConfigCommand::Validate => self.execute_validate(format, config_path).await,
        }
    }

    /// Show the effective configuration, env overrides applied
    async fn execute_show(&self, format: OutputFormat, config_path: Option<&Path>) -> Result<()> {
        use filemerge_core::config::Config;

        let formatter = get_formatter(matches!(format, OutputFormat::Json));

        let config_path = resolve_path(config_path);
        let mut config = Config::load_or_default(&config_path);
        config.apply_env_overrides();

        info!(config_path = %config_path.display(), "Showing configuration");

        if matches!(format, OutputFormat::Json) {
            let json = serde_json::to_value(&config)
                .context("Failed to serialize configuration to JSON")?;
            formatter.print_json(&json);
        } else {
            formatter.success(&format!("Configuration ({})", config_path.display()));
            formatter.info("");

            let yaml = serde_yaml::to_string(&config)
                .context("Failed to serialize configuration to YAML")?;

            for line in yaml.lines() {
                formatter.info(line);
            }
        }

        Ok(())
    }

    /// Print the configuration file path
    async fn execute_path(&self, format: OutputFormat, config_path: Option<&Path>) -> Result<()> {
        let config_path = resolve_path(config_path);

        if matches!(format, OutputFormat::Json) {
            let formatter = get_formatter(true);
            formatter.print_json(&serde_json::json!({
                "path": config_path.display().to_string(),
                "exists": config_path.exists(),
            }));
        } else {
            println!("{}", config_path.display());
        }

        Ok(())
    }

    /// Validate the configuration and report all errors
    async fn execute_validate(
        &self,
        format: OutputFormat,
        config_path: Option<&Path>,
    ) -> Result<()> {
        use filemerge_core::config::Config;

        let formatter = get_formatter(matches!(format, OutputFormat::Json));

        let config_path = resolve_path(config_path);
        let mut config = Config::load_or_default(&config_path);
        config.apply_env_overrides();

        let errors = config.validate();
        if errors.is_empty() {
            formatter.success("Configuration is valid");
            Ok(())
        } else {
            for err in &errors {
                formatter.error(&err.to_string());
            }
            anyhow::bail!("invalid configuration ({} errors)", errors.len());
        }
    }
}

fn resolve_path(config_path: Option<&Path>) -> std::path::PathBuf {
    use filemerge_core::config::Config;
    config_path
        .map(Path::to_path_buf)
        .unwrap_or_else(Config::default_path)
}
