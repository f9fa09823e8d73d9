//! Run command - Merge all datasets into the output directory
//!
//! Provides the `filemerge run` CLI command which:
//! 1. Loads configuration and applies environment/flag overrides
//! 2. Wires the filesystem adapter and the audit trail sink
//! 3. Runs the MergeEngine and displays the resulting report

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;
use tracing::info;

use crate::output::{get_formatter, OutputFormat};

/// Merge command with clap options
#[derive(Debug, Args)]
pub struct RunCommand {
    /// Input root containing one subdirectory per dataset
    #[arg(long)]
    pub input: Option<PathBuf>,

    /// Output root holding the canonical copy of each file
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Reject root receiving losing variants
    #[arg(long)]
    pub reject: Option<PathBuf>,

    /// Resolve and report without copying anything
    #[arg(long)]
    pub dry_run: bool,

    /// Exit non-zero if any per-file error occurred
    #[arg(long)]
    pub strict: bool,
}

impl RunCommand {
    /// Execute the run command
    ///
    /// Wires up the adapters, creates the MergeEngine, runs merge(),
    /// and displays the report.
    pub async fn execute(&self, format: OutputFormat, config_path: Option<&Path>) -> Result<()> {
        use filemerge_audit::{AuditLogger, IAuditSink, JsonlAuditSink};
        use filemerge_core::config::Config;
        use filemerge_core::domain::newtypes::RunId;
        use filemerge_engine::engine::MergeEngine;
        use filemerge_engine::filesystem::FileStoreAdapter;

        let formatter = get_formatter(matches!(format, OutputFormat::Json));

        // Step 1: Load config, then layer env and flag overrides on top
        let config_path = config_path
            .map(Path::to_path_buf)
            .unwrap_or_else(Config::default_path);
        let mut config = Config::load_or_default(&config_path);
        config.apply_env_overrides();

        if let Some(input) = &self.input {
            config.roots.input = input.clone();
        }
        if let Some(output) = &self.output {
            config.roots.output = output.clone();
        }
        if let Some(reject) = &self.reject {
            config.roots.reject = reject.clone();
        }

        info!(config_path = %config_path.display(), "Loaded configuration");

        let validation_errors = config.validate();
        if !validation_errors.is_empty() {
            for err in &validation_errors {
                formatter.error(&err.to_string());
            }
            anyhow::bail!("invalid configuration ({} errors)", validation_errors.len());
        }

        // Step 2: Wire adapters
        let store = Arc::new(FileStoreAdapter::new());
        let run_id = RunId::new();
        let audit = if config.audit.enabled && !self.dry_run {
            let sink = Arc::new(JsonlAuditSink::new(config.audit.file.clone()));
            AuditLogger::new(sink as Arc<dyn IAuditSink>, run_id)
        } else {
            AuditLogger::disabled(run_id)
        };

        if self.dry_run {
            formatter.info("Dry run mode - no changes will be made");
        }

        // Step 3: Run the engine
        formatter.info(&format!(
            "Merging datasets from {} into {}",
            config.roots.input.display(),
            config.roots.output.display()
        ));

        let engine = MergeEngine::new(store, audit, config.roots.clone())
            .with_dry_run(self.dry_run);
        let report = engine.merge().await.context("merge run failed")?;

        // Step 4: Display results
        if matches!(format, OutputFormat::Json) {
            let json = serde_json::to_value(&report)
                .context("Failed to serialize merge report")?;
            formatter.print_json(&json);
        } else {
            let duration_display = if report.duration_ms >= 1000 {
                format!("{:.1}s", report.duration_ms as f64 / 1000.0)
            } else {
                format!("{}ms", report.duration_ms)
            };

            if report.files_processed() == 0 && report.is_clean() {
                formatter.success("Nothing to merge");
            } else {
                formatter.success(&format!("Merge completed in {}", duration_display));
            }

            formatter.info(&format!(
                "Datasets:   {} processed",
                report.datasets_processed
            ));
            if report.files_seeded > 0 {
                formatter.info(&format!(
                    "Seeded:     {} existing file{}",
                    report.files_seeded,
                    plural(report.files_seeded)
                ));
            }
            if report.accepted_new > 0 {
                formatter.info(&format!(
                    "Accepted:   {} new file{}",
                    report.accepted_new,
                    plural(report.accepted_new)
                ));
            }
            if report.duplicate_noop > 0 {
                formatter.info(&format!(
                    "Duplicates: {} skipped",
                    report.duplicate_noop
                ));
            }
            if report.conflict_retained + report.conflict_superseded > 0 {
                formatter.info(&format!(
                    "Conflicts:  {} retained, {} superseded",
                    report.conflict_retained, report.conflict_superseded
                ));
            }
            if report.variants_rejected > 0 {
                formatter.info(&format!(
                    "Rejected:   {} variant cop{}",
                    report.variants_rejected,
                    if report.variants_rejected == 1 { "y" } else { "ies" }
                ));
            }

            if !report.errors.is_empty() {
                formatter.error(&format!(
                    "{} file{} could not be processed:",
                    report.errors.len(),
                    plural(report.errors.len() as u32)
                ));
                for err in &report.errors {
                    formatter.info(&format!("  - {}", err));
                }
            }
        }

        if self.strict && !report.is_clean() {
            anyhow::bail!("{} per-file errors (strict mode)", report.errors.len());
        }

        Ok(())
    }
}

fn plural(count: u32) -> &'static str {
    if count == 1 {
        ""
    } else {
        "s"
    }
}
