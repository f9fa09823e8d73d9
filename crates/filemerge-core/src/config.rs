//! Configuration module for filemerge.
//!
//! Provides typed configuration structs that map to the YAML configuration
//! file, with loading, validation, defaults, and environment variable
//! overrides for the three root directories.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Top-level configuration for filemerge.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    pub roots: RootsConfig,
    pub logging: LoggingConfig,
    pub audit: AuditConfig,
}

/// The three directory roots a merge run operates on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RootsConfig {
    /// Directory containing one subdirectory per dataset.
    pub input: PathBuf,
    /// Flat directory holding the canonical copy of each filename.
    pub output: PathBuf,
    /// Flat directory receiving losing variants as `<name>.<digest>`.
    pub reject: PathBuf,
}

/// Logging / tracing settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level: `trace`, `debug`, `info`, `warn`, or `error`.
    pub level: String,
}

/// Decision trail settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditConfig {
    /// Whether to write the JSONL decision trail.
    pub enabled: bool,
    /// Path of the JSONL trail file.
    pub file: PathBuf,
}

impl Config {
    /// Load configuration from a YAML file at `path`.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Try to load from `path`; fall back to [`Config::default`] on any error.
    pub fn load_or_default(path: &Path) -> Self {
        Self::load(path).unwrap_or_default()
    }

    /// Platform-appropriate default path for the configuration file.
    ///
    /// Typically `$XDG_CONFIG_HOME/filemerge/config.yaml` on Linux.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("~/.config"))
            .join("filemerge")
            .join("config.yaml")
    }

    /// Apply `INPUT_DIR` / `OUTPUT_DIR` / `REJECT_DIR` environment overrides.
    pub fn apply_env_overrides(&mut self) {
        self.apply_env_overrides_from(|key| std::env::var(key).ok());
    }

    /// Override roots from a key lookup. Split out so tests can supply
    /// their own environment instead of mutating the process's.
    pub fn apply_env_overrides_from<F>(&mut self, get: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(dir) = get("INPUT_DIR") {
            self.roots.input = PathBuf::from(dir);
        }
        if let Some(dir) = get("OUTPUT_DIR") {
            self.roots.output = PathBuf::from(dir);
        }
        if let Some(dir) = get("REJECT_DIR") {
            self.roots.reject = PathBuf::from(dir);
        }
    }
}

impl Default for RootsConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::from("./in"),
            output: PathBuf::from("./out"),
            reject: PathBuf::from("./reject"),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            file: PathBuf::from("./merge-audit.jsonl"),
        }
    }
}

/// A single validation error found in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path to the offending field, e.g. `"roots.input"`.
    pub field: String,
    /// Human-readable explanation.
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Valid values for `logging.level`.
const VALID_LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

impl Config {
    /// Validate the configuration and return all errors found.
    ///
    /// An empty vector means the configuration is valid.
    pub fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        // --- roots ---
        for (field, path) in [
            ("roots.input", &self.roots.input),
            ("roots.output", &self.roots.output),
            ("roots.reject", &self.roots.reject),
        ] {
            if path.as_os_str().is_empty() {
                errors.push(ValidationError {
                    field: field.into(),
                    message: "must not be empty".into(),
                });
            }
        }

        // The three roots must be distinct directories; a merge would
        // otherwise read its own output back as input.
        if self.roots.input == self.roots.output {
            errors.push(ValidationError {
                field: "roots.output".into(),
                message: "must differ from roots.input".into(),
            });
        }
        if self.roots.output == self.roots.reject {
            errors.push(ValidationError {
                field: "roots.reject".into(),
                message: "must differ from roots.output".into(),
            });
        }
        if self.roots.input == self.roots.reject {
            errors.push(ValidationError {
                field: "roots.reject".into(),
                message: "must differ from roots.input".into(),
            });
        }

        // --- logging ---
        if !VALID_LOG_LEVELS.contains(&self.logging.level.as_str()) {
            errors.push(ValidationError {
                field: "logging.level".into(),
                message: format!(
                    "must be one of {}",
                    VALID_LOG_LEVELS.join(", ")
                ),
            });
        }

        // --- audit ---
        if self.audit.enabled && self.audit.file.as_os_str().is_empty() {
            errors.push(ValidationError {
                field: "audit.file".into(),
                message: "must not be empty when audit.enabled is true".into(),
            });
        }

        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.roots.input, PathBuf::from("./in"));
        assert_eq!(config.roots.output, PathBuf::from("./out"));
        assert_eq!(config.roots.reject, PathBuf::from("./reject"));
        assert_eq!(config.logging.level, "info");
        assert!(config.audit.enabled);
    }

    #[test]
    fn test_defaults_are_valid() {
        assert!(Config::default().validate().is_empty());
    }

    #[test]
    fn test_load_from_yaml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "roots:\n  input: /data/in\n  output: /data/out\n  reject: /data/reject\n\
             logging:\n  level: debug\n\
             audit:\n  enabled: false\n  file: /data/audit.jsonl"
        )
        .unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.roots.input, PathBuf::from("/data/in"));
        assert_eq!(config.logging.level, "debug");
        assert!(!config.audit.enabled);
    }

    #[test]
    fn test_load_or_default_on_missing_file() {
        let config = Config::load_or_default(Path::new("/nonexistent/config.yaml"));
        assert_eq!(config.roots.input, PathBuf::from("./in"));
    }

    #[test]
    fn test_env_overrides() {
        let mut config = Config::default();
        config.apply_env_overrides_from(|key| match key {
            "INPUT_DIR" => Some("/env/in".to_string()),
            "REJECT_DIR" => Some("/env/reject".to_string()),
            _ => None,
        });
        assert_eq!(config.roots.input, PathBuf::from("/env/in"));
        assert_eq!(config.roots.output, PathBuf::from("./out"));
        assert_eq!(config.roots.reject, PathBuf::from("/env/reject"));
    }

    #[test]
    fn test_validate_rejects_equal_roots() {
        let mut config = Config::default();
        config.roots.output = config.roots.input.clone();
        let errors = config.validate();
        assert!(errors.iter().any(|e| e.field == "roots.output"));
    }

    #[test]
    fn test_validate_rejects_bad_level() {
        let mut config = Config::default();
        config.logging.level = "loud".to_string();
        let errors = config.validate();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "logging.level");
    }

    #[test]
    fn test_validate_rejects_empty_root() {
        let mut config = Config::default();
        config.roots.reject = PathBuf::new();
        let errors = config.validate();
        assert!(errors.iter().any(|e| e.field == "roots.reject"));
    }

    #[test]
    fn test_validation_error_display() {
        let err = ValidationError {
            field: "roots.input".into(),
            message: "must not be empty".into(),
        };
        assert_eq!(err.to_string(), "roots.input: must not be empty");
    }
}
