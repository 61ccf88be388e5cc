//! Configuration for the staging guard.
//!
//! This module loads and validates process-wide settings from a TOML file:
//!
//! - [`Config`] - Root configuration struct
//! - [`StagingConfig`] - Staging root, upload limit, ignore patterns
//!
//! Settings are read once at startup and handed to
//! [`StagingArea::open`](crate::staging::StagingArea::open); nothing reads
//! them implicitly afterwards.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::constants;
use crate::security::IgnorePatterns;

/// Result of configuration validation.
#[derive(Debug, Default)]
pub struct ValidationResult {
    /// Non-fatal warnings that should be logged but don't prevent operation.
    pub warnings: Vec<String>,
}

impl ValidationResult {
    /// Returns true if there are any warnings.
    #[must_use]
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

/// snap.toml configuration structure.
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub staging: StagingConfig,
}

/// `[staging]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct StagingConfig {
    /// Absolute staging root shared by all projects.
    #[serde(default = "default_root")]
    pub root: PathBuf,
    #[serde(default = "default_max_file_bytes")]
    pub max_file_bytes: u64,
    /// Replaces the built-in secret patterns when set.
    #[serde(default)]
    pub ignore_patterns: Option<Vec<String>>,
}

impl Default for StagingConfig {
    fn default() -> Self {
        Self {
            root: default_root(),
            max_file_bytes: default_max_file_bytes(),
            ignore_patterns: None,
        }
    }
}

fn default_root() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("snap")
        .join(constants::STAGING_DISPLAY_PREFIX)
}

fn default_max_file_bytes() -> u64 {
    constants::DEFAULT_MAX_FILE_BYTES
}

impl StagingConfig {
    /// Compiles the configured ignore patterns, or the built-in set.
    ///
    /// # Errors
    ///
    /// Returns an error naming the first invalid glob.
    pub fn ignore_patterns(&self) -> Result<IgnorePatterns> {
        match &self.ignore_patterns {
            Some(patterns) => {
                IgnorePatterns::new(patterns).context("Invalid staging.ignore_patterns entry")
            },
            None => Ok(IgnorePatterns::default()),
        }
    }
}

impl Config {
    /// Load configuration from snap.toml in the current directory, falling
    /// back to defaults when the file does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if snap.toml exists but cannot be read or parsed.
    pub fn load() -> Result<Self> {
        let path = Path::new(constants::DEFAULT_CONFIG_FILE);
        if path.exists() {
            Self::load_from(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from the specified path.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The file cannot be read (IO error)
    /// - The file contains invalid TOML syntax
    /// - Fields have invalid types
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Validate configuration with comprehensive checks.
    ///
    /// Returns a `ValidationResult` containing any non-fatal warnings.
    ///
    /// # Errors
    ///
    /// Returns an error if validation fails with one or more errors:
    /// - Relative staging root
    /// - Zero upload size limit
    /// - Invalid ignore pattern
    pub fn validate(&self) -> Result<ValidationResult> {
        let mut errors = Vec::new();
        let mut warnings = Vec::new();
        let staging = &self.staging;

        // 1. Staging root
        if !staging.root.is_absolute() {
            errors.push(format!(
                "staging.root must be an absolute path (got: '{}')",
                staging.root.display()
            ));
        } else if staging.root.exists() && !staging.root.is_dir() {
            errors.push(format!(
                "staging.root is not a directory: {}",
                staging.root.display()
            ));
        }

        // 2. Upload size limit
        if staging.max_file_bytes == 0 {
            errors.push(
                "staging.max_file_bytes cannot be 0\n  \
                 Recommended: 1048576-8388608 (1-8 MiB)"
                    .to_string(),
            );
        }

        if staging.max_file_bytes > constants::MAX_FILE_BYTES_WARN_THRESHOLD {
            warnings.push(format!(
                "staging.max_file_bytes {} is very high (> {})\n  \
                 Uploads are held in memory while being decoded",
                staging.max_file_bytes,
                constants::MAX_FILE_BYTES_WARN_THRESHOLD
            ));
        }

        // 3. Ignore patterns
        match &staging.ignore_patterns {
            Some(patterns) if patterns.is_empty() => {
                warnings.push(
                    "staging.ignore_patterns is empty\n  \
                     Secret and credential files will be accepted for upload"
                        .to_string(),
                );
            },
            Some(patterns) => {
                for pattern in patterns {
                    if let Err(e) = glob::Pattern::new(pattern) {
                        errors.push(format!("Invalid ignore pattern '{pattern}': {e}"));
                    }
                }
            },
            None => {},
        }

        // Return errors if any
        if !errors.is_empty() {
            anyhow::bail!(
                "Configuration validation failed:\n  - {}",
                errors.join("\n  - ")
            );
        }

        // Return warnings (caller decides how to handle/display them)
        Ok(ValidationResult { warnings })
    }
}
