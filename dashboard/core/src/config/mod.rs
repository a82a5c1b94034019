//! TOML Configuration File Support
//!
//! Centralized configuration loading for the dashboard, supporting a TOML
//! file at `~/.config/cctv-dashboard/dashboard.toml`.
//!
//! # Configuration Priority
//!
//! Configuration values are loaded with the following priority (highest first):
//! 1. CLI arguments (applied by the caller through [`ConfigOverrides`])
//! 2. Environment variables
//! 3. TOML configuration file
//! 4. Default values
//!
//! # Example Configuration
//!
//! ```toml
//! [streams]
//! max_concurrent = 4
//! capacity_choices = [1, 2, 3, 4, 6, 8]
//!
//! [viewport]
//! threshold = 0.3
//! root_margin = 0.0
//! width = 1280.0
//! height = 720.0
//!
//! [grid]
//! columns = 3
//! card_height = 240.0
//! gap = 16.0
//! ```

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::streaming::DEFAULT_MAX_CONCURRENT;
use crate::viewport::VisibilityConfig;

/// Capacities offered by the stream selector by default
pub const DEFAULT_CAPACITY_CHOICES: [usize; 6] = [1, 2, 3, 4, 6, 8];

// =============================================================================
// Error Types
// =============================================================================

/// Errors that can occur when loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read config file
    #[error("Failed to read config file at {path}: {source}")]
    ReadError {
        /// The path that was attempted
        path: PathBuf,
        /// The underlying IO error
        source: std::io::Error,
    },

    /// Failed to parse TOML
    #[error("Failed to parse TOML config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Invalid configuration value
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

// =============================================================================
// Configuration Source Tracking
// =============================================================================

/// Tracks where a configuration value came from
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfigSource {
    /// Value from command-line argument
    Cli,
    /// Value from environment variable
    Env,
    /// Value from TOML configuration file
    File,
    /// Default value
    Default,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cli => write!(f, "CLI"),
            Self::Env => write!(f, "environment"),
            Self::File => write!(f, "config file"),
            Self::Default => write!(f, "default"),
        }
    }
}

// =============================================================================
// TOML Configuration Structures
// =============================================================================

/// Streams section of the TOML configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamsToml {
    /// Number of players allowed to run at once
    pub max_concurrent: Option<usize>,

    /// Values offered by the capacity selector
    pub capacity_choices: Option<Vec<usize>>,
}

/// Viewport section of the TOML configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewportToml {
    /// Fraction of a card that must be on screen to count as visible
    pub threshold: Option<f64>,

    /// Margin added around the viewport, in pixels
    pub root_margin: Option<f64>,

    /// Viewport width in pixels
    pub width: Option<f64>,

    /// Viewport height in pixels
    pub height: Option<f64>,
}

/// Grid section of the TOML configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GridToml {
    /// Number of card columns
    pub columns: Option<usize>,

    /// Card height in pixels
    pub card_height: Option<f64>,

    /// Gap between cards in pixels
    pub gap: Option<f64>,
}

/// Top-level TOML configuration structure
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardToml {
    /// Streams configuration section
    pub streams: StreamsToml,

    /// Viewport configuration section
    pub viewport: ViewportToml,

    /// Grid configuration section
    pub grid: GridToml,
}

// =============================================================================
// Main Configuration Struct
// =============================================================================

/// Resolved dashboard configuration
///
/// Use [`load_config`] to load configuration with proper priority handling.
#[derive(Clone, Debug)]
pub struct DashboardConfig {
    /// Initial stream capacity
    pub max_concurrent: usize,

    /// Values offered by the capacity selector
    pub capacity_choices: Vec<usize>,

    /// Visibility thresholds
    pub visibility: VisibilityConfig,

    /// Viewport width in pixels
    pub viewport_width: f64,

    /// Viewport height in pixels
    pub viewport_height: f64,

    /// Number of card columns in the grid
    pub grid_columns: usize,

    /// Card height in pixels
    pub card_height: f64,

    /// Gap between cards in pixels
    pub gap: f64,

    /// Path to the config file that was loaded (if any)
    pub config_file_path: Option<PathBuf>,

    /// Source of configuration values
    source: ConfigSource,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            max_concurrent: DEFAULT_MAX_CONCURRENT,
            capacity_choices: DEFAULT_CAPACITY_CHOICES.to_vec(),
            visibility: VisibilityConfig::default(),
            viewport_width: 1280.0,
            viewport_height: 720.0,
            grid_columns: 3,
            card_height: 240.0,
            gap: 16.0,
            config_file_path: None,
            source: ConfigSource::Default,
        }
    }
}

impl DashboardConfig {
    /// Create a new configuration with default values
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the primary source of this configuration
    #[must_use]
    pub fn source(&self) -> ConfigSource {
        self.source
    }

    /// Set the configuration source
    pub fn set_source(&mut self, source: ConfigSource) {
        self.source = source;
    }

    /// Whether the capacity selector offers `capacity`
    #[must_use]
    pub fn allows_capacity(&self, capacity: usize) -> bool {
        self.capacity_choices.contains(&capacity)
    }

    /// Check that the configuration is internally consistent
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ValidationError`] describing the first problem.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_concurrent == 0 {
            return Err(ConfigError::ValidationError(
                "streams.max_concurrent must be at least 1".to_string(),
            ));
        }
        if self.capacity_choices.is_empty() || self.capacity_choices.contains(&0) {
            return Err(ConfigError::ValidationError(
                "streams.capacity_choices must be non-empty and positive".to_string(),
            ));
        }
        if !self.allows_capacity(self.max_concurrent) {
            return Err(ConfigError::ValidationError(format!(
                "streams.max_concurrent = {} is not one of {:?}",
                self.max_concurrent, self.capacity_choices
            )));
        }
        if self.grid_columns == 0 {
            return Err(ConfigError::ValidationError(
                "grid.columns must be at least 1".to_string(),
            ));
        }
        if !is_positive(self.viewport_width) || !is_positive(self.viewport_height) {
            return Err(ConfigError::ValidationError(
                "viewport width and height must be positive".to_string(),
            ));
        }
        if !is_positive(self.card_height) || self.gap < 0.0 {
            return Err(ConfigError::ValidationError(
                "grid.card_height must be positive and grid.gap non-negative".to_string(),
            ));
        }
        Ok(())
    }
}

fn is_positive(value: f64) -> bool {
    value.is_finite() && value > 0.0
}

// =============================================================================
// Configuration Loading
// =============================================================================

/// Get the default configuration file path
///
/// Returns `$XDG_CONFIG_HOME/cctv-dashboard/dashboard.toml` or
/// `~/.config/cctv-dashboard/dashboard.toml` if `XDG_CONFIG_HOME` is not set.
#[must_use]
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("cctv-dashboard").join("dashboard.toml"))
}

/// Load configuration from all sources with proper priority
///
/// # Errors
///
/// Returns an error if the config file exists but cannot be parsed, or if the
/// resulting configuration is invalid. A missing config file is not an error.
pub fn load_config() -> Result<DashboardConfig, ConfigError> {
    load_config_from_path(default_config_path())
}

/// Load configuration from a specific path
///
/// # Errors
///
/// Returns an error if the specified config file cannot be read or parsed,
/// or if the resulting configuration is invalid.
pub fn load_config_from_path(path: Option<PathBuf>) -> Result<DashboardConfig, ConfigError> {
    let mut config = DashboardConfig::default();

    if let Some(ref config_path) = path {
        if config_path.exists() {
            let toml_content =
                std::fs::read_to_string(config_path).map_err(|e| ConfigError::ReadError {
                    path: config_path.clone(),
                    source: e,
                })?;

            let toml_config: DashboardToml = toml::from_str(&toml_content)?;
            apply_toml_config(&mut config, &toml_config);
            config.config_file_path = Some(config_path.clone());
            config.source = ConfigSource::File;

            tracing::info!(
                path = %config_path.display(),
                "Loaded configuration from file"
            );
        } else {
            tracing::debug!(
                path = %config_path.display(),
                "Config file not found, using defaults"
            );
        }
    }

    apply_env_config(&mut config);
    config.validate()?;

    Ok(config)
}

/// Apply TOML configuration values to the config struct
fn apply_toml_config(config: &mut DashboardConfig, toml: &DashboardToml) {
    if let Some(max) = toml.streams.max_concurrent {
        config.max_concurrent = max;
    }
    if let Some(ref choices) = toml.streams.capacity_choices {
        config.capacity_choices.clone_from(choices);
    }

    if let Some(threshold) = toml.viewport.threshold {
        config.visibility.threshold = threshold;
    }
    if let Some(margin) = toml.viewport.root_margin {
        config.visibility.root_margin = margin;
    }
    config.visibility = config.visibility.validated();
    if let Some(width) = toml.viewport.width {
        config.viewport_width = width;
    }
    if let Some(height) = toml.viewport.height {
        config.viewport_height = height;
    }

    if let Some(columns) = toml.grid.columns {
        config.grid_columns = columns;
    }
    if let Some(card_height) = toml.grid.card_height {
        config.card_height = card_height;
    }
    if let Some(gap) = toml.grid.gap {
        config.gap = gap;
    }
}

/// Apply environment variable overrides to the config
fn apply_env_config(config: &mut DashboardConfig) {
    apply_env_with(config, |key| std::env::var(key).ok());
}

/// Apply overrides from an environment lookup function
fn apply_env_with(config: &mut DashboardConfig, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(max) = lookup("DASHBOARD_MAX_STREAMS") {
        if let Ok(n) = max.parse::<usize>() {
            config.max_concurrent = n;
            config.source = ConfigSource::Env;
        }
    }
    if let Some(threshold) = lookup("DASHBOARD_VISIBILITY_THRESHOLD") {
        if let Ok(t) = threshold.parse::<f64>() {
            config.visibility = VisibilityConfig {
                threshold: t,
                ..config.visibility
            }
            .validated();
            config.source = ConfigSource::Env;
        }
    }
    if let Some(columns) = lookup("DASHBOARD_GRID_COLUMNS") {
        if let Ok(n) = columns.parse::<usize>() {
            config.grid_columns = n;
            config.source = ConfigSource::Env;
        }
    }
}

// =============================================================================
// CLI Override Support
// =============================================================================

/// Builder for applying CLI overrides to configuration
///
/// Use this after [`load_config`] to apply command-line argument overrides.
#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    /// Initial stream capacity override
    pub max_concurrent: Option<usize>,

    /// Grid column count override
    pub grid_columns: Option<usize>,

    /// Visibility threshold override
    pub threshold: Option<f64>,
}

impl ConfigOverrides {
    /// Create a new empty set of overrides
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set stream capacity override
    #[must_use]
    pub fn with_max_concurrent(mut self, max: usize) -> Self {
        self.max_concurrent = Some(max);
        self
    }

    /// Set grid column override
    #[must_use]
    pub fn with_grid_columns(mut self, columns: usize) -> Self {
        self.grid_columns = Some(columns);
        self
    }

    /// Set visibility threshold override
    #[must_use]
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = Some(threshold);
        self
    }

    /// Apply overrides to a configuration
    ///
    /// The caller should [`validate`](DashboardConfig::validate) afterwards.
    pub fn apply(&self, config: &mut DashboardConfig) {
        if self.max_concurrent.is_some() || self.grid_columns.is_some() || self.threshold.is_some()
        {
            config.source = ConfigSource::Cli;
        }

        if let Some(max) = self.max_concurrent {
            config.max_concurrent = max;
        }
        if let Some(columns) = self.grid_columns {
            config.grid_columns = columns;
        }
        if let Some(threshold) = self.threshold {
            config.visibility = VisibilityConfig {
                threshold,
                ..config.visibility
            }
            .validated();
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_toml(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    // =========================================================================
    // Default Configuration Tests
    // =========================================================================

    #[test]
    fn test_default_config() {
        let config = DashboardConfig::default();

        assert_eq!(config.max_concurrent, 4);
        assert_eq!(config.capacity_choices, vec![1, 2, 3, 4, 6, 8]);
        assert!((config.visibility.threshold - 0.3).abs() < f64::EPSILON);
        assert_eq!(config.grid_columns, 3);
        assert_eq!(config.source(), ConfigSource::Default);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_default_config_path() {
        if let Some(p) = default_config_path() {
            assert!(p.to_string_lossy().contains("cctv-dashboard"));
            assert!(p.to_string_lossy().ends_with("dashboard.toml"));
        }
    }

    // =========================================================================
    // TOML Parsing Tests
    // =========================================================================

    #[test]
    fn test_parse_valid_toml() {
        let file = write_toml(
            r#"
[streams]
max_concurrent = 6
capacity_choices = [2, 6, 12]

[viewport]
root_margin = 40.0
width = 1920.0
height = 1080.0

[grid]
columns = 4
card_height = 180.0
gap = 8.0
"#,
        );

        let config = load_config_from_path(Some(file.path().to_path_buf())).unwrap();

        assert_eq!(config.max_concurrent, 6);
        assert_eq!(config.capacity_choices, vec![2, 6, 12]);
        assert!((config.visibility.root_margin - 40.0).abs() < f64::EPSILON);
        assert!((config.viewport_width - 1920.0).abs() < f64::EPSILON);
        assert!((config.viewport_height - 1080.0).abs() < f64::EPSILON);
        assert!((config.card_height - 180.0).abs() < f64::EPSILON);
        assert!((config.gap - 8.0).abs() < f64::EPSILON);
        assert_eq!(
            config.config_file_path.as_deref(),
            Some(file.path())
        );
    }

    #[test]
    fn test_parse_partial_toml_keeps_defaults() {
        let file = write_toml(
            r"
[viewport]
height = 900.0
",
        );

        let config = load_config_from_path(Some(file.path().to_path_buf())).unwrap();

        assert!((config.viewport_height - 900.0).abs() < f64::EPSILON);
        assert_eq!(config.capacity_choices, DEFAULT_CAPACITY_CHOICES.to_vec());
        assert!((config.card_height - 240.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_out_of_range_threshold_is_clamped() {
        let file = write_toml(
            r"
[viewport]
threshold = 4.5
",
        );

        let config = load_config_from_path(Some(file.path().to_path_buf())).unwrap();
        assert!(config.visibility.threshold <= 1.0);
    }

    #[test]
    fn test_missing_file_graceful() {
        let path = PathBuf::from("/nonexistent/path/dashboard.toml");
        let config = load_config_from_path(Some(path)).unwrap();
        assert!(config.config_file_path.is_none());
        assert!(
            config.source() == ConfigSource::Default || config.source() == ConfigSource::Env,
            "Expected Default or Env source, got: {:?}",
            config.source()
        );
    }

    #[test]
    fn test_malformed_toml_error() {
        let file = write_toml(
            r#"
[streams
max_concurrent = "four"
"#,
        );

        let result = load_config_from_path(Some(file.path().to_path_buf()));
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }

    // =========================================================================
    // Validation Tests
    // =========================================================================

    #[test]
    fn test_capacity_outside_choices_rejected() {
        let file = write_toml(
            r"
[streams]
max_concurrent = 5
",
        );

        let result = load_config_from_path(Some(file.path().to_path_buf()));
        assert!(matches!(result, Err(ConfigError::ValidationError(_))));
    }

    #[test]
    fn test_validate_rejects_zero_values() {
        let mut config = DashboardConfig::default();
        config.max_concurrent = 0;
        assert!(config.validate().is_err());

        let mut config = DashboardConfig::default();
        config.capacity_choices = vec![0, 4];
        assert!(config.validate().is_err());

        let mut config = DashboardConfig::default();
        config.grid_columns = 0;
        assert!(config.validate().is_err());

        let mut config = DashboardConfig::default();
        config.viewport_height = 0.0;
        assert!(config.validate().is_err());
    }

    // =========================================================================
    // Priority Ordering Tests
    // =========================================================================

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            ("DASHBOARD_MAX_STREAMS", "8"),
            ("DASHBOARD_VISIBILITY_THRESHOLD", "0.5"),
            ("DASHBOARD_GRID_COLUMNS", "not-a-number"),
        ]
        .into_iter()
        .collect();

        let mut config = DashboardConfig::default();
        config.set_source(ConfigSource::File);
        apply_env_with(&mut config, |key| env.get(key).map(ToString::to_string));

        assert_eq!(config.max_concurrent, 8);
        assert!((config.visibility.threshold - 0.5).abs() < f64::EPSILON);
        // Unparseable values are ignored
        assert_eq!(config.grid_columns, 3);
        assert_eq!(config.source(), ConfigSource::Env);
    }

    #[test]
    fn test_no_env_keeps_source() {
        let mut config = DashboardConfig::default();
        config.set_source(ConfigSource::File);
        apply_env_with(&mut config, |_| None);
        assert_eq!(config.source(), ConfigSource::File);
    }

    #[test]
    fn test_cli_overrides_env() {
        let mut config = DashboardConfig::default();
        config.max_concurrent = 8;
        config.set_source(ConfigSource::Env);

        let overrides = ConfigOverrides::new()
            .with_max_concurrent(2)
            .with_grid_columns(5)
            .with_threshold(0.75);
        overrides.apply(&mut config);

        assert_eq!(config.max_concurrent, 2);
        assert_eq!(config.grid_columns, 5);
        assert!((config.visibility.threshold - 0.75).abs() < f64::EPSILON);
        assert_eq!(config.source(), ConfigSource::Cli);
    }

    #[test]
    fn test_config_overrides_empty_no_change() {
        let mut config = DashboardConfig::default();
        let original_source = config.source();

        ConfigOverrides::new().apply(&mut config);

        assert_eq!(config.source(), original_source);
    }

    #[test]
    fn test_config_source_display() {
        assert_eq!(format!("{}", ConfigSource::Cli), "CLI");
        assert_eq!(format!("{}", ConfigSource::Env), "environment");
        assert_eq!(format!("{}", ConfigSource::File), "config file");
        assert_eq!(format!("{}", ConfigSource::Default), "default");
    }

    #[test]
    fn test_config_error_display() {
        let read_err = ConfigError::ReadError {
            path: PathBuf::from("/test/path"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
        };
        let msg = format!("{read_err}");
        assert!(msg.contains("/test/path"));
        assert!(msg.contains("Failed to read"));

        let validation_err = ConfigError::ValidationError("invalid value".to_string());
        assert!(format!("{validation_err}").contains("invalid value"));
    }
}
