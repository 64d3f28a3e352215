//! Configuration management for the validator
//!
//! Supports loading configuration from:
//! - Default values
//! - Config file (uispec.toml)
//! - Environment variables (UISPEC__*)
//!
//! ## Example config file (uispec.toml):
//! ```toml
//! [pipeline]
//! development = false
//! stop_at_first_error = false
//! include_suggestions = true
//! documentation_base_url = "https://docs.example.com/validation/"
//! max_depth = 64
//! nesting_warning_depth = 10
//!
//! [output]
//! format = "pretty"
//! report = false
//! ```

use config_crate::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::validation::PipelineOptions;

/// Main configuration for the validator
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidatorConfig {
    /// Options handed to every validation run
    #[serde(default)]
    pub pipeline: PipelineOptions,

    /// How the CLI prints results
    #[serde(default)]
    pub output: OutputConfig,
}

/// Output configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// JSON layout for `--json` output
    #[serde(default)]
    pub format: OutputFormat,

    /// Print the grouped report instead of the terse listing
    #[serde(default)]
    pub report: bool,

    /// Print warnings for documents that pass
    #[serde(default = "default_true")]
    pub show_warnings: bool,
}

/// Output format for JSON
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Pretty,
    Compact,
}

fn default_true() -> bool {
    true
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::Pretty,
            report: false,
            show_warnings: true,
        }
    }
}

impl ValidatorConfig {
    /// Load configuration from default locations
    pub fn load() -> std::result::Result<Self, ConfigError> {
        Self::load_from(None)
    }

    /// Load configuration, with an explicit file layered over the defaults
    pub fn load_from(config_path: Option<&Path>) -> std::result::Result<Self, ConfigError> {
        let mut builder = Config::builder();

        let config_locations = ["uispec.toml", ".uispec.toml", "config/uispec.toml"];

        for location in config_locations {
            builder = builder.add_source(File::with_name(location).required(false));
        }

        if let Some(xdg_config) = Self::user_config_path() {
            if xdg_config.exists() {
                builder = builder.add_source(File::from(xdg_config).required(false));
            }
        }

        if let Some(path) = config_path {
            builder = builder.add_source(File::from(path.to_path_buf()).required(true));
        }

        // UISPEC__PIPELINE__MAX_DEPTH=32 and friends
        builder = builder.add_source(
            Environment::with_prefix("UISPEC")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        config.try_deserialize()
    }

    /// Per-user config file under the XDG config directory
    pub fn user_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("dev", "uispec", "validator")
            .map(|dirs| dirs.config_dir().join("uispec.toml"))
    }

    /// Save configuration to a file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Reject option combinations the pipeline cannot honor
    pub fn validate(&self) -> Result<()> {
        let pipeline = &self.pipeline;
        if pipeline.max_depth == 0 {
            return Err(Error::InvalidConfig(
                "pipeline.max_depth must be at least 1".to_string(),
            ));
        }
        if pipeline.nesting_warning_depth >= pipeline.max_depth {
            return Err(Error::InvalidConfig(format!(
                "pipeline.nesting_warning_depth ({}) must be below pipeline.max_depth ({})",
                pipeline.nesting_warning_depth, pipeline.max_depth
            )));
        }
        if let Some(url) = &pipeline.documentation_base_url {
            if url.trim().is_empty() {
                return Err(Error::InvalidConfig(
                    "pipeline.documentation_base_url must not be empty".to_string(),
                ));
            }
        }
        Ok(())
    }

    pub fn pipeline_options(&self) -> PipelineOptions {
        self.pipeline.clone()
    }
}

impl From<ValidatorConfig> for PipelineOptions {
    fn from(config: ValidatorConfig) -> Self {
        config.pipeline
    }
}
