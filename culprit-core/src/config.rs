//! Configuration for culprit.
//!
//! Uses `figment` for layered configuration: defaults -> user config file ->
//! workspace `.culprit/config.toml` -> explicit file -> environment.
//! Environment variables use the `CULPRIT_` prefix with `__` between
//! sections, e.g. `CULPRIT_REPORT__TOP_FAILED_APIS=20`.

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::aggregate::DEFAULT_MAX_EXAMPLES;
use crate::error::ConfigError;

/// Log levels accepted by `logging.level`.
pub const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CulpritConfig {
    pub aggregate: AggregateConfig,
    pub report: ReportConfig,
    pub logging: LoggingConfig,
    pub dashboard: DashboardConfig,
}

/// Cross-build aggregation settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AggregateConfig {
    /// Example failures kept per category.
    pub max_examples_per_category: usize,
}

impl Default for AggregateConfig {
    fn default() -> Self {
        Self {
            max_examples_per_category: DEFAULT_MAX_EXAMPLES,
        }
    }
}

/// Report rendering settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    pub top_failed_apis: usize,
    pub top_common_errors: usize,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            top_failed_apis: 10,
            top_common_errors: 10,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter level when no `-v`/`-q` flag is given.
    pub level: String,
    /// Directory for daily-rolling JSON log files. Disabled when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub json_dir: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_dir: None,
        }
    }
}

/// View-level dashboard settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub enabled: bool,
    pub show_failure_analysis: bool,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            show_failure_analysis: true,
        }
    }
}

impl CulpritConfig {
    /// Reject values that deserialize fine but make no sense.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let level = self.logging.level.to_ascii_lowercase();
        if !LOG_LEVELS.contains(&level.as_str()) {
            return Err(ConfigError::Invalid {
                key: "logging.level".to_string(),
                message: format!(
                    "'{}' is not one of {}",
                    self.logging.level,
                    LOG_LEVELS.join(", ")
                ),
            });
        }
        Ok(())
    }
}

/// Path of the user-level configuration file, if a home directory exists.
pub fn user_config_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("dev", "culprit", "culprit")
        .map(|dirs| dirs.config_dir().join("config.toml"))
}

/// Path of the workspace-level configuration file.
pub fn workspace_config_path(workspace: &Path) -> PathBuf {
    workspace.join(".culprit").join("config.toml")
}

/// Load configuration from all layers.
pub fn load_config(
    workspace: Option<&Path>,
    explicit: Option<&Path>,
) -> Result<CulpritConfig, ConfigError> {
    let mut figment = Figment::from(Serialized::defaults(CulpritConfig::default()));

    if let Some(user_config) = user_config_path()
        && user_config.exists()
    {
        figment = figment.merge(Toml::file(&user_config));
    }

    if let Some(ws) = workspace {
        let ws_config = workspace_config_path(ws);
        if ws_config.exists() {
            figment = figment.merge(Toml::file(&ws_config));
        }
    }

    if let Some(path) = explicit {
        if !path.exists() {
            return Err(ConfigError::MissingFile(path.to_path_buf()));
        }
        figment = figment.merge(Toml::file(path));
    }

    figment = figment.merge(Env::prefixed("CULPRIT_").split("__"));

    let config: CulpritConfig = figment.extract().map_err(Box::new)?;
    config.validate()?;
    Ok(config)
}
