use super::{default_data_dir, ConfigError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Token in `pipeline.args` replaced by the absolute path of the report's config artifact.
pub const CONFIG_PLACEHOLDER: &str = "{config}";

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Settings {
    /// Root for the status registry, configs, inputs, reports and logs.
    /// Defaults to `$HOME/.reportd/data`.
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
    #[serde(default)]
    pub pipeline: PipelineSettings,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PipelineSettings {
    #[serde(default = "default_program")]
    pub program: String,
    #[serde(default = "default_args")]
    pub args: Vec<String>,
    #[serde(default = "default_working_dir")]
    pub working_dir: PathBuf,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            program: default_program(),
            args: default_args(),
            working_dir: default_working_dir(),
        }
    }
}

fn default_program() -> String {
    "python".to_string()
}

fn default_args() -> Vec<String> {
    vec![
        "hierarchical_main.py".to_string(),
        CONFIG_PLACEHOLDER.to_string(),
        "--skip-interaction".to_string(),
        "--without-html".to_string(),
    ]
}

fn default_working_dir() -> PathBuf {
    PathBuf::from("pipeline")
}

impl Settings {
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::ReadSettings {
            path: path.to_path_buf(),
            source,
        })?;
        serde_yaml::from_str(&raw).map_err(|source| ConfigError::ParseSettings {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.pipeline.program.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "`pipeline.program` must be non-empty".to_string(),
            ));
        }
        if !self
            .pipeline
            .args
            .iter()
            .any(|arg| arg.contains(CONFIG_PLACEHOLDER))
        {
            return Err(ConfigError::Invalid(format!(
                "`pipeline.args` must reference the config path via `{CONFIG_PLACEHOLDER}`"
            )));
        }
        if let Some(data_dir) = &self.data_dir {
            if data_dir.as_os_str().is_empty() {
                return Err(ConfigError::Invalid(
                    "`data_dir` must be non-empty when set".to_string(),
                ));
            }
        }
        Ok(())
    }

    pub fn resolve_data_dir(&self) -> Result<PathBuf, ConfigError> {
        match &self.data_dir {
            Some(path) => Ok(path.clone()),
            None => default_data_dir(),
        }
    }
}
