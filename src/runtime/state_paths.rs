use crate::config::{ConfigError, Settings};
use crate::orchestration::error::{io_error, OrchestratorError};
use std::fs;
use std::path::PathBuf;

pub const REPORT_STATUS_FILE_NAME: &str = "report_status.json";
pub const PIPELINE_STATUS_FILE_NAME: &str = "hierarchical_status.json";

/// On-disk layout. The data root holds the registry and logs; the pipeline workspace is
/// the pipeline's working directory, where it reads `inputs/<slug>.csv` and writes
/// `outputs/<slug>/`. Every per-report artifact is namespaced by slug.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatePaths {
    pub root: PathBuf,
    pub pipeline_root: PathBuf,
}

impl StatePaths {
    /// Data root that doubles as the pipeline workspace.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self {
            pipeline_root: root.clone(),
            root,
        }
    }

    pub fn with_pipeline_root(root: impl Into<PathBuf>, pipeline_root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            pipeline_root: pipeline_root.into(),
        }
    }

    pub fn from_settings(settings: &Settings) -> Result<Self, ConfigError> {
        Ok(Self::with_pipeline_root(
            settings.resolve_data_dir()?,
            settings.pipeline.working_dir.clone(),
        ))
    }

    /// Directories owned by the data root. Workspace directories are created on demand,
    /// since the pipeline checkout may not exist yet.
    pub fn required_directories(&self) -> Vec<PathBuf> {
        vec![self.root.join("logs"), self.pipeline_log_dir()]
    }

    pub fn report_status_path(&self) -> PathBuf {
        self.root.join(REPORT_STATUS_FILE_NAME)
    }

    pub fn config_dir(&self) -> PathBuf {
        self.pipeline_root.join("configs")
    }

    pub fn config_path(&self, slug: &str) -> PathBuf {
        self.config_dir().join(format!("{slug}.json"))
    }

    pub fn input_dir(&self) -> PathBuf {
        self.pipeline_root.join("inputs")
    }

    pub fn input_path(&self, slug: &str) -> PathBuf {
        self.input_dir().join(format!("{slug}.csv"))
    }

    pub fn outputs_dir(&self) -> PathBuf {
        self.pipeline_root.join("outputs")
    }

    pub fn report_dir(&self, slug: &str) -> PathBuf {
        self.outputs_dir().join(slug)
    }

    /// Progress document written by the pipeline process itself.
    pub fn pipeline_status_path(&self, slug: &str) -> PathBuf {
        self.report_dir(slug).join(PIPELINE_STATUS_FILE_NAME)
    }

    pub fn runtime_log_path(&self) -> PathBuf {
        self.root.join("logs/runtime.log")
    }

    pub fn pipeline_log_dir(&self) -> PathBuf {
        self.root.join("logs/pipeline")
    }

    pub fn pipeline_log_path(&self, slug: &str) -> PathBuf {
        self.pipeline_log_dir().join(format!("{slug}.log"))
    }
}

pub fn bootstrap_state_root(paths: &StatePaths) -> Result<(), OrchestratorError> {
    for path in paths.required_directories() {
        fs::create_dir_all(&path).map_err(|source| io_error(&path, source))?;
    }
    Ok(())
}
