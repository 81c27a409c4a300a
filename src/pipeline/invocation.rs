use crate::config::{PipelineSettings, CONFIG_PLACEHOLDER};
use crate::orchestration::error::{io_error, OrchestratorError};
use std::fs;
use std::path::{Path, PathBuf};

/// Fully resolved command line for one pipeline run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineInvocation {
    pub program: String,
    pub args: Vec<String>,
    pub working_dir: PathBuf,
}

impl PipelineInvocation {
    pub fn command_form(&self) -> String {
        if self.args.is_empty() {
            return self.program.clone();
        }
        format!("{} {}", self.program, self.args.join(" "))
    }
}

/// Substitutes the config path into the configured arguments. The path is made absolute
/// because the pipeline runs from its own working directory.
pub fn build_invocation(
    settings: &PipelineSettings,
    config_path: &Path,
) -> Result<PipelineInvocation, OrchestratorError> {
    let config_path = fs::canonicalize(config_path).map_err(|e| io_error(config_path, e))?;
    let config_arg = config_path.display().to_string();
    let args = settings
        .args
        .iter()
        .map(|arg| arg.replace(CONFIG_PLACEHOLDER, &config_arg))
        .collect();
    Ok(PipelineInvocation {
        program: settings.program.clone(),
        args,
        working_dir: settings.working_dir.clone(),
    })
}
