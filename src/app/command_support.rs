use crate::config::{default_global_config_path, load_settings_or_default, ConfigError, Settings};
use crate::orchestration::{NoopStorageSync, OrchestratorError, ReportOrchestrator};
use crate::runtime::StatePaths;
use std::sync::Arc;

pub fn map_config_err(err: ConfigError) -> String {
    err.to_string()
}

pub fn map_orchestrator_err(err: OrchestratorError) -> String {
    if err.is_client_error() {
        err.to_string()
    } else {
        format!("internal error: {err}")
    }
}

pub fn load_settings() -> Result<Settings, String> {
    let path = default_global_config_path().map_err(map_config_err)?;
    load_settings_or_default(&path).map_err(map_config_err)
}

/// Opens the orchestrator over the configured data directory. The CLI has no remote
/// storage, so finished reports are synced through the no-op collaborator.
pub fn open_orchestrator(settings: &Settings) -> Result<ReportOrchestrator, String> {
    let paths = StatePaths::from_settings(settings).map_err(map_config_err)?;
    let sync = Arc::new(NoopStorageSync::new(paths));
    ReportOrchestrator::open(settings, sync).map_err(map_orchestrator_err)
}

pub fn require_slug<'a>(args: &'a [String], usage: &str) -> Result<&'a str, String> {
    match args {
        [slug] => Ok(slug.as_str()),
        _ => Err(format!("usage: {usage}")),
    }
}
