use crate::orchestration::error::OrchestratorError;
use crate::runtime::logging::{append_report_log, append_runtime_log};
use crate::runtime::StatePaths;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct SyncError(pub String);

/// Pushes finished report artifacts to durable storage. Every call must be idempotent
/// and safe on partially synced state.
pub trait StorageSync: Send + Sync {
    fn sync_report_files(&self, slug: &str) -> Result<(), SyncError>;
    fn sync_input_file(&self, slug: &str) -> Result<(), SyncError>;
    fn sync_config_file(&self, slug: &str) -> Result<(), SyncError>;
    /// Global: syncs the report registry itself.
    fn sync_status_file(&self) -> Result<(), SyncError>;
}

/// Keeps everything on local disk and records that a sync was requested.
#[derive(Debug, Clone)]
pub struct NoopStorageSync {
    paths: StatePaths,
}

impl NoopStorageSync {
    pub fn new(paths: StatePaths) -> Self {
        Self { paths }
    }

    fn skipped(&self, slug: &str, what: &str) {
        append_report_log(&self.paths, "debug", "sync.skipped", slug, what);
    }
}

impl StorageSync for NoopStorageSync {
    fn sync_report_files(&self, slug: &str) -> Result<(), SyncError> {
        self.skipped(slug, "report files");
        Ok(())
    }

    fn sync_input_file(&self, slug: &str) -> Result<(), SyncError> {
        self.skipped(slug, "input file");
        Ok(())
    }

    fn sync_config_file(&self, slug: &str) -> Result<(), SyncError> {
        self.skipped(slug, "config file");
        Ok(())
    }

    fn sync_status_file(&self) -> Result<(), SyncError> {
        append_runtime_log(&self.paths, "debug", "sync.skipped", "status file");
        Ok(())
    }
}

/// Runs the four sync calls in their fixed order: report files, input file, config file,
/// status file. A failing call is logged and does not stop the later ones; the failures
/// are returned together.
pub fn sync_finished_report(
    sync: &dyn StorageSync,
    paths: &StatePaths,
    slug: &str,
) -> Result<(), OrchestratorError> {
    append_report_log(paths, "info", "sync.started", slug, "syncing report to storage");
    let mut failures = Vec::new();
    let mut record = |what: &str, result: Result<(), SyncError>| {
        if let Err(err) = result {
            append_report_log(paths, "error", "sync.failed", slug, &format!("{what}: {err}"));
            failures.push(format!("{what}: {err}"));
        }
    };
    record("report files", sync.sync_report_files(slug));
    record("input file", sync.sync_input_file(slug));
    record("config file", sync.sync_config_file(slug));
    record("status file", sync.sync_status_file());

    if failures.is_empty() {
        Ok(())
    } else {
        Err(OrchestratorError::Sync(failures.join("; ")))
    }
}
