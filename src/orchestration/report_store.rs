use crate::orchestration::error::{io_error, json_error, OrchestratorError};
use crate::runtime::logging::append_runtime_log;
use crate::runtime::StatePaths;
use crate::shared::fs_atomic::{atomic_write_file, ensure_parent_dir};
use crate::shared::time::now_rfc3339;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportStatus {
    Processing,
    Ready,
    Error,
    Deleted,
    /// Reported by the pipeline's own status artifact; never written by this crate.
    Completed,
}

impl ReportStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Processing => "processing",
            Self::Ready => "ready",
            Self::Error => "error",
            Self::Deleted => "deleted",
            Self::Completed => "completed",
        }
    }
}

impl std::fmt::Display for ReportStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportRecord {
    pub slug: String,
    pub status: ReportStatus,
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub is_pubcom: bool,
    #[serde(default = "default_true")]
    pub is_public: bool,
    pub created_at: String,
}

fn default_true() -> bool {
    true
}

impl ReportRecord {
    pub fn processing(
        slug: impl Into<String>,
        title: impl Into<String>,
        description: impl Into<String>,
        is_pubcom: bool,
    ) -> Self {
        Self {
            slug: slug.into(),
            status: ReportStatus::Processing,
            title: title.into(),
            description: description.into(),
            is_pubcom,
            is_public: true,
            created_at: now_rfc3339(),
        }
    }
}

type Registry = BTreeMap<String, ReportRecord>;

/// Registry of every report, persisted as one JSON object keyed by slug.
///
/// Each operation reloads the backing file, applies its change and rewrites the whole
/// registry while holding a single lock, so out-of-process edits between calls are
/// picked up and in-process writers never interleave. A missing or undecodable file
/// reads as an empty registry. Any other read failure fails mutations instead of
/// letting them overwrite records that could not be read; `list` and `get` degrade to
/// an empty view.
#[derive(Debug)]
pub struct ReportStore {
    paths: StatePaths,
    path: PathBuf,
    registry: Mutex<Registry>,
}

impl ReportStore {
    pub fn open(paths: &StatePaths) -> Self {
        let store = Self {
            paths: paths.clone(),
            path: paths.report_status_path(),
            registry: Mutex::new(Registry::new()),
        };
        if let Ok(loaded) = store.read_backing_file() {
            *store.lock() = loaded;
        }
        store
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn register(&self, record: ReportRecord) -> Result<(), OrchestratorError> {
        let mut registry = self.lock_reloaded()?;
        if registry.contains_key(&record.slug) {
            return Err(OrchestratorError::DuplicateKey { slug: record.slug });
        }
        registry.insert(record.slug.clone(), record);
        self.persist(&registry)
    }

    pub fn set_status(&self, slug: &str, status: ReportStatus) -> Result<(), OrchestratorError> {
        let mut registry = self.lock_reloaded()?;
        let record = registry
            .get_mut(slug)
            .ok_or_else(|| not_found(slug))?;
        record.status = status;
        self.persist(&registry)
    }

    /// Flips `is_public` and returns the new value.
    pub fn toggle_visibility(&self, slug: &str) -> Result<bool, OrchestratorError> {
        let mut registry = self.lock_reloaded()?;
        let record = registry
            .get_mut(slug)
            .ok_or_else(|| not_found(slug))?;
        record.is_public = !record.is_public;
        let is_public = record.is_public;
        self.persist(&registry)?;
        Ok(is_public)
    }

    pub fn list(&self, include_deleted: bool) -> Vec<ReportRecord> {
        self.read_view(|registry| {
            registry
                .values()
                .filter(|record| include_deleted || record.status != ReportStatus::Deleted)
                .cloned()
                .collect()
        })
    }

    pub fn get(&self, slug: &str) -> Option<ReportRecord> {
        self.read_view(|registry| registry.get(slug).cloned())
    }

    /// Rewrites the backing file from the in-memory registry without reloading first.
    /// Refuses to overwrite a backing file that exists but cannot be read.
    pub fn flush(&self) -> Result<(), OrchestratorError> {
        let registry = self.lock();
        self.read_backing_file()?;
        self.persist(&registry)
    }

    pub fn close(self) -> Result<(), OrchestratorError> {
        self.flush()
    }

    fn lock(&self) -> MutexGuard<'_, Registry> {
        self.registry.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_reloaded(&self) -> Result<MutexGuard<'_, Registry>, OrchestratorError> {
        let mut registry = self.lock();
        *registry = self.read_backing_file()?;
        Ok(registry)
    }

    fn read_view<T>(&self, view: impl FnOnce(&Registry) -> T) -> T {
        match self.lock_reloaded() {
            Ok(registry) => view(&registry),
            Err(_) => view(&Registry::new()),
        }
    }

    fn read_backing_file(&self) -> Result<Registry, OrchestratorError> {
        let raw = match fs::read(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Registry::new()),
            Err(err) => {
                append_runtime_log(
                    &self.paths,
                    "error",
                    "report_store.read_failed",
                    &format!("path={} error={err}", self.path.display()),
                );
                return Err(io_error(&self.path, err));
            }
        };
        Ok(match serde_json::from_slice::<Registry>(&raw) {
            Ok(registry) => registry,
            Err(err) => {
                let preserved = self.preserve_corrupt_copy(&raw);
                append_runtime_log(
                    &self.paths,
                    "warn",
                    "report_store.decode_failed",
                    &format!(
                        "path={} error={err} preserved={}; treating registry as empty",
                        self.path.display(),
                        preserved
                            .as_deref()
                            .map(|p| p.display().to_string())
                            .unwrap_or_else(|| "none".to_string())
                    ),
                );
                Registry::new()
            }
        })
    }

    fn preserve_corrupt_copy(&self, raw: &[u8]) -> Option<PathBuf> {
        let mut name = self.path.file_name()?.to_os_string();
        name.push(".corrupt");
        let target = self.path.with_file_name(name);
        atomic_write_file(&target, raw).ok()?;
        Some(target)
    }

    fn persist(&self, registry: &Registry) -> Result<(), OrchestratorError> {
        ensure_parent_dir(&self.path).map_err(|e| io_error(&self.path, e))?;
        let body = serde_json::to_vec_pretty(registry).map_err(|e| json_error(&self.path, e))?;
        atomic_write_file(&self.path, &body).map_err(|e| io_error(&self.path, e))
    }
}

fn not_found(slug: &str) -> OrchestratorError {
    OrchestratorError::NotFound {
        slug: slug.to_string(),
    }
}
