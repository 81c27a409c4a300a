use crate::config::{PipelineSettings, Settings};
use crate::orchestration::artifacts::{copy_artifacts, copy_source_input, CopyReport};
use crate::orchestration::error::OrchestratorError;
use crate::orchestration::materialize::{
    load_config, materialize_config, materialize_input, retarget_config, write_config,
};
use crate::orchestration::progress::current_step;
use crate::orchestration::report_store::{ReportRecord, ReportStatus, ReportStore};
use crate::orchestration::request::{LaunchMode, ReportRequest};
use crate::orchestration::sync::{sync_finished_report, StorageSync};
use crate::pipeline::{build_invocation, check_step_contract, StepArtifactSet, StepContractDrift};
use crate::runtime::{
    append_report_log, append_runtime_log, bootstrap_state_root, launch, supervise, StatePaths,
    SupervisionOutcome, SupervisorContext,
};
use crate::shared::ids::ReportSlug;
use serde::Serialize;
use std::sync::Arc;
use std::thread::JoinHandle;

const COPY_TITLE_SUFFIX: &str = " (コピー)";

/// How a created report is being produced.
#[derive(Debug)]
pub enum LaunchOutcome {
    /// A pipeline process is running; the handle resolves when it exits and its
    /// outcome has been recorded. Dropping it detaches the supervisor.
    Supervising(JoinHandle<SupervisionOutcome>),
    /// Outputs of an earlier report were copied and the report is already `ready`.
    Reused(CopyReport),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DuplicatedReport {
    pub slug: String,
    pub title: String,
    pub description: String,
}

/// Entry point for the control layer: creates, duplicates, deletes and inspects reports.
pub struct ReportOrchestrator {
    paths: StatePaths,
    pipeline: PipelineSettings,
    step_outputs: StepArtifactSet,
    store: Arc<ReportStore>,
    sync: Arc<dyn StorageSync>,
}

impl ReportOrchestrator {
    pub fn open(settings: &Settings, sync: Arc<dyn StorageSync>) -> Result<Self, OrchestratorError> {
        let paths = StatePaths::from_settings(settings)?;
        Self::with_parts(
            paths,
            settings.pipeline.clone(),
            StepArtifactSet::declared(),
            sync,
        )
    }

    pub fn with_parts(
        paths: StatePaths,
        pipeline: PipelineSettings,
        step_outputs: StepArtifactSet,
        sync: Arc<dyn StorageSync>,
    ) -> Result<Self, OrchestratorError> {
        bootstrap_state_root(&paths)?;
        let store = Arc::new(ReportStore::open(&paths));
        let orchestrator = Self {
            paths,
            pipeline,
            step_outputs,
            store,
            sync,
        };
        orchestrator.log_step_contract_drift();
        Ok(orchestrator)
    }

    pub fn paths(&self) -> &StatePaths {
        &self.paths
    }

    pub fn store(&self) -> &Arc<ReportStore> {
        &self.store
    }

    pub fn list_jobs(&self, include_deleted: bool) -> Vec<ReportRecord> {
        self.store.list(include_deleted)
    }

    /// Registers the report and starts producing it. Returns as soon as the pipeline is
    /// spawned, or once reused outputs are in place.
    pub fn create_job(&self, request: &ReportRequest) -> Result<LaunchOutcome, OrchestratorError> {
        match request.launch_mode() {
            LaunchMode::Fresh => self.launch_fresh(request).map(LaunchOutcome::Supervising),
            LaunchMode::ReuseFrom(_) => self.launch_duplicate(request).map(LaunchOutcome::Reused),
        }
    }

    pub fn launch_fresh(
        &self,
        request: &ReportRequest,
    ) -> Result<JoinHandle<SupervisionOutcome>, OrchestratorError> {
        let slug = request.slug();
        self.register(request)?;
        self.start_pipeline(request)
            .inspect_err(|err| self.mark_launch_failed(slug, err))
    }

    /// Produces the report from a previous report's outputs without running the
    /// pipeline. Falls back to a fresh input file when the source has none.
    pub fn launch_duplicate(&self, request: &ReportRequest) -> Result<CopyReport, OrchestratorError> {
        let slug = request.slug();
        let source = match request.launch_mode() {
            LaunchMode::ReuseFrom(source) => source.as_str(),
            LaunchMode::Fresh => {
                return Err(OrchestratorError::Config(format!(
                    "report `{slug}` does not request reuse of intermediate results"
                )))
            }
        };
        self.register(request)?;
        let report = self
            .reuse_outputs(request, source)
            .inspect_err(|err| self.mark_launch_failed(slug, err))?;

        self.store.set_status(slug, ReportStatus::Ready)?;
        sync_finished_report(self.sync.as_ref(), &self.paths, slug)?;
        Ok(report)
    }

    /// Soft delete: the record stays in the registry with status `deleted`.
    pub fn delete_job(&self, slug: &str) -> Result<(), OrchestratorError> {
        let parsed = parse_slug(slug)?;
        let slug = parsed.as_str();
        self.store.set_status(slug, ReportStatus::Deleted)?;
        append_report_log(&self.paths, "info", "report.deleted", slug, "marked as deleted");
        Ok(())
    }

    pub fn toggle_visibility(&self, slug: &str) -> Result<bool, OrchestratorError> {
        self.store.toggle_visibility(parse_slug(slug)?.as_str())
    }

    pub fn current_step(&self, slug: &str) -> String {
        current_step(&self.paths, slug)
    }

    /// Copies the config of `slug` under a fresh `<slug>_copy_<hex>` slug and registers
    /// the copy as `ready`. Step outputs are not copied.
    pub fn duplicate_job(&self, slug: &str) -> Result<DuplicatedReport, OrchestratorError> {
        let parsed = parse_slug(slug)?;
        let slug = parsed.as_str();
        let mut config = load_config(&self.paths, slug)?;
        let source = self
            .store
            .get(slug)
            .ok_or_else(|| OrchestratorError::NotFound {
                slug: slug.to_string(),
            })?;

        let new_slug = ReportSlug::copy_of(slug).map_err(OrchestratorError::InvalidSlug)?;
        retarget_config(&mut config, new_slug.as_str());
        write_config(&self.paths, new_slug.as_str(), &config)?;

        let duplicated = DuplicatedReport {
            slug: new_slug.to_string(),
            title: format!("{}{COPY_TITLE_SUFFIX}", source.title),
            description: source.description.clone(),
        };
        self.store.register(ReportRecord::processing(
            duplicated.slug.clone(),
            duplicated.title.clone(),
            duplicated.description.clone(),
            source.is_pubcom,
        ))?;
        self.store.set_status(&duplicated.slug, ReportStatus::Ready)?;
        append_report_log(
            &self.paths,
            "info",
            "report.duplicated",
            &duplicated.slug,
            &format!("source={slug}"),
        );
        Ok(duplicated)
    }

    /// Compares the declared step outputs with the pipeline's manifest, if it ships one.
    pub fn step_contract_drift(&self) -> Result<Option<Vec<StepContractDrift>>, OrchestratorError> {
        check_step_contract(&self.step_outputs, &self.pipeline.working_dir)
    }

    pub fn close(self) -> Result<(), OrchestratorError> {
        self.store.flush()
    }

    fn register(&self, request: &ReportRequest) -> Result<(), OrchestratorError> {
        self.store.register(ReportRecord::processing(
            request.slug(),
            request.question.clone(),
            request.intro.clone(),
            request.is_pubcom,
        ))?;
        append_report_log(
            &self.paths,
            "info",
            "report.registered",
            request.slug(),
            &format!("comments={}", request.comments.len()),
        );
        Ok(())
    }

    fn start_pipeline(
        &self,
        request: &ReportRequest,
    ) -> Result<JoinHandle<SupervisionOutcome>, OrchestratorError> {
        let config_path = materialize_config(&self.paths, request)?;
        materialize_input(&self.paths, request)?;
        let invocation = build_invocation(&self.pipeline, &config_path)?;
        let handle = launch(&self.paths, request.slug(), &invocation)?;
        Ok(supervise(
            handle,
            SupervisorContext {
                paths: self.paths.clone(),
                store: Arc::clone(&self.store),
                sync: Arc::clone(&self.sync),
            },
        ))
    }

    fn reuse_outputs(
        &self,
        request: &ReportRequest,
        source: &str,
    ) -> Result<CopyReport, OrchestratorError> {
        let slug = request.slug();
        materialize_config(&self.paths, request)?;
        if copy_source_input(&self.paths, source, slug)? {
            append_report_log(
                &self.paths,
                "info",
                "input.copied",
                slug,
                &format!("source={source}"),
            );
        } else {
            materialize_input(&self.paths, request)?;
            append_report_log(
                &self.paths,
                "warn",
                "input.regenerated",
                slug,
                &format!("source input for `{source}` not found; wrote input from request"),
            );
        }

        let report = copy_artifacts(&self.paths, &self.step_outputs, source, slug)?;
        if report.copied.is_empty() && !report.status_patched {
            append_report_log(
                &self.paths,
                "warn",
                "artifacts.none_reused",
                slug,
                &format!("source `{source}` had no step outputs to reuse"),
            );
        }
        Ok(report)
    }

    fn mark_launch_failed(&self, slug: &str, err: &OrchestratorError) {
        append_report_log(&self.paths, "error", "report.launch_failed", slug, &err.to_string());
        if let Err(status_err) = self.store.set_status(slug, ReportStatus::Error) {
            append_report_log(
                &self.paths,
                "error",
                "report.status.update_failed",
                slug,
                &format!("target=error error={status_err}"),
            );
        }
    }

    fn log_step_contract_drift(&self) {
        match self.step_contract_drift() {
            Ok(None) => append_runtime_log(
                &self.paths,
                "info",
                "pipeline.contract.unchecked",
                &format!(
                    "no step output manifest under {}",
                    self.pipeline.working_dir.display()
                ),
            ),
            Ok(Some(drift)) if drift.is_empty() => append_runtime_log(
                &self.paths,
                "info",
                "pipeline.contract.ok",
                &format!("step outputs version {}", self.step_outputs.version()),
            ),
            Ok(Some(drift)) => {
                for entry in drift {
                    append_runtime_log(
                        &self.paths,
                        "warn",
                        "pipeline.contract.drift",
                        &entry.to_string(),
                    );
                }
            }
            Err(err) => append_runtime_log(
                &self.paths,
                "warn",
                "pipeline.contract.unreadable",
                &err.to_string(),
            ),
        }
    }
}

fn parse_slug(slug: &str) -> Result<ReportSlug, OrchestratorError> {
    ReportSlug::parse(slug).map_err(OrchestratorError::InvalidSlug)
}
