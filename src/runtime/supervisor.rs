use super::{append_report_log, StatePaths};
use crate::orchestration::error::{io_error, OrchestratorError};
use crate::orchestration::report_store::{ReportStatus, ReportStore};
use crate::orchestration::sync::{sync_finished_report, StorageSync};
use crate::pipeline::PipelineInvocation;
use crate::shared::fs_atomic::ensure_parent_dir;
use std::fs;
use std::process::{Child, Command, Stdio};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

/// A running pipeline process for one report.
#[derive(Debug)]
pub struct PipelineHandle {
    slug: String,
    command_form: String,
    child: Child,
}

impl PipelineHandle {
    pub fn slug(&self) -> &str {
        &self.slug
    }

    pub fn pid(&self) -> u32 {
        self.child.id()
    }

    pub fn command_form(&self) -> &str {
        &self.command_form
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SupervisionOutcome {
    Ready,
    /// `exit_code` is `None` when the process was killed by a signal or could not be
    /// waited on.
    Failed { exit_code: Option<i32> },
}

/// What a supervising thread needs: its only side effects go through `store` and `sync`.
#[derive(Clone)]
pub struct SupervisorContext {
    pub paths: StatePaths,
    pub store: Arc<ReportStore>,
    pub sync: Arc<dyn StorageSync>,
}

/// Spawns the pipeline without waiting for it. Output goes to `logs/pipeline/<slug>.log`.
pub fn launch(
    paths: &StatePaths,
    slug: &str,
    invocation: &PipelineInvocation,
) -> Result<PipelineHandle, OrchestratorError> {
    let log_path = paths.pipeline_log_path(slug);
    ensure_parent_dir(&log_path).map_err(|e| io_error(&log_path, e))?;
    let stdout = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .map_err(|e| io_error(&log_path, e))?;
    let stderr = stdout.try_clone().map_err(|e| io_error(&log_path, e))?;

    let child = Command::new(&invocation.program)
        .args(&invocation.args)
        .current_dir(&invocation.working_dir)
        .stdin(Stdio::null())
        .stdout(Stdio::from(stdout))
        .stderr(Stdio::from(stderr))
        .spawn()
        .map_err(|source| OrchestratorError::Spawn {
            program: invocation.program.clone(),
            source,
        })?;

    let handle = PipelineHandle {
        slug: slug.to_string(),
        command_form: invocation.command_form(),
        child,
    };
    append_report_log(
        paths,
        "info",
        "pipeline.spawned",
        slug,
        &format!(
            "pid={} cwd={} command={}",
            handle.pid(),
            invocation.working_dir.display(),
            handle.command_form
        ),
    );
    Ok(handle)
}

/// Waits for the pipeline on a dedicated thread and records the outcome:
/// exit 0 marks the report `ready` and syncs it to storage, anything else marks it
/// `error`. Nothing on this thread propagates; failures are logged.
pub fn supervise(
    handle: PipelineHandle,
    context: SupervisorContext,
) -> JoinHandle<SupervisionOutcome> {
    thread::spawn(move || watch_until_exit(handle, &context))
}

fn watch_until_exit(mut handle: PipelineHandle, context: &SupervisorContext) -> SupervisionOutcome {
    let slug = handle.slug.clone();
    let outcome = match handle.child.wait() {
        Ok(status) if status.success() => SupervisionOutcome::Ready,
        Ok(status) => SupervisionOutcome::Failed {
            exit_code: status.code(),
        },
        Err(err) => {
            append_report_log(
                &context.paths,
                "error",
                "pipeline.wait_failed",
                &slug,
                &err.to_string(),
            );
            SupervisionOutcome::Failed { exit_code: None }
        }
    };

    match outcome {
        SupervisionOutcome::Ready => {
            append_report_log(&context.paths, "info", "pipeline.exited", &slug, "code=0");
            if mark_report(context, &slug, ReportStatus::Ready) {
                if let Err(err) = sync_finished_report(context.sync.as_ref(), &context.paths, &slug)
                {
                    append_report_log(
                        &context.paths,
                        "warn",
                        "sync.incomplete",
                        &slug,
                        &err.to_string(),
                    );
                }
            }
        }
        SupervisionOutcome::Failed { exit_code } => {
            append_report_log(
                &context.paths,
                "warn",
                "pipeline.exited",
                &slug,
                &format!(
                    "code={}",
                    exit_code
                        .map(|code| code.to_string())
                        .unwrap_or_else(|| "none".to_string())
                ),
            );
            mark_report(context, &slug, ReportStatus::Error);
        }
    }
    outcome
}

fn mark_report(context: &SupervisorContext, slug: &str, status: ReportStatus) -> bool {
    match context.store.set_status(slug, status) {
        Ok(()) => true,
        Err(err) => {
            append_report_log(
                &context.paths,
                "error",
                "report.status.update_failed",
                slug,
                &format!("target={status} error={err}"),
            );
            false
        }
    }
}
