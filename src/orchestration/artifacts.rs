use crate::orchestration::error::{io_error, json_error, OrchestratorError};
use crate::orchestration::materialize::write_json;
use crate::pipeline::StepArtifactSet;
use crate::runtime::logging::append_report_log;
use crate::runtime::StatePaths;
use crate::shared::fs_atomic::{copy_file_durable, ensure_parent_dir};
use serde_json::{Map, Value};
use std::fs;

/// Value forced into a copied status artifact; reused outputs are already-finished work.
pub const REUSED_STATUS: &str = "completed";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CopyReport {
    pub copied: Vec<String>,
    pub skipped: Vec<String>,
    pub status_patched: bool,
}

/// Copies every declared step output that exists under `outputs/<source>` into
/// `outputs/<target>`, then rewrites the identity of the copied status artifact.
///
/// Missing files are skipped. The first I/O failure aborts the copy and leaves whatever
/// was already copied in place.
pub fn copy_artifacts(
    paths: &StatePaths,
    step_outputs: &StepArtifactSet,
    source: &str,
    target: &str,
) -> Result<CopyReport, OrchestratorError> {
    let source_dir = paths.report_dir(source);
    let target_dir = paths.report_dir(target);
    fs::create_dir_all(&target_dir).map_err(|e| io_error(&target_dir, e))?;

    let mut report = CopyReport::default();
    for (step, files) in step_outputs.steps() {
        for file in files {
            let source_file = source_dir.join(file);
            if !source_file.exists() {
                report.skipped.push(file.clone());
                continue;
            }
            let target_file = target_dir.join(file);
            copy_file_durable(&source_file, &target_file)
                .map_err(|e| io_error(&target_file, e))?;
            append_report_log(
                paths,
                "info",
                "artifacts.copy",
                target,
                &format!(
                    "step={step} from={} to={}",
                    source_file.display(),
                    target_file.display()
                ),
            );
            report.copied.push(file.clone());
        }
    }

    let source_status = paths.pipeline_status_path(source);
    if source_status.exists() {
        let raw = fs::read_to_string(&source_status).map_err(|e| io_error(&source_status, e))?;
        let mut status: Map<String, Value> =
            serde_json::from_str(&raw).map_err(|e| json_error(&source_status, e))?;
        patch_status_identity(&mut status, target);
        write_json(&paths.pipeline_status_path(target), &Value::Object(status))?;
        report.status_patched = true;
    }

    append_report_log(
        paths,
        "info",
        "artifacts.copied",
        target,
        &format!(
            "source={source} copied={} skipped={} status_patched={}",
            report.copied.len(),
            report.skipped.len(),
            report.status_patched
        ),
    );
    Ok(report)
}

/// Points a copied status artifact at `target` and marks it finished.
/// All other fields, including `completed_jobs`, are kept as-is.
pub fn patch_status_identity(status: &mut Map<String, Value>, target: &str) {
    for key in ["name", "input", "output_dir"] {
        status.insert(key.to_string(), Value::String(target.to_string()));
    }
    status.insert(
        "status".to_string(),
        Value::String(REUSED_STATUS.to_string()),
    );
}

/// Copies `inputs/<source>.csv` to `inputs/<target>.csv`. Returns `false` when the
/// source input does not exist.
pub fn copy_source_input(
    paths: &StatePaths,
    source: &str,
    target: &str,
) -> Result<bool, OrchestratorError> {
    let source_input = paths.input_path(source);
    if !source_input.exists() {
        return Ok(false);
    }
    let target_input = paths.input_path(target);
    ensure_parent_dir(&target_input).map_err(|e| io_error(&target_input, e))?;
    copy_file_durable(&source_input, &target_input).map_err(|e| io_error(&target_input, e))?;
    Ok(true)
}
