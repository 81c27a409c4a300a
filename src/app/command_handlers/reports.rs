use crate::app::command_support::{
    load_settings, map_orchestrator_err, open_orchestrator, require_slug,
};
use crate::orchestration::{
    LaunchOutcome, ReportOrchestrator, ReportRecord, ReportRequest, ReportStatus,
};
use crate::runtime::SupervisionOutcome;
use std::fs;
use std::path::Path;

fn orchestrator() -> Result<ReportOrchestrator, String> {
    let settings = load_settings()?;
    open_orchestrator(&settings)
}

fn record_lines(record: &ReportRecord) -> Vec<String> {
    let slug = &record.slug;
    vec![
        format!("report:{slug}={}", record.status),
        format!("report:{slug}.title={}", record.title),
        format!("report:{slug}.public={}", record.is_public),
        format!("report:{slug}.pubcom={}", record.is_pubcom),
        format!("report:{slug}.created_at={}", record.created_at),
    ]
}

pub fn cmd_list(args: &[String]) -> Result<String, String> {
    let include_deleted = match args {
        [] => false,
        [flag] if flag == "--all" => true,
        _ => return Err("usage: list [--all]".to_string()),
    };
    let orchestrator = orchestrator()?;
    Ok(render_list(&orchestrator.list_jobs(include_deleted)))
}

pub(crate) fn render_list(records: &[ReportRecord]) -> String {
    let mut lines = vec![format!("reports_total={}", records.len())];
    for record in records {
        lines.extend(record_lines(record));
    }
    lines.join("\n")
}

pub(crate) fn read_request(path: &Path) -> Result<ReportRequest, String> {
    let raw =
        fs::read_to_string(path).map_err(|e| format!("failed to read {}: {e}", path.display()))?;
    serde_json::from_str(&raw).map_err(|e| format!("invalid request in {}: {e}", path.display()))
}

pub fn cmd_create(args: &[String]) -> Result<String, String> {
    let [path] = args else {
        return Err("usage: create <request.json>".to_string());
    };
    let request = read_request(Path::new(path))?;
    let orchestrator = orchestrator()?;
    create_with(&orchestrator, &request)
}

/// Creates the report and, on the fresh path, waits for the pipeline so the final status
/// is recorded before the process exits.
pub(crate) fn create_with(
    orchestrator: &ReportOrchestrator,
    request: &ReportRequest,
) -> Result<String, String> {
    let slug = request.slug();
    let mut lines = vec![format!("slug={slug}")];
    match orchestrator
        .create_job(request)
        .map_err(map_orchestrator_err)?
    {
        LaunchOutcome::Supervising(handle) => {
            lines.push("mode=fresh".to_string());
            let outcome = handle
                .join()
                .map_err(|_| format!("supervisor for `{slug}` panicked"))?;
            if let SupervisionOutcome::Failed { exit_code } = outcome {
                lines.push(format!(
                    "exit_code={}",
                    exit_code.map_or_else(|| "none".to_string(), |code| code.to_string())
                ));
            }
        }
        LaunchOutcome::Reused(report) => {
            lines.push("mode=reuse".to_string());
            lines.push(format!("artifacts_copied={}", report.copied.len()));
            lines.push(format!("artifacts_skipped={}", report.skipped.len()));
            lines.push(format!("status_patched={}", report.status_patched));
        }
    }
    let status = orchestrator
        .store()
        .get(slug)
        .map(|record| record.status)
        .unwrap_or(ReportStatus::Error);
    lines.push(format!("status={status}"));
    Ok(lines.join("\n"))
}

pub fn cmd_delete(args: &[String]) -> Result<String, String> {
    let slug = require_slug(args, "delete <slug>")?;
    orchestrator()?
        .delete_job(slug)
        .map_err(map_orchestrator_err)?;
    Ok(format!("slug={slug}\nstatus={}", ReportStatus::Deleted))
}

pub fn cmd_visibility(args: &[String]) -> Result<String, String> {
    let slug = require_slug(args, "visibility <slug>")?;
    let is_public = orchestrator()?
        .toggle_visibility(slug)
        .map_err(map_orchestrator_err)?;
    Ok(format!("slug={slug}\npublic={is_public}"))
}

pub fn cmd_step(args: &[String]) -> Result<String, String> {
    let slug = require_slug(args, "step <slug>")?;
    let step = orchestrator()?.current_step(slug);
    Ok(format!("slug={slug}\ncurrent_step={step}"))
}

pub fn cmd_duplicate(args: &[String]) -> Result<String, String> {
    let slug = require_slug(args, "duplicate <slug>")?;
    let duplicated = orchestrator()?
        .duplicate_job(slug)
        .map_err(map_orchestrator_err)?;
    Ok([
        format!("source={slug}"),
        format!("slug={}", duplicated.slug),
        format!("title={}", duplicated.title),
        format!("description={}", duplicated.description),
        format!("status={}", ReportStatus::Ready),
    ]
    .join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_renders_one_block_per_record() {
        let records = vec![ReportRecord::processing("survey", "Title", "Intro", false)];
        let rendered = render_list(&records);
        assert!(rendered.starts_with("reports_total=1\nreport:survey=processing\n"));
        assert!(rendered.contains("report:survey.public=true"));
    }
}
