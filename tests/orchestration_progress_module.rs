use reportd::orchestration::progress::{current_step, read_progress, PipelineProgress};
use reportd::runtime::StatePaths;
use std::fs;
use tempfile::tempdir;

fn step_for(status_body: Option<&str>) -> String {
    let dir = tempdir().expect("tempdir");
    let paths = StatePaths::new(dir.path());
    if let Some(body) = status_body {
        fs::create_dir_all(paths.report_dir("survey")).expect("report dir");
        fs::write(paths.pipeline_status_path("survey"), body).expect("status");
    }
    current_step(&paths, "survey")
}

#[test]
fn progress_module_missing_status_is_loading() {
    assert_eq!(step_for(None), "loading");
}

#[test]
fn progress_module_error_key_wins_over_everything() {
    assert_eq!(
        step_for(Some(
            r#"{"error":"boom","status":"completed","current_job":"embedding"}"#
        )),
        "error"
    );
    assert_eq!(step_for(Some(r#"{"error":null}"#)), "error");
}

#[test]
fn progress_module_completed_status_is_completed() {
    assert_eq!(
        step_for(Some(r#"{"status":"completed","current_job":"embedding"}"#)),
        "completed"
    );
}

#[test]
fn progress_module_reports_current_job_or_loading() {
    assert_eq!(
        step_for(Some(r#"{"status":"running","current_job":"extraction"}"#)),
        "extraction"
    );
    assert_eq!(step_for(Some(r#"{"status":"running"}"#)), "loading");
    assert_eq!(step_for(Some(r#"{"current_job":""}"#)), "loading");
    assert_eq!(step_for(Some(r#"{"current_job":null}"#)), "loading");
    assert_eq!(step_for(Some(r#"{"current_job":0}"#)), "loading");
    assert_eq!(step_for(Some(r#"{"current_job":3}"#)), "3");
}

#[test]
fn progress_module_unreadable_status_is_error() {
    assert_eq!(step_for(Some(r#"{"status":"runn"#)), "error");
    assert_eq!(step_for(Some("")), "error");
    assert_eq!(step_for(Some("[1, 2]")), "error");
}

#[test]
fn progress_module_read_progress_classifies_paths_directly() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("status.json");
    assert_eq!(read_progress(&path), PipelineProgress::Loading);

    fs::write(&path, r#"{"current_job":"hierarchical_overview"}"#).expect("status");
    let progress = read_progress(&path);
    assert_eq!(
        progress,
        PipelineProgress::Step("hierarchical_overview".to_string())
    );
    assert_eq!(progress.to_string(), "hierarchical_overview");
}
