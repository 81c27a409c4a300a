pub mod logging;
pub mod state_paths;
pub mod supervisor;

pub use logging::{append_report_log, append_runtime_log};
pub use state_paths::{
    bootstrap_state_root, StatePaths, PIPELINE_STATUS_FILE_NAME, REPORT_STATUS_FILE_NAME,
};
pub use supervisor::{launch, supervise, PipelineHandle, SupervisionOutcome, SupervisorContext};

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::tempdir;

    #[test]
    fn bootstrap_creates_required_directories() {
        let dir = tempdir().expect("temp dir");
        let paths = StatePaths::new(dir.path().join("data"));
        bootstrap_state_root(&paths).expect("bootstrap succeeds");

        for required in paths.required_directories() {
            assert!(
                required.is_dir(),
                "missing directory: {}",
                required.display()
            );
        }
    }

    #[test]
    fn per_report_paths_live_in_the_pipeline_workspace() {
        let paths = StatePaths::with_pipeline_root("/srv/reportd", "/opt/pipeline");
        assert_eq!(
            paths.config_path("survey"),
            PathBuf::from("/opt/pipeline/configs/survey.json")
        );
        assert_eq!(
            paths.input_path("survey"),
            PathBuf::from("/opt/pipeline/inputs/survey.csv")
        );
        assert_eq!(
            paths.pipeline_status_path("survey"),
            PathBuf::from("/opt/pipeline/outputs/survey/hierarchical_status.json")
        );
        assert_eq!(
            paths.report_status_path(),
            PathBuf::from("/srv/reportd/report_status.json")
        );
        assert_eq!(
            paths.pipeline_log_path("survey"),
            PathBuf::from("/srv/reportd/logs/pipeline/survey.log")
        );
    }

    #[test]
    fn runtime_log_lines_are_json_objects_with_slug() {
        let dir = tempdir().expect("temp dir");
        let paths = StatePaths::new(dir.path());
        append_runtime_log(&paths, "info", "startup", "hello");
        append_report_log(&paths, "warn", "pipeline.exited", "survey", "code=1");

        let raw = fs::read_to_string(paths.runtime_log_path()).expect("read log");
        let lines = raw
            .lines()
            .map(|line| serde_json::from_str::<serde_json::Value>(line).expect("json line"))
            .collect::<Vec<_>>();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["event"], "startup");
        assert!(lines[0].get("slug").is_none());
        assert_eq!(lines[1]["slug"], "survey");
        assert_eq!(lines[1]["level"], "warn");
    }
}
