use super::StatePaths;
use crate::shared::time::now_secs;
use std::fs;
use std::io::Write;

pub fn append_runtime_log(paths: &StatePaths, level: &str, event: &str, message: &str) {
    write_log_line(
        paths,
        serde_json::json!({
            "timestamp": now_secs(),
            "level": level,
            "event": event,
            "message": message,
        }),
    );
}

/// Same as [`append_runtime_log`] with the report slug as its own field, so one
/// report's history can be filtered out of the shared log.
pub fn append_report_log(paths: &StatePaths, level: &str, event: &str, slug: &str, message: &str) {
    write_log_line(
        paths,
        serde_json::json!({
            "timestamp": now_secs(),
            "level": level,
            "event": event,
            "slug": slug,
            "message": message,
        }),
    );
}

fn write_log_line(paths: &StatePaths, payload: serde_json::Value) {
    let Ok(line) = serde_json::to_string(&payload) else {
        return;
    };

    let path = paths.runtime_log_path();
    if let Some(parent) = path.parent() {
        if fs::create_dir_all(parent).is_err() {
            return;
        }
    }
    let Ok(mut file) = fs::OpenOptions::new().create(true).append(true).open(path) else {
        return;
    };
    let _ = writeln!(file, "{line}");
}
