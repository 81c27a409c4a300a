use crate::runtime::StatePaths;
use crate::shared::ids::validate_slug;
use serde_json::{Map, Value};
use std::fs;
use std::path::Path;

/// Coarse progress of one report, derived from the pipeline's own status artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineProgress {
    Loading,
    Error,
    Completed,
    Step(String),
}

impl PipelineProgress {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Loading => "loading",
            Self::Error => "error",
            Self::Completed => "completed",
            Self::Step(step) => step,
        }
    }
}

impl std::fmt::Display for PipelineProgress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Current step name for `slug`: `loading`, `error`, `completed` or the pipeline's
/// `current_job`. Never fails; the pipeline may be rewriting the file while we read it.
/// A slug that is not path-safe reads as `error`.
pub fn current_step(paths: &StatePaths, slug: &str) -> String {
    if validate_slug(slug).is_err() {
        return PipelineProgress::Error.to_string();
    }
    read_progress(&paths.pipeline_status_path(slug)).to_string()
}

pub fn read_progress(status_path: &Path) -> PipelineProgress {
    if !status_path.exists() {
        return PipelineProgress::Loading;
    }
    let Ok(raw) = fs::read_to_string(status_path) else {
        return PipelineProgress::Error;
    };
    let Ok(status) = serde_json::from_str::<Map<String, Value>>(&raw) else {
        return PipelineProgress::Error;
    };
    classify(&status)
}

fn classify(status: &Map<String, Value>) -> PipelineProgress {
    if status.contains_key("error") {
        return PipelineProgress::Error;
    }
    if status.get("status").and_then(Value::as_str) == Some("completed") {
        return PipelineProgress::Completed;
    }
    match status.get("current_job") {
        None => PipelineProgress::Loading,
        Some(job) if !is_truthy(job) => PipelineProgress::Loading,
        Some(Value::String(job)) => PipelineProgress::Step(job.clone()),
        Some(other) => PipelineProgress::Step(other.to_string()),
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0),
        Value::String(text) => !text.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn classify_json(value: Value) -> PipelineProgress {
        classify(value.as_object().expect("object"))
    }

    #[test]
    fn error_key_wins_over_every_other_field() {
        assert_eq!(
            classify_json(json!({"status": "completed", "current_job": "embedding", "error": null})),
            PipelineProgress::Error
        );
    }

    #[test]
    fn falsy_current_job_values_read_as_loading() {
        for job in [json!(null), json!(""), json!(0), json!(false), json!([]), json!({})] {
            assert_eq!(
                classify_json(json!({"status": "running", "current_job": job})),
                PipelineProgress::Loading
            );
        }
    }

    #[test]
    fn truthy_non_string_job_is_rendered_as_json_text() {
        assert_eq!(
            classify_json(json!({"current_job": 3})),
            PipelineProgress::Step("3".to_string())
        );
    }

    #[test]
    fn completed_requires_exact_status_value() {
        assert_eq!(
            classify_json(json!({"status": "Completed"})),
            PipelineProgress::Loading
        );
        assert_eq!(
            classify_json(json!({"status": "completed"})),
            PipelineProgress::Completed
        );
    }
}
