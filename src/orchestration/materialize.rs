use crate::orchestration::error::{io_error, json_error, OrchestratorError};
use crate::orchestration::request::{CommentRow, ReportRequest};
use crate::runtime::StatePaths;
use crate::shared::fs_atomic::{atomic_write_file, ensure_parent_dir};
use serde_json::{json, Value};
use std::borrow::Cow;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

const LABELLING_SAMPLING_NUM: u32 = 30;
const INPUT_CSV_HEADER: [&str; 4] = ["comment-id", "comment-body", "source", "url"];

pub fn build_config(request: &ReportRequest) -> Value {
    let mut config = json!({
        "name": request.slug(),
        "input": request.slug(),
        "question": request.question,
        "intro": request.intro,
        "model": request.model,
        "is_pubcom": request.is_pubcom,
        "extraction": {
            "prompt": request.prompt.extraction,
            "workers": request.workers,
            "limit": request.comments.len(),
        },
        "hierarchical_clustering": {
            "cluster_nums": request.cluster,
        },
        "hierarchical_initial_labelling": {
            "prompt": request.prompt.initial_labelling,
            "sampling_num": LABELLING_SAMPLING_NUM,
            "workers": request.workers,
        },
        "hierarchical_merge_labelling": {
            "prompt": request.prompt.merge_labelling,
            "sampling_num": LABELLING_SAMPLING_NUM,
            "workers": request.workers,
        },
        "hierarchical_overview": {
            "prompt": request.prompt.overview,
        },
        "hierarchical_aggregation": {
            "sampling_num": request.workers,
        },
    });

    if let (Some(options), Value::Object(map)) = (&request.duplication_options, &mut config) {
        map.insert(
            "source_slug".to_string(),
            Value::String(options.source_slug.to_string()),
        );
        map.insert(
            "reuse_intermediate_results".to_string(),
            Value::Bool(options.reuse_intermediate_results),
        );
    }
    config
}

/// Writes `configs/<slug>.json`, replacing any previous config for the slug.
pub fn materialize_config(
    paths: &StatePaths,
    request: &ReportRequest,
) -> Result<PathBuf, OrchestratorError> {
    write_config(paths, request.slug(), &build_config(request))
}

/// Writes `inputs/<slug>.csv` with one row per comment, in request order.
pub fn materialize_input(
    paths: &StatePaths,
    request: &ReportRequest,
) -> Result<PathBuf, OrchestratorError> {
    let path = paths.input_path(request.slug());
    ensure_parent_dir(&path).map_err(|e| io_error(&path, e))?;
    atomic_write_file(&path, encode_input_csv(&request.comments).as_bytes())
        .map_err(|e| io_error(&path, e))?;
    Ok(path)
}

pub fn load_config(paths: &StatePaths, slug: &str) -> Result<Value, OrchestratorError> {
    let path = paths.config_path(slug);
    let raw = match fs::read_to_string(&path) {
        Ok(raw) => raw,
        Err(err) if err.kind() == ErrorKind::NotFound => {
            return Err(OrchestratorError::NotFound {
                slug: slug.to_string(),
            })
        }
        Err(err) => return Err(io_error(&path, err)),
    };
    serde_json::from_str(&raw).map_err(|e| json_error(&path, e))
}

/// Rewrites `name`/`input` so a copied config refers to `target`.
pub fn retarget_config(config: &mut Value, target: &str) {
    if let Value::Object(map) = config {
        map.insert("name".to_string(), Value::String(target.to_string()));
        map.insert("input".to_string(), Value::String(target.to_string()));
    }
}

pub fn write_config(
    paths: &StatePaths,
    slug: &str,
    config: &Value,
) -> Result<PathBuf, OrchestratorError> {
    let path = paths.config_path(slug);
    write_json(&path, config)?;
    Ok(path)
}

pub(crate) fn write_json(path: &Path, value: &Value) -> Result<(), OrchestratorError> {
    ensure_parent_dir(path).map_err(|e| io_error(path, e))?;
    let body = serde_json::to_vec_pretty(value).map_err(|e| json_error(path, e))?;
    atomic_write_file(path, &body).map_err(|e| io_error(path, e))
}

pub fn encode_input_csv(comments: &[CommentRow]) -> String {
    let mut out = String::new();
    push_csv_row(&mut out, INPUT_CSV_HEADER);
    for comment in comments {
        push_csv_row(
            &mut out,
            [
                comment.id.as_str(),
                comment.comment.as_str(),
                comment.source.as_deref().unwrap_or_default(),
                comment.url.as_deref().unwrap_or_default(),
            ],
        );
    }
    out
}

fn push_csv_row(out: &mut String, fields: [&str; 4]) {
    let row = fields.map(csv_field);
    out.push_str(&row.join(","));
    out.push('\n');
}

fn csv_field(value: &str) -> Cow<'_, str> {
    if value.contains([',', '"', '\n', '\r']) {
        Cow::Owned(format!("\"{}\"", value.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(value)
    }
}
