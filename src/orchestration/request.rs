use crate::shared::ids::ReportSlug;
use serde::{Deserialize, Serialize};

/// A request to produce one report. The presence of `duplication_options` with
/// `reuse_intermediate_results` set selects the copy-and-reuse path instead of a
/// fresh pipeline run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportRequest {
    /// Slug of the new report.
    pub input: ReportSlug,
    pub question: String,
    pub intro: String,
    /// Requested cluster counts per hierarchy level, coarsest first.
    pub cluster: Vec<u32>,
    pub model: String,
    pub workers: u32,
    pub prompt: PromptSet,
    #[serde(default)]
    pub comments: Vec<CommentRow>,
    #[serde(default)]
    pub is_pubcom: bool,
    #[serde(default)]
    pub duplication_options: Option<DuplicationOptions>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptSet {
    #[serde(default)]
    pub extraction: String,
    #[serde(default)]
    pub initial_labelling: String,
    #[serde(default)]
    pub merge_labelling: String,
    #[serde(default)]
    pub overview: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentRow {
    pub id: String,
    pub comment: String,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DuplicationOptions {
    pub source_slug: ReportSlug,
    #[serde(default)]
    pub reuse_intermediate_results: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaunchMode<'a> {
    Fresh,
    ReuseFrom(&'a ReportSlug),
}

impl ReportRequest {
    pub fn slug(&self) -> &str {
        self.input.as_str()
    }

    pub fn launch_mode(&self) -> LaunchMode<'_> {
        match &self.duplication_options {
            Some(options) if options.reuse_intermediate_results => {
                LaunchMode::ReuseFrom(&options.source_slug)
            }
            _ => LaunchMode::Fresh,
        }
    }
}
