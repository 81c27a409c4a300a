//! Declared output files per pipeline step.
//!
//! This table is the only thing the artifact copier knows about the pipeline's outputs,
//! so it is versioned and can be compared against a manifest shipped with the pipeline.

use crate::orchestration::error::{io_error, json_error, OrchestratorError};
use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

pub const STEP_OUTPUTS_VERSION: u32 = 1;
pub const STEP_OUTPUTS_MANIFEST: &str = "step_outputs.json";

const DECLARED_STEP_OUTPUTS: &[(&str, &[&str])] = &[
    ("extraction", &["extraction.json"]),
    ("embedding", &["embedding.json", "embedding.npy"]),
    ("hierarchical_clustering", &["hierarchical_clustering.json"]),
    (
        "hierarchical_initial_labelling",
        &["hierarchical_initial_labelling.json"],
    ),
    (
        "hierarchical_merge_labelling",
        &["hierarchical_merge_labelling.json"],
    ),
    ("hierarchical_overview", &["hierarchical_overview.json"]),
    ("hierarchical_aggregation", &["hierarchical_aggregation.json"]),
    (
        "hierarchical_visualization",
        &[
            "hierarchical_visualization.json",
            "hierarchical_visualization.html",
        ],
    ),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepArtifactSet {
    version: u32,
    steps: Vec<(String, Vec<String>)>,
}

impl Default for StepArtifactSet {
    fn default() -> Self {
        Self::declared()
    }
}

impl StepArtifactSet {
    pub fn declared() -> Self {
        Self::from_entries(
            STEP_OUTPUTS_VERSION,
            DECLARED_STEP_OUTPUTS
                .iter()
                .map(|(step, files)| (*step, files.to_vec())),
        )
    }

    pub fn from_entries<'a, I>(version: u32, entries: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, Vec<&'a str>)>,
    {
        Self {
            version,
            steps: entries
                .into_iter()
                .map(|(step, files)| {
                    (
                        step.to_string(),
                        files.into_iter().map(str::to_string).collect(),
                    )
                })
                .collect(),
        }
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    pub fn steps(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.steps
            .iter()
            .map(|(step, files)| (step.as_str(), files.as_slice()))
    }

    pub fn files(&self) -> impl Iterator<Item = &str> {
        self.steps
            .iter()
            .flat_map(|(_, files)| files.iter().map(String::as_str))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepContractDrift {
    VersionMismatch { declared: u32, manifest: u32 },
    MissingStep { step: String },
    UndeclaredStep { step: String },
    FilesDiffer {
        step: String,
        declared: Vec<String>,
        manifest: Vec<String>,
    },
}

impl std::fmt::Display for StepContractDrift {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::VersionMismatch { declared, manifest } => write!(
                f,
                "step output contract version {declared} does not match pipeline manifest version {manifest}"
            ),
            Self::MissingStep { step } => {
                write!(f, "step `{step}` is declared but absent from the pipeline manifest")
            }
            Self::UndeclaredStep { step } => {
                write!(f, "pipeline step `{step}` has no declared outputs")
            }
            Self::FilesDiffer {
                step,
                declared,
                manifest,
            } => write!(
                f,
                "step `{step}` outputs differ: declared [{}], pipeline [{}]",
                declared.join(", "),
                manifest.join(", ")
            ),
        }
    }
}

#[derive(Debug, Deserialize)]
struct StepOutputsManifest {
    version: u32,
    steps: BTreeMap<String, Vec<String>>,
}

/// Compares the declared table against `<working_dir>/step_outputs.json`.
/// Returns `Ok(None)` when the pipeline ships no manifest.
pub fn check_step_contract(
    declared: &StepArtifactSet,
    working_dir: &Path,
) -> Result<Option<Vec<StepContractDrift>>, OrchestratorError> {
    let path = working_dir.join(STEP_OUTPUTS_MANIFEST);
    let raw = match fs::read_to_string(&path) {
        Ok(raw) => raw,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
        Err(err) => return Err(io_error(&path, err)),
    };
    let manifest: StepOutputsManifest =
        serde_json::from_str(&raw).map_err(|e| json_error(&path, e))?;

    let mut drift = Vec::new();
    if manifest.version != declared.version() {
        drift.push(StepContractDrift::VersionMismatch {
            declared: declared.version(),
            manifest: manifest.version,
        });
    }

    for (step, files) in declared.steps() {
        let Some(manifest_files) = manifest.steps.get(step) else {
            drift.push(StepContractDrift::MissingStep {
                step: step.to_string(),
            });
            continue;
        };
        let declared_set = files.iter().collect::<BTreeSet<_>>();
        let manifest_set = manifest_files.iter().collect::<BTreeSet<_>>();
        if declared_set != manifest_set {
            drift.push(StepContractDrift::FilesDiffer {
                step: step.to_string(),
                declared: declared_set.into_iter().cloned().collect(),
                manifest: manifest_set.into_iter().cloned().collect(),
            });
        }
    }

    for step in manifest.steps.keys() {
        if !declared.steps().any(|(declared_step, _)| declared_step == step) {
            drift.push(StepContractDrift::UndeclaredStep { step: step.clone() });
        }
    }

    Ok(Some(drift))
}
