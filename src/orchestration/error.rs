use crate::config::ConfigError;
use std::path::Path;

#[derive(Debug, thiserror::Error)]
pub enum OrchestratorError {
    #[error("report `{slug}` not found")]
    NotFound { slug: String },
    #[error("report `{slug}` already exists")]
    DuplicateKey { slug: String },
    #[error("invalid report slug: {0}")]
    InvalidSlug(String),
    #[error("failed to spawn pipeline `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("storage sync failed: {0}")]
    Sync(String),
    #[error("config error: {0}")]
    Config(String),
    #[error("io error at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("json error at {path}: {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

impl OrchestratorError {
    /// Errors caused by the caller's input rather than by the server's environment.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::NotFound { .. } | Self::DuplicateKey { .. } | Self::InvalidSlug(_)
        )
    }
}

impl From<ConfigError> for OrchestratorError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value.to_string())
    }
}

pub(crate) fn io_error(path: &Path, source: std::io::Error) -> OrchestratorError {
    OrchestratorError::Io {
        path: path.display().to_string(),
        source,
    }
}

pub(crate) fn json_error(path: &Path, source: serde_json::Error) -> OrchestratorError {
    OrchestratorError::Json {
        path: path.display().to_string(),
        source,
    }
}
