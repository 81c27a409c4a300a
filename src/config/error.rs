use std::path::PathBuf;

/// Failures loading, validating or saving the reportd settings file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read settings file {}: {source}", path.display())]
    ReadSettings {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("settings file {} is not valid yaml: {source}", path.display())]
    ParseSettings {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("cannot save settings to {}: {source}", path.display())]
    SaveSettings {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot encode settings for {}: {source}", path.display())]
    EncodeSettings {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("invalid reportd settings: {0}")]
    Invalid(String),
    #[error("HOME is not set; cannot locate ~/.reportd (set REPORTD_CONFIG and data_dir instead)")]
    HomeDirectoryUnavailable,
}
