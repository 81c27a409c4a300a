use super::{default_global_config_path, ConfigError, Settings};
use crate::shared::fs_atomic::{atomic_write_file, ensure_parent_dir};
use std::path::{Path, PathBuf};

/// Loads the global settings file, falling back to defaults when it does not exist yet.
pub fn load_global_settings() -> Result<Settings, ConfigError> {
    let path = default_global_config_path()?;
    load_settings_or_default(&path)
}

pub fn load_settings_or_default(path: &Path) -> Result<Settings, ConfigError> {
    let settings = if path.exists() {
        Settings::from_path(path)?
    } else {
        Settings::default()
    };
    settings.validate()?;
    Ok(settings)
}

pub fn save_settings(settings: &Settings, path: &Path) -> Result<PathBuf, ConfigError> {
    settings.validate()?;
    let body = serde_yaml::to_string(settings).map_err(|source| ConfigError::EncodeSettings {
        path: path.to_path_buf(),
        source,
    })?;
    ensure_parent_dir(path)
        .and_then(|()| atomic_write_file(path, body.as_bytes()))
        .map_err(|source| ConfigError::SaveSettings {
            path: path.to_path_buf(),
            source,
        })?;
    Ok(path.to_path_buf())
}
