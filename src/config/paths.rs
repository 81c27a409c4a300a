use crate::config::ConfigError;
use std::path::PathBuf;

pub const GLOBAL_STATE_DIR: &str = ".reportd";
pub const GLOBAL_SETTINGS_FILE_NAME: &str = "config.yaml";
pub const DEFAULT_DATA_DIR_NAME: &str = "data";
pub const CONFIG_PATH_ENV: &str = "REPORTD_CONFIG";

fn home_state_dir() -> Result<PathBuf, ConfigError> {
    let home = std::env::var_os("HOME").ok_or(ConfigError::HomeDirectoryUnavailable)?;
    Ok(PathBuf::from(home).join(GLOBAL_STATE_DIR))
}

/// `$REPORTD_CONFIG` when set, otherwise `$HOME/.reportd/config.yaml`.
pub fn default_global_config_path() -> Result<PathBuf, ConfigError> {
    if let Some(path) = std::env::var_os(CONFIG_PATH_ENV).filter(|value| !value.is_empty()) {
        return Ok(PathBuf::from(path));
    }
    Ok(home_state_dir()?.join(GLOBAL_SETTINGS_FILE_NAME))
}

pub fn default_data_dir() -> Result<PathBuf, ConfigError> {
    Ok(home_state_dir()?.join(DEFAULT_DATA_DIR_NAME))
}
