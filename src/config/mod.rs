pub mod error;
pub mod load;
pub mod paths;
pub mod settings;

pub use error::ConfigError;
pub use load::{load_global_settings, load_settings_or_default, save_settings};
pub use paths::{
    default_data_dir, default_global_config_path, CONFIG_PATH_ENV, DEFAULT_DATA_DIR_NAME,
    GLOBAL_SETTINGS_FILE_NAME, GLOBAL_STATE_DIR,
};
pub use settings::{PipelineSettings, Settings, CONFIG_PLACEHOLDER};

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::sync::Mutex;
    use tempfile::tempdir;

    static ENV_LOCK: Mutex<()> = Mutex::new(());

    #[test]
    fn empty_yaml_uses_pipeline_defaults() {
        let settings: Settings = serde_yaml::from_str("{}").expect("parse settings");
        assert_eq!(settings.pipeline.program, "python");
        assert_eq!(
            settings.pipeline.args,
            vec![
                "hierarchical_main.py",
                "{config}",
                "--skip-interaction",
                "--without-html"
            ]
        );
        assert_eq!(settings.pipeline.working_dir, PathBuf::from("pipeline"));
        settings.validate().expect("defaults validate");
    }

    #[test]
    fn args_without_config_placeholder_are_rejected() {
        let settings: Settings = serde_yaml::from_str(
            r#"
pipeline:
  program: python
  args: [main.py]
"#,
        )
        .expect("parse settings");
        let err = settings.validate().expect_err("missing placeholder");
        assert!(err.to_string().contains("{config}"));
    }

    #[test]
    fn explicit_data_dir_wins_over_home_default() {
        let settings: Settings =
            serde_yaml::from_str("data_dir: /srv/reports\n").expect("parse settings");
        assert_eq!(
            settings.resolve_data_dir().expect("data dir"),
            PathBuf::from("/srv/reports")
        );
    }

    #[test]
    fn config_path_env_overrides_home_location() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|err| err.into_inner());
        let dir = tempdir().expect("temp dir");
        let custom = dir.path().join("custom.yaml");
        let old = std::env::var_os(CONFIG_PATH_ENV);
        std::env::set_var(CONFIG_PATH_ENV, &custom);

        assert_eq!(default_global_config_path().expect("config path"), custom);

        match old {
            Some(value) => std::env::set_var(CONFIG_PATH_ENV, value),
            None => std::env::remove_var(CONFIG_PATH_ENV),
        }
    }

    #[test]
    fn missing_settings_file_loads_defaults_and_save_round_trips() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("nested/config.yaml");
        let loaded = load_settings_or_default(&path).expect("defaults");
        assert!(loaded.data_dir.is_none());

        let settings = Settings {
            data_dir: Some(dir.path().join("data")),
            pipeline: PipelineSettings::default(),
        };
        save_settings(&settings, &path).expect("save");
        let reloaded = load_settings_or_default(&path).expect("reload");
        assert_eq!(reloaded.data_dir, Some(dir.path().join("data")));
    }

    #[test]
    fn malformed_settings_file_error_names_the_file() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "pipeline: [unclosed\n").expect("write settings");

        let err = load_settings_or_default(&path).expect_err("malformed yaml");
        assert!(matches!(err, ConfigError::ParseSettings { .. }));
        let message = err.to_string();
        assert!(message.starts_with("settings file "));
        assert!(message.contains(&path.display().to_string()));
    }
}
