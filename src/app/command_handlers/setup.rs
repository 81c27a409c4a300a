use crate::app::command_support::{map_config_err, map_orchestrator_err};
use crate::config::{default_global_config_path, load_settings_or_default, save_settings};
use crate::runtime::{append_runtime_log, bootstrap_state_root, StatePaths};

pub fn cmd_setup() -> Result<String, String> {
    let config_path = default_global_config_path().map_err(map_config_err)?;
    let existed = config_path.exists();
    let settings = load_settings_or_default(&config_path).map_err(map_config_err)?;
    if !existed {
        save_settings(&settings, &config_path).map_err(map_config_err)?;
    }

    let paths = StatePaths::from_settings(&settings).map_err(map_config_err)?;
    bootstrap_state_root(&paths).map_err(map_orchestrator_err)?;
    append_runtime_log(
        &paths,
        "info",
        "setup.complete",
        &format!("config={}", config_path.display()),
    );

    Ok([
        format!("config={}", config_path.display()),
        format!("config_created={}", !existed),
        format!("data_dir={}", paths.root.display()),
        format!("pipeline_dir={}", paths.pipeline_root.display()),
    ]
    .join("\n"))
}
