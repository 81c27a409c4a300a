use crate::app::command_support::{load_settings, map_config_err};
use crate::config::{default_global_config_path, Settings};
use crate::pipeline::{check_step_contract, StepArtifactSet};
use crate::shared::time::now_secs;
use std::fs;
#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;
use std::path::Path;

#[derive(Debug, Clone)]
struct DoctorFinding {
    id: String,
    ok: bool,
    detail: String,
    remediation: String,
}

fn doctor_finding(
    id: impl Into<String>,
    ok: bool,
    detail: impl Into<String>,
    remediation: impl Into<String>,
) -> DoctorFinding {
    DoctorFinding {
        id: id.into(),
        ok,
        detail: detail.into(),
        remediation: remediation.into(),
    }
}

pub(crate) fn is_binary_available(binary: &str) -> bool {
    if binary.trim().is_empty() {
        return false;
    }
    let explicit = Path::new(binary);
    if explicit.components().count() > 1 || explicit.is_absolute() {
        return is_executable_file(explicit);
    }

    let Some(path) = std::env::var_os("PATH") else {
        return false;
    };
    std::env::split_paths(&path).any(|dir| is_executable_file(&dir.join(binary)))
}

fn is_executable_file(path: &Path) -> bool {
    let Ok(metadata) = fs::metadata(path) else {
        return false;
    };
    if !metadata.is_file() {
        return false;
    }
    #[cfg(unix)]
    {
        metadata.permissions().mode() & 0o111 != 0
    }
    #[cfg(not(unix))]
    {
        true
    }
}

fn can_write_directory(path: &Path) -> Result<(), String> {
    fs::create_dir_all(path).map_err(|e| format!("failed to create {}: {e}", path.display()))?;
    let marker = path.join(format!(".reportd-doctor-{}", now_secs()));
    fs::write(&marker, b"ok").map_err(|e| format!("failed to write {}: {e}", marker.display()))?;
    fs::remove_file(&marker).map_err(|e| format!("failed to remove {}: {e}", marker.display()))
}

fn settings_findings(settings: &Settings) -> Vec<DoctorFinding> {
    let mut findings = Vec::new();
    match settings.resolve_data_dir() {
        Ok(data_dir) => findings.push(match can_write_directory(&data_dir) {
            Ok(()) => doctor_finding(
                "data_dir.writable",
                true,
                format!("data_dir={}", data_dir.display()),
                "none",
            ),
            Err(err) => doctor_finding(
                "data_dir.writable",
                false,
                err,
                "fix permissions or set `data_dir` in the settings file",
            ),
        }),
        Err(err) => findings.push(doctor_finding(
            "data_dir.writable",
            false,
            err.to_string(),
            "set `data_dir` in the settings file",
        )),
    }

    let pipeline = &settings.pipeline;
    findings.push(doctor_finding(
        "pipeline.program",
        is_binary_available(&pipeline.program),
        format!("program={}", pipeline.program),
        "install the pipeline interpreter or set `pipeline.program`",
    ));
    findings.push(doctor_finding(
        "pipeline.working_dir",
        pipeline.working_dir.is_dir(),
        format!("working_dir={}", pipeline.working_dir.display()),
        "set `pipeline.working_dir` to the pipeline checkout",
    ));

    let declared = StepArtifactSet::declared();
    findings.push(
        match check_step_contract(&declared, &pipeline.working_dir) {
            Ok(None) => doctor_finding(
                "pipeline.step_outputs",
                true,
                "no step output manifest; using built-in step outputs",
                "none",
            ),
            Ok(Some(drift)) if drift.is_empty() => doctor_finding(
                "pipeline.step_outputs",
                true,
                format!("manifest matches version {}", declared.version()),
                "none",
            ),
            Ok(Some(drift)) => doctor_finding(
                "pipeline.step_outputs",
                false,
                drift
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join("; "),
                "update reportd to match the pipeline's step outputs",
            ),
            Err(err) => doctor_finding(
                "pipeline.step_outputs",
                false,
                err.to_string(),
                "fix or remove the pipeline's step output manifest",
            ),
        },
    );
    findings
}

pub fn cmd_doctor() -> Result<String, String> {
    let mut findings = Vec::new();
    let config_path = default_global_config_path().map_err(map_config_err)?;
    findings.push(doctor_finding(
        "config.path",
        config_path.exists(),
        format!("config={}", config_path.display()),
        "run `reportd setup` to create default config",
    ));

    match load_settings() {
        Ok(settings) => {
            findings.push(doctor_finding(
                "config.parse",
                true,
                "settings parsed and validated",
                "none",
            ));
            findings.extend(settings_findings(&settings));
        }
        Err(err) => findings.push(doctor_finding(
            "config.parse",
            false,
            format!("settings load failed: {err}"),
            "fix the settings file and retry `reportd doctor`",
        )),
    }

    Ok(render_findings(findings))
}

fn render_findings(findings: Vec<DoctorFinding>) -> String {
    let failed = findings.iter().filter(|f| !f.ok).count();
    let summary = if failed == 0 { "healthy" } else { "unhealthy" };
    let mut lines = vec![
        format!("summary={summary}"),
        format!("checks_total={}", findings.len()),
        format!("checks_failed={failed}"),
    ];
    for finding in findings {
        lines.push(format!(
            "check:{}={}",
            finding.id,
            if finding.ok { "ok" } else { "fail" }
        ));
        lines.push(format!("check:{}.detail={}", finding.id, finding.detail));
        if !finding.ok {
            lines.push(format!(
                "check:{}.remediation={}",
                finding.id, finding.remediation
            ));
        }
    }
    lines.join("\n")
}
