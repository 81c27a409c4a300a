use reportd::app::cli::{cli_help_lines, parse_cli_verb, CliVerb};
use reportd::app::command_handlers::run_cli;

fn args(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| value.to_string()).collect()
}

#[test]
fn app_command_handlers_run_cli_prints_help_without_args() {
    let help = run_cli(Vec::new()).expect("help");
    assert!(help.starts_with("Commands:"));
    assert_eq!(help.lines().count(), cli_help_lines().len());
}

#[test]
fn app_command_handlers_run_cli_supports_unknown_command_error() {
    let err = run_cli(args(&["unknown-command"])).expect_err("unknown command");
    assert!(err.contains("unknown command"));
}

#[test]
fn app_command_handlers_validate_arguments_before_loading_settings() {
    for (command, usage) in [
        (vec!["list", "--everything"], "usage: list [--all]"),
        (vec!["create"], "usage: create <request.json>"),
        (vec!["delete"], "usage: delete <slug>"),
        (vec!["visibility", "a", "b"], "usage: visibility <slug>"),
        (vec!["step"], "usage: step <slug>"),
        (vec!["duplicate"], "usage: duplicate <slug>"),
    ] {
        let err = run_cli(args(&command)).expect_err("usage error");
        assert_eq!(err, usage, "{command:?}");
    }
}

#[test]
fn app_cli_parses_report_verbs() {
    assert_eq!(parse_cli_verb("create"), CliVerb::Create);
    assert_eq!(parse_cli_verb("visibility"), CliVerb::Visibility);
    assert_eq!(parse_cli_verb("doctor"), CliVerb::Doctor);
    assert_eq!(parse_cli_verb("Create"), CliVerb::Unknown);
}
