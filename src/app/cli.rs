#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CliVerb {
    Setup,
    List,
    Create,
    Delete,
    Visibility,
    Step,
    Duplicate,
    Doctor,
    Unknown,
}

pub fn parse_cli_verb(input: &str) -> CliVerb {
    match input {
        "setup" => CliVerb::Setup,
        "list" => CliVerb::List,
        "create" => CliVerb::Create,
        "delete" => CliVerb::Delete,
        "visibility" => CliVerb::Visibility,
        "step" => CliVerb::Step,
        "duplicate" => CliVerb::Duplicate,
        "doctor" => CliVerb::Doctor,
        _ => CliVerb::Unknown,
    }
}

pub fn cli_help_lines() -> Vec<String> {
    vec![
        "Commands:".to_string(),
        "  setup                                Write default settings and data directories"
            .to_string(),
        "  list [--all]                         List reports (`--all` includes deleted)"
            .to_string(),
        "  create <request.json>                Register a report and produce it".to_string(),
        "  delete <slug>                        Mark a report as deleted".to_string(),
        "  visibility <slug>                    Toggle whether a report is public".to_string(),
        "  step <slug>                          Show the pipeline step a report is on"
            .to_string(),
        "  duplicate <slug>                     Copy a report's config under a new slug"
            .to_string(),
        "  doctor                               Run local environment and config checks"
            .to_string(),
    ]
}

pub(crate) fn help_text() -> String {
    cli_help_lines().join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_documented_command_parses_to_a_verb() {
        for line in cli_help_lines().iter().skip(1) {
            let command = line.split_whitespace().next().expect("command word");
            assert_ne!(parse_cli_verb(command), CliVerb::Unknown, "{command}");
        }
        assert_eq!(parse_cli_verb("start"), CliVerb::Unknown);
    }
}
