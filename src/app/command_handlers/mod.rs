use crate::app::cli::{help_text, parse_cli_verb, CliVerb};

pub mod doctor;
pub mod reports;
pub mod setup;

pub fn run_cli(args: Vec<String>) -> Result<String, String> {
    if args.is_empty() {
        return Ok(help_text());
    }

    let rest = &args[1..];
    match parse_cli_verb(args[0].as_str()) {
        CliVerb::Setup => setup::cmd_setup(),
        CliVerb::List => reports::cmd_list(rest),
        CliVerb::Create => reports::cmd_create(rest),
        CliVerb::Delete => reports::cmd_delete(rest),
        CliVerb::Visibility => reports::cmd_visibility(rest),
        CliVerb::Step => reports::cmd_step(rest),
        CliVerb::Duplicate => reports::cmd_duplicate(rest),
        CliVerb::Doctor => doctor::cmd_doctor(),
        CliVerb::Unknown => Err(format!("unknown command `{}`", args[0])),
    }
}
