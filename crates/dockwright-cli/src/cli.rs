use clap::parser::ValueSource;
use clap::{Arg, ArgMatches, Command};
use dockwright_core::{CliInput, FieldKind, fields};

pub const DEPLOY: &str = "deploy";
pub const VALIDATE: &str = "validate";

/// `dockwright` with one `--<flag> <value>` per registry field on each
/// subcommand.
pub fn command() -> Command {
    Command::new("dockwright")
        .about("Dockwright is a modular CLI for Docker & Helm orchestration")
        .version(env!("CARGO_PKG_VERSION"))
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(with_field_flags(
            Command::new(DEPLOY).about("Deploy the application"),
        ))
        .subcommand(with_field_flags(
            Command::new(VALIDATE).about("Check configuration and prerequisites without deploying"),
        ))
}

fn with_field_flags(command: Command) -> Command {
    fields().iter().fold(command, |command, field| {
        let arg = Arg::new(field.flag)
            .long(field.flag)
            .help(field.description)
            .value_name("VALUE");
        // A bare boolean flag reads as `true`.
        let arg = match field.kind {
            FieldKind::Bool => arg.num_args(0..=1).default_missing_value("true"),
            FieldKind::Text | FieldKind::List => arg.num_args(1),
        };
        command.arg(arg)
    })
}

/// Flags the user actually typed. Clap defaults never reach the resolver,
/// so an absent flag falls through to the config file.
pub fn collect_input(matches: &ArgMatches) -> CliInput {
    let mut input = CliInput::new();
    for field in fields() {
        if matches.value_source(field.flag) != Some(ValueSource::CommandLine) {
            continue;
        }
        if let Some(value) = matches.get_one::<String>(field.flag) {
            input.supply(field.flag, value.clone());
        }
    }
    input
}
