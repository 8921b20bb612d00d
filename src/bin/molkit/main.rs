use std::process::ExitCode;

use clap::{Arg, ArgMatches, Command};
use tracing::error;

mod descriptors;
mod react;
mod rxn_block;

pub(crate) fn required<'a>(matches: &'a ArgMatches, name: &'static str) -> molkit::Result<&'a str> {
    matches
        .get_one::<String>(name)
        .map(String::as_str)
        .ok_or(molkit::Error::MissingArgument(name))
}

fn command() -> Command {
    Command::new("molkit")
        .about("Reaction templates and molecular descriptors")
        .arg(
            Arg::new("log-level")
                .long("log-level")
                .global(true)
                .num_args(1)
                .default_value("info"),
        )
        .subcommand_required(true)
        .subcommand(descriptors::command())
        .subcommand(react::command())
        .subcommand(rxn_block::command())
        .subcommand(rxn_block::smarts_command())
}

fn run(matches: &ArgMatches) -> molkit::Result<()> {
    match matches.subcommand() {
        Some((descriptors::NAME, args)) => descriptors::action(args),
        Some((react::NAME, args)) => react::action(args),
        Some((rxn_block::NAME, args)) => rxn_block::action(args),
        Some((rxn_block::SMARTS_NAME, args)) => rxn_block::smarts_action(args),
        _ => Ok(()),
    }
}

fn main() -> ExitCode {
    let matches = command().get_matches();
    let level = matches
        .get_one::<String>("log-level")
        .map(String::as_str)
        .unwrap_or("info");
    molkit::logging::init_logging(level);

    match run(&matches) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}
