use clap::{Arg, ArgAction, ArgMatches, Command};
use molkit::reactions::{
    is_reaction_ok, rxn_from_block_file, rxn_from_smarts, rxn_to_block, rxn_to_block_file,
    rxn_to_smarts,
};

use crate::required;

pub const NAME: &str = "rxn-block";
pub const SMARTS_NAME: &str = "rxn-smarts";

pub fn command() -> Command {
    Command::new(NAME)
        .about("Write a reaction SMARTS as an MDL RXN block")
        .arg(Arg::new("smarts").required(true).num_args(1))
        .arg(
            Arg::new("output")
                .long("output")
                .short('o')
                .num_args(1),
        )
        .arg(
            Arg::new("separate-agents")
                .long("separate-agents")
                .action(ArgAction::SetTrue),
        )
        .arg(Arg::new("v3000").long("v3000").action(ArgAction::SetTrue))
}

pub fn action(matches: &ArgMatches) -> molkit::Result<()> {
    let rxn = rxn_from_smarts(required(matches, "smarts")?)?;
    let separate = matches.get_flag("separate-agents");
    let v3000 = matches.get_flag("v3000");
    match matches.get_one::<String>("output") {
        Some(path) => rxn_to_block_file(&rxn, path, separate, v3000)?,
        None => print!("{}", rxn_to_block(&rxn, separate, v3000)),
    }
    Ok(())
}

pub fn smarts_command() -> Command {
    Command::new(SMARTS_NAME)
        .about("Read an MDL RXN file and print it as reaction SMARTS")
        .arg(Arg::new("file").required(true).num_args(1))
        .arg(
            Arg::new("sanitize")
                .long("sanitize")
                .action(ArgAction::SetTrue),
        )
}

pub fn smarts_action(matches: &ArgMatches) -> molkit::Result<()> {
    let rxn = rxn_from_block_file(required(matches, "file")?, matches.get_flag("sanitize"))?;
    is_reaction_ok(&rxn, true);
    println!("{}", rxn_to_smarts(&rxn));
    Ok(())
}
