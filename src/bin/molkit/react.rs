use clap::{Arg, ArgAction, ArgMatches, Command};
use molkit::reactions::{apply_reaction, rxn_from_smarts, ApplyOptions, Product};
use molkit::smiles::from_smiles;

use crate::required;

pub const NAME: &str = "react";

pub fn command() -> Command {
    Command::new(NAME)
        .about("Apply a reaction SMARTS and print each product group on its own line")
        .arg(
            Arg::new("rxn")
                .required(true)
                .long("rxn")
                .short('r')
                .num_args(1),
        )
        .arg(
            Arg::new("reactant")
                .help("Reactant SMILES, one per reactant template, in order")
                .required(true)
                .num_args(1..),
        )
        .arg(
            Arg::new("single")
                .help("Keep one randomly chosen product group")
                .long("single")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("rm-attach")
                .long("rm-attach")
                .action(ArgAction::SetTrue),
        )
}

pub fn action(matches: &ArgMatches) -> molkit::Result<()> {
    let rxn = rxn_from_smarts(required(matches, "rxn")?)?;
    let reactants = matches
        .get_many::<String>("reactant")
        .into_iter()
        .flatten()
        .map(|s| from_smiles(s))
        .collect::<Result<Vec<_>, _>>()?;
    let refs: Vec<_> = reactants.iter().collect();

    let opts = ApplyOptions {
        single_product_group: matches.get_flag("single"),
        rm_attach: matches.get_flag("rm-attach"),
        as_smiles: true,
        ..Default::default()
    };
    for group in apply_reaction(&rxn, &refs, &opts)? {
        let line: Vec<&str> = group
            .iter()
            .map(|p| p.as_ref().and_then(Product::as_smiles).unwrap_or("-"))
            .collect();
        println!("{}", line.join(" "));
    }
    Ok(())
}
