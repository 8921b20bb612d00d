use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};

use clap::{Arg, ArgMatches, Command};
use molkit::descriptors::{batch_compute_many_descriptors, DEFAULT_DESCRIPTORS};
use molkit::smiles::from_smiles;
use tracing::{info, warn};

use crate::required;

pub const NAME: &str = "descriptors";

pub fn command() -> Command {
    Command::new(NAME)
        .about("Compute descriptors for a file of SMILES, one per line")
        .arg(
            Arg::new("input")
                .required(true)
                .long("input")
                .short('i')
                .num_args(1),
        )
        .arg(
            Arg::new("output")
                .help("CSV destination; stdout when omitted")
                .long("output")
                .short('o')
                .num_args(1),
        )
        .arg(
            Arg::new("names")
                .help("Comma-separated descriptor names")
                .long("names")
                .short('n')
                .num_args(1),
        )
        .arg(
            Arg::new("jobs")
                .long("jobs")
                .short('j')
                .num_args(1)
                .value_parser(clap::value_parser!(usize)),
        )
}

pub fn action(matches: &ArgMatches) -> molkit::Result<()> {
    let input = required(matches, "input")?;
    let names: Vec<&str> = match matches.get_one::<String>("names") {
        Some(list) => list.split(',').map(str::trim).collect(),
        None => DEFAULT_DESCRIPTORS.to_vec(),
    };
    let jobs = matches.get_one::<usize>("jobs").copied();

    let reader = BufReader::new(File::open(input)?);
    let mut smiles = Vec::new();
    let mut mols = Vec::new();
    for (lineno, line) in reader.lines().enumerate() {
        let line = line?;
        let Some(token) = line.split_whitespace().next() else {
            continue;
        };
        match from_smiles(token) {
            Ok(mol) => {
                smiles.push(token.to_string());
                mols.push(mol);
            }
            Err(e) => warn!("line {}: skipping {token}: {e}", lineno + 1),
        }
    }
    info!("read {} molecules from {input}", mols.len());

    let table = batch_compute_many_descriptors(&mols, &names, jobs)?;

    let sink: Box<dyn Write> = match matches.get_one::<String>("output") {
        Some(path) => Box::new(File::create(path)?),
        None => Box::new(io::stdout().lock()),
    };
    table.write_csv_with_ids(sink, "smiles", &smiles)?;
    Ok(())
}
