use std::fs::File;
use std::io::{self, BufWriter};

use anyhow::{Context, Result};
use clap::ArgMatches;

use diffanal_normalize::CountTable;

pub fn run_normalize(matches: &ArgMatches) -> Result<()> {
    let paths: Vec<&String> = matches
        .get_many::<String>("abundance")
        .context("At least one abundance file is required.")?
        .collect();

    let table = CountTable::from_abundance_files(&paths)
        .context("Failed to load abundance tables")?;
    let normalized = table.normalize().context("Failed to normalize counts")?;

    match matches.get_one::<String>("output") {
        Some(path) => {
            let file = File::create(path).with_context(|| format!("Failed to create {}", path))?;
            normalized.write_tsv(BufWriter::new(file))?;
        }
        None => normalized.write_tsv(io::stdout().lock())?,
    }

    Ok(())
}
