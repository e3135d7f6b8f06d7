use clap::{Arg, Command, arg};

pub const NORMALIZE_CMD: &str = "normalize";

pub fn create_normalize_cli() -> Command {
    Command::new(NORMALIZE_CMD)
        .about("Normalize Kallisto-style abundance tables with median-of-ratios size factors.")
        .arg(
            Arg::new("abundance")
                .num_args(1..)
                .required(true)
                .help("One abundance.tsv (optionally .gz) per sample"),
        )
        .arg(
            arg!(--output <OUTPUT>)
                .required(false)
                .help("Output TSV path (default: stdout)"),
        )
}
