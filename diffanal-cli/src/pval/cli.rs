use clap::{Arg, Command, arg, value_parser};

pub const PVAL_CMD: &str = "pval";

pub fn create_pval_cli() -> Command {
    Command::new(PVAL_CMD)
        .about("Compute the exact P-value of a mean fold-change between two conditions.")
        .long_about(
            "Compute the exact P-value of a mean fold-change between two conditions.\n\n\
             Either simulate demo counts from two means and a maximum deviation \
             (e.g. `diffanal pval 100 200 .2 3`), or give the counts directly with \
             --cond1 and --cond2.",
        )
        .arg(
            Arg::new("count1-mean")
                .value_parser(value_parser!(u64))
                .required_unless_present("cond1")
                .help("Mean count of condition 1 for simulated counts"),
        )
        .arg(
            Arg::new("count2-mean")
                .value_parser(value_parser!(u64))
                .required_unless_present("cond1")
                .help("Mean count of condition 2 for simulated counts"),
        )
        .arg(
            Arg::new("max-deviation")
                .value_parser(value_parser!(f64))
                .required_unless_present("cond1")
                .help("Maximum relative deviation of simulated counts, e.g. .2"),
        )
        .arg(
            Arg::new("replicates")
                .value_parser(value_parser!(usize))
                .required_unless_present("cond1")
                .help("Replicates per condition for simulated counts"),
        )
        .arg(
            arg!(--cond1 <COUNTS>)
                .required(false)
                .requires("cond2")
                .conflicts_with("count1-mean")
                .help("Comma-separated counts of condition 1"),
        )
        .arg(
            arg!(--cond2 <COUNTS>)
                .required(false)
                .requires("cond1")
                .help("Comma-separated counts of condition 2, paired with --cond1"),
        )
        .arg(
            arg!(--config <CONFIG>)
                .required(false)
                .help("TOML file with engine settings"),
        )
        .arg(
            Arg::new("exact-max-replicates")
                .long("exact-max-replicates")
                .value_parser(value_parser!(usize))
                .help("Enumerate exactly up to this many replicates [default: 10]"),
        )
        .arg(
            arg!(--draws <N>)
                .value_parser(value_parser!(u64))
                .help("Random subsets drawn per down-sampling trial"),
        )
        .arg(
            arg!(--trials <N>)
                .value_parser(value_parser!(usize))
                .help("Down-sampling trials used to check stability"),
        )
        .arg(
            arg!(--seed <SEED>)
                .value_parser(value_parser!(u64))
                .help("Seed for simulated counts and down-sampling"),
        )
        .arg(
            arg!(--timeout <SECONDS>)
                .value_parser(value_parser!(u64))
                .help("Abort exact enumeration after this many seconds"),
        )
        .arg(arg!(--json "Print the report as JSON"))
        .arg(arg!(--progress "Show a progress bar during exact enumeration"))
}
