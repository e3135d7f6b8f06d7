use std::io::{self, Write};
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use clap::ArgMatches;
use indicatif::{ProgressBar, ProgressStyle};
use log::info;
use rand::SeedableRng;
use rand::rngs::StdRng;

use diffanal_core::ConditionCounts;
use diffanal_core::simulate::simulate_counts;
use diffanal_pval::{CountingMode, PValueConfig, PValueConfigBuilder, PValueEngine, PValueReport};

fn parse_counts(s: &str) -> Result<Vec<f64>> {
    s.split(',')
        .map(|field| {
            field
                .trim()
                .parse::<f64>()
                .with_context(|| format!("Invalid count: {:?}", field))
        })
        .collect()
}

fn load_config(matches: &ArgMatches) -> Result<PValueConfig> {
    let base = match matches.get_one::<String>("config") {
        Some(path) => PValueConfig::from_toml_file(path)
            .with_context(|| format!("Failed to load config from {}", path))?,
        None => PValueConfig::default(),
    };

    let mut builder = PValueConfigBuilder::from_config(base);
    if let Some(&replicates) = matches.get_one::<usize>("exact-max-replicates") {
        builder = builder.with_exact_max_replicates(replicates);
    }
    if let Some(&draws) = matches.get_one::<u64>("draws") {
        builder = builder.with_sample_draws(draws);
    }
    if let Some(&trials) = matches.get_one::<usize>("trials") {
        builder = builder.with_stability_trials(trials);
    }
    if let Some(&seed) = matches.get_one::<u64>("seed") {
        builder = builder.with_seed(seed);
    }

    Ok(builder.finish()?)
}

fn load_counts(matches: &ArgMatches, seed: Option<u64>) -> Result<ConditionCounts> {
    if let (Some(cond1), Some(cond2)) = (
        matches.get_one::<String>("cond1"),
        matches.get_one::<String>("cond2"),
    ) {
        return Ok(ConditionCounts::try_new(
            parse_counts(cond1)?,
            parse_counts(cond2)?,
        )?);
    }

    let count1_mean = *matches
        .get_one::<u64>("count1-mean")
        .ok_or_else(|| anyhow!("count1-mean is required without --cond1"))?;
    let count2_mean = *matches
        .get_one::<u64>("count2-mean")
        .ok_or_else(|| anyhow!("count2-mean is required without --cond1"))?;
    let max_deviation = *matches
        .get_one::<f64>("max-deviation")
        .ok_or_else(|| anyhow!("max-deviation is required without --cond1"))?;
    let replicates = *matches
        .get_one::<usize>("replicates")
        .ok_or_else(|| anyhow!("replicates is required without --cond1"))?;

    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };
    info!(
        "Simulating counts: count1 = {} +/- up to {:.0}%, count2 = {} +/- same",
        count1_mean,
        max_deviation * 100.0,
        count2_mean
    );
    Ok(simulate_counts(
        count1_mean,
        count2_mean,
        max_deviation,
        replicates,
        &mut rng,
    )?)
}

pub fn write_report<W: Write>(mut out: W, report: &PValueReport) -> Result<()> {
    let observed = &report.observed;
    let population = &report.population;
    let k = observed.replicates;

    write!(out, "{}", report.counts)?;
    writeln!(out, "Observed FC mean = {:.5}", observed.mean)?;
    writeln!(
        out,
        "P-value: Likelihood of a mean of {} FCs at least as extreme as {:.5}",
        k, observed.mean
    )?;

    writeln!(out)?;
    writeln!(
        out,
        "Distribution: less = {}  more = {}  equal = {}  H0 FC mean = {:.5}",
        population.less, population.more, population.equal, population.mean
    )?;
    writeln!(
        out,
        "{} choose {} = {} possible means of {} FCs",
        population.size, k, report.total_possible, k
    )?;

    writeln!(out)?;
    writeln!(
        out,
        "Observed: FC mean = {:.5}  stddev = {:.5}  spread = {:.5}",
        observed.mean, observed.stddev, observed.spread
    )?;
    for trial in &report.trials {
        match trial.mode {
            CountingMode::Exact => writeln!(
                out,
                "FC mean count = {}  FC >= {:.5} = {}  P(FC >= {:.5}) = {:.5}",
                trial.examined,
                observed.mean,
                trial.at_or_above,
                observed.mean,
                trial.p_value()?
            )?,
            CountingMode::Estimated => {
                write!(
                    out,
                    "Sampled: draws = {}  hits FC >= {:.5} = {}  P(FC >= {:.5}) = {:.5}",
                    trial.examined,
                    observed.mean,
                    trial.at_or_above,
                    observed.mean,
                    trial.p_value()?
                )?;
                match trial.estimated_at_or_above {
                    Some(estimate) => writeln!(
                        out,
                        "  estimated FC >= {:.5} = {} of {}",
                        observed.mean, estimate, report.total_possible
                    )?,
                    None => writeln!(out)?,
                }
            }
        }
    }

    writeln!(out)?;
    match (&report.mode, &report.stability) {
        (CountingMode::Estimated, Some(stability)) => writeln!(
            out,
            "P-value (estimated from {} down-sampled trials) = {:.5}  trial stddev = {:.5}  spread = {:.5}",
            stability.p_values.len(),
            report.p_value,
            stability.stddev,
            stability.spread
        )?,
        _ => writeln!(out, "P-value ({}) = {:.5}", report.mode, report.p_value)?,
    }

    Ok(())
}

pub fn run_pval(matches: &ArgMatches) -> Result<()> {
    let config = load_config(matches)?;
    let counts = load_counts(matches, config.seed)?;

    let mut engine = PValueEngine::new(config);

    if let Some(&seconds) = matches.get_one::<u64>("timeout") {
        let token = engine.cancel_token();
        thread::spawn(move || {
            thread::sleep(Duration::from_secs(seconds));
            token.cancel();
        });
    }

    let progress = if matches.get_flag("progress") {
        let pb = ProgressBar::new(0);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} subsets ({eta})")?,
        );
        engine = engine.with_progress(pb.clone());
        Some(pb)
    } else {
        None
    };

    let report = engine.run(&counts).context("Failed to compute P-value")?;

    if let Some(pb) = progress {
        pb.finish_and_clear();
    }

    let stdout = io::stdout();
    let mut out = stdout.lock();
    if matches.get_flag("json") {
        serde_json::to_writer_pretty(&mut out, &report)?;
        writeln!(out)?;
    } else {
        write_report(&mut out, &report)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::*;

    #[rstest]
    fn test_parse_counts() {
        assert_eq!(parse_counts("90, 100,110").unwrap(), vec![90.0, 100.0, 110.0]);
        assert!(parse_counts("90,,110").is_err());
        assert!(parse_counts("ninety").is_err());
    }

    #[rstest]
    fn test_write_exact_report() {
        let counts = ConditionCounts::from_integer_counts(&[90, 100, 110], &[180, 200, 220]).unwrap();
        let report = PValueEngine::default().run(&counts).unwrap();

        let mut out = Vec::new();
        write_report(&mut out, &report).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.contains("Observed FC mean = 2.00000"));
        assert!(text.contains("30 choose 3 = 4060 possible means of 3 FCs"));
        assert!(text.contains("P-value (exact) = "));
        assert!(!text.contains("Sampled: draws"));
    }

    #[rstest]
    fn test_write_estimated_report_labels_draws() {
        let config = PValueConfig::builder()
            .with_exact_max_replicates(2)
            .with_stability_replicate_cutoff(2)
            .with_stability_trials(2)
            .with_sample_draws(400)
            .with_seed(11)
            .finish()
            .unwrap();
        let counts = ConditionCounts::from_integer_counts(&[90, 100, 110], &[180, 200, 220]).unwrap();
        let report = PValueEngine::new(config).run(&counts).unwrap();

        let mut out = Vec::new();
        write_report(&mut out, &report).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(!text.contains("FC mean count = 400"));
        assert_eq!(text.matches("Sampled: draws = 400").count(), 2);
        assert_eq!(text.matches(" of 4060\n").count(), 2);
        assert!(text.contains("estimated FC >= 2.00000 = "));
        assert!(text.contains("P-value (estimated from 2 down-sampled trials) = "));
    }
}
