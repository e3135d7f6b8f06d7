//! Ties the pieces together: observed statistics, the null population, the
//! counting strategy chosen by the tractability gate, and the final P-value.

use diffanal_core::ConditionCounts;
use indicatif::ProgressBar;
use log::{debug, info, warn};
use rand::SeedableRng;
use rand::rngs::StdRng;
#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::config::PValueConfig;
use crate::counter::{CancelToken, NullDistribution};
use crate::errors::PValueError;
use crate::models::{
    CountingMode, NullCount, ObservedStatistics, PValueReport, StabilityCheck, TotalSubsets,
};
use crate::population::FoldChangePopulation;

#[derive(Debug, Clone, Default)]
pub struct PValueEngine {
    config: PValueConfig,
    cancel: CancelToken,
    progress: Option<ProgressBar>,
}

impl PValueEngine {
    pub fn new(config: PValueConfig) -> Self {
        PValueEngine {
            config,
            cancel: CancelToken::new(),
            progress: None,
        }
    }

    pub fn with_cancel_token(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Report exact enumeration progress on `progress`.
    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = Some(progress);
        self
    }

    pub fn config(&self) -> &PValueConfig {
        &self.config
    }

    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    pub fn mode_for(&self, replicates: usize) -> CountingMode {
        if replicates <= self.config.exact_max_replicates {
            CountingMode::Exact
        } else {
            CountingMode::Estimated
        }
    }

    /// Number of counting trials for an estimated result.
    pub fn trials_for(&self, replicates: usize) -> usize {
        if replicates > self.config.stability_replicate_cutoff {
            self.config.stability_trials
        } else {
            1
        }
    }

    fn trial_rng(&self, trial: usize) -> StdRng {
        match self.config.seed {
            Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(trial as u64)),
            None => StdRng::from_os_rng(),
        }
    }

    fn sampled_trial(
        &self,
        population: &FoldChangePopulation,
        replicates: usize,
        observed_mean: f64,
        trial: usize,
    ) -> Result<NullCount, PValueError> {
        let mut rng = self.trial_rng(trial);
        let count = population.count_sampled(
            replicates,
            observed_mean,
            self.config.sample_draws,
            &mut rng,
        )?;
        debug!(
            "Trial {}: {} of {} sampled subsets at or above {:.5}",
            trial, count.at_or_above, count.examined, observed_mean
        );
        Ok(count)
    }

    ///
    /// Run the counter chosen for `replicates` against `population`.
    ///
    /// Exact mode returns a single count. Estimated mode returns one count per
    /// stability trial, each from an independently seeded random source.
    ///
    pub fn count(
        &self,
        population: &FoldChangePopulation,
        replicates: usize,
        observed_mean: f64,
    ) -> Result<Vec<NullCount>, PValueError> {
        match self.mode_for(replicates) {
            CountingMode::Exact => {
                let count = population.count_exact(
                    replicates,
                    observed_mean,
                    &self.cancel,
                    self.progress.as_ref(),
                )?;
                Ok(vec![count])
            }
            CountingMode::Estimated => {
                let trials = self.trials_for(replicates);
                info!(
                    "{} replicates exceeds the exact limit of {}, estimating from {} x {} random subsets",
                    replicates, self.config.exact_max_replicates, trials, self.config.sample_draws
                );

                #[cfg(feature = "parallel")]
                if self.config.parallel {
                    return (0..trials)
                        .into_par_iter()
                        .map(|trial| self.sampled_trial(population, replicates, observed_mean, trial))
                        .collect();
                }

                (0..trials)
                    .map(|trial| self.sampled_trial(population, replicates, observed_mean, trial))
                    .collect()
            }
        }
    }

    ///
    /// Compute the full report for one pair of condition counts.
    ///
    pub fn run(&self, counts: &ConditionCounts) -> Result<PValueReport, PValueError> {
        let replicates = counts.replicates();
        let observed = ObservedStatistics::try_from(counts)?;
        let population = FoldChangePopulation::from_condition_counts(counts)?;
        let summary = population.summary();
        info!(
            "Population of {} fold changes (less = {}, more = {}, equal = {}), H0 mean = {:.5}",
            summary.size, summary.less, summary.more, summary.equal, summary.mean
        );

        let mode = self.mode_for(replicates);
        let total_possible = TotalSubsets::compute(population.len(), replicates);
        if total_possible.exact().is_none() {
            warn!(
                "C({}, {}) exceeds the representable range",
                population.len(),
                replicates
            );
        }

        let trials = self.count(&population, replicates, observed.mean)?;
        let p_values = trials
            .iter()
            .map(NullCount::p_value)
            .collect::<Result<Vec<f64>, PValueError>>()?;

        let (p_value, stability) = match mode {
            CountingMode::Exact => (p_values[0], None),
            CountingMode::Estimated => {
                let stability = StabilityCheck::from_p_values(p_values).ok_or(
                    PValueError::InvalidInput("no down-sampling trials were run".to_string()),
                )?;
                (stability.mean, Some(stability))
            }
        };

        Ok(PValueReport {
            counts: counts.clone(),
            observed,
            population: summary,
            mode,
            total_possible,
            trials,
            stability,
            p_value,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PValueConfigBuilder;
    use pretty_assertions::assert_eq;
    use rstest::*;

    #[fixture]
    fn engine() -> PValueEngine {
        PValueEngine::new(
            PValueConfig::builder()
                .with_sample_draws(2_000)
                .with_seed(17)
                .finish()
                .unwrap(),
        )
    }

    #[rstest]
    #[case(3, CountingMode::Exact, 1)]
    #[case(5, CountingMode::Exact, 1)]
    #[case(10, CountingMode::Exact, 5)]
    #[case(11, CountingMode::Estimated, 5)]
    fn test_policy(
        engine: PValueEngine,
        #[case] replicates: usize,
        #[case] mode: CountingMode,
        #[case] trials: usize,
    ) {
        assert_eq!(engine.mode_for(replicates), mode);
        assert_eq!(engine.trials_for(replicates), trials);
    }

    #[rstest]
    fn test_exact_run(engine: PValueEngine) {
        let counts = ConditionCounts::from_integer_counts(&[90, 100, 110], &[180, 200, 220]).unwrap();
        let report = engine.run(&counts).unwrap();

        assert!(report.is_exact());
        assert_eq!(report.total_possible, TotalSubsets::Exact { value: 4060 });
        assert_eq!(report.trials.len(), 1);
        assert_eq!(report.stability, None);
        assert_eq!(report.observed.mean, 2.0);
        assert!(report.p_value > 0.0 && report.p_value < 0.1);
    }

    #[rstest]
    fn test_lowered_gate_switches_to_estimate() {
        let engine = PValueEngine::new(
            PValueConfig::builder()
                .with_exact_max_replicates(2)
                .with_stability_replicate_cutoff(2)
                .with_stability_trials(3)
                .with_sample_draws(1_000)
                .with_seed(5)
                .with_parallel(false)
                .finish()
                .unwrap(),
        );
        let counts = ConditionCounts::from_integer_counts(&[90, 100, 110], &[180, 200, 220]).unwrap();
        let report = engine.run(&counts).unwrap();

        assert_eq!(report.mode, CountingMode::Estimated);
        assert_eq!(report.trials.len(), 3);
        assert!(report.trials.iter().all(|t| t.examined == 1_000));
        let stability = report.stability.unwrap();
        assert_eq!(stability.p_values.len(), 3);
        assert_eq!(report.p_value, stability.mean);
    }

    #[rstest]
    fn test_parallel_and_sequential_trials_match() {
        let config = PValueConfig::builder()
            .with_exact_max_replicates(2)
            .with_stability_replicate_cutoff(2)
            .with_stability_trials(4)
            .with_sample_draws(500)
            .with_seed(99)
            .finish()
            .unwrap();
        let parallel = PValueEngine::new(
            PValueConfigBuilder::from_config(config.clone())
                .with_parallel(true)
                .finish()
                .unwrap(),
        );
        let sequential = PValueEngine::new(
            PValueConfigBuilder::from_config(config.clone())
                .with_parallel(false)
                .finish()
                .unwrap(),
        );
        let counts = ConditionCounts::from_integer_counts(&[90, 100, 110], &[180, 200, 220]).unwrap();

        let parallel = parallel.run(&counts).unwrap();
        let sequential = sequential.run(&counts).unwrap();
        assert_eq!(parallel.mode, CountingMode::Estimated);
        assert_eq!(parallel.trials.len(), 4);
        assert_eq!(parallel.trials, sequential.trials);
        assert_eq!(parallel.p_value, sequential.p_value);
    }

    #[rstest]
    fn test_cancelled_engine_reports_error() {
        let engine = PValueEngine::default();
        engine.cancel_token().cancel();

        let counts = ConditionCounts::try_new(
            (1..=8).map(|c| c as f64 * 10.0).collect(),
            (1..=8).map(|c| c as f64 * 13.0).collect(),
        )
        .unwrap();
        let err = engine.run(&counts).unwrap_err();
        assert!(matches!(err, PValueError::Cancelled { .. }));
    }
}
