//! Counting the subsets of a fold-change population whose mean reaches the
//! observed mean.
//!
//! Two strategies are provided:
//!
//! - [`NullDistribution::count_exact`] visits every size-k subset once, in
//!   lexicographic index order, keeping running prefix sums so each step only
//!   re-adds the indices that changed.
//! - [`NullDistribution::count_sampled`] draws random size-k subsets (without
//!   replacement inside a subset) and reports the hit fraction. Repeated calls
//!   may legitimately disagree.
//!
//! "At or above" is a plain IEEE `>=` on the subset mean, so ties count.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use indicatif::ProgressBar;
use log::debug;
use rand::Rng;
use rand::seq::index;

use crate::consts::CANCEL_POLL_INTERVAL;
use crate::errors::PValueError;
use crate::models::{CountingMode, NullCount, TotalSubsets};
use crate::population::FoldChangePopulation;

/// Shared flag used to stop a long exact enumeration from another thread.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }
}

pub trait NullDistribution {
    /// Count every size-`replicates` subset with mean `>= observed_mean`.
    ///
    /// Polls `cancel` periodically and advances `progress`, if given, by the
    /// number of subsets visited.
    fn count_exact(
        &self,
        replicates: usize,
        observed_mean: f64,
        cancel: &CancelToken,
        progress: Option<&ProgressBar>,
    ) -> Result<NullCount, PValueError>;

    /// Estimate the same count from `draws` random subsets.
    fn count_sampled<R: Rng>(
        &self,
        replicates: usize,
        observed_mean: f64,
        draws: u64,
        rng: &mut R,
    ) -> Result<NullCount, PValueError>;
}

fn check_preconditions(
    population_size: usize,
    replicates: usize,
    observed_mean: f64,
) -> Result<(), PValueError> {
    if population_size == 0 {
        return Err(PValueError::InvalidInput(
            "fold-change population is empty".to_string(),
        ));
    }
    if replicates == 0 {
        return Err(PValueError::InvalidInput(
            "replicates must be > 0".to_string(),
        ));
    }
    if replicates > population_size {
        return Err(PValueError::InvalidInput(format!(
            "replicates ({}) exceeds the population size ({})",
            replicates, population_size
        )));
    }
    if !(observed_mean.is_finite() && observed_mean > 0.0) {
        return Err(PValueError::InvalidInput(format!(
            "observed mean must be finite and positive, got {}",
            observed_mean
        )));
    }
    Ok(())
}

impl NullDistribution for FoldChangePopulation {
    fn count_exact(
        &self,
        replicates: usize,
        observed_mean: f64,
        cancel: &CancelToken,
        progress: Option<&ProgressBar>,
    ) -> Result<NullCount, PValueError> {
        let values = self.values();
        let m = values.len();
        let k = replicates;
        check_preconditions(m, k, observed_mean)?;

        let total = TotalSubsets::compute(m, k)
            .exact()
            .ok_or(PValueError::ArithmeticOverflow { n: m, k })?;
        debug!("Enumerating {} subsets of {} fold changes", total, m);

        if let Some(pb) = progress {
            pb.set_length(u64::try_from(total).unwrap_or(u64::MAX));
        }

        // prefix[j] is the sum of values[idx[0..j]]
        let mut idx: Vec<usize> = (0..k).collect();
        let mut prefix = vec![0.0; k + 1];
        for j in 0..k {
            prefix[j + 1] = prefix[j] + values[idx[j]];
        }

        let k_f64 = k as f64;
        let mut at_or_above: u128 = 0;
        let mut visited: u128 = 0;

        'enumerate: loop {
            if prefix[k] / k_f64 >= observed_mean {
                at_or_above += 1;
            }
            visited += 1;

            if visited % CANCEL_POLL_INTERVAL == 0 {
                if cancel.is_cancelled() {
                    return Err(PValueError::Cancelled { visited });
                }
                if let Some(pb) = progress {
                    pb.inc(CANCEL_POLL_INTERVAL as u64);
                }
            }

            // rightmost index that can still move
            let mut i = k;
            loop {
                if i == 0 {
                    break 'enumerate;
                }
                i -= 1;
                if idx[i] < m - k + i {
                    break;
                }
            }

            idx[i] += 1;
            prefix[i + 1] = prefix[i] + values[idx[i]];
            for j in (i + 1)..k {
                idx[j] = idx[j - 1] + 1;
                prefix[j + 1] = prefix[j] + values[idx[j]];
            }
        }

        if let Some(pb) = progress {
            pb.set_position(u64::try_from(visited).unwrap_or(u64::MAX));
        }

        // every subset is visited exactly once
        debug_assert_eq!(visited, total);

        Ok(NullCount {
            mode: CountingMode::Exact,
            at_or_above,
            examined: total,
            estimated_at_or_above: None,
        })
    }

    fn count_sampled<R: Rng>(
        &self,
        replicates: usize,
        observed_mean: f64,
        draws: u64,
        rng: &mut R,
    ) -> Result<NullCount, PValueError> {
        let values = self.values();
        let m = values.len();
        check_preconditions(m, replicates, observed_mean)?;
        if draws == 0 {
            return Err(PValueError::InvalidInput(
                "number of random draws must be > 0".to_string(),
            ));
        }

        let k_f64 = replicates as f64;
        let mut hits: u64 = 0;
        for _ in 0..draws {
            let sum: f64 = index::sample(rng, m, replicates)
                .iter()
                .map(|i| values[i])
                .sum();
            if sum / k_f64 >= observed_mean {
                hits += 1;
            }
        }

        let fraction = hits as f64 / draws as f64;
        let estimated_at_or_above = TotalSubsets::compute(m, replicates)
            .exact()
            .map(|total| (fraction * total as f64).round() as u128);

        Ok(NullCount {
            mode: CountingMode::Estimated,
            at_or_above: hits as u128,
            examined: draws as u128,
            estimated_at_or_above,
        })
    }
}
