//! The null-hypothesis fold-change population.
//!
//! Every unordered pair of pooled samples contributes both of its fold
//! changes, `a/b` and `b/a`, so that under the null hypothesis a fold change
//! is as likely to fall below 1 as above it.

use diffanal_core::utils::{binomial, combinations, is_usable_ratio};
use diffanal_core::{ConditionCounts, CountsError};

use crate::errors::PValueError;
use crate::models::PopulationSummary;

#[derive(Debug, Clone, PartialEq)]
pub struct FoldChangePopulation {
    values: Vec<f64>,
}

impl FoldChangePopulation {
    ///
    /// Build the reciprocal-closed population from pooled sample counts.
    ///
    /// For the pair `(i, j)`, `i < j`, at pair index `p`, `counts[i] / counts[j]`
    /// lands at position `p` and its reciprocal at `p + C(n, 2)`. Both must be
    /// finite and strictly positive; counts too far apart to divide are
    /// rejected here, before any counting.
    ///
    pub fn from_counts(counts: &[f64]) -> Result<Self, PValueError> {
        if counts.len() < 2 {
            return Err(CountsError::TooFewSamples(counts.len()).into());
        }
        for (index, &value) in counts.iter().enumerate() {
            if !value.is_finite() {
                return Err(CountsError::NonFiniteCount { index }.into());
            }
            if value <= 0.0 {
                return Err(CountsError::NonPositiveSample { index, value }.into());
            }
        }

        let half = binomial(counts.len() as u64, 2)
            .and_then(|h| usize::try_from(h).ok())
            .ok_or(PValueError::ArithmeticOverflow {
                n: counts.len(),
                k: 2,
            })?;

        let mut values = vec![0.0; half * 2];
        for (p, pair) in combinations(counts.len(), 2).enumerate() {
            let fc = counts[pair[0]] / counts[pair[1]];
            if !is_usable_ratio(fc) {
                return Err(CountsError::FoldChangeOutOfRange {
                    numerator: pair[0],
                    denominator: pair[1],
                }
                .into());
            }
            values[p] = fc;
            values[p + half] = 1.0 / fc;
        }

        Ok(FoldChangePopulation { values })
    }

    /// Pool both conditions and build their population.
    pub fn from_condition_counts(counts: &ConditionCounts) -> Result<Self, PValueError> {
        Self::from_counts(&counts.pooled())
    }

    ///
    /// Wrap an arbitrary list of fold changes. No reciprocal pairing is
    /// enforced; the values only have to be finite and positive.
    ///
    pub fn from_fold_changes(values: Vec<f64>) -> Result<Self, PValueError> {
        if values.is_empty() {
            return Err(PValueError::InvalidInput(
                "fold-change population is empty".to_string(),
            ));
        }
        if let Some((index, value)) = values
            .iter()
            .enumerate()
            .find(|(_, v)| !(v.is_finite() && **v > 0.0))
        {
            return Err(PValueError::InvalidInput(format!(
                "fold change {} at index {} must be finite and positive",
                value, index
            )));
        }
        Ok(FoldChangePopulation { values })
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Number of single fold changes `>= threshold`.
    pub fn count_at_or_above(&self, threshold: f64) -> usize {
        self.values.iter().filter(|&&v| v >= threshold).count()
    }

    pub fn summary(&self) -> PopulationSummary {
        let (mut less, mut more, mut equal) = (0, 0, 0);
        for &v in &self.values {
            if v < 1.0 {
                less += 1;
            } else if v > 1.0 {
                more += 1;
            } else {
                equal += 1;
            }
        }

        PopulationSummary {
            size: self.values.len(),
            less,
            more,
            equal,
            mean: self.values.iter().sum::<f64>() / self.values.len() as f64,
        }
    }
}
