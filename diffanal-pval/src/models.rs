use std::fmt::{self, Display};

use diffanal_core::ConditionCounts;
use diffanal_core::utils::{binomial, ln_binomial};
use serde::Serialize;

use crate::errors::PValueError;

/// Mean, standard deviation and spread of the observed paired fold changes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ObservedStatistics {
    /// Number of paired fold changes the statistics were computed from
    pub replicates: usize,
    /// Arithmetic mean, the test statistic
    pub mean: f64,
    /// Population (not sample) standard deviation
    pub stddev: f64,
    /// Maximum minus minimum
    pub spread: f64,
}

/// Shape of the full fold-change population under the null hypothesis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PopulationSummary {
    /// Number of fold-change values, `2 * C(samples, 2)`
    pub size: usize,
    /// Values below 1
    pub less: usize,
    /// Values above 1
    pub more: usize,
    /// Values exactly 1
    pub equal: usize,
    /// Mean of all values, >= 1 by reciprocal pairing
    pub mean: f64,
}

/// How a null count was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CountingMode {
    /// Every subset was enumerated
    Exact,
    /// Subsets were randomly down-sampled; the count is an estimate
    Estimated,
}

impl Display for CountingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CountingMode::Exact => write!(f, "exact"),
            CountingMode::Estimated => write!(f, "estimated"),
        }
    }
}

/// The number of size-k subsets of a population of size n.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TotalSubsets {
    Exact { value: u128 },
    /// C(n, k) overflows a `u128`; only its natural log is known
    ExceedsRange { ln_value: f64 },
}

impl TotalSubsets {
    pub fn compute(n: usize, k: usize) -> Self {
        match binomial(n as u64, k as u64) {
            Some(value) => TotalSubsets::Exact { value },
            None => TotalSubsets::ExceedsRange {
                ln_value: ln_binomial(n as u64, k as u64),
            },
        }
    }

    pub fn exact(&self) -> Option<u128> {
        match self {
            TotalSubsets::Exact { value } => Some(*value),
            TotalSubsets::ExceedsRange { .. } => None,
        }
    }
}

impl Display for TotalSubsets {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TotalSubsets::Exact { value } => write!(f, "{}", value),
            TotalSubsets::ExceedsRange { ln_value } => {
                write!(f, "> 2^128 (~10^{:.1})", ln_value / std::f64::consts::LN_10)
            }
        }
    }
}

/// Result of one pass of the null-distribution counter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct NullCount {
    pub mode: CountingMode,
    /// Exact: subsets with mean >= the observed mean.
    /// Estimated: drawn subsets with mean >= the observed mean.
    pub at_or_above: u128,
    /// Exact: all possible subsets. Estimated: subsets drawn.
    pub examined: u128,
    /// Estimated mode only: `at_or_above / examined` scaled to C(n, k), when
    /// that total is representable.
    pub estimated_at_or_above: Option<u128>,
}

impl NullCount {
    pub fn p_value(&self) -> Result<f64, PValueError> {
        p_value(self.at_or_above, self.examined)
    }
}

///
/// Fraction of subsets at or above the observed mean.
///
/// A zero total cannot happen for valid inputs and is reported as an error
/// rather than producing NaN.
///
pub fn p_value(at_or_above: u128, total: u128) -> Result<f64, PValueError> {
    if total == 0 {
        return Err(PValueError::ZeroTotal);
    }
    if at_or_above > total {
        return Err(PValueError::InvalidInput(format!(
            "{} subsets at or above the observed mean out of only {}",
            at_or_above, total
        )));
    }
    Ok(at_or_above as f64 / total as f64)
}

/// Spread of P-values across repeated down-sampling trials.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StabilityCheck {
    pub p_values: Vec<f64>,
    pub mean: f64,
    pub stddev: f64,
    pub spread: f64,
}

impl StabilityCheck {
    pub fn from_p_values(p_values: Vec<f64>) -> Option<Self> {
        if p_values.is_empty() {
            return None;
        }
        let n = p_values.len() as f64;
        let mean = p_values.iter().sum::<f64>() / n;
        let var = p_values.iter().map(|p| (p - mean) * (p - mean)).sum::<f64>() / n;
        let min = p_values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = p_values.iter().copied().fold(f64::NEG_INFINITY, f64::max);

        Some(StabilityCheck {
            mean,
            stddev: var.sqrt(),
            spread: max - min,
            p_values,
        })
    }

    /// True when every trial landed within `tolerance` of every other.
    pub fn is_stable(&self, tolerance: f64) -> bool {
        self.spread <= tolerance
    }
}

/// Everything computed for one feature.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PValueReport {
    pub counts: ConditionCounts,
    pub observed: ObservedStatistics,
    pub population: PopulationSummary,
    pub mode: CountingMode,
    pub total_possible: TotalSubsets,
    pub trials: Vec<NullCount>,
    /// Present for estimated results only
    pub stability: Option<StabilityCheck>,
    /// The exact P-value, or the mean of the trial estimates
    pub p_value: f64,
}

impl PValueReport {
    pub fn is_exact(&self) -> bool {
        self.mode == CountingMode::Exact
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::*;

    #[rstest]
    fn test_total_subsets_exact() {
        assert_eq!(TotalSubsets::compute(30, 3), TotalSubsets::Exact { value: 4060 });
        assert_eq!(TotalSubsets::compute(30, 3).to_string(), "4060");
    }

    #[rstest]
    fn test_total_subsets_exceeds_range() {
        let total = TotalSubsets::compute(10_000, 60);
        assert_eq!(total.exact(), None);
        assert!(total.to_string().starts_with("> 2^128"));
    }

    #[rstest]
    #[case(1, 4, 0.25)]
    #[case(0, 4, 0.0)]
    #[case(4, 4, 1.0)]
    fn test_p_value(#[case] at_or_above: u128, #[case] total: u128, #[case] expected: f64) {
        assert_eq!(p_value(at_or_above, total).unwrap(), expected);
    }

    #[rstest]
    fn test_p_value_rejects_zero_total() {
        assert!(matches!(p_value(0, 0), Err(PValueError::ZeroTotal)));
        assert!(matches!(p_value(5, 4), Err(PValueError::InvalidInput(_))));
    }

    #[rstest]
    fn test_stability_check() {
        let check = StabilityCheck::from_p_values(vec![0.1, 0.12, 0.11]).unwrap();
        assert!((check.mean - 0.11).abs() < 1e-12);
        assert!((check.spread - 0.02).abs() < 1e-12);
        assert!(check.is_stable(0.05));
        assert!(!check.is_stable(0.01));
        assert_eq!(StabilityCheck::from_p_values(vec![]), None);
    }
}
