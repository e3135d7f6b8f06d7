use std::fmt::{self, Display};

use crate::errors::CountsError;
use crate::utils::is_usable_ratio;

///
/// Raw counts for one feature measured under two conditions, one value per
/// replicate. Replicate `i` of condition 1 is paired with replicate `i` of
/// condition 2.
///
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ConditionCounts {
    cond1: Vec<f64>,
    cond2: Vec<f64>,
}

impl ConditionCounts {
    ///
    /// Build a validated pair of count vectors.
    ///
    /// Both conditions must have the same, non-zero number of replicates and
    /// every count must be finite and strictly positive, since counts end up
    /// as fold-change divisors. The largest and smallest pooled counts must
    /// also divide to a finite, non-zero ratio both ways, so no fold change
    /// built from these counts can overflow or underflow.
    ///
    pub fn try_new(cond1: Vec<f64>, cond2: Vec<f64>) -> Result<Self, CountsError> {
        if cond1.len() != cond2.len() {
            return Err(CountsError::MismatchedLengths {
                cond1: cond1.len(),
                cond2: cond2.len(),
            });
        }
        if cond1.is_empty() {
            return Err(CountsError::NoReplicates);
        }

        for (condition, values) in [(1, &cond1), (2, &cond2)] {
            for (replicate, &value) in values.iter().enumerate() {
                if !value.is_finite() {
                    return Err(CountsError::NonFiniteCount {
                        index: (condition - 1) * values.len() + replicate,
                    });
                }
                if value <= 0.0 {
                    return Err(CountsError::NonPositiveCount {
                        condition,
                        replicate,
                        value,
                    });
                }
            }
        }

        let counts = ConditionCounts { cond1, cond2 };
        counts.check_ratio_range()?;
        Ok(counts)
    }

    /// Convenience constructor for integer read counts.
    pub fn from_integer_counts(cond1: &[u64], cond2: &[u64]) -> Result<Self, CountsError> {
        Self::try_new(
            cond1.iter().map(|&c| c as f64).collect(),
            cond2.iter().map(|&c| c as f64).collect(),
        )
    }

    fn check_ratio_range(&self) -> Result<(), CountsError> {
        let pooled = self.pooled();
        let (mut lo, mut hi) = (0, 0);
        for (index, &value) in pooled.iter().enumerate() {
            if value < pooled[lo] {
                lo = index;
            }
            if value > pooled[hi] {
                hi = index;
            }
        }

        // every pairwise ratio lies between these two
        if is_usable_ratio(pooled[hi] / pooled[lo]) && is_usable_ratio(pooled[lo] / pooled[hi]) {
            Ok(())
        } else {
            Err(CountsError::FoldChangeOutOfRange {
                numerator: hi,
                denominator: lo,
            })
        }
    }

    pub fn replicates(&self) -> usize {
        self.cond1.len()
    }

    pub fn cond1(&self) -> &[f64] {
        &self.cond1
    }

    pub fn cond2(&self) -> &[f64] {
        &self.cond2
    }

    ///
    /// All `2 * replicates` samples, condition 1 first.
    ///
    pub fn pooled(&self) -> Vec<f64> {
        self.cond1.iter().chain(self.cond2.iter()).copied().collect()
    }

    ///
    /// The observed fold changes: condition 2 over condition 1, per replicate.
    ///
    pub fn paired_fold_changes(&self) -> Vec<f64> {
        self.cond1
            .iter()
            .zip(self.cond2.iter())
            .map(|(c1, c2)| c2 / c1)
            .collect()
    }
}

impl Display for ConditionCounts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Cond1 Cond2")?;
        for (c1, c2) in self.cond1.iter().zip(self.cond2.iter()) {
            writeln!(f, "{:5} {:5} {:0.5}", c1, c2, c2 / c1)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::*;

    #[rstest]
    fn test_paired_fold_changes() {
        let counts = ConditionCounts::from_integer_counts(&[90, 100, 110], &[180, 200, 220]).unwrap();
        assert_eq!(counts.replicates(), 3);
        assert_eq!(counts.paired_fold_changes(), vec![2.0, 2.0, 2.0]);
        assert_eq!(
            counts.pooled(),
            vec![90.0, 100.0, 110.0, 180.0, 200.0, 220.0]
        );
    }

    #[rstest]
    #[case(vec![1.0, 2.0], vec![1.0], CountsError::MismatchedLengths { cond1: 2, cond2: 1 })]
    #[case(vec![], vec![], CountsError::NoReplicates)]
    #[case(vec![1.0, 0.0], vec![1.0, 2.0], CountsError::NonPositiveCount { condition: 1, replicate: 1, value: 0.0 })]
    #[case(vec![1.0, 2.0], vec![-3.0, 2.0], CountsError::NonPositiveCount { condition: 2, replicate: 0, value: -3.0 })]
    #[case(vec![1.0, 2.0], vec![2.0, f64::INFINITY], CountsError::NonFiniteCount { index: 3 })]
    #[case(vec![1e-200, 1.0], vec![1.0, 1e200], CountsError::FoldChangeOutOfRange { numerator: 3, denominator: 0 })]
    #[case(vec![1.0], vec![1e-310], CountsError::FoldChangeOutOfRange { numerator: 0, denominator: 1 })]
    fn test_rejects_invalid_counts(
        #[case] cond1: Vec<f64>,
        #[case] cond2: Vec<f64>,
        #[case] expected: CountsError,
    ) {
        assert_eq!(ConditionCounts::try_new(cond1, cond2).unwrap_err(), expected);
    }

    #[rstest]
    fn test_accepts_wide_but_representable_range() {
        let counts = ConditionCounts::try_new(vec![1e-150, 1.0], vec![1.0, 1e150]).unwrap();
        assert!(counts.paired_fold_changes().iter().all(|fc| fc.is_finite() && *fc > 1e149));
    }

    #[rstest]
    fn test_display_lists_pairs() {
        let counts = ConditionCounts::from_integer_counts(&[100], &[250]).unwrap();
        let shown = counts.to_string();
        assert!(shown.starts_with("Cond1 Cond2\n"));
        assert!(shown.contains("2.50000"));
    }
}
