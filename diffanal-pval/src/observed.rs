use diffanal_core::ConditionCounts;

use crate::errors::PValueError;
use crate::models::ObservedStatistics;

impl ObservedStatistics {
    ///
    /// Mean, population standard deviation (two-pass) and spread of the
    /// observed fold changes, one per replicate.
    ///
    pub fn from_fold_changes(fold_changes: &[f64]) -> Result<Self, PValueError> {
        if fold_changes.is_empty() {
            return Err(PValueError::InvalidInput(
                "no observed fold changes".to_string(),
            ));
        }
        if fold_changes.iter().any(|fc| !(fc.is_finite() && *fc > 0.0)) {
            return Err(PValueError::InvalidInput(
                "observed fold changes must be finite and positive".to_string(),
            ));
        }

        let n = fold_changes.len() as f64;
        let mean = fold_changes.iter().sum::<f64>() / n;
        let var_sum: f64 = fold_changes
            .iter()
            .map(|fc| (fc - mean) * (fc - mean))
            .sum();

        let (min, max) = fold_changes
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &fc| {
                (lo.min(fc), hi.max(fc))
            });

        Ok(ObservedStatistics {
            replicates: fold_changes.len(),
            mean,
            stddev: (var_sum / n).sqrt(),
            spread: max - min,
        })
    }
}

impl TryFrom<&ConditionCounts> for ObservedStatistics {
    type Error = PValueError;

    fn try_from(counts: &ConditionCounts) -> Result<Self, Self::Error> {
        ObservedStatistics::from_fold_changes(&counts.paired_fold_changes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::*;

    #[rstest]
    fn test_known_values() {
        let stats = ObservedStatistics::from_fold_changes(&[1.0, 2.0, 3.0, 4.0]).unwrap();
        assert_eq!(stats.replicates, 4);
        assert_eq!(stats.mean, 2.5);
        // population variance: (2.25 + 0.25 + 0.25 + 2.25) / 4
        assert!((stats.stddev - 1.25_f64.sqrt()).abs() < 1e-12);
        assert_eq!(stats.spread, 3.0);
    }

    #[rstest]
    fn test_from_condition_counts() {
        let counts = ConditionCounts::from_integer_counts(&[100, 100, 100], &[100, 100, 100]).unwrap();
        let stats = ObservedStatistics::try_from(&counts).unwrap();
        assert_eq!(stats.mean, 1.0);
        assert_eq!(stats.stddev, 0.0);
        assert_eq!(stats.spread, 0.0);
    }

    #[rstest]
    fn test_single_replicate() {
        let stats = ObservedStatistics::from_fold_changes(&[1.7]).unwrap();
        assert_eq!(stats.mean, 1.7);
        assert_eq!(stats.stddev, 0.0);
        assert_eq!(stats.spread, 0.0);
    }

    #[rstest]
    fn test_rejects_empty_and_non_finite() {
        assert!(ObservedStatistics::from_fold_changes(&[]).is_err());
        assert!(ObservedStatistics::from_fold_changes(&[1.0, f64::INFINITY]).is_err());
        assert!(ObservedStatistics::from_fold_changes(&[1.0, 0.0]).is_err());
    }
}
