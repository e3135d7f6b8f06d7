//! Median-of-ratios size factors.
//!
//! 1. Take the log of every count.
//! 2. Average the logs of each target across samples (the pseudo-reference).
//! 3. Drop targets whose pseudo-reference is `-inf`, i.e. with any zero count.
//! 4. Subtract the pseudo-reference from each log count; this is the log of
//!    the ratio to the reference.
//! 5. The size factor of a sample is `exp` of the median of its log ratios.

use log::debug;

use crate::errors::NormalizeError;
use crate::models::CountTable;

fn median(values: &mut [f64]) -> f64 {
    values.sort_by(f64::total_cmp);
    let n = values.len();
    if n % 2 == 0 {
        (values[n / 2 - 1] + values[n / 2]) / 2.0
    } else {
        values[n / 2]
    }
}

pub fn size_factors(table: &CountTable) -> Result<Vec<f64>, NormalizeError> {
    let n_samples = table.n_samples();
    let mut log_ratios: Vec<Vec<f64>> = vec![Vec::with_capacity(table.n_targets()); n_samples];

    for row in &table.counts {
        let logs: Vec<f64> = row.iter().map(|c| c.ln()).collect();
        let reference = logs.iter().sum::<f64>() / n_samples as f64;
        if !reference.is_finite() {
            continue;
        }
        for (sample, log_count) in logs.iter().enumerate() {
            log_ratios[sample].push(log_count - reference);
        }
    }

    let usable = log_ratios.first().map_or(0, Vec::len);
    if usable == 0 {
        return Err(NormalizeError::NoUsableTargets);
    }
    debug!(
        "{} of {} targets usable for size factors",
        usable,
        table.n_targets()
    );

    Ok(log_ratios
        .iter_mut()
        .map(|ratios| median(ratios).exp())
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::*;

    fn table(counts: Vec<Vec<f64>>) -> CountTable {
        let n_samples = counts[0].len();
        CountTable {
            target_ids: (0..counts.len()).map(|i| format!("tx{}", i)).collect(),
            samples: (0..n_samples).map(|i| format!("s{}", i)).collect(),
            counts,
        }
    }

    #[rstest]
    fn test_double_depth_sample() {
        // sample 1 is sample 0 sequenced twice as deep
        let t = table(vec![
            vec![10.0, 20.0],
            vec![50.0, 100.0],
            vec![3.0, 6.0],
        ]);
        let factors = size_factors(&t).unwrap();
        assert!((factors[0] - 1.0 / 2f64.sqrt()).abs() < 1e-12);
        assert!((factors[1] - 2f64.sqrt()).abs() < 1e-12);

        let normalized = t.normalize().unwrap();
        for row in &normalized.counts {
            assert!((row[0] - row[1]).abs() < 1e-9);
        }
    }

    #[rstest]
    fn test_zero_targets_are_skipped() {
        let t = table(vec![vec![0.0, 5.0], vec![10.0, 10.0]]);
        assert_eq!(size_factors(&t).unwrap(), vec![1.0, 1.0]);

        // normalized zero stays zero
        assert_eq!(t.normalize().unwrap().counts[0][0], 0.0);
    }

    #[rstest]
    fn test_no_usable_targets() {
        let t = table(vec![vec![0.0, 5.0], vec![10.0, 0.0]]);
        assert!(matches!(size_factors(&t), Err(NormalizeError::NoUsableTargets)));
    }

    #[rstest]
    #[case(vec![3.0, 1.0, 2.0], 2.0)]
    #[case(vec![4.0, 1.0, 3.0, 2.0], 2.5)]
    fn test_median(#[case] mut values: Vec<f64>, #[case] expected: f64) {
        assert_eq!(median(&mut values), expected);
    }
}
