//! Random demo counts for a two-condition experiment.
//!
//! Each replicate is drawn uniformly around the condition mean, within
//! `max_deviation` (a fraction of the mean) on either side. Useful for trying
//! out the P-value engine without real data.

use rand::Rng;

use crate::errors::CountsError;
use crate::models::ConditionCounts;

fn draw_count<R: Rng>(rng: &mut R, mean: u64, max_deviation: f64) -> f64 {
    let half_width = mean as f64 * max_deviation;
    let span = (half_width * 2.0) as u64;
    let offset = rng.random_range(0..span);
    (mean as f64 + offset as f64 - half_width).trunc().max(1.0)
}

///
/// Simulate `replicates` paired counts around `count1_mean` and `count2_mean`.
///
/// The means are swapped if needed so that condition 2 is the higher one.
///
/// # Arguments
/// * `count1_mean` - mean count of condition 1
/// * `count2_mean` - mean count of condition 2
/// * `max_deviation` - maximum relative deviation from the mean, in `(0, 1)`
/// * `replicates` - number of replicates per condition
/// * `rng` - random source
pub fn simulate_counts<R: Rng>(
    count1_mean: u64,
    count2_mean: u64,
    max_deviation: f64,
    replicates: usize,
    rng: &mut R,
) -> Result<ConditionCounts, CountsError> {
    if replicates == 0 {
        return Err(CountsError::NoReplicates);
    }
    if !(max_deviation > 0.0 && max_deviation < 1.0) {
        return Err(CountsError::Simulation(format!(
            "max deviation must be in (0, 1), got {}",
            max_deviation
        )));
    }

    let (low, high) = if count1_mean > count2_mean {
        (count2_mean, count1_mean)
    } else {
        (count1_mean, count2_mean)
    };
    if low == 0 {
        return Err(CountsError::Simulation("count means must be > 0".to_string()));
    }
    if (low as f64 * max_deviation * 2.0) < 1.0 {
        return Err(CountsError::Simulation(format!(
            "deviation window for mean {} is empty at max deviation {}",
            low, max_deviation
        )));
    }

    let mut cond1 = Vec::with_capacity(replicates);
    let mut cond2 = Vec::with_capacity(replicates);
    for _ in 0..replicates {
        cond1.push(draw_count(rng, low, max_deviation));
        cond2.push(draw_count(rng, high, max_deviation));
    }

    ConditionCounts::try_new(cond1, cond2)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use rstest::*;

    #[fixture]
    fn rng() -> StdRng {
        StdRng::seed_from_u64(42)
    }

    #[rstest]
    fn test_counts_stay_within_deviation(mut rng: StdRng) {
        let counts = simulate_counts(100, 200, 0.2, 8, &mut rng).unwrap();
        assert_eq!(counts.replicates(), 8);
        assert!(counts.cond1().iter().all(|&c| (80.0..120.0).contains(&c)));
        assert!(counts.cond2().iter().all(|&c| (160.0..240.0).contains(&c)));
    }

    #[rstest]
    fn test_means_are_ordered(mut rng: StdRng) {
        let counts = simulate_counts(500, 50, 0.1, 4, &mut rng).unwrap();
        assert!(counts.cond1().iter().all(|&c| c < 60.0));
        assert!(counts.cond2().iter().all(|&c| c >= 450.0));
    }

    #[rstest]
    fn test_same_seed_same_counts() {
        let a = simulate_counts(100, 200, 0.2, 5, &mut StdRng::seed_from_u64(7)).unwrap();
        let b = simulate_counts(100, 200, 0.2, 5, &mut StdRng::seed_from_u64(7)).unwrap();
        assert_eq!(a, b);
    }

    #[rstest]
    #[case(100, 200, 0.2, 0)]
    #[case(100, 200, 0.0, 3)]
    #[case(100, 200, 1.5, 3)]
    #[case(0, 200, 0.2, 3)]
    #[case(2, 200, 0.2, 3)]
    fn test_rejects_bad_parameters(
        mut rng: StdRng,
        #[case] count1_mean: u64,
        #[case] count2_mean: u64,
        #[case] max_deviation: f64,
        #[case] replicates: usize,
    ) {
        assert!(simulate_counts(count1_mean, count2_mean, max_deviation, replicates, &mut rng).is_err());
    }
}
