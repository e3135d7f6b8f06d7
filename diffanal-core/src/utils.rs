//! Combinatorics shared by the fold-change population builder and the
//! null-distribution counter.

fn gcd(mut a: u128, mut b: u128) -> u128 {
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a
}

///
/// Exact binomial coefficient C(n, k).
///
/// Returns `None` when the result does not fit in a `u128`. Each step divides
/// out the common factor first, so intermediate products only overflow when
/// the next partial result itself would.
///
pub fn binomial(n: u64, k: u64) -> Option<u128> {
    if k > n {
        return Some(0);
    }
    let k = k.min(n - k);
    let n = n as u128;

    let mut result: u128 = 1;
    for i in 0..k as u128 {
        let numerator = n - i;
        let denominator = i + 1;
        let g = gcd(result, denominator);
        let reduced = denominator / g;
        // `reduced` always divides `numerator` here
        result = (result / g).checked_mul(numerator / reduced)?;
    }
    Some(result)
}

///
/// True when both `ratio` and `1 / ratio` are finite and strictly positive,
/// i.e. the ratio can stand in a reciprocal-closed fold-change population.
///
pub fn is_usable_ratio(ratio: f64) -> bool {
    let reciprocal = 1.0 / ratio;
    ratio.is_finite() && ratio > 0.0 && reciprocal.is_finite() && reciprocal > 0.0
}

///
/// Natural log of C(n, k), usable when [`binomial`] overflows.
///
pub fn ln_binomial(n: u64, k: u64) -> f64 {
    if k > n {
        return f64::NEG_INFINITY;
    }
    let k = k.min(n - k);
    (0..k)
        .map(|i| ((n - i) as f64).ln() - ((i + 1) as f64).ln())
        .sum()
}

///
/// Iterator over all k-element combinations of indices `[0, n)`, in
/// lexicographic order. Combinations are produced on demand; nothing is
/// materialized up front.
///
/// ```
/// use diffanal_core::utils::combinations;
///
/// let pairs: Vec<Vec<usize>> = combinations(4, 2).collect();
/// assert_eq!(pairs.len(), 6);
/// assert_eq!(pairs[0], vec![0, 1]);
/// assert_eq!(pairs[5], vec![2, 3]);
/// ```
pub fn combinations(n: usize, k: usize) -> Combinations {
    let current = if k == 0 || k > n {
        None
    } else {
        Some((0..k).collect())
    };
    Combinations { n, k, current }
}

#[derive(Debug, Clone)]
pub struct Combinations {
    n: usize,
    k: usize,
    current: Option<Vec<usize>>,
}

impl Iterator for Combinations {
    type Item = Vec<usize>;

    fn next(&mut self) -> Option<Self::Item> {
        let result = self.current.take()?;

        let mut next = result.clone();
        let mut i = self.k;
        while i > 0 {
            i -= 1;
            if next[i] < self.n - self.k + i {
                next[i] += 1;
                for j in (i + 1)..self.k {
                    next[j] = next[j - 1] + 1;
                }
                self.current = Some(next);
                break;
            }
        }

        Some(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::*;

    #[rstest]
    #[case(2.0, true)]
    #[case(1e-300, true)]
    #[case(1e-310, false)]
    #[case(0.0, false)]
    #[case(f64::INFINITY, false)]
    #[case(-1.0, false)]
    fn test_is_usable_ratio(#[case] ratio: f64, #[case] expected: bool) {
        assert_eq!(is_usable_ratio(ratio), expected);
    }

    #[rstest]
    #[case(5, 0, 1)]
    #[case(5, 2, 10)]
    #[case(6, 2, 15)]
    #[case(30, 3, 4060)]
    #[case(20, 10, 184_756)]
    #[case(3, 5, 0)]
    fn test_binomial_known_values(#[case] n: u64, #[case] k: u64, #[case] expected: u128) {
        assert_eq!(binomial(n, k), Some(expected));
    }

    #[rstest]
    fn test_binomial_near_u64_limit() {
        // C(67, 33) is the largest central coefficient below 2^64
        assert_eq!(binomial(67, 33), Some(14_226_520_737_620_288_370));
        // and this one needs the extra width
        assert_eq!(binomial(68, 34), Some(28_453_041_475_240_576_740));
    }

    #[rstest]
    fn test_binomial_overflow_is_reported() {
        assert_eq!(binomial(10_000, 5_000), None);
        assert!(ln_binomial(10_000, 5_000) > 6_900.0);
    }

    #[rstest]
    fn test_ln_binomial_matches_exact() {
        let exact = binomial(462, 11).unwrap() as f64;
        assert!((ln_binomial(462, 11) - exact.ln()).abs() < 1e-9);
    }

    #[rstest]
    fn test_combinations_order() {
        let combos: Vec<Vec<usize>> = combinations(4, 2).collect();
        assert_eq!(
            combos,
            vec![
                vec![0, 1],
                vec![0, 2],
                vec![0, 3],
                vec![1, 2],
                vec![1, 3],
                vec![2, 3]
            ]
        );
    }

    #[rstest]
    #[case(5, 0, 0)]
    #[case(2, 5, 0)]
    #[case(3, 3, 1)]
    #[case(10, 4, 210)]
    fn test_combinations_count(#[case] n: usize, #[case] k: usize, #[case] expected: usize) {
        assert_eq!(combinations(n, k).count(), expected);
    }
}
