use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CountsError {
    #[error("replicates must be > 0")]
    NoReplicates,

    #[error("condition 1 has {cond1} replicates but condition 2 has {cond2}")]
    MismatchedLengths { cond1: usize, cond2: usize },

    #[error("count {value} (condition {condition}, replicate {replicate}) must be strictly positive")]
    NonPositiveCount {
        condition: usize,
        replicate: usize,
        value: f64,
    },

    #[error("count at index {index} is not a finite number")]
    NonFiniteCount { index: usize },

    #[error("sample count {value} at index {index} must be strictly positive")]
    NonPositiveSample { index: usize, value: f64 },

    #[error("fold change of sample {numerator} over sample {denominator} or its reciprocal is not a finite positive number")]
    FoldChangeOutOfRange { numerator: usize, denominator: usize },

    #[error("at least 2 samples are required to form a fold-change, got {0}")]
    TooFewSamples(usize),

    #[error("invalid simulation parameters: {0}")]
    Simulation(String),
}
