use diffanal_core::CountsError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PValueError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error(transparent)]
    Counts(#[from] CountsError),

    #[error("C({n}, {k}) does not fit in a 128-bit counter")]
    ArithmeticOverflow { n: usize, k: usize },

    #[error("Exact enumeration cancelled after {visited} subsets")]
    Cancelled { visited: u128 },

    #[error("Total number of possible subsets is zero")]
    ZeroTotal,

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
