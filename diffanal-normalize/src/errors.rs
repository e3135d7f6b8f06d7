use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum NormalizeError {
    #[error("Error parsing {path:?} line {line}: {message}")]
    Parse {
        path: PathBuf,
        line: usize,
        message: String,
    },

    #[error("Target {found} in {path:?} does not match {expected} in the first sample")]
    MismatchedTargets {
        path: PathBuf,
        expected: String,
        found: String,
    },

    #[error("{path:?} has {found} targets, expected {expected}")]
    MismatchedTargetCount {
        path: PathBuf,
        expected: usize,
        found: usize,
    },

    #[error("No target has a non-zero count in every sample")]
    NoUsableTargets,

    #[error("No abundance files given")]
    EmptyInput,

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
