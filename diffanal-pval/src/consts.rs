//! Default policy values for the P-value engine.

/// Largest replicate count for which every subset of the fold-change
/// population is enumerated. Above this the counter falls back to random
/// down-sampling.
pub const DEFAULT_EXACT_MAX_REPLICATES: usize = 10;

/// Random subsets drawn per down-sampling trial.
pub const DEFAULT_SAMPLE_DRAWS: u64 = 100_000;

/// Counting trials run to check the stability of a down-sampled estimate.
pub const DEFAULT_STABILITY_TRIALS: usize = 5;

/// Only repeat trials when there are more replicates than this.
pub const DEFAULT_STABILITY_REPLICATE_CUTOFF: usize = 5;

/// How many subsets the exact enumeration visits between checks of its
/// cancel token (and progress bar updates).
pub const CANCEL_POLL_INTERVAL: u128 = 1 << 16;
