/// Name of the first header column of an abundance table.
pub const TARGET_ID_COLUMN: &str = "target_id";

/// Zero-based column holding the estimated counts.
pub const EST_COUNTS_COLUMN: usize = 3;

/// File name Kallisto gives its per-sample output.
pub const ABUNDANCE_FILE_STEM: &str = "abundance";
