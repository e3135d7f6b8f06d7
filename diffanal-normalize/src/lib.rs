//! Count normalization for diffanal.
//!
//! Reads per-sample abundance tables in the Kallisto `abundance.tsv` layout
//! (`target_id length eff_length est_counts tpm`) and rescales the estimated
//! counts with median-of-ratios size factors, so that counts from samples
//! sequenced to different depths can be compared.
//!
//! ```no_run
//! use diffanal_normalize::CountTable;
//!
//! let table = CountTable::from_abundance_files(&["ctl/abundance.tsv", "trt/abundance.tsv"]).unwrap();
//! let normalized = table.normalize().unwrap();
//! normalized.write_tsv(std::io::stdout()).unwrap();
//! ```

pub mod abundance;
pub mod consts;
pub mod errors;
pub mod models;
pub mod size_factors;

// re-exports
pub use errors::NormalizeError;
pub use models::CountTable;
pub use size_factors::size_factors;
