//! Exact P-values for an observed mean fold-change between two conditions.
//!
//! The null distribution is built by combinatorics instead of a parametric
//! assumption: pool the samples of both conditions, take the fold change of
//! every pair in both directions, and ask what fraction of all
//! `replicates`-sized subsets of those fold changes has a mean at least as
//! large as the observed one.
//!
//! When `replicates` is above [`PValueConfig::exact_max_replicates`] the
//! subsets are randomly down-sampled instead, over several trials, and the
//! result is tagged [`CountingMode::Estimated`].
//!
//! # Example
//!
//! ```
//! use diffanal_core::ConditionCounts;
//! use diffanal_pval::{PValueConfig, PValueEngine};
//!
//! let counts = ConditionCounts::from_integer_counts(&[90, 100, 110], &[180, 200, 220]).unwrap();
//! let report = PValueEngine::new(PValueConfig::default()).run(&counts).unwrap();
//!
//! assert!(report.is_exact());
//! assert_eq!(report.population.size, 30);
//! assert!(report.p_value < 0.1);
//! ```

pub mod config;
pub mod consts;
pub mod counter;
pub mod engine;
pub mod errors;
pub mod models;
pub mod observed;
pub mod population;

// re-exports
pub use config::{PValueConfig, PValueConfigBuilder};
pub use counter::{CancelToken, NullDistribution};
pub use engine::PValueEngine;
pub use errors::PValueError;
pub use models::{
    CountingMode, NullCount, ObservedStatistics, PValueReport, PopulationSummary,
    StabilityCheck, TotalSubsets, p_value,
};
pub use population::FoldChangePopulation;
