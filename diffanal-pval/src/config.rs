//! Engine configuration.
//!
//! Every field has a default, so a TOML file only needs the values it wants
//! to change:
//!
//! ```toml
//! exact_max_replicates = 8
//! sample_draws = 50000
//! seed = 42
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::{
    DEFAULT_EXACT_MAX_REPLICATES, DEFAULT_SAMPLE_DRAWS, DEFAULT_STABILITY_REPLICATE_CUTOFF,
    DEFAULT_STABILITY_TRIALS,
};
use crate::errors::PValueError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PValueConfig {
    /// Enumerate exactly when `replicates <= exact_max_replicates`
    pub exact_max_replicates: usize,
    /// Random subsets drawn per down-sampling trial
    pub sample_draws: u64,
    /// Trials run when `replicates > stability_replicate_cutoff`
    pub stability_trials: usize,
    pub stability_replicate_cutoff: usize,
    /// Base seed; trial `i` is seeded with `seed + i`. `None` seeds from the OS.
    pub seed: Option<u64>,
    /// Run down-sampling trials on the rayon thread pool
    pub parallel: bool,
}

impl Default for PValueConfig {
    fn default() -> Self {
        PValueConfig {
            exact_max_replicates: DEFAULT_EXACT_MAX_REPLICATES,
            sample_draws: DEFAULT_SAMPLE_DRAWS,
            stability_trials: DEFAULT_STABILITY_TRIALS,
            stability_replicate_cutoff: DEFAULT_STABILITY_REPLICATE_CUTOFF,
            seed: None,
            parallel: true,
        }
    }
}

impl PValueConfig {
    pub fn builder() -> PValueConfigBuilder {
        PValueConfigBuilder::new()
    }

    pub fn from_toml_str(s: &str) -> Result<Self, PValueError> {
        let config: PValueConfig =
            toml::from_str(s).map_err(|e| PValueError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> Result<Self, PValueError> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    pub fn validate(&self) -> Result<(), PValueError> {
        if self.sample_draws == 0 {
            return Err(PValueError::Config("sample_draws must be > 0".to_string()));
        }
        if self.stability_trials == 0 {
            return Err(PValueError::Config(
                "stability_trials must be > 0".to_string(),
            ));
        }
        Ok(())
    }
}

/// Builder for [`PValueConfig`]; unset values keep their defaults.
///
/// ```
/// use diffanal_pval::PValueConfig;
///
/// let config = PValueConfig::builder()
///     .with_exact_max_replicates(6)
///     .with_seed(7)
///     .finish()
///     .unwrap();
/// assert_eq!(config.exact_max_replicates, 6);
/// assert_eq!(config.seed, Some(7));
/// ```
#[derive(Debug, Default)]
pub struct PValueConfigBuilder {
    config: PValueConfig,
}

impl PValueConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing configuration, e.g. one loaded from TOML.
    pub fn from_config(config: PValueConfig) -> Self {
        PValueConfigBuilder { config }
    }

    pub fn with_exact_max_replicates(mut self, replicates: usize) -> Self {
        self.config.exact_max_replicates = replicates;
        self
    }

    pub fn with_sample_draws(mut self, draws: u64) -> Self {
        self.config.sample_draws = draws;
        self
    }

    pub fn with_stability_trials(mut self, trials: usize) -> Self {
        self.config.stability_trials = trials;
        self
    }

    pub fn with_stability_replicate_cutoff(mut self, cutoff: usize) -> Self {
        self.config.stability_replicate_cutoff = cutoff;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.config.seed = Some(seed);
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.config.parallel = parallel;
        self
    }

    /// Consumes the builder, validating the result.
    pub fn finish(self) -> Result<PValueConfig, PValueError> {
        self.config.validate()?;
        Ok(self.config)
    }
}
