//! Prover configuration: search caps and probabilistic-test strength.
//!
//! Loaded from an optional TOML file; every field has a default so an empty
//! file (or no file) gives the stock prover.
//!
//! ```toml
//! mr_rounds = 20
//! max_base = 100000
//! proth_max_base = 100
//! max_trial_divisor = 10000000
//! try_proth = true
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::DEFAULT_MR_ROUNDS;

/// Knobs for `prove`, `prove_proth` and `prove_chain`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProverConfig {
    /// Miller-Rabin rounds for the compositeness pre-filter and for `find_a`.
    pub mr_rounds: u32,
    /// Largest base tried by the general prover (inclusive).
    pub max_base: u64,
    /// Bases below this bound are tried by the Proth fast path.
    pub proth_max_base: u64,
    /// Largest trial divisor `find_a` uses before giving up on `N-1`.
    pub max_trial_divisor: u64,
    /// Let `prove_chain` try the Proth fast path before the general prover.
    pub try_proth: bool,
}

impl Default for ProverConfig {
    fn default() -> Self {
        ProverConfig {
            mr_rounds: DEFAULT_MR_ROUNDS,
            max_base: 100_000,
            proth_max_base: 100,
            max_trial_divisor: 10_000_000,
            try_proth: false,
        }
    }
}

impl ProverConfig {
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: ProverConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        Self::from_toml_str(&text).with_context(|| format!("invalid config {}", path.display()))
    }

    pub fn validate(&self) -> Result<()> {
        if self.mr_rounds == 0 {
            anyhow::bail!("mr_rounds must be at least 1");
        }
        if self.max_base < 2 {
            anyhow::bail!("max_base must be at least 2, got {}", self.max_base);
        }
        if self.proth_max_base < 3 {
            anyhow::bail!(
                "proth_max_base must be at least 3, got {}",
                self.proth_max_base
            );
        }
        if self.max_trial_divisor < 2 {
            anyhow::bail!(
                "max_trial_divisor must be at least 2, got {}",
                self.max_trial_divisor
            );
        }
        Ok(())
    }
}
