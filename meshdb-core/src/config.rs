//! Simulation configuration
//!
//! Every latency the simulator models and the commit success rate live here
//! so callers (and tests) can tune them without touching the coordinators.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default simulated transfer delay for one replication
pub const DEFAULT_REPLICATION_DELAY_MS: u64 = 2_000;

/// Default simulated execution delay for one transaction
pub const DEFAULT_TRANSACTION_DELAY_MS: u64 = 1_000;

/// Default simulated fan-out delay for one distributed query
pub const DEFAULT_QUERY_DELAY_MS: u64 = 500;

/// Default simulated delay of the single-database query editor
pub const DEFAULT_EDITOR_DELAY_MS: u64 = 800;

/// Default simulated delay when saving a query
pub const DEFAULT_SAVE_DELAY_MS: u64 = 300;

/// Default probability that a transaction commits
pub const DEFAULT_COMMIT_PROBABILITY: f64 = 0.9;

/// Simulation configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Replication transfer delay in milliseconds
    pub replication_delay_ms: u64,

    /// Transaction execution delay in milliseconds
    pub transaction_delay_ms: u64,

    /// Distributed query delay in milliseconds
    pub query_delay_ms: u64,

    /// Query editor delay in milliseconds
    pub editor_delay_ms: u64,

    /// Saved query delay in milliseconds
    pub save_delay_ms: u64,

    /// Probability in `[0, 1]` that an executed transaction commits
    pub commit_probability: f64,

    /// Seed for the random source; `None` draws from the thread RNG
    pub seed: Option<u64>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            replication_delay_ms: DEFAULT_REPLICATION_DELAY_MS,
            transaction_delay_ms: DEFAULT_TRANSACTION_DELAY_MS,
            query_delay_ms: DEFAULT_QUERY_DELAY_MS,
            editor_delay_ms: DEFAULT_EDITOR_DELAY_MS,
            save_delay_ms: DEFAULT_SAVE_DELAY_MS,
            commit_probability: DEFAULT_COMMIT_PROBABILITY,
            seed: None,
        }
    }
}

impl SimulationConfig {
    /// Configuration with every delay set to zero
    pub fn immediate() -> Self {
        Self {
            replication_delay_ms: 0,
            transaction_delay_ms: 0,
            query_delay_ms: 0,
            editor_delay_ms: 0,
            save_delay_ms: 0,
            ..Default::default()
        }
    }

    /// Set the commit probability
    pub fn with_commit_probability(mut self, probability: f64) -> Self {
        self.commit_probability = probability;
        self
    }

    /// Set the random seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Set the replication delay
    pub fn with_replication_delay(mut self, delay: Duration) -> Self {
        self.replication_delay_ms = delay.as_millis() as u64;
        self
    }

    /// Set the transaction delay
    pub fn with_transaction_delay(mut self, delay: Duration) -> Self {
        self.transaction_delay_ms = delay.as_millis() as u64;
        self
    }

    /// Set the distributed query delay
    pub fn with_query_delay(mut self, delay: Duration) -> Self {
        self.query_delay_ms = delay.as_millis() as u64;
        self
    }

    pub fn replication_delay(&self) -> Duration {
        Duration::from_millis(self.replication_delay_ms)
    }

    pub fn transaction_delay(&self) -> Duration {
        Duration::from_millis(self.transaction_delay_ms)
    }

    pub fn query_delay(&self) -> Duration {
        Duration::from_millis(self.query_delay_ms)
    }

    pub fn editor_delay(&self) -> Duration {
        Duration::from_millis(self.editor_delay_ms)
    }

    pub fn save_delay(&self) -> Duration {
        Duration::from_millis(self.save_delay_ms)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.commit_probability) {
            return Err(Error::config(format!(
                "commit_probability must be within [0, 1], got {}",
                self.commit_probability
            )));
        }
        Ok(())
    }
}
