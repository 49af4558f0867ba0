//! Learning module for stock agents.
//!
//! This module provides the tabular reinforcement learning pieces an agent is
//! assembled from:
//! - [`QTable`]: default-on-read value store with the SARSA update
//! - [`EpsilonGreedy`]: exploration/exploitation over the fixed action set
//!
//! ## Example
//!
//! ```rust
//! use stock_agents::learning::{EpsilonGreedy, LearningConfig, QTable, StateActionPair};
//! use stock_agents::{Action, StateType};
//!
//! let config = LearningConfig::default();
//! let mut table = QTable::new();
//!
//! let previous = StateActionPair::new(StateType::Init, Action::BuyShares);
//! let next = StateActionPair::new(StateType::Init, Action::Wait);
//! table.update_sarsa(previous, 10.0, next, &config);
//!
//! let mut policy = EpsilonGreedy::seeded(0.0, 1);
//! assert_eq!(policy.select(&table, &StateType::Init).action(), Action::BuyShares);
//! ```

pub mod policy;
pub mod q_table;

pub use policy::{Choice, EpsilonGreedy};
pub use q_table::{QEntry, QTable, StateActionPair};

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Configuration for the value update and action selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LearningConfig {
    /// The learning rate (alpha).
    pub learning_rate: f64,
    /// The discount factor (gamma).
    pub discount_factor: f64,
    /// The exploration rate (epsilon) for the epsilon-greedy strategy.
    pub epsilon: f64,
}

impl Default for LearningConfig {
    fn default() -> Self {
        Self {
            learning_rate: 0.1,
            discount_factor: 0.9998,
            epsilon: 0.2,
        }
    }
}

impl LearningConfig {
    /// Checks that every rate lies in `[0, 1]`.
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("learning_rate", self.learning_rate),
            ("discount_factor", self.discount_factor),
            ("epsilon", self.epsilon),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(Error::Config(format!(
                    "{} must be within [0, 1], got {}",
                    name, value
                )));
            }
        }
        Ok(())
    }
}
