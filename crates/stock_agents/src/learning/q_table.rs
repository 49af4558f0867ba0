//! The tabular value store.
//!
//! Maps `(StateType, Action)` pairs to estimates of discounted future reward.
//! Absent pairs read as `0.0` without being inserted; only an update
//! materializes a key.

use super::LearningConfig;
use crate::action::Action;
use crate::state::StateType;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A composite key representing a state-action pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StateActionPair {
    pub state: StateType,
    pub action: Action,
}

impl StateActionPair {
    pub fn new(state: StateType, action: Action) -> Self {
        Self { state, action }
    }
}

/// One persisted row of a [`QTable`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QEntry {
    pub state: StateType,
    pub action: Action,
    pub value: f64,
}

/// Learned values for one agent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QTable {
    values: HashMap<StateActionPair, f64>,
    total_updates: u64,
}

impl QTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds a table from persisted rows.
    pub fn from_entries(entries: impl IntoIterator<Item = QEntry>) -> Self {
        let values = entries
            .into_iter()
            .map(|e| (StateActionPair::new(e.state, e.action), e.value))
            .collect();
        Self {
            values,
            total_updates: 0,
        }
    }

    /// Rows sorted by state label then action, for stable output.
    pub fn entries(&self) -> Vec<QEntry> {
        let mut entries: Vec<QEntry> = self
            .values
            .iter()
            .map(|(pair, value)| QEntry {
                state: pair.state,
                action: pair.action,
                value: *value,
            })
            .collect();
        entries.sort_by(|a, b| {
            a.state
                .label()
                .cmp(&b.state.label())
                .then(a.action.cmp(&b.action))
        });
        entries
    }

    /// The estimate for a pair, `0.0` if never written.
    pub fn get(&self, state: &StateType, action: Action) -> f64 {
        self.values
            .get(&StateActionPair::new(*state, action))
            .copied()
            .unwrap_or(0.0)
    }

    /// Whether the pair has ever been written.
    pub fn contains(&self, state: &StateType, action: Action) -> bool {
        self.values
            .contains_key(&StateActionPair::new(*state, action))
    }

    /// Writes an estimate.
    pub fn set(&mut self, state: StateType, action: Action, value: f64) {
        self.values.insert(StateActionPair::new(state, action), value);
    }

    /// SARSA update: `Q(s,a) += α * (r + γ * Q(s',a') - Q(s,a))`.
    ///
    /// Returns the new value written for `previous`.
    pub fn update_sarsa(
        &mut self,
        previous: StateActionPair,
        reward: f64,
        next: StateActionPair,
        config: &LearningConfig,
    ) -> f64 {
        let current_q = self.get(&previous.state, previous.action);
        let next_q = self.get(&next.state, next.action);

        let td_target = reward + config.discount_factor * next_q;
        let new_q = current_q + config.learning_rate * (td_target - current_q);

        self.values.insert(previous, new_q);
        self.total_updates += 1;
        new_q
    }

    /// The greedy action for `state`.
    ///
    /// Scans [`Action::ALL`] in order keeping the first action whose estimate
    /// is strictly greater than the best so far, starting from negative
    /// infinity. Equal later values never replace an earlier one. Returns
    /// `None` only if no estimate qualifies (all NaN).
    pub fn best_action(&self, state: &StateType) -> Option<Action> {
        let mut best = None;
        let mut max_value = f64::NEG_INFINITY;
        for action in Action::ALL {
            let value = self.get(state, action);
            if value > max_value {
                max_value = value;
                best = Some(action);
            }
        }
        best
    }

    /// Number of materialized pairs.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether nothing has been learned yet.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Updates applied since this table was created or loaded.
    pub fn total_updates(&self) -> u64 {
        self.total_updates
    }
}
