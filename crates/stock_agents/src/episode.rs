//! Per-episode summaries.
//!
//! One [`EpisodeInfo`] is appended to an agent's [`EpisodeLog`] each time the
//! simulator reports the investor as a zombie. The log is persisted next to
//! the Q-table and only ever grows.

use crate::types::Timestamp;
use serde::{Deserialize, Serialize};

/// Summary of one finished episode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EpisodeInfo {
    /// The simulator step on which the episode ended.
    pub step: i64,
    /// Highest deposit gain over the initial deposit seen during the episode.
    pub max_profit: i64,
    /// Deposit on the terminal observation.
    pub final_deposit: i64,
    /// Debt on the terminal observation.
    pub final_debt: i64,
    /// Number of observations in the episode, the terminal one included.
    #[serde(default)]
    pub steps: u64,
    /// When the episode was recorded.
    #[serde(default)]
    pub recorded_at: Timestamp,
}

impl EpisodeInfo {
    pub fn new(step: i64, max_profit: i64, final_deposit: i64, final_debt: i64) -> Self {
        Self {
            step,
            max_profit,
            final_deposit,
            final_debt,
            steps: 0,
            recorded_at: Timestamp::now(),
        }
    }

    pub fn with_steps(mut self, steps: u64) -> Self {
        self.steps = steps;
        self
    }
}

/// Append-only list of episode summaries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EpisodeLog {
    entries: Vec<EpisodeInfo>,
}

impl EpisodeLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, info: EpisodeInfo) {
        self.entries.push(info);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn last(&self) -> Option<&EpisodeInfo> {
        self.entries.last()
    }

    pub fn iter(&self) -> impl Iterator<Item = &EpisodeInfo> {
        self.entries.iter()
    }

    /// Best `max_profit` over all recorded episodes.
    pub fn best_profit(&self) -> Option<i64> {
        self.entries.iter().map(|e| e.max_profit).max()
    }
}

impl From<Vec<EpisodeInfo>> for EpisodeLog {
    fn from(entries: Vec<EpisodeInfo>) -> Self {
        Self { entries }
    }
}
