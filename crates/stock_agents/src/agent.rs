//! The per-investor learning agent.
//!
//! An [`Agent`] owns everything learned about one investor: its Q-table, its
//! episode log, and the state of the episode in progress. Each call to
//! [`Agent::act`] classifies the new observation, credits the previous
//! transition with a SARSA update, and picks the next action.
//!
//! ## Lifecycle
//!
//! ```text
//!   open ──► bootstrap ──act──► steady ──act──► steady ...
//!               ▲                                  │
//!               └──── save, reset, reload ◄── zombie observation
//! ```
//!
//! - **bootstrap**: no previous transition. The action is uniformly random
//!   and nothing is learned.
//! - **steady**: the previous transition is updated using the reward earned
//!   since, and the next action is epsilon-greedy.
//! - **zombie**: the episode is summarized into the episode log, both blobs
//!   are written to the agent's files, and the agent goes back to bootstrap
//!   with its learned state re-read from storage.
//!
//! An agent dropped with unsaved updates writes them out first (see
//! [`Agent::persist_on_drop`]); a killed process loses the episode in flight.

use crate::action::Action;
use crate::config::AgentConfig;
use crate::episode::{EpisodeInfo, EpisodeLog};
use crate::error::Result;
use crate::learning::{Choice, EpsilonGreedy, QTable, StateActionPair};
use crate::observation::Observation;
use crate::persistence::AgentStore;
use crate::reward::calculate_reward;
use crate::state::{StateClassifier, StateType};
use serde::{Deserialize, Serialize};

/// Counters for monitoring an agent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentStats {
    /// Observations processed.
    pub steps: u64,
    /// SARSA updates applied.
    pub updates: u64,
    /// Episodes completed.
    pub episodes: u64,
    /// Actions chosen at random (bootstrap or exploration).
    pub random_choices: u64,
    /// Actions chosen greedily.
    pub greedy_choices: u64,
}

/// The last step of the running episode, credited on the next step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transition {
    pub observation: Observation,
    pub state_type: StateType,
    pub action: Action,
}

/// A tabular SARSA learner for one investor.
#[derive(Debug)]
pub struct Agent {
    id: String,
    store: AgentStore,
    config: AgentConfig,
    classifier: StateClassifier,
    policy: EpsilonGreedy,

    q_table: QTable,
    episodes: EpisodeLog,

    previous: Option<Transition>,
    initial_deposit: Option<i64>,
    max_profit: i64,
    episode_steps: u64,

    stats: AgentStats,
    dirty: bool,
    persist_on_drop: bool,
}

impl Agent {
    /// Opens the agent for `id`, loading whatever `store` holds for it.
    ///
    /// Fails with [`Error::CorruptState`](crate::Error::CorruptState) if the
    /// stored blobs exist but cannot be decoded.
    pub fn open(id: impl Into<String>, store: AgentStore, config: &AgentConfig) -> Result<Self> {
        let id = id.into();
        let classifier = config.classifier()?;
        let snapshot = store.load(&id)?;

        log::info!(
            "Opened agent {} ({} Q-values, {} past episodes)",
            id,
            snapshot.q_table.len(),
            snapshot.episodes.len()
        );

        Ok(Self {
            id,
            store,
            config: config.clone(),
            classifier,
            policy: EpsilonGreedy::new(config.learning.epsilon),
            q_table: snapshot.q_table,
            episodes: snapshot.episodes,
            previous: None,
            initial_deposit: None,
            max_profit: 0,
            episode_steps: 0,
            stats: AgentStats::default(),
            dirty: false,
            persist_on_drop: true,
        })
    }

    /// Replaces the random stream with a reproducible one.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.policy = EpsilonGreedy::seeded(self.config.learning.epsilon, seed);
        self
    }

    /// Whether dropping the agent saves unsaved updates. Defaults to `true`.
    pub fn persist_on_drop(mut self, enabled: bool) -> Self {
        self.persist_on_drop = enabled;
        self
    }

    /// Processes one observation and returns the action to take.
    ///
    /// Only fails when the observation ends the episode and the agent's state
    /// cannot be written or re-read.
    pub fn act(&mut self, step: i64, observation: &Observation) -> Result<Action> {
        self.stats.steps += 1;
        self.episode_steps += 1;

        let initial_deposit = *self.initial_deposit.get_or_insert(observation.deposit);
        let state_type = self
            .classifier
            .classify(observation, self.previous.as_ref().map(|t| &t.observation));

        let choice = match &self.previous {
            None => {
                log::debug!(
                    "step {} agent {}: {:?} state={} (bootstrap)",
                    step,
                    self.id,
                    observation,
                    state_type
                );
                Choice::Random(self.policy.random())
            }
            Some(prev) => {
                let profit = observation.deposit.saturating_sub(initial_deposit);
                self.max_profit = self.max_profit.max(profit);

                let choice = self.policy.select(&self.q_table, &state_type);
                let reward = calculate_reward(observation, &prev.observation);
                let value = self.q_table.update_sarsa(
                    StateActionPair::new(prev.state_type, prev.action),
                    reward as f64,
                    StateActionPair::new(state_type, choice.action()),
                    &self.config.learning,
                );
                self.stats.updates += 1;
                self.dirty = true;

                log::debug!(
                    "step {} agent {}: {:?} state={} reward={} Q({}, {})={:.4}",
                    step,
                    self.id,
                    observation,
                    state_type,
                    reward,
                    prev.state_type,
                    prev.action,
                    value
                );
                choice
            }
        };

        if choice.is_random() {
            self.stats.random_choices += 1;
        } else {
            self.stats.greedy_choices += 1;
        }

        let action = choice.action();
        log::debug!("step {} agent {}: action={}", step, self.id, action);

        self.previous = Some(Transition {
            observation: *observation,
            state_type,
            action,
        });

        if observation.is_zombie {
            self.end_episode(step, observation)?;
        }

        Ok(action)
    }

    fn end_episode(&mut self, step: i64, terminal: &Observation) -> Result<()> {
        let info = EpisodeInfo::new(step, self.max_profit, terminal.deposit, terminal.debt)
            .with_steps(self.episode_steps);
        log::info!(
            "Agent {} episode ended at step {}: max profit {}, deposit {}, debt {}",
            self.id,
            step,
            info.max_profit,
            info.final_deposit,
            info.final_debt
        );

        self.episodes.push(info);
        self.stats.episodes += 1;

        let saved = self.store.save(&self.id, &self.q_table, &self.episodes);
        self.clear_episode();
        saved?;
        self.dirty = false;

        self.reload()
    }

    /// Returns the agent to its freshly opened state: transient episode data
    /// is cleared and learned state is re-read from storage.
    ///
    /// Unsaved updates are discarded.
    pub fn reset(&mut self) -> Result<()> {
        self.clear_episode();
        self.reload()?;
        self.dirty = false;
        Ok(())
    }

    fn clear_episode(&mut self) {
        self.previous = None;
        self.initial_deposit = None;
        self.max_profit = 0;
        self.episode_steps = 0;
    }

    fn reload(&mut self) -> Result<()> {
        let snapshot = self.store.load(&self.id)?;
        self.q_table = snapshot.q_table;
        self.episodes = snapshot.episodes;
        Ok(())
    }

    /// Writes the Q-table and episode log if there are unsaved updates.
    pub fn flush(&mut self) -> Result<()> {
        if self.dirty {
            self.store.save(&self.id, &self.q_table, &self.episodes)?;
            self.dirty = false;
        }
        Ok(())
    }

    /// Flushes and consumes the agent, reporting any write error.
    pub fn close(mut self) -> Result<()> {
        self.flush()
    }

    /// The entity id.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The learned values.
    pub fn q_table(&self) -> &QTable {
        &self.q_table
    }

    /// Completed episodes, including those from earlier runs.
    pub fn episodes(&self) -> &EpisodeLog {
        &self.episodes
    }

    /// Counters since the agent was opened.
    pub fn stats(&self) -> &AgentStats {
        &self.stats
    }

    /// The storage backing this agent.
    pub fn store(&self) -> &AgentStore {
        &self.store
    }

    /// `true` until the first observation of an episode has been seen.
    pub fn is_bootstrap(&self) -> bool {
        self.previous.is_none()
    }

    /// The last step of the running episode.
    pub fn previous(&self) -> Option<&Transition> {
        self.previous.as_ref()
    }

    /// Deposit at the start of the running episode.
    pub fn initial_deposit(&self) -> Option<i64> {
        self.initial_deposit
    }

    /// Peak deposit gain of the running episode.
    pub fn max_profit(&self) -> i64 {
        self.max_profit
    }

    /// Whether learned values differ from what is on disk.
    pub fn has_unsaved_updates(&self) -> bool {
        self.dirty
    }
}

impl Drop for Agent {
    fn drop(&mut self) {
        if !self.persist_on_drop || !self.dirty {
            return;
        }
        if let Err(e) = self.flush() {
            log::warn!("Failed to save agent {} on drop: {}", self.id, e);
        }
    }
}
