//! # Stock Agents
//!
//! Per-investor reinforcement learning agents for a simulated stock market.
//!
//! ## Overview
//!
//! Each simulated investor is driven by its own tabular SARSA learner. On
//! every simulator step the investor's [`Agent`]:
//! - **Observes** the investor's deposit, debt, holdings and the market prices
//! - **Classifies** the observation into a discrete [`StateType`]
//! - **Learns** by crediting the previous state/action pair with the reward
//!   earned since
//! - **Decides** on one of the five [`Action`]s, epsilon-greedily
//!
//! When the simulator reports the investor as a zombie the episode ends: a
//! summary is appended to the agent's [`EpisodeLog`] and the Q-table and log
//! are saved to the agent's own files.
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────┐
//! │                    AgentRegistry                        │
//! │        entity id ──► Agent (created on first use)       │
//! ├────────────────────────────────────────────────────────┤
//! │                        Agent                            │
//! │                                                         │
//! │  Observation ─► StateClassifier ─► StateType            │
//! │       │                               │                 │
//! │       ▼                               ▼                 │
//! │  calculate_reward ──► QTable ◄── EpsilonGreedy ─► Action│
//! │                         │                               │
//! │                         ▼                               │
//! │                    AgentStore (JSON files)              │
//! └────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use stock_agents::{AgentRegistry, Observation, RegistryConfig};
//!
//! let config = RegistryConfig::in_dir("./agent_state").with_seed(42);
//! let mut registry = AgentRegistry::new(config)?;
//!
//! // deposit, debt, shares, bid, ask
//! let first = registry.act(1, "alice", &Observation::new(1_000, 0, 0, 50, 52))?;
//! let second = registry.act(2, "alice", &Observation::new(950, 0, 1, 51, 53))?;
//! println!("{} then {}", first, second);
//!
//! // The investor went bankrupt: episode ends, state is saved.
//! registry.act(3, "alice", &Observation::new(0, 400, 0, 20, 21).zombie())?;
//!
//! registry.close()?;
//! # Ok::<(), stock_agents::Error>(())
//! ```
//!
//! ## Modules
//!
//! - [`observation`]: the per-step investor snapshot
//! - [`state`]: discretization into state labels
//! - [`reward`]: the per-step reward
//! - [`learning`]: Q-table, SARSA update, epsilon-greedy policy
//! - [`agent`]: the per-investor learner and its episode lifecycle
//! - [`registry`]: entity id to agent mapping
//! - [`persistence`]: per-agent JSON files
//! - [`config`]: TOML and environment configuration

pub mod action;
pub mod agent;
pub mod config;
pub mod episode;
pub mod error;
pub mod learning;
pub mod observation;
pub mod persistence;
pub mod registry;
pub mod reward;
pub mod state;
pub mod types;

pub use action::Action;
pub use agent::{Agent, AgentStats, Transition};
pub use config::{AgentConfig, RegistryConfig, StorageConfig};
pub use episode::{EpisodeInfo, EpisodeLog};
pub use error::{Error, Result};
pub use learning::{Choice, EpsilonGreedy, LearningConfig, QEntry, QTable, StateActionPair};
pub use observation::Observation;
pub use persistence::{AgentSnapshot, AgentStore, PersistenceOptions};
pub use registry::AgentRegistry;
pub use reward::calculate_reward;
pub use state::{InvestorState, MarketBucket, StateClassifier, StateType};
pub use types::*;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
