//! Entity id to agent mapping.
//!
//! The simulator addresses investors by an opaque, stable id. The registry
//! opens an [`Agent`] the first time an id is seen and forwards every
//! observation for that id to it. Agents never share tables or files.
//!
//! ## Example
//!
//! ```rust,no_run
//! use stock_agents::{AgentRegistry, Observation, RegistryConfig};
//!
//! let mut registry = AgentRegistry::new(RegistryConfig::in_dir("./agent_state"))?;
//! let action = registry.act(1, "investor-1", &Observation::new(1_000, 0, 0, 50, 51))?;
//! println!("{}", action);
//! registry.close()?;
//! # Ok::<(), stock_agents::Error>(())
//! ```

use crate::action::Action;
use crate::agent::Agent;
use crate::config::RegistryConfig;
use crate::error::Result;
use crate::observation::Observation;
use crate::persistence::AgentStore;
use std::collections::hash_map::Entry;
use std::collections::HashMap;

/// Owns one [`Agent`] per entity id.
#[derive(Debug)]
pub struct AgentRegistry {
    config: RegistryConfig,
    store: AgentStore,
    agents: HashMap<String, Agent>,
    created: u64,
}

impl AgentRegistry {
    /// Creates an empty registry. No agent is opened until its first observation.
    pub fn new(config: RegistryConfig) -> Result<Self> {
        config.validate()?;
        let store = config.storage.store();
        Ok(Self {
            config,
            store,
            agents: HashMap::new(),
            created: 0,
        })
    }

    /// Routes one observation to the agent for `entity_id`, opening it first if
    /// needed, and returns that agent's action unchanged.
    pub fn act(&mut self, step: i64, entity_id: &str, observation: &Observation) -> Result<Action> {
        let agent = match self.agents.entry(entity_id.to_string()) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => {
                let agent = open_agent(&self.config, &self.store, entity_id, self.created)?;
                self.created += 1;
                entry.insert(agent)
            }
        };
        agent.act(step, observation)
    }

    /// The agent for `entity_id`, if it has been opened.
    pub fn get(&self, entity_id: &str) -> Option<&Agent> {
        self.agents.get(entity_id)
    }

    /// Removes an agent from the registry, handing it to the caller.
    pub fn remove(&mut self, entity_id: &str) -> Option<Agent> {
        self.agents.remove(entity_id)
    }

    /// Ids of all opened agents, sorted.
    pub fn ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.agents.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    /// The storage shared by all agents.
    pub fn store(&self) -> &AgentStore {
        &self.store
    }

    /// Writes unsaved updates of every agent. Tries all agents and returns the
    /// first error.
    pub fn flush_all(&mut self) -> Result<()> {
        let mut first_error = None;
        for agent in self.agents.values_mut() {
            if let Err(e) = agent.flush() {
                log::warn!("Failed to flush agent {}: {}", agent.id(), e);
                first_error.get_or_insert(e);
            }
        }
        first_error.map_or(Ok(()), Err)
    }

    /// Flushes every agent and drops the registry.
    pub fn close(mut self) -> Result<()> {
        let result = self.flush_all();
        log::info!("Closed registry with {} agents", self.agents.len());
        result
    }
}

fn open_agent(
    config: &RegistryConfig,
    store: &AgentStore,
    entity_id: &str,
    index: u64,
) -> Result<Agent> {
    let agent = Agent::open(entity_id, store.clone(), &config.agent)?
        .persist_on_drop(config.storage.persist_on_drop);
    Ok(match config.seed {
        Some(seed) => agent.with_seed(seed.wrapping_add(index)),
        None => agent,
    })
}
