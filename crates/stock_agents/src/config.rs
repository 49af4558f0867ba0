//! Configuration for stock agents.
//!
//! A [`RegistryConfig`] bundles everything needed to run a population of
//! agents: learning parameters, state discretization, and where learned state
//! is stored. It can be read from TOML and overridden from the environment.
//!
//! ```toml
//! seed = 7
//!
//! [agent]
//! state_gap = 5
//! market_range = 100
//!
//! [agent.learning]
//! learning_rate = 0.1
//! discount_factor = 0.9998
//! epsilon = 0.2
//!
//! [storage]
//! dir = "./agent_state"
//! pretty = true
//! persist_on_drop = true
//! ```

use crate::error::{Error, Result};
use crate::learning::LearningConfig;
use crate::persistence::{AgentStore, PersistenceOptions};
use crate::state::{StateClassifier, DEFAULT_MARKET_RANGE, DEFAULT_STATE_GAP};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Environment variable overriding [`StorageConfig::dir`].
pub const ENV_STATE_DIR: &str = "STOCK_AGENTS_STATE_DIR";
/// Environment variable overriding [`LearningConfig::epsilon`].
pub const ENV_EPSILON: &str = "STOCK_AGENTS_EPSILON";
/// Environment variable overriding [`RegistryConfig::seed`].
pub const ENV_SEED: &str = "STOCK_AGENTS_SEED";

/// Per-agent learning and discretization settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// Width of one ask-price band.
    pub state_gap: i64,
    /// Price changes beyond +/- this bound land in an overflow bucket.
    pub market_range: i64,
    /// Update and exploration parameters.
    pub learning: LearningConfig,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            state_gap: DEFAULT_STATE_GAP,
            market_range: DEFAULT_MARKET_RANGE,
            learning: LearningConfig::default(),
        }
    }
}

impl AgentConfig {
    /// Builds the state classifier these settings describe.
    pub fn classifier(&self) -> Result<StateClassifier> {
        StateClassifier::new(self.state_gap, self.market_range)
    }

    pub fn validate(&self) -> Result<()> {
        self.learning.validate()?;
        self.classifier().map(|_| ())
    }
}

/// Where and how agent state is persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory holding one Q-table and one episode log per agent.
    pub dir: PathBuf,
    /// Pretty-print the JSON blobs.
    pub pretty: bool,
    /// Save unsaved learning when an agent is dropped.
    pub persist_on_drop: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("./agent_state"),
            pretty: true,
            persist_on_drop: true,
        }
    }
}

impl StorageConfig {
    /// A config rooted at `dir` with default options.
    pub fn in_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            ..Default::default()
        }
    }

    /// Opens the store this config describes.
    pub fn store(&self) -> AgentStore {
        let options = if self.pretty {
            PersistenceOptions::readable()
        } else {
            PersistenceOptions::compact()
        };
        AgentStore::new(self.dir.clone(), options)
    }
}

/// Configuration for an [`AgentRegistry`](crate::AgentRegistry).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct RegistryConfig {
    /// Seed for reproducible runs; agents are seeded from it in creation order.
    pub seed: Option<u64>,
    /// Settings shared by every agent.
    pub agent: AgentConfig,
    /// Persistence settings.
    pub storage: StorageConfig,
}

impl RegistryConfig {
    /// A default config storing state under `dir`.
    pub fn in_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            storage: StorageConfig::in_dir(dir),
            ..Default::default()
        }
    }

    /// Sets the seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Sets the exploration rate.
    pub fn with_epsilon(mut self, epsilon: f64) -> Self {
        self.agent.learning.epsilon = epsilon;
        self
    }

    /// Load configuration from TOML.
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize to TOML.
    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Reads a TOML file.
    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml(&content)
    }

    /// Default configuration with environment overrides applied.
    pub fn from_env() -> Result<Self> {
        Self::default().apply_env()
    }

    /// Applies `STOCK_AGENTS_*` environment overrides. Unparseable values are
    /// rejected rather than ignored.
    pub fn apply_env(mut self) -> Result<Self> {
        if let Ok(dir) = std::env::var(ENV_STATE_DIR) {
            self.storage.dir = PathBuf::from(dir);
        }
        if let Ok(epsilon) = std::env::var(ENV_EPSILON) {
            self.agent.learning.epsilon = epsilon
                .parse()
                .map_err(|e| Error::Config(format!("{}={:?}: {}", ENV_EPSILON, epsilon, e)))?;
        }
        if let Ok(seed) = std::env::var(ENV_SEED) {
            self.seed = Some(
                seed.parse()
                    .map_err(|e| Error::Config(format!("{}={:?}: {}", ENV_SEED, seed, e)))?,
            );
        }
        self.validate()?;
        Ok(self)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        self.agent.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = RegistryConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.agent.state_gap, 5);
        assert_eq!(config.agent.market_range, 100);
        assert!(config.storage.persist_on_drop);
        assert_eq!(config.seed, None);
    }

    #[test]
    fn test_toml_roundtrip() {
        let config = RegistryConfig::in_dir("/var/lib/agents")
            .with_seed(9)
            .with_epsilon(0.05);
        let toml = config.to_toml().unwrap();
        let parsed = RegistryConfig::from_toml(&toml).unwrap();
        assert_eq!(config, parsed);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let parsed = RegistryConfig::from_toml(
            r#"
            [agent.learning]
            epsilon = 0.0
            "#,
        )
        .unwrap();
        assert_eq!(parsed.agent.learning.epsilon, 0.0);
        assert_eq!(parsed.agent.learning.discount_factor, 0.9998);
        assert_eq!(parsed.storage, StorageConfig::default());
    }

    #[test]
    fn test_invalid_toml_values_rejected() {
        let err = RegistryConfig::from_toml("[agent]\nstate_gap = 0\n").unwrap_err();
        assert!(matches!(err, Error::Config(_)));

        let err = RegistryConfig::from_toml("seed = \"abc\"").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    // Only test touching STOCK_AGENTS_* variables.
    #[test]
    fn test_env_overrides() {
        let clear = || {
            for var in [ENV_STATE_DIR, ENV_EPSILON, ENV_SEED] {
                std::env::remove_var(var);
            }
        };
        clear();

        std::env::set_var(ENV_STATE_DIR, "/srv/agents");
        std::env::set_var(ENV_EPSILON, "0.05");
        std::env::set_var(ENV_SEED, "42");
        let config = RegistryConfig::from_env().unwrap();
        assert_eq!(config.storage.dir, PathBuf::from("/srv/agents"));
        assert_eq!(config.agent.learning.epsilon, 0.05);
        assert_eq!(config.seed, Some(42));

        let overridden = RegistryConfig::in_dir("/tmp/other")
            .with_seed(1)
            .apply_env()
            .unwrap();
        assert_eq!(overridden.storage.dir, PathBuf::from("/srv/agents"));
        assert_eq!(overridden.seed, Some(42));

        std::env::set_var(ENV_EPSILON, "abc");
        assert!(matches!(RegistryConfig::from_env(), Err(Error::Config(_))));

        std::env::set_var(ENV_EPSILON, "1.5");
        assert!(matches!(RegistryConfig::from_env(), Err(Error::Config(_))));

        std::env::set_var(ENV_EPSILON, "0.1");
        std::env::set_var(ENV_SEED, "-3");
        assert!(matches!(RegistryConfig::from_env(), Err(Error::Config(_))));

        clear();
        assert_eq!(RegistryConfig::from_env().unwrap(), RegistryConfig::default());
    }

    #[test]
    fn test_storage_store_options() {
        let mut storage = StorageConfig::in_dir("/tmp/x");
        assert_eq!(storage.store().dir(), std::path::Path::new("/tmp/x"));
        storage.pretty = false;
        assert_eq!(
            storage.store(),
            AgentStore::new("/tmp/x", PersistenceOptions::compact())
        );
    }
}
