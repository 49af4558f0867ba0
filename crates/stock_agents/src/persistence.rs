//! Agent State Persistence.
//!
//! Every agent owns two private files under the state directory, both derived
//! from its entity id:
//!
//! - `<stem>.qtable.json`: the learned values, a list of
//!   `{state, action, value}` rows
//! - `<stem>.episodes.json`: the episode log
//!
//! `<stem>` is the id with every byte outside `[A-Za-z0-9_-]` written as
//! `%XX`, so two different ids can never share a file.
//!
//! Both files are read whole when an agent is created or reset and written
//! whole at episode end. A missing or empty file means "nothing learned yet".
//! A file that exists but does not decode is reported as
//! [`Error::CorruptState`]; it is never replaced by an empty table.
//!
//! ## Example
//!
//! ```rust,no_run
//! use stock_agents::{AgentStore, PersistenceOptions};
//!
//! let store = AgentStore::new("./agent_state", PersistenceOptions::default());
//! let snapshot = store.load("investor-7")?;
//! println!("{} learned pairs", snapshot.q_table.len());
//! # Ok::<(), stock_agents::Error>(())
//! ```

use crate::episode::{EpisodeInfo, EpisodeLog};
use crate::error::{Error, Result};
use crate::learning::{QEntry, QTable};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt::Write as _;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

const Q_TABLE_SUFFIX: &str = "qtable.json";
const EPISODES_SUFFIX: &str = "episodes.json";

/// Options for configuring persistence operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PersistenceOptions {
    /// If `true`, pretty-prints JSON output to be more human-readable.
    pub pretty: bool,
}

impl Default for PersistenceOptions {
    fn default() -> Self {
        Self { pretty: true }
    }
}

impl PersistenceOptions {
    /// Returns options optimized for compact storage.
    pub fn compact() -> Self {
        Self { pretty: false }
    }

    /// Returns options optimized for human-readability (pretty-printed JSON).
    pub fn readable() -> Self {
        Self { pretty: true }
    }
}

/// Everything persisted for one agent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AgentSnapshot {
    pub q_table: QTable,
    pub episodes: EpisodeLog,
}

/// File-backed storage for agent state, rooted at one directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentStore {
    dir: PathBuf,
    options: PersistenceOptions,
}

impl AgentStore {
    /// Creates a store rooted at `dir`. Nothing is touched on disk until the
    /// first save.
    pub fn new(dir: impl Into<PathBuf>, options: PersistenceOptions) -> Self {
        Self {
            dir: dir.into(),
            options,
        }
    }

    /// The state directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// The file name stem for an entity id.
    pub fn file_stem(entity_id: &str) -> String {
        let mut stem = String::with_capacity(entity_id.len());
        for byte in entity_id.bytes() {
            if byte.is_ascii_alphanumeric() || byte == b'_' || byte == b'-' {
                stem.push(byte as char);
            } else {
                let _ = write!(stem, "%{:02X}", byte);
            }
        }
        if stem.is_empty() {
            stem.push('%');
        }
        stem
    }

    /// Where the Q-table of `entity_id` lives.
    pub fn q_table_path(&self, entity_id: &str) -> PathBuf {
        self.dir
            .join(format!("{}.{}", Self::file_stem(entity_id), Q_TABLE_SUFFIX))
    }

    /// Where the episode log of `entity_id` lives.
    pub fn episodes_path(&self, entity_id: &str) -> PathBuf {
        self.dir
            .join(format!("{}.{}", Self::file_stem(entity_id), EPISODES_SUFFIX))
    }

    /// Loads both blobs for an entity.
    pub fn load(&self, entity_id: &str) -> Result<AgentSnapshot> {
        Ok(AgentSnapshot {
            q_table: self.load_q_table(entity_id)?,
            episodes: self.load_episodes(entity_id)?,
        })
    }

    /// Loads the Q-table, empty if none was saved yet.
    pub fn load_q_table(&self, entity_id: &str) -> Result<QTable> {
        let path = self.q_table_path(entity_id);
        let entries: Option<Vec<QEntry>> = read_json(&path)?;
        let table = entries.map(QTable::from_entries).unwrap_or_default();
        log::debug!("Loaded {} Q-values from {:?}", table.len(), path);
        Ok(table)
    }

    /// Loads the episode log, empty if none was saved yet.
    pub fn load_episodes(&self, entity_id: &str) -> Result<EpisodeLog> {
        let path = self.episodes_path(entity_id);
        let entries: Option<Vec<EpisodeInfo>> = read_json(&path)?;
        Ok(entries.map(EpisodeLog::from).unwrap_or_default())
    }

    /// Writes both blobs for an entity, replacing earlier ones.
    pub fn save(&self, entity_id: &str, q_table: &QTable, episodes: &EpisodeLog) -> Result<()> {
        fs::create_dir_all(&self.dir)?;

        let q_path = self.q_table_path(entity_id);
        write_json(&q_path, &q_table.entries(), &self.options)?;
        write_json(&self.episodes_path(entity_id), episodes, &self.options)?;

        log::info!(
            "Saved agent {} ({} Q-values, {} episodes) to {:?}",
            entity_id,
            q_table.len(),
            episodes.len(),
            q_path
        );
        Ok(())
    }

    /// Whether anything was ever saved for `entity_id`.
    pub fn exists(&self, entity_id: &str) -> bool {
        self.q_table_path(entity_id).exists() || self.episodes_path(entity_id).exists()
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }
    serde_json::from_slice(&bytes)
        .map(Some)
        .map_err(|e| Error::corrupt(path, e))
}

// Writes next to the target and renames, so a failed write leaves the previous
// snapshot in place. The temp file is removed on failure.
fn write_json<T: Serialize + ?Sized>(
    path: &Path,
    value: &T,
    options: &PersistenceOptions,
) -> Result<()> {
    let bytes = if options.pretty {
        serde_json::to_vec_pretty(value)?
    } else {
        serde_json::to_vec(value)?
    };

    let tmp = path.with_extension("json.tmp");
    let written = fs::File::create(&tmp)
        .and_then(|mut file| {
            file.write_all(&bytes)?;
            file.sync_all()
        })
        .and_then(|()| fs::rename(&tmp, path));
    if let Err(e) = written {
        let _ = fs::remove_file(&tmp);
        return Err(e.into());
    }
    Ok(())
}
