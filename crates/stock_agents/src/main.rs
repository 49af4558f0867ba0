//! Stock Agents CLI
//!
//! Drives the per-investor agents from a stream of observations and inspects
//! what they have learned.
//!
//! ## Usage
//!
//! ```bash
//! # One JSON object per line on stdin, one action label per line on stdout
//! stock-agents run --state-dir ./agent_state < observations.jsonl
//!
//! # Reproducible exploration
//! stock-agents run --state-dir ./agent_state --seed 7 < observations.jsonl
//!
//! # What has investor-3 learned?
//! stock-agents inspect --state-dir ./agent_state investor-3
//! ```
//!
//! Input lines look like:
//!
//! ```text
//! {"step":12,"agent_id":"investor-3","state":{"deposit":900,"debt":0,"shareHolding":2,"bidPrice":50,"askPrice":51,"isZombie":false}}
//! ```

use clap::{Parser, Subcommand};
use serde::Deserialize;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use stock_agents::{
    AgentRegistry, AgentStore, Error, Observation, PersistenceOptions, RegistryConfig, Result,
    StateType,
};

/// Per-investor SARSA agents for a simulated stock market
#[derive(Parser, Debug)]
#[command(name = "stock-agents")]
#[command(version)]
#[command(about = "Per-investor SARSA agents for a simulated stock market", long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Read observations as JSON lines from stdin and print one action per line
    Run {
        /// Directory holding the agents' Q-tables and episode logs
        #[arg(long)]
        state_dir: Option<PathBuf>,

        /// TOML configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Seed for reproducible exploration
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Print the persisted Q-table and episode log of one agent
    Inspect {
        /// Directory holding the agents' Q-tables and episode logs
        #[arg(long, default_value = "./agent_state")]
        state_dir: PathBuf,

        /// Entity id of the agent
        agent_id: String,
    },
}

/// One line of simulator input.
#[derive(Debug, Deserialize)]
struct StepRecord {
    step: i64,
    agent_id: String,
    state: Observation,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let log_level = match args.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level))
        .format_timestamp_millis()
        .target(env_logger::Target::Stderr)
        .init();

    match args.command {
        Command::Run {
            state_dir,
            config,
            seed,
        } => {
            let mut config = match config {
                Some(path) => RegistryConfig::from_file(path)?,
                None => RegistryConfig::default(),
            }
            .apply_env()?;
            if let Some(dir) = state_dir {
                config.storage.dir = dir;
            }
            if let Some(seed) = seed {
                config.seed = Some(seed);
            }
            run(config, io::stdin().lock(), io::stdout().lock())
        }
        Command::Inspect {
            state_dir,
            agent_id,
        } => inspect(&state_dir, &agent_id, io::stdout().lock()),
    }
}

fn run(config: RegistryConfig, input: impl BufRead, mut output: impl Write) -> Result<()> {
    log::info!("Agent state directory: {:?}", config.storage.dir);
    let mut registry = AgentRegistry::new(config)?;

    for (number, line) in input.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let record: StepRecord = serde_json::from_str(&line)
            .map_err(|e| Error::InvalidObservation(format!("line {}: {}", number + 1, e)))?;

        let action = registry.act(record.step, &record.agent_id, &record.state)?;
        writeln!(output, "{}", action)?;
        output.flush()?;
    }

    registry.close()
}

fn inspect(state_dir: &std::path::Path, agent_id: &str, mut output: impl Write) -> Result<()> {
    let store = AgentStore::new(state_dir, PersistenceOptions::default());
    if !store.exists(agent_id) {
        writeln!(output, "no saved state for {:?} in {:?}", agent_id, state_dir)?;
        return Ok(());
    }
    let snapshot = store.load(agent_id)?;

    writeln!(output, "Q-table ({} values):", snapshot.q_table.len())?;
    let mut states: Vec<StateType> = snapshot
        .q_table
        .entries()
        .into_iter()
        .map(|entry| entry.state)
        .collect();
    states.dedup();
    for state in &states {
        match snapshot.q_table.best_action(state) {
            Some(action) => writeln!(
                output,
                "  {:<28} {:<12} {:.4}",
                state.label(),
                action.as_str(),
                snapshot.q_table.get(state, action)
            )?,
            None => writeln!(output, "  {:<28} -", state.label())?,
        }
    }

    writeln!(output, "Episodes ({}):", snapshot.episodes.len())?;
    for info in snapshot.episodes.iter() {
        writeln!(
            output,
            "  step {:>8}  max profit {:>8}  deposit {:>8}  debt {:>8}  steps {:>6}  at {}",
            info.step,
            info.max_profit,
            info.final_deposit,
            info.final_debt,
            info.steps,
            info.recorded_at.to_rfc3339()
        )?;
    }
    if let Some(best) = snapshot.episodes.best_profit() {
        writeln!(output, "Best max profit: {}", best)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_prints_one_action_per_line() {
        let dir = tempfile::tempdir().unwrap();
        let input = concat!(
            r#"{"step":1,"agent_id":"a","state":{"deposit":100,"debt":0,"shareHolding":0,"bidPrice":10,"askPrice":10}}"#,
            "\n\n",
            r#"{"step":1,"agent_id":"b","state":{"deposit":100,"debt":0,"shareHolding":0,"bidPrice":10,"askPrice":10}}"#,
            "\n",
            r#"{"step":2,"agent_id":"a","state":{"deposit":0,"debt":500,"shareHolding":0,"bidPrice":10,"askPrice":10,"isZombie":true}}"#,
            "\n",
        );
        let mut output = Vec::new();
        run(
            RegistryConfig::in_dir(dir.path()).with_seed(3),
            input.as_bytes(),
            &mut output,
        )
        .unwrap();

        let text = String::from_utf8(output).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        for line in lines {
            assert!(line.parse::<stock_agents::Action>().is_ok(), "{}", line);
        }

        let store = AgentStore::new(dir.path(), PersistenceOptions::default());
        assert_eq!(store.load_episodes("a").unwrap().len(), 1);
    }

    #[test]
    fn test_run_rejects_bad_line() {
        let dir = tempfile::tempdir().unwrap();
        let mut output = Vec::new();
        let err = run(
            RegistryConfig::in_dir(dir.path()),
            "{\"step\":1}\n".as_bytes(),
            &mut output,
        )
        .unwrap_err();
        assert!(matches!(err, Error::InvalidObservation(msg) if msg.starts_with("line 1")));
    }

    #[test]
    fn test_inspect_lists_states_and_episodes() {
        let dir = tempfile::tempdir().unwrap();
        let input = concat!(
            r#"{"step":1,"agent_id":"a","state":{"deposit":100,"debt":0,"shareHolding":0,"bidPrice":10,"askPrice":10}}"#,
            "\n",
            r#"{"step":2,"agent_id":"a","state":{"deposit":120,"debt":0,"shareHolding":0,"bidPrice":10,"askPrice":12}}"#,
            "\n",
            r#"{"step":3,"agent_id":"a","state":{"deposit":0,"debt":500,"shareHolding":0,"bidPrice":10,"askPrice":10,"isZombie":true}}"#,
            "\n",
        );
        run(
            RegistryConfig::in_dir(dir.path()).with_seed(1),
            input.as_bytes(),
            io::sink(),
        )
        .unwrap();

        let mut output = Vec::new();
        inspect(dir.path(), "a", &mut output).unwrap();
        let text = String::from_utf8(output).unwrap();
        assert!(text.contains("Q-table (2 values)"));
        assert!(text.contains("init"));
        assert!(text.contains("Episodes (1)"));
        assert!(text.contains("Best max profit: 20"));
    }

    #[test]
    fn test_inspect_unknown_agent() {
        let dir = tempfile::tempdir().unwrap();
        let mut output = Vec::new();
        inspect(dir.path(), "ghost", &mut output).unwrap();
        assert!(String::from_utf8(output).unwrap().starts_with("no saved state"));
    }
}
