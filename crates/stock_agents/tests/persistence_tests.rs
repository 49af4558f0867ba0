//! Integration tests for agent state persistence
//!
//! Tests the on-disk blob format, file naming per entity id, and how damaged
//! or missing files are treated.

use std::fs;
use stock_agents::{
    Action, AgentConfig, AgentStore, EpisodeInfo, EpisodeLog, Error, PersistenceOptions, QTable,
    StateType,
};

fn sample_table() -> QTable {
    let mut table = QTable::new();
    table.set("ownStock[5,10)".parse().unwrap(), Action::Wait, 0.25);
    table.set(StateType::Init, Action::BuyShares, 1.5);
    table.set("bankrupt(-inf,-100)".parse().unwrap(), Action::Liquidate, -3.0);
    table
}

// ============================================================================
// Blob Format Tests
// ============================================================================

#[test]
fn test_q_table_blob_is_sorted_list_of_labels() {
    let dir = tempfile::tempdir().unwrap();
    let store = AgentStore::new(dir.path(), PersistenceOptions::compact());
    store
        .save("inv", &sample_table(), &EpisodeLog::new())
        .unwrap();

    let raw = fs::read_to_string(store.q_table_path("inv")).unwrap();
    let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
    let rows = json.as_array().unwrap();
    assert_eq!(rows.len(), 3);

    let states: Vec<&str> = rows.iter().map(|r| r["state"].as_str().unwrap()).collect();
    assert_eq!(states, vec!["bankrupt(-inf,-100)", "init", "ownStock[5,10)"]);
    assert_eq!(rows[1]["action"], "buyShares");
    assert_eq!(rows[1]["value"], 1.5);
    assert!(!raw.contains('\n'));
}

#[test]
fn test_pretty_output_is_multiline_and_equivalent() {
    let dir = tempfile::tempdir().unwrap();
    let pretty = AgentStore::new(dir.path().join("pretty"), PersistenceOptions::readable());
    let compact = AgentStore::new(dir.path().join("compact"), PersistenceOptions::compact());
    let table = sample_table();

    pretty.save("inv", &table, &EpisodeLog::new()).unwrap();
    compact.save("inv", &table, &EpisodeLog::new()).unwrap();

    let pretty_raw = fs::read_to_string(pretty.q_table_path("inv")).unwrap();
    assert!(pretty_raw.contains('\n'));
    assert_eq!(
        pretty.load_q_table("inv").unwrap(),
        compact.load_q_table("inv").unwrap()
    );
}

#[test]
fn test_episode_blob_fields() {
    let dir = tempfile::tempdir().unwrap();
    let store = AgentStore::new(dir.path(), PersistenceOptions::default());
    let mut episodes = EpisodeLog::new();
    episodes.push(EpisodeInfo::new(57, 340, 0, 1_200).with_steps(57));
    store.save("inv", &QTable::new(), &episodes).unwrap();

    let raw = fs::read_to_string(store.episodes_path("inv")).unwrap();
    let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
    let row = &json[0];
    assert_eq!(row["step"], 57);
    assert_eq!(row["max_profit"], 340);
    assert_eq!(row["final_deposit"], 0);
    assert_eq!(row["final_debt"], 1_200);
    assert_eq!(row["steps"], 57);
}

#[test]
fn test_values_survive_exactly() {
    let dir = tempfile::tempdir().unwrap();
    let store = AgentStore::new(dir.path(), PersistenceOptions::default());
    let mut table = QTable::new();
    table.set(StateType::Terminate, Action::RequestLoan, 0.1 * 3.0 - 1.0 / 7.0);
    store.save("inv", &table, &EpisodeLog::new()).unwrap();

    assert_eq!(store.load_q_table("inv").unwrap(), table);
}

// ============================================================================
// File Naming Tests
// ============================================================================

#[test]
fn test_distinct_ids_never_share_files() {
    let dir = tempfile::tempdir().unwrap();
    let store = AgentStore::new(dir.path(), PersistenceOptions::default());
    let ids = ["a b", "a_b", "a%20b", "../a", "a/b", "Ä", ""];

    for (i, id) in ids.iter().enumerate() {
        let mut table = QTable::new();
        table.set(StateType::Init, Action::Wait, i as f64);
        store.save(id, &table, &EpisodeLog::new()).unwrap();
    }

    for (i, id) in ids.iter().enumerate() {
        let path = store.q_table_path(id);
        assert_eq!(path.parent().unwrap(), dir.path());
        let table = store.load_q_table(id).unwrap();
        assert_eq!(table.get(&StateType::Init, Action::Wait), i as f64);
    }
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), ids.len() * 2);
}

// ============================================================================
// Damaged State Tests
// ============================================================================

#[test]
fn test_truncated_blob_is_reported_not_replaced() {
    let dir = tempfile::tempdir().unwrap();
    let store = AgentStore::new(dir.path(), PersistenceOptions::default());
    store
        .save("inv", &sample_table(), &EpisodeLog::new())
        .unwrap();

    let path = store.q_table_path("inv");
    let raw = fs::read(&path).unwrap();
    fs::write(&path, &raw[..raw.len() / 2]).unwrap();

    match store.load("inv") {
        Err(Error::CorruptState { path: reported, .. }) => assert_eq!(reported, path),
        other => panic!("expected CorruptState, got {:?}", other),
    }
    assert_eq!(fs::read(&path).unwrap().len(), raw.len() / 2);
}

#[test]
fn test_corrupt_episode_log_blocks_agent_creation() {
    let dir = tempfile::tempdir().unwrap();
    let store = AgentStore::new(dir.path(), PersistenceOptions::default());
    fs::write(store.episodes_path("inv"), "{\"step\": 1}").unwrap();

    let err = stock_agents::Agent::open("inv", store, &AgentConfig::default()).unwrap_err();
    assert!(err.is_corrupt_state());
}

#[test]
fn test_whitespace_only_files_are_empty_state() {
    let dir = tempfile::tempdir().unwrap();
    let store = AgentStore::new(dir.path(), PersistenceOptions::default());
    fs::write(store.q_table_path("inv"), "\n  \n").unwrap();
    fs::write(store.episodes_path("inv"), "").unwrap();

    let snapshot = store.load("inv").unwrap();
    assert!(snapshot.q_table.is_empty());
    assert!(snapshot.episodes.is_empty());
}
