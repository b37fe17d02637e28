//! CLI command tests
//!
//! This module contains all tests for the CLI commands.

use std::fs;

use tally_core::models::DEFAULT_BUDGET;
use tally_core::{AppState, Config, MemoryStore, TransactionType};

use crate::commands::{self, truncate, EditFields};

fn setup_state() -> AppState<MemoryStore> {
    AppState::load(MemoryStore::new(), DEFAULT_BUDGET).unwrap()
}

fn add_expense(state: &mut AppState<MemoryStore>, category: &str, amount: f64, date: &str) -> String {
    commands::cmd_add(state, "expense", category, amount, Some(date), None).unwrap();
    state.transactions().last().unwrap().id.clone()
}

// ========== Helper Tests ==========

#[test]
fn test_truncate() {
    assert_eq!(truncate("short", 10), "short");
    assert_eq!(truncate("a much longer category", 10), "a much ...");
    // Multi-byte characters are not split
    assert_eq!(truncate("Café au lait", 6), "Caf...");
}

#[test]
fn test_format_amount() {
    assert!(commands::format_amount(12.5, true).contains("+$12.50"));
    assert!(commands::format_amount(12.5, false).contains("-$12.50"));
}

// ========== Transaction Command Tests ==========

#[test]
fn test_cmd_add() {
    let mut state = setup_state();
    commands::cmd_add(&mut state, "income", "Income", 2500.0, Some("2024-01-01"), Some("salary".into()))
        .unwrap();

    let tx = &state.transactions()[0];
    assert_eq!(tx.kind, TransactionType::Income);
    assert_eq!(tx.amount, 2500.0);
    assert_eq!(tx.date.to_string(), "2024-01-01");
    assert_eq!(tx.notes.as_deref(), Some("salary"));
}

#[test]
fn test_cmd_add_defaults_to_today() {
    let mut state = setup_state();
    commands::cmd_add(&mut state, "expense", "Shopping", 5.0, None, None).unwrap();
    assert_eq!(state.transactions()[0].date, chrono::Local::now().date_naive());
}

#[test]
fn test_cmd_add_rejects_bad_input() {
    let mut state = setup_state();
    assert!(commands::cmd_add(&mut state, "transfer", "Shopping", 5.0, None, None).is_err());
    assert!(commands::cmd_add(&mut state, "expense", "Shopping", -5.0, None, None).is_err());
    assert!(commands::cmd_add(&mut state, "expense", "Shopping", 5.0, Some("15/01/2024"), None).is_err());
    assert!(commands::cmd_add(&mut state, "expense", "Lottery", 5.0, None, None).is_err());
    assert!(state.transactions().is_empty());
}

#[test]
fn test_cmd_edit_keeps_unspecified_fields() {
    let mut state = setup_state();
    let id = add_expense(&mut state, "Shopping", 40.0, "2024-01-10");

    commands::cmd_edit(
        &mut state,
        &id,
        EditFields {
            amount: Some(55.0),
            notes: Some("returned one".into()),
            ..EditFields::default()
        },
    )
    .unwrap();

    let tx = state.get(&id).unwrap();
    assert_eq!(tx.amount, 55.0);
    assert_eq!(tx.category, "Shopping");
    assert_eq!(tx.date.to_string(), "2024-01-10");
    assert_eq!(tx.notes.as_deref(), Some("returned one"));
}

#[test]
fn test_cmd_edit_missing_transaction() {
    let mut state = setup_state();
    assert!(commands::cmd_edit(&mut state, "404", EditFields::default()).is_err());
}

#[test]
fn test_cmd_delete() {
    let mut state = setup_state();
    let id = add_expense(&mut state, "Travel", 300.0, "2024-01-10");

    commands::cmd_delete(&mut state, &id).unwrap();
    assert!(state.transactions().is_empty());
    assert!(commands::cmd_delete(&mut state, &id).is_err());
}

#[test]
fn test_cmd_list() {
    let mut state = setup_state();
    assert!(commands::cmd_list(&state, 20, None).is_ok());

    add_expense(&mut state, "Travel", 300.0, "2024-01-10");
    assert!(commands::cmd_list(&state, 20, None).is_ok());
    assert!(commands::cmd_list(&state, 20, Some("2024-01")).is_ok());
    assert!(commands::cmd_list(&state, 20, Some("January")).is_err());
}

// ========== Budget Command Tests ==========

#[test]
fn test_cmd_budget() {
    let mut state = setup_state();
    assert!(commands::cmd_budget_show(&state).is_ok());

    commands::cmd_budget_set(&mut state, 1200.0).unwrap();
    assert_eq!(state.budget(), 1200.0);

    assert!(commands::cmd_budget_set(&mut state, -10.0).is_err());
    assert_eq!(state.budget(), 1200.0);
}

// ========== Report Command Tests ==========

#[test]
fn test_cmd_summary() {
    let mut state = setup_state();
    assert!(commands::cmd_summary(&state, None, false).is_ok());

    add_expense(&mut state, "Food & Dining", 80.0, "2024-01-10");
    add_expense(&mut state, "Travel", 300.0, "2024-02-10");
    assert!(commands::cmd_summary(&state, None, false).is_ok());
    assert!(commands::cmd_summary(&state, Some("2024-01"), true).is_ok());
    assert!(commands::cmd_summary(&state, Some("2024-13"), false).is_err());
}

#[tokio::test]
async fn test_cmd_analyze_local() {
    let mut state = setup_state();
    add_expense(&mut state, "Food & Dining", 80.0, "2024-01-10");

    let analyzer = tally_core::Analyzer::local();
    assert!(commands::cmd_analyze(&state, &analyzer, false).await.is_ok());
    assert!(commands::cmd_analyze(&state, &analyzer, true).await.is_ok());
}

#[test]
fn test_cmd_categories() {
    assert!(commands::cmd_categories(None).is_ok());
    assert!(commands::cmd_categories(Some("income")).is_ok());
    assert!(commands::cmd_categories(Some("gift")).is_err());
}

#[test]
fn test_cmd_status() {
    let dir = tempfile::tempdir().unwrap();
    let config = Config::defaults(dir.path());
    let state = setup_state();
    assert!(commands::cmd_status(&state, &config).is_ok());
}

#[tokio::test]
async fn test_cmd_ai_test_without_backend() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = Config::defaults(dir.path());
    config.ai.backend = "none".into();
    assert!(commands::cmd_ai_test(&config).await.is_ok());
}

#[tokio::test]
async fn test_cmd_ai_test_mock_backend() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = Config::defaults(dir.path());
    config.ai.backend = "mock".into();
    assert!(commands::cmd_ai_test(&config).await.is_ok());
}

// ========== Import/Export Command Tests ==========

#[test]
fn test_cmd_export_then_import() {
    let dir = tempfile::tempdir().unwrap();
    let mut state = setup_state();
    add_expense(&mut state, "Food & Dining", 80.0, "2024-01-10");
    add_expense(&mut state, "Travel", 300.0, "2024-02-10");

    let json_path = dir.path().join("out.json");
    commands::cmd_export(&state, Some(json_path.as_path()), "json").unwrap();

    let mut fresh = setup_state();
    commands::cmd_import(&mut fresh, &json_path, None).unwrap();
    assert_eq!(fresh.transactions(), state.transactions());

    let csv_path = dir.path().join("out.csv");
    commands::cmd_export(&state, Some(csv_path.as_path()), "csv").unwrap();
    let csv = fs::read_to_string(&csv_path).unwrap();
    assert!(csv.starts_with("Date,Type,Category,Amount,Notes"));
}

#[test]
fn test_cmd_import_detects_format_from_content() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("transactions.txt");
    fs::write(&path, "Date,Type,Category,Amount\n2024-01-03,expense,Healthcare,45\n").unwrap();

    let mut state = setup_state();
    commands::cmd_import(&mut state, &path, None).unwrap();
    assert_eq!(state.transactions().len(), 1);
    assert_eq!(state.transactions()[0].category, "Healthcare");
}

#[test]
fn test_cmd_import_errors() {
    let dir = tempfile::tempdir().unwrap();
    let mut state = setup_state();

    assert!(commands::cmd_import(&mut state, &dir.path().join("missing.csv"), None).is_err());

    let path = dir.path().join("bad.json");
    fs::write(&path, "{\"not\": \"an array\"}").unwrap();
    assert!(commands::cmd_import(&mut state, &path, None).is_err());
    assert!(commands::cmd_import(&mut state, &path, Some("xml")).is_err());
}

#[test]
fn test_cmd_export_rejects_unknown_format() {
    let state = setup_state();
    assert!(commands::cmd_export(&state, None, "xlsx").is_err());
}

// ========== Config Tests ==========

#[test]
fn test_load_config_ignores_malformed_file() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("config.toml"), "default_budget = [").unwrap();

    let config = commands::load_config(Some(dir.path()));
    assert_eq!(config.default_budget, DEFAULT_BUDGET);
    assert_eq!(config.data_dir, dir.path());
}

#[test]
fn test_open_state_on_disk() {
    let dir = tempfile::tempdir().unwrap();
    let config = Config::defaults(dir.path().join("data"));

    let mut state = commands::open_state(&config).unwrap();
    commands::cmd_budget_set(&mut state, 900.0).unwrap();

    let reopened = commands::open_state(&config).unwrap();
    assert_eq!(reopened.budget(), 900.0);
}
