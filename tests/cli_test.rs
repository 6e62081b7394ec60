//! Binary-level tests: configuration handling, subcommands, and the menu

use assert_cmd::Command;
use predicates::prelude::*;

use ollama_journal::clock::Clock;
use ollama_journal::storage::SqliteStorage;

mod common;
use common::{journal_config, temp_config_file};

#[test]
fn test_missing_config_is_fatal() {
    let dir = tempfile::TempDir::new().unwrap();
    let missing = dir.path().join("nope.yaml");

    let mut cmd = Command::cargo_bin("ollama-journal").unwrap();
    cmd.arg("--config").arg(&missing).arg("list");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Config file not found"));
}

#[test]
fn test_invalid_timezone_is_fatal() {
    let (_dir, config_path) = temp_config_file(
        "ollama:\n  host: http://localhost:11434\n  model: m\npaths:\n  db: chats.db\ntimezone:\n  offset: 20\n",
    );

    let mut cmd = Command::cargo_bin("ollama-journal").unwrap();
    cmd.env_remove("OLLAMA_JOURNAL_TZ_OFFSET")
        .arg("--config")
        .arg(&config_path)
        .arg("list");

    cmd.assert().failure();
}

#[test]
fn test_list_on_empty_store() {
    let (dir, config_path) = temp_config_file(&journal_config("http://127.0.0.1:1"));

    let mut cmd = Command::cargo_bin("ollama-journal").unwrap();
    cmd.env_remove("OLLAMA_JOURNAL_DB")
        .env_remove("OLLAMA_JOURNAL_CHATS_DIR")
        .arg("--config")
        .arg(&config_path)
        .arg("list");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("No chats found"));

    // Relative paths resolve next to the config file
    assert!(dir.path().join("data").join("chats.db").exists());
}

#[test]
fn test_export_with_nothing_stored() {
    let (_dir, config_path) = temp_config_file(&journal_config("http://127.0.0.1:1"));

    let mut cmd = Command::cargo_bin("ollama-journal").unwrap();
    cmd.env_remove("OLLAMA_JOURNAL_DB")
        .env_remove("OLLAMA_JOURNAL_CHATS_DIR")
        .arg("--config")
        .arg(&config_path)
        .arg("export");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("No chats found"));
}

#[test]
fn test_delete_unknown_session_fails() {
    let (_dir, config_path) = temp_config_file(&journal_config("http://127.0.0.1:1"));

    let mut cmd = Command::cargo_bin("ollama-journal").unwrap();
    cmd.env_remove("OLLAMA_JOURNAL_DB")
        .env_remove("OLLAMA_JOURNAL_CHATS_DIR")
        .arg("--config")
        .arg(&config_path)
        .args(["delete", "5", "--yes"]);

    cmd.assert()
        .failure()
        .stdout(predicate::str::contains("Session 5 not found"));
}

#[test]
fn test_menu_exit_option() {
    let (_dir, config_path) = temp_config_file(&journal_config("http://127.0.0.1:1"));

    let mut cmd = Command::cargo_bin("ollama-journal").unwrap();
    cmd.env_remove("OLLAMA_JOURNAL_DB")
        .env_remove("OLLAMA_JOURNAL_CHATS_DIR")
        .arg("--config")
        .arg(&config_path)
        .write_stdin("9\n2\n6\n");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Invalid option"))
        .stdout(predicate::str::contains("No chats found"))
        .stdout(predicate::str::contains("Goodbye!"));
}

fn seeded_session(dir: &std::path::Path) -> (SqliteStorage, i64) {
    let storage =
        SqliteStorage::new_with_path(dir.join("data").join("chats.db"), Clock::utc()).unwrap();
    let id = storage.create_session("work", "keep-me").unwrap();
    (storage, id)
}

#[test]
fn test_menu_delete_declined_keeps_session() {
    let (dir, config_path) = temp_config_file(&journal_config("http://127.0.0.1:1"));
    let (storage, id) = seeded_session(dir.path());

    let mut cmd = Command::cargo_bin("ollama-journal").unwrap();
    cmd.env_remove("OLLAMA_JOURNAL_DB")
        .env_remove("OLLAMA_JOURNAL_CHATS_DIR")
        .arg("--config")
        .arg(&config_path)
        .write_stdin(format!("5\n{}\nn\n6\n", id));

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Cancelled."))
        .stdout(predicate::str::contains("Goodbye!"));

    assert!(storage.get_session(id).unwrap().is_some());
}

#[test]
fn test_menu_delete_confirmed_removes_session() {
    let (dir, config_path) = temp_config_file(&journal_config("http://127.0.0.1:1"));
    let (storage, id) = seeded_session(dir.path());

    let mut cmd = Command::cargo_bin("ollama-journal").unwrap();
    cmd.env_remove("OLLAMA_JOURNAL_DB")
        .env_remove("OLLAMA_JOURNAL_CHATS_DIR")
        .arg("--config")
        .arg(&config_path)
        .write_stdin(format!("5\n{}\ny\n6\n", id));

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Deleted chat"));

    assert!(storage.get_session(id).unwrap().is_none());
}
