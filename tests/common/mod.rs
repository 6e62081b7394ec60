use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;
use ollama_journal::clock::Clock;
use ollama_journal::mirror::MarkdownMirror;
use ollama_journal::storage::SqliteStorage;

/// Store and mirror rooted in one temporary directory
#[allow(dead_code)]
pub fn create_temp_journal() -> (SqliteStorage, MarkdownMirror, TempDir) {
    let tmp = TempDir::new().expect("failed to create tempdir");
    let storage = SqliteStorage::new_with_path(tmp.path().join("data").join("chats.db"), Clock::utc())
        .expect("failed to create sqlite storage with path");
    let mirror = MarkdownMirror::new(tmp.path().join("chats"));
    (storage, mirror, tmp)
}

#[allow(dead_code)]
pub fn temp_config_file(contents: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("failed to create tempdir");
    let config_path = temp_dir.path().join("config.yaml");
    fs::write(&config_path, contents).expect("failed to write config file");
    (temp_dir, config_path)
}

/// Config whose relative paths land inside the config's temp directory
#[allow(dead_code)]
pub fn journal_config(host: &str) -> String {
    format!(
        "ollama:\n  host: {}\n  model: test-model\npaths:\n  db: data/chats.db\n  chats_dir: chats\ntimezone:\n  offset: 0\n",
        host
    )
}
