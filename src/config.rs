//! Configuration management for ollama-journal
//!
//! This module handles loading, parsing, validating, and managing
//! configuration from a YAML file, environment variables, and CLI overrides.
//!
//! The configuration is loaded once at startup and passed explicitly to
//! every component that needs it.

use crate::clock::Clock;
use crate::error::{JournalError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Inference server settings
    #[serde(default)]
    pub ollama: OllamaConfig,

    /// Storage locations
    #[serde(default)]
    pub paths: PathsConfig,

    /// Timezone used for every persisted and mirrored timestamp
    #[serde(default)]
    pub timezone: TimezoneConfig,
}

/// Ollama server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OllamaConfig {
    /// Ollama server host, e.g. `http://localhost:11434`
    #[serde(default = "default_ollama_host")]
    pub host: String,

    /// Model used when a chat starts
    #[serde(default = "default_ollama_model")]
    pub model: String,

    /// Request streamed replies and echo them as they arrive
    #[serde(default = "default_stream")]
    pub stream: bool,

    /// HTTP request timeout (seconds)
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

fn default_ollama_host() -> String {
    "http://localhost:11434".to_string()
}

fn default_ollama_model() -> String {
    "llama3.2:latest".to_string()
}

fn default_stream() -> bool {
    true
}

fn default_timeout_seconds() -> u64 {
    600
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            host: default_ollama_host(),
            model: default_ollama_model(),
            stream: default_stream(),
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

/// Storage path configuration
///
/// Relative paths are resolved against the directory holding the
/// configuration file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// SQLite database file; the platform data directory is used when unset
    #[serde(default)]
    pub db: Option<PathBuf>,

    /// Root directory for markdown transcripts
    #[serde(default = "default_chats_dir")]
    pub chats_dir: PathBuf,
}

fn default_chats_dir() -> PathBuf {
    PathBuf::from("chats")
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            db: None,
            chats_dir: default_chats_dir(),
        }
    }
}

/// Timezone configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TimezoneConfig {
    /// Whole hours east of UTC
    #[serde(default)]
    pub offset: i32,
}

impl Config {
    /// Load configuration from file, then apply environment and CLI overrides
    ///
    /// Unlike most settings, the file itself is mandatory: a missing file is a
    /// configuration error and the process is expected to exit.
    ///
    /// # Errors
    ///
    /// Returns `JournalError::Config` if the file is missing or unparsable.
    pub fn load(path: &str, cli: &crate::cli::Cli) -> Result<Self> {
        let path = Path::new(path);
        if !path.exists() {
            return Err(JournalError::Config(format!(
                "Config file not found at: {}",
                path.display()
            ))
            .into());
        }

        let mut config = Self::from_file(path)?;
        let base_dir = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));

        config.apply_env_vars();
        config.apply_cli_overrides(cli);
        config.resolve_paths(&base_dir);

        Ok(config)
    }

    fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| JournalError::Config(format!("Failed to read config file: {}", e)))?;
        serde_yaml::from_str(&contents)
            .map_err(|e| JournalError::Config(format!("Failed to parse config: {}", e)).into())
    }

    fn apply_env_vars(&mut self) {
        if let Ok(host) = std::env::var("OLLAMA_JOURNAL_HOST") {
            self.ollama.host = host;
        }

        if let Ok(model) = std::env::var("OLLAMA_JOURNAL_MODEL") {
            self.ollama.model = model;
        }

        if let Ok(stream) = std::env::var("OLLAMA_JOURNAL_STREAM") {
            if let Ok(value) = stream.parse() {
                self.ollama.stream = value;
            } else {
                tracing::warn!("Invalid OLLAMA_JOURNAL_STREAM: {}", stream);
            }
        }

        if let Ok(db) = std::env::var("OLLAMA_JOURNAL_DB") {
            self.paths.db = Some(PathBuf::from(db));
        }

        if let Ok(chats_dir) = std::env::var("OLLAMA_JOURNAL_CHATS_DIR") {
            self.paths.chats_dir = PathBuf::from(chats_dir);
        }

        if let Ok(offset) = std::env::var("OLLAMA_JOURNAL_TZ_OFFSET") {
            if let Ok(value) = offset.parse() {
                self.timezone.offset = value;
            } else {
                tracing::warn!("Invalid OLLAMA_JOURNAL_TZ_OFFSET: {}", offset);
            }
        }
    }

    fn apply_cli_overrides(&mut self, cli: &crate::cli::Cli) {
        if cli.no_stream {
            tracing::debug!("Streaming disabled from the command line");
            self.ollama.stream = false;
        }
    }

    fn resolve_paths(&mut self, base_dir: &Path) {
        if let Some(db) = self.paths.db.as_mut() {
            if db.is_relative() {
                *db = base_dir.join(&*db);
            }
        }
        if self.paths.chats_dir.is_relative() {
            self.paths.chats_dir = base_dir.join(&self.paths.chats_dir);
        }
    }

    /// Clock for the configured timezone offset
    ///
    /// # Errors
    ///
    /// Returns `JournalError::Config` if the offset is out of range.
    pub fn clock(&self) -> Result<Clock> {
        Clock::from_hours(self.timezone.offset)
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns error if any validation check fails
    pub fn validate(&self) -> Result<()> {
        if self.ollama.host.trim().is_empty() {
            return Err(JournalError::Config("ollama.host cannot be empty".to_string()).into());
        }

        if !self.ollama.host.starts_with("http://") && !self.ollama.host.starts_with("https://") {
            return Err(JournalError::Config(format!(
                "ollama.host must start with http:// or https://, got {}",
                self.ollama.host
            ))
            .into());
        }

        if self.ollama.model.trim().is_empty() {
            return Err(JournalError::Config("ollama.model cannot be empty".to_string()).into());
        }

        if self.ollama.timeout_seconds == 0 {
            return Err(JournalError::Config(
                "ollama.timeout_seconds must be greater than 0".to_string(),
            )
            .into());
        }

        if matches!(&self.paths.db, Some(db) if db.as_os_str().is_empty()) {
            return Err(JournalError::Config("paths.db cannot be empty".to_string()).into());
        }

        if self.paths.chats_dir.as_os_str().is_empty() {
            return Err(JournalError::Config("paths.chats_dir cannot be empty".to_string()).into());
        }

        self.clock()?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Cli;
    use serial_test::serial;
    use std::env;
    use tempfile::tempdir;

    fn write_config(dir: &Path, contents: &str) -> PathBuf {
        let path = dir.join("config.yaml");
        std::fs::write(&path, contents).expect("write config");
        path
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.ollama.host, "http://localhost:11434");
        assert_eq!(config.ollama.model, "llama3.2:latest");
        assert!(config.ollama.stream);
        assert_eq!(config.timezone.offset, 0);
        assert!(config.paths.db.is_none());
    }

    #[test]
    fn test_config_validation_success() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_config_validation_empty_model() {
        let mut config = Config::default();
        config.ollama.model = "  ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_host_without_scheme() {
        let mut config = Config::default();
        config.ollama.host = "localhost:11434".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_offset_out_of_range() {
        let mut config = Config::default();
        config.timezone.offset = 30;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_zero_timeout() {
        let mut config = Config::default();
        config.ollama.timeout_seconds = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_from_yaml() {
        let yaml = r#"
ollama:
  model: mistral:7b
  host: http://127.0.0.1:11434
paths:
  db: data/chats.db
  chats_dir: chats
timezone:
  offset: 9
"#;

        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.ollama.model, "mistral:7b");
        assert_eq!(config.ollama.host, "http://127.0.0.1:11434");
        assert!(config.ollama.stream);
        assert_eq!(config.ollama.timeout_seconds, 600);
        assert_eq!(config.paths.db, Some(PathBuf::from("data/chats.db")));
        assert_eq!(config.timezone.offset, 9);
        assert_eq!(config.clock().unwrap().offset_hours(), 9);
    }

    #[test]
    #[serial]
    fn test_load_missing_file_is_an_error() {
        let err = Config::load("definitely/not/here.yaml", &Cli::default()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<JournalError>(),
            Some(JournalError::Config(msg)) if msg.contains("not found")
        ));
    }

    #[test]
    #[serial]
    fn test_load_resolves_relative_paths_against_config_dir() {
        let dir = tempdir().unwrap();
        let path = write_config(
            dir.path(),
            "paths:\n  db: data/chats.db\n  chats_dir: chats\n",
        );

        let config = Config::load(path.to_str().unwrap(), &Cli::default()).unwrap();
        assert_eq!(config.paths.db, Some(dir.path().join("data/chats.db")));
        assert_eq!(config.paths.chats_dir, dir.path().join("chats"));
    }

    #[test]
    #[serial]
    fn test_load_keeps_absolute_paths() {
        let dir = tempdir().unwrap();
        let absolute = dir.path().join("elsewhere").join("db.sqlite");
        let yaml = format!("paths:\n  db: {}\n", absolute.display());
        let path = write_config(dir.path(), &yaml);

        let config = Config::load(path.to_str().unwrap(), &Cli::default()).unwrap();
        assert_eq!(config.paths.db, Some(absolute));
    }

    #[test]
    #[serial]
    fn test_load_rejects_malformed_yaml() {
        let dir = tempdir().unwrap();
        let path = write_config(dir.path(), "ollama: [unclosed");
        assert!(Config::load(path.to_str().unwrap(), &Cli::default()).is_err());
    }

    #[test]
    #[serial]
    fn test_apply_env_vars_overrides_fields() {
        let dir = tempdir().unwrap();
        let path = write_config(dir.path(), "ollama:\n  model: from-file\n");

        env::set_var("OLLAMA_JOURNAL_MODEL", "from-env");
        env::set_var("OLLAMA_JOURNAL_TZ_OFFSET", "-3");
        env::set_var("OLLAMA_JOURNAL_STREAM", "false");

        let config = Config::load(path.to_str().unwrap(), &Cli::default());

        env::remove_var("OLLAMA_JOURNAL_MODEL");
        env::remove_var("OLLAMA_JOURNAL_TZ_OFFSET");
        env::remove_var("OLLAMA_JOURNAL_STREAM");

        let config = config.unwrap();
        assert_eq!(config.ollama.model, "from-env");
        assert_eq!(config.timezone.offset, -3);
        assert!(!config.ollama.stream);
    }

    #[test]
    #[serial]
    fn test_apply_env_vars_ignores_invalid_offset() {
        let dir = tempdir().unwrap();
        let path = write_config(dir.path(), "timezone:\n  offset: 2\n");

        env::set_var("OLLAMA_JOURNAL_TZ_OFFSET", "two");
        let config = Config::load(path.to_str().unwrap(), &Cli::default());
        env::remove_var("OLLAMA_JOURNAL_TZ_OFFSET");

        assert_eq!(config.unwrap().timezone.offset, 2);
    }

    #[test]
    #[serial]
    fn test_cli_no_stream_overrides_file() {
        let dir = tempdir().unwrap();
        let path = write_config(dir.path(), "ollama:\n  stream: true\n");
        let cli = Cli {
            no_stream: true,
            ..Cli::default()
        };

        let config = Config::load(path.to_str().unwrap(), &cli).unwrap();
        assert!(!config.ollama.stream);
    }
}
