//! Application configuration.
//!
//! The configuration is loaded from `$XDG_CONFIG_HOME/i3custom/config.json`.
//! Every section is optional, so the file can grow new sections later
//! without breaking older files.
//!
//! # Example
//!
//! ```json
//! {
//!   "socket_path": "/run/user/1000/i3/ipc-socket.1234",
//!   "history": { "capacity": 10 },
//!   "notifier": { "program": "swaynag", "args": ["-m"] }
//! }
//! ```

use crate::history::DEFAULT_CAPACITY;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Top-level configuration.
///
/// A minimal `{}` file is valid and all sections fall back to their
/// compiled-in defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// IPC socket to connect to.  Discovered from the environment when
    /// unset.
    #[serde(default)]
    pub socket_path: Option<PathBuf>,

    /// Workspace history settings.
    #[serde(default)]
    pub history: HistoryConfig,

    /// How error messages are shown to the user.
    #[serde(default)]
    pub notifier: NotifierConfig,
}

/// Workspace history settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// Number of remembered visits.  Values below `1` are treated as `1`.
    pub capacity: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
        }
    }
}

/// The program launched to show an error message.
///
/// The message is appended as the last argument, so the default runs
/// `i3-nagbar -m <message>`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NotifierConfig {
    pub program: String,
    pub args: Vec<String>,
}

impl Default for NotifierConfig {
    fn default() -> Self {
        Self {
            program: "i3-nagbar".into(),
            args: vec!["-m".into()],
        }
    }
}

impl Config {
    /// Load configuration from a JSON file at `path`.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError(format!("failed to read {}: {}", path.display(), e)))?;
        let config: Self = serde_json::from_str(&contents)
            .map_err(|e| ConfigError(format!("failed to parse {}: {}", path.display(), e)))?;
        Ok(config)
    }
}

/// Error from loading or parsing a configuration file.
#[derive(Debug, thiserror::Error)]
#[error("config error: {0}")]
pub struct ConfigError(String);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserialize_full_config() {
        let json = r#"{
            "socket_path": "/tmp/i3.sock",
            "history": { "capacity": 4 },
            "notifier": { "program": "swaynag", "args": ["-t", "warning", "-m"] }
        }"#;
        let cfg: Config = serde_json::from_str(json).unwrap();
        assert_eq!(cfg.socket_path, Some(PathBuf::from("/tmp/i3.sock")));
        assert_eq!(cfg.history.capacity, 4);
        assert_eq!(cfg.notifier.program, "swaynag");
        assert_eq!(cfg.notifier.args, vec!["-t", "warning", "-m"]);
    }

    #[test]
    fn deserialize_empty_uses_defaults() {
        let cfg: Config = serde_json::from_str("{}").unwrap();
        assert_eq!(cfg.socket_path, None);
        assert_eq!(cfg.history.capacity, DEFAULT_CAPACITY);
        let nd = NotifierConfig::default();
        assert_eq!(cfg.notifier.program, nd.program);
        assert_eq!(cfg.notifier.args, nd.args);
    }

    #[test]
    fn deserialize_partial_notifier() {
        let json = r#"{ "notifier": { "program": "swaynag" } }"#;
        let cfg: Config = serde_json::from_str(json).unwrap();
        assert_eq!(cfg.notifier.program, "swaynag");
        assert_eq!(cfg.notifier.args, vec!["-m"]);
    }

    #[test]
    fn unknown_top_level_keys_ignored() {
        let json = r#"{ "history": {}, "future_section": { "key": 42 } }"#;
        let _cfg: Config = serde_json::from_str(json).unwrap();
    }

    #[test]
    fn load_missing_file_is_error() {
        let path = std::env::temp_dir().join(format!(
            "i3custom-missing-{}.json",
            std::process::id()
        ));
        let err = Config::load(&path).unwrap_err();
        assert!(err.to_string().contains("failed to read"));
    }

    #[test]
    fn load_from_file() {
        let path = std::env::temp_dir().join(format!(
            "i3custom-config-{}.json",
            std::process::id()
        ));
        std::fs::write(&path, r#"{ "history": { "capacity": 3 } }"#).unwrap();
        let cfg = Config::load(&path).unwrap();
        assert_eq!(cfg.history.capacity, 3);
        let _ = std::fs::remove_file(&path);
    }
}
