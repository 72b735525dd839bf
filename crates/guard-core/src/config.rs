use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Top-level configuration loaded from `~/.guardian/config.toml`.
///
/// Every section and field has a default, so a missing file (or a file with
/// only the sections the operator cares about) yields a runnable daemon.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub guardian: GuardianConfig,
    #[serde(default)]
    pub analyzer: AnalyzerConfig,
    #[serde(default)]
    pub probe: ProbeConfig,
}

impl Config {
    /// Load config from the default path, falling back to defaults when the
    /// file does not exist. A present-but-malformed file is an error.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(path)
        } else {
            let cfg = Config::default();
            cfg.validate()?;
            Ok(cfg)
        }
    }

    /// Load from a specific path.
    pub fn load_from(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        let text = std::fs::read_to_string(&path).map_err(|e| ConfigError::Io(e.to_string()))?;
        let cfg: Config = toml::from_str(&text).map_err(|e| ConfigError::Parse(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Semantic validation for settings that are not expressible via type checks.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.guardian.interval_secs == 0 {
            return Err(ConfigError::Validation(
                "guardian.interval_secs must be at least 1".to_string(),
            ));
        }
        if self.guardian.history_limit == 0 {
            return Err(ConfigError::Validation(
                "guardian.history_limit must be at least 1".to_string(),
            ));
        }
        if self.analyzer.command.trim().is_empty() {
            return Err(ConfigError::Validation(
                "analyzer.command must not be empty".to_string(),
            ));
        }
        if self.probe.command.trim().is_empty() {
            return Err(ConfigError::Validation(
                "probe.command must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Config file location: the `GUARDIAN_CONFIG` environment variable if
    /// set, otherwise `~/.guardian/config.toml`.
    pub fn default_path() -> PathBuf {
        if let Ok(path) = std::env::var("GUARDIAN_CONFIG") {
            return PathBuf::from(path);
        }
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".guardian")
            .join("config.toml")
    }

    /// The state directory with a leading `~` expanded.
    pub fn state_dir(&self) -> PathBuf {
        expand_home(&self.guardian.state_dir)
    }

    /// The analyzer working directory with a leading `~` expanded.
    pub fn analyzer_workdir(&self) -> PathBuf {
        expand_home(&self.analyzer.workdir)
    }
}

/// Expand a leading `~` or `~/` against the home directory.
pub fn expand_home(path: &str) -> PathBuf {
    if path == "~" {
        return dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
    }
    if let Some(rest) = path.strip_prefix("~/") {
        return dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(rest);
    }
    PathBuf::from(path)
}

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("io: {0}")]
    Io(String),
    #[error("parse: {0}")]
    Parse(String),
    #[error("validation: {0}")]
    Validation(String),
}

// ---------------------------------------------------------------------------
// Section structs
// ---------------------------------------------------------------------------

/// Loop-level settings: where state lives, how often cycles run, and how
/// many snapshots the history retains.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuardianConfig {
    #[serde(default = "default_state_dir")]
    pub state_dir: String,
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub json_logs: bool,
}

impl Default for GuardianConfig {
    fn default() -> Self {
        Self {
            state_dir: default_state_dir(),
            interval_secs: default_interval_secs(),
            history_limit: default_history_limit(),
            log_level: default_log_level(),
            json_logs: false,
        }
    }
}

fn default_state_dir() -> String {
    "~/.guardian".into()
}
fn default_interval_secs() -> u64 {
    600
}
fn default_history_limit() -> usize {
    100
}
fn default_log_level() -> String {
    "info".into()
}

/// The external analysis command. Its output schema is consumed, not defined,
/// here; see [`crate::report`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzerConfig {
    #[serde(default = "default_analyzer_command")]
    pub command: String,
    #[serde(default = "default_analyzer_args")]
    pub args: Vec<String>,
    #[serde(default = "default_workdir")]
    pub workdir: String,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            command: default_analyzer_command(),
            args: default_analyzer_args(),
            workdir: default_workdir(),
        }
    }
}

fn default_analyzer_command() -> String {
    "code-analyzer".into()
}
fn default_analyzer_args() -> Vec<String> {
    vec!["--format".into(), "json".into()]
}
fn default_workdir() -> String {
    ".".into()
}

/// The external verification command. Exit-code-only contract: 0 is
/// compliant, anything else is not.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProbeConfig {
    #[serde(default = "default_probe_command")]
    pub command: String,
    #[serde(default)]
    pub args: Vec<String>,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            command: default_probe_command(),
            args: Vec::new(),
        }
    }
}

fn default_probe_command() -> String {
    "compliance-check".into()
}
