//! Console configuration: command line, environment and `console.conf`.
//!
//! Precedence is CLI/env first, then the config file, then built-in defaults.
//! The file uses the same `key = value` format as `theme.conf` and
//! `keybinds.conf`, with `#` comments.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use thiserror::Error;

use crate::api::http::DEFAULT_TIMEOUT;
use crate::api::{CredentialProvider, StaticToken, TokenFile};

pub const APP_DIR: &str = "roster-admin";
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:5000";
pub const CONFIG_FILE: &str = "console.conf";
pub const SESSION_TOKEN_FILE: &str = "session.token";
pub const LOG_FILE: &str = "roster-admin.log";

#[derive(Parser, Debug, Clone, Default)]
#[command(name = "roster-admin", version, about = "Admin console for users and course enrollments")]
pub struct Cli {
    /// Base URL of the admin API, e.g. https://admin.example.com
    #[arg(long, env = "ROSTER_ADMIN_URL")]
    pub base_url: Option<String>,
    /// Bearer token for the operator session
    #[arg(long, env = "ADMIN_TOKEN", hide_env_values = true)]
    pub token: Option<String>,
    /// File holding the session token; re-read before each request
    #[arg(long)]
    pub token_file: Option<PathBuf>,
    /// Client-side request timeout in seconds
    #[arg(long)]
    pub timeout_secs: Option<u64>,
    /// Path to console.conf
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Where to write logs (stdout is owned by the TUI)
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid value for `{key}`: {value}")]
    InvalidValue { key: String, value: String },
}

/// Values read from `console.conf`; every key is optional.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FileConfig {
    pub base_url: Option<String>,
    pub timeout_secs: Option<u64>,
    pub token_file: Option<PathBuf>,
}

impl FileConfig {
    pub fn parse(contents: &str) -> Result<Self, ConfigError> {
        let mut cfg = Self::default();
        for raw in contents.lines() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let mut parts = line.splitn(2, '=');
            let key = parts.next().map(|s| s.trim()).unwrap_or("");
            let val = parts.next().map(|s| s.trim()).unwrap_or("");
            if key.is_empty() || val.is_empty() {
                continue;
            }
            match key {
                "base_url" => cfg.base_url = Some(val.to_string()),
                "timeout_secs" => {
                    let secs = val.parse::<u64>().ok().filter(|s| *s > 0).ok_or_else(|| {
                        ConfigError::InvalidValue { key: key.to_string(), value: val.to_string() }
                    })?;
                    cfg.timeout_secs = Some(secs);
                }
                "token_file" => cfg.token_file = Some(PathBuf::from(val)),
                _ => tracing::debug!(key, "ignoring unknown console.conf key"),
            }
        }
        Ok(cfg)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::parse(&contents)
    }
}

/// Fully resolved settings used to build the API client.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConsoleConfig {
    pub base_url: String,
    pub timeout: Duration,
    pub token: Option<String>,
    pub token_file: PathBuf,
}

impl ConsoleConfig {
    /// Merge CLI/env values over `console.conf` over defaults.
    ///
    /// An explicit `--config` must exist; the implicit lookup may find nothing.
    pub fn resolve(cli: &Cli) -> Result<Self, ConfigError> {
        let file = match &cli.config {
            Some(path) => FileConfig::from_file(path)?,
            None => match config_file_read_path(CONFIG_FILE) {
                Some(found) => FileConfig::from_file(Path::new(&found))?,
                None => FileConfig::default(),
            },
        };
        Ok(Self::merge(cli, file))
    }

    pub fn merge(cli: &Cli, file: FileConfig) -> Self {
        let base_url = cli
            .base_url
            .clone()
            .or(file.base_url)
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let timeout = cli
            .timeout_secs
            .or(file.timeout_secs)
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_TIMEOUT);
        let token_file = cli
            .token_file
            .clone()
            .or(file.token_file)
            .unwrap_or_else(|| config_dir().join(SESSION_TOKEN_FILE));
        Self { base_url, timeout, token: cli.token.clone(), token_file }
    }

    /// A fixed token wins; otherwise the session file is consulted per request.
    pub fn credentials(&self) -> Arc<dyn CredentialProvider> {
        match &self.token {
            Some(t) if !t.trim().is_empty() => Arc::new(StaticToken::new(Some(t.clone()))),
            _ => Arc::new(TokenFile::new(self.token_file.clone())),
        }
    }
}

/// `$XDG_CONFIG_HOME/roster-admin`, else `~/.config/roster-admin`, else the working directory.
pub fn config_dir() -> PathBuf {
    if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME").filter(|v| !v.is_empty()) {
        return PathBuf::from(xdg).join(APP_DIR);
    }
    if let Some(home) = std::env::var_os("HOME").filter(|v| !v.is_empty()) {
        return PathBuf::from(home).join(".config").join(APP_DIR);
    }
    PathBuf::from(".")
}

/// Existing config file named `name`, checked in the working directory first.
pub fn config_file_read_path(name: &str) -> Option<String> {
    let local = Path::new(name);
    if local.exists() {
        return Some(name.to_string());
    }
    let in_dir = config_dir().join(name);
    in_dir.exists().then(|| in_dir.to_string_lossy().to_string())
}

/// Where a default config file should be written when none exists yet.
pub fn config_file_write_path(name: &str) -> String {
    let dir = config_dir();
    match std::fs::create_dir_all(&dir) {
        Ok(()) => dir.join(name).to_string_lossy().to_string(),
        Err(_) => name.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_keys_and_skips_noise() {
        let cfg = FileConfig::parse(
            "# console\n\nbase_url = https://admin.example.com\ntimeout_secs=20\n\
             unknown = 1\ntoken_file = /tmp/tok\nbroken\n",
        )
        .unwrap();
        assert_eq!(cfg.base_url.as_deref(), Some("https://admin.example.com"));
        assert_eq!(cfg.timeout_secs, Some(20));
        assert_eq!(cfg.token_file, Some(PathBuf::from("/tmp/tok")));
    }

    #[test]
    fn rejects_bad_timeout() {
        let err = FileConfig::parse("timeout_secs = soon").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref key, .. } if key == "timeout_secs"));
        assert!(FileConfig::parse("timeout_secs = 0").is_err());
    }

    #[test]
    fn cli_overrides_file_overrides_defaults() {
        let file = FileConfig {
            base_url: Some("http://file".into()),
            timeout_secs: Some(30),
            token_file: None,
        };
        let cli = Cli { base_url: Some("http://cli".into()), ..Default::default() };
        let cfg = ConsoleConfig::merge(&cli, file);
        assert_eq!(cfg.base_url, "http://cli");
        assert_eq!(cfg.timeout, Duration::from_secs(30));
        assert!(cfg.token_file.ends_with(SESSION_TOKEN_FILE));

        let cfg = ConsoleConfig::merge(&Cli::default(), FileConfig::default());
        assert_eq!(cfg.base_url, DEFAULT_BASE_URL);
        assert_eq!(cfg.timeout, DEFAULT_TIMEOUT);
    }

    #[test]
    fn explicit_token_takes_precedence() {
        let cli = Cli { token: Some("tok".into()), ..Default::default() };
        let cfg = ConsoleConfig::merge(&cli, FileConfig::default());
        assert_eq!(cfg.credentials().bearer_token().as_deref(), Some("tok"));
    }

    #[test]
    fn cli_parses_flags() {
        let cli =
            Cli::parse_from(["roster-admin", "--base-url", "http://x", "--timeout-secs", "5"]);
        assert_eq!(cli.base_url.as_deref(), Some("http://x"));
        assert_eq!(cli.timeout_secs, Some(5));
    }
}
