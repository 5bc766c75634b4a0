//! Operator credentials attached to every admin request.

use std::path::{Path, PathBuf};

/// Supplies the bearer token for the current operator session, if any.
///
/// Implementations are queried once per request so a token that appears or
/// changes mid-session is picked up without restarting the console.
pub trait CredentialProvider: Send + Sync {
    fn bearer_token(&self) -> Option<String>;
}

/// A token fixed at startup (e.g. from `--token` or `ADMIN_TOKEN`).
#[derive(Clone, Debug, Default)]
pub struct StaticToken(Option<String>);

impl StaticToken {
    pub fn new(token: Option<String>) -> Self {
        Self(token.filter(|t| !t.trim().is_empty()))
    }
}

impl CredentialProvider for StaticToken {
    fn bearer_token(&self) -> Option<String> {
        self.0.clone()
    }
}

/// A token stored in a session file, re-read on every request.
#[derive(Clone, Debug)]
pub struct TokenFile {
    path: PathBuf,
}

impl TokenFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CredentialProvider for TokenFile {
    fn bearer_token(&self) -> Option<String> {
        match std::fs::read_to_string(&self.path) {
            Ok(contents) => {
                let token = contents.trim();
                if token.is_empty() { None } else { Some(token.to_string()) }
            }
            Err(e) => {
                tracing::debug!(path = %self.path.display(), error = %e, "no session token");
                None
            }
        }
    }
}
