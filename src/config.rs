//! Service configuration loaded once from the process environment.
//!
//! All values are read at startup and immutable afterwards; the struct is
//! passed explicitly (behind an `Arc`) into the HTTP gateway and the
//! repository fetcher instead of being consulted as hidden globals.

use anyhow::{Context, Result};
use std::path::PathBuf;

/// Environment variable holding the API authentication secret
const ENV_API_TOKEN: &str = "CHANGELOG_API_TOKEN";
/// Environment variable holding the base GitLab URL
const ENV_GITLAB_URL: &str = "GITLAB_URL";
/// Environment variable holding the listening port
const ENV_PORT: &str = "PORT";
/// Environment variable holding the temporary workspace root
const ENV_WORK_DIR: &str = "WORK_DIR";
/// Environment variable toggling debug logging
const ENV_DEBUG: &str = "DEBUG";

const DEFAULT_API_TOKEN: &str = "changeme";
const DEFAULT_GITLAB_URL: &str = "https://gitlab.example.com";
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_WORK_DIR: &str = "/tmp/changelog-work";

/// Immutable runtime configuration for the service
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Secret expected in `X-API-Token` / `Authorization: Bearer`
    pub api_token: String,
    /// Base URL of the GitLab instance repositories are cloned from
    pub gitlab_url: String,
    /// Port the HTTP server listens on
    pub port: u16,
    /// Root directory under which per-request workspaces are created
    pub work_root: PathBuf,
    /// Enables verbose logging when set
    pub debug: bool,
}

impl ServiceConfig {
    /// Load configuration from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup.
    /// Split out from `from_env` so tests can supply values without
    /// mutating process-global environment state.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_token = lookup(ENV_API_TOKEN).unwrap_or_else(|| DEFAULT_API_TOKEN.to_string());
        let gitlab_url = lookup(ENV_GITLAB_URL).unwrap_or_else(|| DEFAULT_GITLAB_URL.to_string());

        let port = match lookup(ENV_PORT) {
            Some(raw) => raw
                .parse::<u16>()
                .with_context(|| format!("Invalid {ENV_PORT} value: {raw}"))?,
            None => DEFAULT_PORT,
        };

        let work_root = lookup(ENV_WORK_DIR)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_WORK_DIR));

        let debug = lookup(ENV_DEBUG)
            .map(|v| v.eq_ignore_ascii_case("true"))
            .unwrap_or(false);

        Ok(Self {
            api_token,
            gitlab_url,
            port,
            work_root,
            debug,
        })
    }
}
