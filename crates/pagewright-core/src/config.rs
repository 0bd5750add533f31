//! Explicitly constructed runtime configuration.
//!
//! Every component receives a `Config` (or the fields it needs) at
//! construction time — nothing reads the environment after startup, which
//! keeps retry policies and endpoints swappable in tests.

use crate::error::{CoreError, Result};
use std::path::PathBuf;
use std::time::Duration;

/// Default GitHub REST API base.
pub const DEFAULT_GITHUB_API: &str = "https://api.github.com";

#[derive(Debug, Clone)]
pub struct Config {
    /// Bearer credential for the repository host.
    pub github_token: String,
    /// Account that owns created repositories; used to compose repo and Pages URLs.
    pub github_owner: String,
    /// REST API base, overridable for tests.
    pub github_api_base: String,
    /// Branch that carries the published file set.
    pub repo_branch: String,

    /// Primary generation endpoint (chat/responses envelope). Unset = provider unconfigured.
    pub primary_endpoint: Option<String>,
    pub primary_api_key: Option<String>,
    pub primary_model: String,
    /// Secondary generation endpoint (candidate/parts envelope). Unset = provider unconfigured.
    pub secondary_endpoint: Option<String>,
    pub secondary_api_key: Option<String>,

    /// Root directory for per-task workspaces.
    pub workspace_dir: PathBuf,
    /// Shared store for decoded attachments.
    pub attachment_dir: PathBuf,

    /// Shared secret expected in inbound requests. Unset = every request is rejected.
    pub shared_secret: Option<String>,

    /// Upper bound on a single generation call. Generation is slow; minutes, not seconds.
    pub generation_timeout: Duration,
    /// How many times to re-fetch a just-created repository before declaring failure.
    pub provision_retries: u32,
    /// Fixed delay between provisioning re-fetches.
    pub provision_delay: Duration,
    /// Attempt cap for the completion callback.
    pub notify_max_attempts: u32,
    /// First callback retry delay; doubles each attempt.
    pub notify_base_delay: Duration,

    pub port: u16,
}

impl Config {
    /// Build a config with the two required credentials and defaults everywhere else.
    pub fn new(github_token: impl Into<String>, github_owner: impl Into<String>) -> Self {
        Self {
            github_token: github_token.into(),
            github_owner: github_owner.into(),
            github_api_base: DEFAULT_GITHUB_API.to_string(),
            repo_branch: "main".to_string(),
            primary_endpoint: None,
            primary_api_key: None,
            primary_model: "gpt-4o-mini".to_string(),
            secondary_endpoint: None,
            secondary_api_key: None,
            workspace_dir: PathBuf::from("workspace"),
            attachment_dir: PathBuf::from("data/attachments"),
            shared_secret: None,
            generation_timeout: Duration::from_secs(300),
            provision_retries: 5,
            provision_delay: Duration::from_millis(2000),
            notify_max_attempts: 6,
            notify_base_delay: Duration::from_millis(1000),
            port: 8000,
        }
    }

    /// Read configuration from process environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through an arbitrary lookup function.
    ///
    /// `from_env` delegates here; tests pass a closure over a map instead of
    /// mutating the process environment.
    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let github_token = get("GITHUB_TOKEN")
            .filter(|v| !v.is_empty())
            .ok_or_else(|| CoreError::MissingCredential("GITHUB_TOKEN".into()))?;
        let github_owner = get("GITHUB_OWNER")
            .filter(|v| !v.is_empty())
            .ok_or_else(|| CoreError::MissingCredential("GITHUB_OWNER".into()))?;

        let mut config = Self::new(github_token, github_owner);

        if let Some(v) = get("GITHUB_API_BASE") {
            config.github_api_base = v;
        }
        if let Some(v) = get("REPO_BRANCH") {
            config.repo_branch = v;
        }
        config.primary_endpoint = get("LLM_PRIMARY_URL");
        config.primary_api_key = get("LLM_PRIMARY_KEY");
        if let Some(v) = get("LLM_PRIMARY_MODEL") {
            config.primary_model = v;
        }
        config.secondary_endpoint = get("LLM_SECONDARY_URL");
        config.secondary_api_key = get("LLM_SECONDARY_KEY");
        if let Some(v) = get("WORKSPACE_DIR") {
            config.workspace_dir = PathBuf::from(v);
        }
        if let Some(v) = get("ATTACHMENT_DIR") {
            config.attachment_dir = PathBuf::from(v);
        }
        config.shared_secret = get("AGENT_SECRET").filter(|v| !v.is_empty());

        if let Some(v) = get("GENERATION_TIMEOUT_SECS") {
            config.generation_timeout = Duration::from_secs(parse(&v, "GENERATION_TIMEOUT_SECS")?);
        }
        if let Some(v) = get("PROVISION_RETRIES") {
            config.provision_retries = parse(&v, "PROVISION_RETRIES")? as u32;
        }
        if let Some(v) = get("PROVISION_DELAY_MS") {
            config.provision_delay = Duration::from_millis(parse(&v, "PROVISION_DELAY_MS")?);
        }
        if let Some(v) = get("NOTIFY_MAX_ATTEMPTS") {
            config.notify_max_attempts = parse(&v, "NOTIFY_MAX_ATTEMPTS")? as u32;
        }
        if let Some(v) = get("NOTIFY_BASE_DELAY_MS") {
            config.notify_base_delay = Duration::from_millis(parse(&v, "NOTIFY_BASE_DELAY_MS")?);
        }
        if let Some(v) = get("PORT") {
            config.port = parse(&v, "PORT")? as u16;
        }

        Ok(config)
    }
}

fn parse(value: &str, key: &str) -> Result<u64> {
    value.parse().map_err(|_| CoreError::InvalidConfigValue {
        key: key.to_string(),
        value: value.to_string(),
    })
}
