//! Server configuration, read once at startup from the environment.

use std::net::SocketAddr;

use anyhow::{Context, Result};

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: SocketAddr,
    pub admin_allow_list: Vec<String>,
    pub table_abandonment_grace_ms: u64,
    pub default_action_timeout_ms: u64,
    pub session_secret: String,
}

impl Config {
    /// Load configuration from the environment. `SESSION_SECRET` is
    /// required; everything else has a reasonable default.
    pub fn from_env() -> Result<Self> {
        let bind_addr = std::env::var("BIND_ADDR")
            .unwrap_or_else(|_| "127.0.0.1:8080".to_string())
            .parse()
            .context("parsing BIND_ADDR")?;

        let admin_allow_list = std::env::var("ADMIN_ALLOW_LIST")
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();

        let table_abandonment_grace_ms = std::env::var("TABLE_ABANDONMENT_GRACE_MS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(300_000);

        let default_action_timeout_ms = std::env::var("DEFAULT_ACTION_TIMEOUT_MS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(20_000);

        let session_secret = std::env::var("SESSION_SECRET")
            .context("SESSION_SECRET must be set")?;

        Ok(Config {
            bind_addr,
            admin_allow_list,
            table_abandonment_grace_ms,
            default_action_timeout_ms,
            session_secret,
        })
    }

    /// Test/dev fallback so integration tests don't need the environment
    /// wired up.
    pub fn for_tests() -> Self {
        Config {
            bind_addr: "127.0.0.1:0".parse().unwrap(),
            admin_allow_list: vec![],
            table_abandonment_grace_ms: 300_000,
            default_action_timeout_ms: 20_000,
            session_secret: "test-secret-not-for-production".to_string(),
        }
    }
}
