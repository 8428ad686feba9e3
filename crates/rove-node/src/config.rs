use crate::composer::ComposerConfig;
use anyhow::{Context, Result};
use rove_audit::AuditConfig;
use rove_session::SessionConfig;
use rove_types::Credentials;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct NodeConfig {
    pub node: NodeSettings,
    pub collection: CollectionConfig,
    pub session: SessionSettings,
    pub limiter: LimiterConfig,
    pub audit: AuditConfig,
    pub composer: ComposerConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeSettings {
    pub data_dir: PathBuf,
    pub name: String,

    /// Seconds between round-clock polls
    pub round_poll_secs: u64,
}

impl Default for NodeSettings {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./data"),
            name: "rove-node".to_string(),
            round_poll_secs: 30,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CollectionConfig {
    /// Search targets; one is drawn at random per round
    pub targets: Vec<String>,
    pub limit: usize,
    pub depth: u32,
}

impl Default for CollectionConfig {
    fn default() -> Self {
        Self {
            targets: vec!["rove".to_string()],
            limit: 10,
            depth: 3,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionSettings {
    pub max_retry: u32,
    pub recheck_grace_secs: i64,
    pub liveness_interval_secs: i64,
    pub backoff_base_ms: u64,
    pub backoff_jitter_ms: u64,
}

impl Default for SessionSettings {
    fn default() -> Self {
        let defaults = SessionConfig::default();
        Self {
            max_retry: defaults.max_retry,
            recheck_grace_secs: defaults.recheck_grace_secs,
            liveness_interval_secs: defaults.liveness_interval_secs,
            backoff_base_ms: defaults.backoff_base_ms,
            backoff_jitter_ms: defaults.backoff_jitter_ms,
        }
    }
}

impl From<SessionSettings> for SessionConfig {
    fn from(settings: SessionSettings) -> Self {
        SessionConfig {
            max_retry: settings.max_retry,
            recheck_grace_secs: settings.recheck_grace_secs,
            liveness_interval_secs: settings.liveness_interval_secs,
            backoff_base_ms: settings.backoff_base_ms,
            backoff_jitter_ms: settings.backoff_jitter_ms,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LimiterConfig {
    pub min_cooldown_secs: u64,
    pub max_cooldown_secs: u64,
}

impl Default for LimiterConfig {
    fn default() -> Self {
        Self {
            min_cooldown_secs: rove_session::DEFAULT_MIN_COOLDOWN.as_secs(),
            max_cooldown_secs: rove_session::DEFAULT_MAX_COOLDOWN.as_secs(),
        }
    }
}

impl LimiterConfig {
    pub fn limiter(&self) -> rove_session::ActionRateLimiter {
        rove_session::ActionRateLimiter::new(
            Duration::from_secs(self.min_cooldown_secs),
            Duration::from_secs(self.max_cooldown_secs),
        )
    }
}

impl NodeConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        Ok(config)
    }

    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file {}", path.display()))?;
        Ok(())
    }

    /// Apply environment variable overrides
    pub fn apply_env_overrides(&mut self) {
        if let Ok(data_dir) = env::var("ROVE_DATA_DIR") {
            self.node.data_dir = PathBuf::from(data_dir);
        }
        if let Ok(name) = env::var("ROVE_NODE_NAME") {
            if !name.is_empty() {
                self.node.name = name;
            }
        }
        if let Ok(targets) = env::var("ROVE_TARGETS") {
            if !targets.is_empty() {
                self.collection.targets =
                    targets.split(',').map(|s| s.trim().to_string()).collect();
            }
        }
        if let Ok(limit) = env::var("ROVE_COLLECT_LIMIT") {
            if let Ok(limit) = limit.parse() {
                self.collection.limit = limit;
            }
        }
    }
}

/// Surface credentials come from the environment only; they are never
/// written into the config file.
pub fn credentials_from_env() -> Result<Credentials> {
    let username =
        env::var("ROVE_USERNAME").context("ROVE_USERNAME is not set; surface login requires it")?;
    let password =
        env::var("ROVE_PASSWORD").context("ROVE_PASSWORD is not set; surface login requires it")?;
    let verification = env::var("ROVE_VERIFICATION").ok().filter(|v| !v.is_empty());
    Ok(Credentials {
        username,
        password,
        verification,
    })
}
