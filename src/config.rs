use std::time::Duration;

use tracing::trace;

use crate::monitors::thresholds::Thresholds;

#[derive(Debug, Clone, serde::Deserialize)]
pub struct Config {
    #[serde(default)]
    pub source: SourceConfig,

    #[serde(default)]
    pub thresholds: Thresholds,

    /// Consecutive fetch failures before "Unable to fetch server statistic" is emitted
    #[serde(default = "default_max_failures")]
    pub max_failures: u32,

    /// Alert targets (defaults to the console when empty)
    #[serde(default)]
    pub alerts: Vec<Alert>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            source: SourceConfig::default(),
            thresholds: Thresholds::default(),
            max_failures: default_max_failures(),
            alerts: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, serde::Deserialize)]
pub struct SourceConfig {
    #[serde(default = "default_url")]
    pub url: String,

    /// Poll interval in milliseconds
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,

    /// Request timeout in milliseconds, capped to the poll interval
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for SourceConfig {
    fn default() -> Self {
        SourceConfig {
            url: default_url(),
            interval_ms: default_interval_ms(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

impl SourceConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms.max(1))
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms.max(1)).min(self.interval())
    }
}

#[derive(Debug, Clone, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Alert {
    Console {},
    Discord(Discord),
    Webhook(Webhook),
}

#[derive(Debug, Clone, serde::Deserialize)]
pub struct Webhook {
    pub url: String,
}

#[derive(Debug, Clone, serde::Deserialize)]
pub struct Discord {
    pub url: String,
    pub user_id: Option<String>,
}

fn default_url() -> String {
    String::from("http://srv.msk01.gigacorp.local/_stats")
}

fn default_interval_ms() -> u64 {
    30_000
}

fn default_timeout_ms() -> u64 {
    10_000
}

fn default_max_failures() -> u32 {
    3
}

pub fn read_config_file(path: &str) -> anyhow::Result<Config> {
    let file_content = std::fs::read_to_string(path)?;
    serde_json::from_str(&file_content)
        .map_err(|e| anyhow::anyhow!("Invalid configuration file provided: {e}"))
        .inspect(|config| trace!("loaded config: {config:?}"))
}
