use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use serde::Serialize;
use serde_json::json;
use tracing::{error, instrument, trace};

use crate::config::{Alert, Webhook};
use crate::discord::DiscordSink;

/// The rule an alert originates from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    Load,
    Memory,
    Disk,
    Network,
    Unavailable,
}

impl AlertKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertKind::Load => "load",
            AlertKind::Memory => "memory",
            AlertKind::Disk => "disk",
            AlertKind::Network => "network",
            AlertKind::Unavailable => "unavailable",
        }
    }
}

/// A single formatted alert line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertMessage {
    kind: AlertKind,
    text: String,
}

impl AlertMessage {
    pub fn new(kind: AlertKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
        }
    }

    pub fn kind(&self) -> AlertKind {
        self.kind
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

impl fmt::Display for AlertMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Destination for emitted alerts.
///
/// Sinks handle their own failures: an unreachable webhook is logged and
/// must not prevent other sinks from receiving the alert.
#[async_trait]
pub trait AlertSink: Send + Sync {
    async fn emit(&self, alert: &AlertMessage);
}

/// Writes one line per alert to stdout.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleSink;

#[async_trait]
impl AlertSink for ConsoleSink {
    async fn emit(&self, alert: &AlertMessage) {
        println!("{alert}");
    }
}

/// Posts every alert as JSON to a generic webhook.
#[derive(Debug, Clone)]
pub struct WebhookSink {
    client: Client,
    webhook: Webhook,
    source: String,
}

impl WebhookSink {
    pub fn new(client: Client, webhook: Webhook, source: impl Into<String>) -> Self {
        Self {
            client,
            webhook,
            source: source.into(),
        }
    }
}

#[async_trait]
impl AlertSink for WebhookSink {
    #[instrument(skip_all, fields(kind = alert.kind().as_str()))]
    async fn emit(&self, alert: &AlertMessage) {
        let payload = json!({
            "message": alert.text(),
            "kind": alert.kind(),
            "source": self.source,
            "timestamp": Utc::now().to_rfc3339()
        });

        match self.client.post(&self.webhook.url).json(&payload).send().await {
            Ok(response) => {
                if response.status().is_success() {
                    trace!("webhook alert delivered");
                } else {
                    error!("webhook alert failed with status: {}", response.status());
                }
            }
            Err(e) => {
                error!("failed to send webhook alert: {e}");
            }
        }
    }
}

/// Fans every alert out to all configured sinks, in order.
pub struct AlertDispatcher {
    sinks: Vec<Box<dyn AlertSink>>,
}

impl AlertDispatcher {
    pub fn new(sinks: Vec<Box<dyn AlertSink>>) -> Self {
        Self { sinks }
    }

    /// Build the sinks described by the alert configuration.
    ///
    /// With no alert targets configured, alerts go to the console. Every
    /// remote sink shares one client whose requests give up after `timeout`,
    /// so a hung endpoint cannot hold up the poll loop.
    pub fn from_config(
        alerts: &[Alert],
        source: &str,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        if alerts.is_empty() {
            return Ok(Self::new(vec![Box::new(ConsoleSink)]));
        }

        let client = Client::builder().timeout(timeout).build()?;
        let sinks = alerts
            .iter()
            .map(|alert| -> Box<dyn AlertSink> {
                match alert {
                    Alert::Console {} => Box::new(ConsoleSink),
                    Alert::Webhook(webhook) => {
                        Box::new(WebhookSink::new(client.clone(), webhook.clone(), source))
                    }
                    Alert::Discord(discord) => {
                        Box::new(DiscordSink::new(client.clone(), discord.clone(), source))
                    }
                }
            })
            .collect();

        Ok(Self::new(sinks))
    }

    pub fn sink_count(&self) -> usize {
        self.sinks.len()
    }

    /// Deliver the alert to every sink before returning.
    pub async fn dispatch(&self, alert: &AlertMessage) {
        for sink in &self.sinks {
            sink.emit(alert).await;
        }
    }

    /// Deliver alerts strictly in the given order.
    pub async fn dispatch_all(&self, alerts: &[AlertMessage]) {
        for alert in alerts {
            self.dispatch(alert).await;
        }
    }
}
