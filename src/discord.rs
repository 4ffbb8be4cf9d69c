use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use serde::Serialize;
use tracing::{error, instrument, trace};

use crate::alerts::{AlertKind, AlertMessage, AlertSink};
use crate::config::Discord;

#[derive(Debug, Clone, Serialize)]
pub struct Message {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub embeds: Vec<Embed>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Embed {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub footer: Option<EmbedFooter>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct EmbedFooter {
    pub text: String,
}

#[derive(Default)]
pub struct MessageBuilder {
    content: Option<String>,
    embeds: Vec<Embed>,
}

impl MessageBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn content(mut self, content: impl ToString) -> Self {
        self.content = Some(content.to_string());
        self
    }

    pub fn add_embed(mut self, embed: Embed) -> Self {
        self.embeds.push(embed);
        self
    }

    pub fn build(self) -> Message {
        Message {
            content: self.content,
            embeds: self.embeds,
        }
    }
}

/// Sends alerts to a Discord channel webhook, one embed per alert.
#[derive(Debug, Clone)]
pub struct DiscordSink {
    client: Client,
    discord: Discord,
    source: String,
}

impl DiscordSink {
    pub fn new(client: Client, discord: Discord, source: impl Into<String>) -> Self {
        Self {
            client,
            discord,
            source: source.into(),
        }
    }

    pub fn build_message(&self, alert: &AlertMessage) -> Message {
        let (title, color) = match alert.kind() {
            AlertKind::Load => ("🔥 Load Alert", 15158332),       // Red
            AlertKind::Memory => ("🧠 Memory Alert", 15105570),   // Orange
            AlertKind::Disk => ("💾 Disk Alert", 15105570),       // Orange
            AlertKind::Network => ("🌐 Network Alert", 15844367), // Gold
            AlertKind::Unavailable => ("❓ Statistics Unavailable", 9807270), // Grey
        };

        let embed = Embed {
            title: Some(title.to_string()),
            description: Some(alert.text().to_string()),
            color: Some(color),
            footer: Some(EmbedFooter {
                text: format!("Source: {}", self.source),
            }),
            timestamp: Some(Utc::now().to_rfc3339()),
        };

        let mut builder = MessageBuilder::new().add_embed(embed);
        if let Some(user_id) = &self.discord.user_id {
            builder = builder.content(format!("{} <@{user_id}>", alert.text()));
        }
        builder.build()
    }
}

#[async_trait]
impl AlertSink for DiscordSink {
    #[instrument(skip_all, fields(kind = alert.kind().as_str()))]
    async fn emit(&self, alert: &AlertMessage) {
        let message = self.build_message(alert);

        match self.client.post(&self.discord.url).json(&message).send().await {
            Ok(response) => {
                if response.status().is_success() {
                    trace!("discord alert delivered");
                } else {
                    error!("Discord message failed with status: {}", response.status());
                    if let Ok(error_text) = response.text().await {
                        error!("Discord API error response: {}", error_text);
                    }
                }
            }
            Err(e) => {
                error!("failed to send Discord message: {e}");
            }
        }
    }
}
