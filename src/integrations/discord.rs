//! Discord channel notifier
//!
//! Posts one embed per message to a single channel through the REST API
//! (`POST /channels/{id}/messages`) using a bot token.

use super::{Notifier, DELIVERY_CLIENT};
use crate::config::DiscordConfig;
use crate::error::DeliveryError;
use crate::format::{Field, MessageKind, RichMessage};
use async_trait::async_trait;
use chrono::Utc;
use serde_json::{json, Value};
use std::time::Duration;
use tokio::sync::OnceCell;

const DISCORD_API_URL: &str = "https://discord.com/api/v10";

// discord.py's Color.blue / green / purple
const COLOR_BLUE: u32 = 0x3498db;
const COLOR_GREEN: u32 = 0x2ecc71;
const COLOR_PURPLE: u32 = 0x9b59b6;

// Embed limits; Discord rejects the whole message when any is exceeded
const MAX_TITLE: usize = 256;
const MAX_DESCRIPTION: usize = 4096;
const MAX_FIELDS: usize = 25;
const MAX_FIELD_NAME: usize = 256;
const MAX_FIELD_VALUE: usize = 1024;
const MAX_FOOTER: usize = 2048;
const MAX_EMBED_TEXT: usize = 6000;
const MAX_CONTENT: usize = 2000;

pub struct DiscordNotifier {
    api_url: String,
    bot_token: Option<String>,
    channel_id: Option<String>,
    http: reqwest::Client,
    send_timeout: Option<Duration>,
    /// Set once the channel has been looked up successfully
    resolved: OnceCell<()>,
}

impl DiscordNotifier {
    pub fn from_config(config: &DiscordConfig) -> Self {
        Self::with_api_url(config, DISCORD_API_URL)
    }

    /// Point the notifier at a different API root (used for testing)
    pub fn with_api_url(config: &DiscordConfig, api_url: &str) -> Self {
        Self {
            api_url: api_url.trim_end_matches('/').to_string(),
            bot_token: config.bot_token.clone(),
            channel_id: config.channel_id.clone(),
            http: DELIVERY_CLIENT.clone(),
            send_timeout: config.send_timeout_secs.map(Duration::from_secs),
            resolved: OnceCell::new(),
        }
    }

    fn credentials(&self) -> Result<(&str, &str), DeliveryError> {
        let token = self
            .bot_token
            .as_deref()
            .ok_or_else(|| DeliveryError::NotConfigured("DISCORD_BOT_TOKEN is not set".into()))?;
        let channel = self
            .channel_id
            .as_deref()
            .ok_or_else(|| DeliveryError::NotConfigured("DISCORD_CHANNEL_ID is not set".into()))?;
        Ok((token, channel))
    }

    async fn resolve_channel(&self, token: &str, channel: &str) -> Result<(), DeliveryError> {
        let url = format!("{}/channels/{}", self.api_url, urlencoding::encode(channel));
        let response = self
            .http
            .get(&url)
            .header("Authorization", format!("Bot {}", token))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DeliveryError::Status { status, body });
        }
        Ok(())
    }
}

#[async_trait]
impl Notifier for DiscordNotifier {
    async fn ready(&self) -> Result<(), DeliveryError> {
        let (token, channel) = self.credentials()?;
        // Only successful lookups are cached; failures are retried next tick
        self.resolved
            .get_or_try_init(|| self.resolve_channel(token, channel))
            .await?;
        Ok(())
    }

    async fn send(&self, message: &RichMessage) -> Result<(), DeliveryError> {
        let (token, channel) = self.credentials()?;
        let url = format!(
            "{}/channels/{}/messages",
            self.api_url,
            urlencoding::encode(channel)
        );

        let mut request = self
            .http
            .post(&url)
            .header("Authorization", format!("Bot {}", token))
            .json(&message_payload(message));
        if let Some(timeout) = self.send_timeout {
            request = request.timeout(timeout);
        }
        let response = request.send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::debug!("Discord rejected message ({}): {}", status, body);
            return Err(DeliveryError::Status { status, body });
        }

        Ok(())
    }
}

/// Build the JSON body for a create-message request
pub fn message_payload(message: &RichMessage) -> Value {
    match message.kind {
        MessageKind::Notice => json!({ "content": truncate(&message.headline, MAX_CONTENT) }),
        _ => json!({ "embeds": [embed(message)] }),
    }
}

fn embed(message: &RichMessage) -> Value {
    let (prefix, color) = match message.kind {
        MessageKind::NowPlaying => ("▶️ ", COLOR_BLUE),
        MessageKind::RecentlyAdded => ("✨ ", COLOR_GREEN),
        MessageKind::Status => ("📊 ", COLOR_PURPLE),
        MessageKind::Notice => ("", COLOR_PURPLE),
    };

    let title = truncate(&format!("{}{}", prefix, message.headline), MAX_TITLE);
    let footer = message.footer.as_deref().map(|f| truncate(f, MAX_FOOTER));

    // Title and footer are capped well below the total, so this cannot underflow
    let mut budget = MAX_EMBED_TEXT
        - title.chars().count()
        - footer.as_deref().map_or(0, |f| f.chars().count());
    let description = message
        .detail
        .as_deref()
        .map(|d| truncate(d, MAX_DESCRIPTION.min(budget)));
    budget -= description.as_deref().map_or(0, |d| d.chars().count());

    let mut embed = json!({
        "title": title,
        "color": color,
        "timestamp": Utc::now().to_rfc3339(),
    });

    if let Some(description) = description {
        embed["description"] = json!(description);
    }
    if !message.fields.is_empty() {
        embed["fields"] = Value::Array(embed_fields(&message.fields, &mut budget));
    }
    if let Some(footer) = footer {
        embed["footer"] = json!({ "text": footer });
    }
    if let Some(url) = &message.thumbnail {
        embed["thumbnail"] = json!({ "url": url });
    }
    if let Some(url) = &message.image {
        embed["image"] = json!({ "url": url });
    }

    embed
}

/// Render fields within the count and total-text limits. Whatever does not
/// fit is summarized in a final "and N more" field.
fn embed_fields(fields: &[Field], budget: &mut usize) -> Vec<Value> {
    const OVERFLOW_NAME: &str = "…";
    // Room kept for the overflow field itself
    const OVERFLOW_RESERVE: usize = 32;

    let mut rendered = Vec::new();
    for (index, field) in fields.iter().enumerate() {
        let remaining = fields.len() - index;
        let name = truncate(&format!("👤 {}", field.name), MAX_FIELD_NAME);
        let value = truncate(&field.value, MAX_FIELD_VALUE);
        let cost = name.chars().count() + value.chars().count();

        // The last field may use the overflow slot when nothing follows it
        let slots_left = MAX_FIELDS - rendered.len();
        let fits_count = if remaining == 1 { slots_left >= 1 } else { slots_left > 1 };
        let reserve = if remaining == 1 { 0 } else { OVERFLOW_RESERVE };
        if !fits_count || cost + reserve > *budget {
            let more = format!("and {} more", remaining);
            let overflow_cost = OVERFLOW_NAME.chars().count() + more.len();
            if overflow_cost <= *budget {
                *budget -= overflow_cost;
                rendered.push(json!({ "name": OVERFLOW_NAME, "value": more, "inline": false }));
            }
            break;
        }

        *budget -= cost;
        rendered.push(json!({ "name": name, "value": value, "inline": false }));
    }
    rendered
}

/// Cut `text` to at most `max` characters, marking the cut with an ellipsis
fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max.saturating_sub(1)).collect();
    out.push('…');
    out
}
