use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde_json::{Value, json};

use crate::canvas::item::truncate_detail;
use crate::config::DiscordConfig;
use crate::notifications::channel::{
    Notification, NotificationChannel, NotificationError, NotificationResult,
};

const EMBED_TITLE_LIMIT: usize = 256;

#[derive(Debug, Clone)]
pub struct DiscordChannel {
    client: Client,
    api_base: String,
    token: String,
    channel_id: String,
}

impl DiscordChannel {
    pub fn new(api_base: &str, token: String, channel_id: u64) -> NotificationResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|err| NotificationError::Transport(err.to_string()))?;
        Ok(Self {
            client,
            api_base: api_base.trim_end_matches('/').to_string(),
            token,
            channel_id: channel_id.to_string(),
        })
    }

    pub fn from_config(config: &DiscordConfig) -> NotificationResult<Self> {
        Self::new(
            config.api_base(),
            config.token.clone().unwrap_or_default(),
            config.channel_id.unwrap_or_default(),
        )
    }

    fn channel_url(&self) -> String {
        format!("{}/channels/{}", self.api_base, self.channel_id)
    }

    fn auth_header(&self) -> String {
        format!("Bot {}", self.token)
    }
}

fn embed_payload(notification: &Notification) -> Value {
    json!({
        "embeds": [{
            "title": truncate_detail(&notification.title, EMBED_TITLE_LIMIT),
            "description": notification.body,
            "url": notification.url,
            "color": notification.color,
            "fields": [{
                "name": "Link",
                "value": format!("[Click here]({})", notification.url),
                "inline": false
            }]
        }]
    })
}

async fn check_status(response: Response) -> NotificationResult<()> {
    let status = response.status();
    if status.is_success() {
        return Ok(());
    }
    let body = response.text().await.unwrap_or_default();
    Err(NotificationError::Status {
        status: status.as_u16(),
        body,
    })
}

#[async_trait]
impl NotificationChannel for DiscordChannel {
    fn channel_id(&self) -> &str {
        &self.channel_id
    }

    async fn resolve(&self) -> NotificationResult<()> {
        let response = self
            .client
            .get(self.channel_url())
            .header("Authorization", self.auth_header())
            .send()
            .await
            .map_err(|err| NotificationError::ChannelUnresolved(err.to_string()))?;
        check_status(response)
            .await
            .map_err(|err| NotificationError::ChannelUnresolved(err.to_string()))
    }

    async fn send(&self, notification: Notification) -> NotificationResult<()> {
        let response = self
            .client
            .post(format!("{}/messages", self.channel_url()))
            .header("Authorization", self.auth_header())
            .json(&embed_payload(&notification))
            .send()
            .await
            .map_err(|err| NotificationError::Transport(err.to_string()))?;
        check_status(response).await
    }
}
