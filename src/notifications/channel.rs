use async_trait::async_trait;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub title: String,
    pub body: String,
    pub url: String,
    /// Category color as 0xRRGGBB.
    pub color: u32,
}

#[derive(Debug, thiserror::Error)]
pub enum NotificationError {
    #[error("Notification endpoint returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("Notification transport failed: {0}")]
    Transport(String),
    #[error("Notification channel could not be resolved: {0}")]
    ChannelUnresolved(String),
}

pub type NotificationResult<T> = Result<T, NotificationError>;

#[async_trait]
pub trait NotificationChannel: Send + Sync {
    fn channel_id(&self) -> &str;

    /// Confirms the destination exists and the credentials can reach it.
    async fn resolve(&self) -> NotificationResult<()>;

    async fn send(&self, notification: Notification) -> NotificationResult<()>;
}
