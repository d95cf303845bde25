use std::sync::Arc;

use crate::canvas::item::{RemoteItem, ResourceKind};
use crate::notifications::channel::{NotificationChannel, NotificationResult};
use crate::notifications::format::build_notification;

#[derive(Clone)]
pub struct Notifier {
    channel: Arc<dyn NotificationChannel>,
}

impl Notifier {
    pub fn new(channel: Arc<dyn NotificationChannel>) -> Self {
        Self { channel }
    }

    pub fn channel(&self) -> &Arc<dyn NotificationChannel> {
        &self.channel
    }

    pub async fn resolve(&self) -> NotificationResult<()> {
        self.channel.resolve().await
    }

    pub async fn notify(&self, kind: ResourceKind, item: &RemoteItem) -> NotificationResult<()> {
        let notification = build_notification(kind, item);
        match self.channel.send(notification).await {
            Ok(()) => {
                tracing::debug!(
                    event = "notification_sent",
                    channel_id = %self.channel.channel_id(),
                    kind = %kind,
                    item_id = item.id,
                    "notification sent"
                );
                Ok(())
            }
            Err(err) => {
                tracing::warn!(
                    event = "notification_failed",
                    channel_id = %self.channel.channel_id(),
                    kind = %kind,
                    item_id = item.id,
                    error = %err,
                    "notification delivery failed"
                );
                Err(err)
            }
        }
    }
}
