//! Redis pub/sub publisher for entity change notifications.

use async_trait::async_trait;
use redis::AsyncCommands;
use serde_json::json;
use tracing::debug;

use userhub_application::EntityEventPublisher;
use userhub_core::{AppError, AppResult};
use userhub_domain::EntityEvent;

/// Publishes `{"id": ...}` to the `<prefix>.<entity>.<change>` channel.
#[derive(Clone)]
pub struct RedisEntityEventPublisher {
    client: redis::Client,
    channel_prefix: String,
}

impl RedisEntityEventPublisher {
    /// Creates a publisher with a configured Redis client and channel prefix.
    #[must_use]
    pub fn new(client: redis::Client, channel_prefix: impl Into<String>) -> Self {
        Self {
            client,
            channel_prefix: channel_prefix.into(),
        }
    }

    fn channel_for(&self, event: &EntityEvent) -> String {
        format!("{}.{}", self.channel_prefix, event.topic())
    }

    fn payload_for(event: &EntityEvent) -> String {
        json!({ "id": event.id }).to_string()
    }
}

#[async_trait]
impl EntityEventPublisher for RedisEntityEventPublisher {
    async fn publish(&self, event: &EntityEvent) -> AppResult<()> {
        let channel = self.channel_for(event);
        let mut connection = self
            .client
            .get_multiplexed_async_connection()
            .await
            .map_err(|error| AppError::Internal(format!("failed to connect to redis: {error}")))?;

        let receivers: i64 = connection
            .publish(channel.as_str(), Self::payload_for(event))
            .await
            .map_err(|error| {
                AppError::Internal(format!("failed to publish '{channel}' event: {error}"))
            })?;

        debug!(%channel, receivers, "published entity event");
        Ok(())
    }
}
