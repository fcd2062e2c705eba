use std::sync::Arc;

use async_trait::async_trait;
use tracing::warn;

use userhub_core::AppResult;
use userhub_domain::EntityEvent;

/// Port for fire-and-forget change notifications.
#[async_trait]
pub trait EntityEventPublisher: Send + Sync {
    /// Publishes one event to the message bus.
    async fn publish(&self, event: &EntityEvent) -> AppResult<()>;
}

/// Post-commit hook dispatcher shared by mutating services.
#[derive(Clone)]
pub struct EntityEventService {
    publisher: Arc<dyn EntityEventPublisher>,
}

impl EntityEventService {
    /// Creates a dispatcher from a publisher implementation.
    #[must_use]
    pub fn new(publisher: Arc<dyn EntityEventPublisher>) -> Self {
        Self { publisher }
    }

    /// Publishes events in order. Failures are logged and never surface to the caller.
    pub async fn dispatch(&self, events: impl IntoIterator<Item = EntityEvent>) {
        for event in events {
            if let Err(error) = self.publisher.publish(&event).await {
                warn!(
                    topic = %event.topic(),
                    entity_id = %event.id,
                    %error,
                    "failed to publish entity event"
                );
            }
        }
    }
}
