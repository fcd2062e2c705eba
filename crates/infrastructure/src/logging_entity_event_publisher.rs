//! Publisher that only writes entity events to the log.

use async_trait::async_trait;
use tracing::info;

use userhub_application::EntityEventPublisher;
use userhub_core::AppResult;
use userhub_domain::EntityEvent;

/// Logs every event at `info`. Used when no message bus is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingEntityEventPublisher;

#[async_trait]
impl EntityEventPublisher for LoggingEntityEventPublisher {
    async fn publish(&self, event: &EntityEvent) -> AppResult<()> {
        info!(topic = %event.topic(), id = %event.id, "entity event");
        Ok(())
    }
}
