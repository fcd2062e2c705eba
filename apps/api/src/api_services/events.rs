use std::sync::Arc;

use tracing::info;
use userhub_application::EntityEventPublisher;
use userhub_core::AppError;
use userhub_infrastructure::{LoggingEntityEventPublisher, RedisEntityEventPublisher};

use crate::api_config::{ApiConfig, EventPublisherConfig};

pub(super) struct EventWiring {
    pub publisher: Arc<dyn EntityEventPublisher>,
    pub redis_client: Option<redis::Client>,
}

pub(super) fn build_event_publisher(config: &ApiConfig) -> Result<EventWiring, AppError> {
    match &config.event_publisher {
        EventPublisherConfig::Logging => {
            info!("entity events are written to the log only");
            Ok(EventWiring {
                publisher: Arc::new(LoggingEntityEventPublisher),
                redis_client: None,
            })
        }
        EventPublisherConfig::Redis { redis_url } => {
            let client = build_redis_client(redis_url)?;
            info!(prefix = %config.event_topic_prefix, "publishing entity events to redis");
            Ok(EventWiring {
                publisher: Arc::new(RedisEntityEventPublisher::new(
                    client.clone(),
                    config.event_topic_prefix.clone(),
                )),
                redis_client: Some(client),
            })
        }
    }
}

fn build_redis_client(redis_url: &str) -> Result<redis::Client, AppError> {
    redis::Client::open(redis_url)
        .map_err(|error| AppError::Validation(format!("invalid REDIS_URL: {error}")))
}
