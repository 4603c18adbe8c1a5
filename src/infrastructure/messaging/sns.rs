//! AWS SNS implementation of the event-publisher contract

use async_trait::async_trait;
use aws_sdk_sns::types::MessageAttributeValue;
use aws_sdk_sns::Client;
use tracing::debug;

use crate::config::MessagingConfig;
use crate::domain::messaging::{EventEnvelope, EventPublisher, PublishedEvent};
use crate::domain::DomainError;

/// SNS-backed event publisher
///
/// The payload travels as the JSON message body; the event name rides along
/// as a message attribute so subscribers can filter without parsing.
pub struct SnsEventPublisher {
    client: Client,
    topic_arn: String,
}

impl SnsEventPublisher {
    pub fn new(client: Client, config: &MessagingConfig) -> Self {
        Self {
            client,
            topic_arn: config.topic_arn.clone(),
        }
    }
}

#[async_trait]
impl EventPublisher for SnsEventPublisher {
    async fn publish(&self, event: EventEnvelope) -> Result<PublishedEvent, DomainError> {
        debug!(event_name = %event.event_name, "publishing domain event");

        let event_name_attribute = MessageAttributeValue::builder()
            .data_type("String")
            .string_value(&event.event_name)
            .build()
            .map_err(|e| DomainError::messaging(format!("invalid event attribute: {e}")))?;

        let response = self
            .client
            .publish()
            .topic_arn(&self.topic_arn)
            .message(event.payload.to_string())
            .message_attributes("eventName", event_name_attribute)
            .send()
            .await
            .map_err(|e| {
                DomainError::messaging(format!(
                    "failed to publish '{}': {}",
                    event.event_name,
                    e.into_service_error()
                ))
            })?;

        let message_id = response
            .message_id()
            .ok_or_else(|| DomainError::messaging("event bus returned no message id"))?;

        Ok(PublishedEvent {
            message_id: message_id.to_string(),
        })
    }
}
