//! Event-publisher collaborator contract

use async_trait::async_trait;
use serde_json::Value;

#[cfg(test)]
use mockall::automock;

use crate::domain::DomainError;

/// A domain event ready for the wire
#[derive(Debug, Clone, PartialEq)]
pub struct EventEnvelope {
    pub event_name: String,
    pub payload: Value,
}

/// Acknowledgement returned by the bus
#[derive(Debug, Clone, PartialEq)]
pub struct PublishedEvent {
    pub message_id: String,
}

/// Outbound event bus; one publish per drained domain event, no batching
#[cfg_attr(test, automock)]
#[async_trait]
pub trait EventPublisher: Send + Sync {
    async fn publish(&self, event: EventEnvelope) -> Result<PublishedEvent, DomainError>;
}
