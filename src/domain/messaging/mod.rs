//! Event-publisher collaborator contract

mod publisher;

pub use publisher::{EventEnvelope, EventPublisher, PublishedEvent};

#[cfg(test)]
pub use publisher::MockEventPublisher;
