//! Domain events emitted by the user aggregate
//!
//! Events are buffered on the aggregate and must be drained explicitly by
//! the orchestrator that triggered the mutation; the aggregate itself never
//! performs I/O.

use chrono::{DateTime, Utc};
use serde_json::{json, Value};
use uuid::Uuid;

use super::value_objects::{Email, UserId};

/// Immutable fact recording that a user completed a password change
#[derive(Debug, Clone, PartialEq)]
pub struct PasswordChanged {
    event_id: Uuid,
    aggregate_id: UserId,
    email: Email,
    occurred_on: DateTime<Utc>,
}

impl PasswordChanged {
    pub const NAME: &'static str = "PasswordChanged";

    pub fn new(aggregate_id: UserId, email: Email) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            aggregate_id,
            email,
            occurred_on: Utc::now(),
        }
    }

    pub fn event_id(&self) -> Uuid {
        self.event_id
    }

    pub fn event_name(&self) -> &'static str {
        Self::NAME
    }

    pub fn aggregate_id(&self) -> &UserId {
        &self.aggregate_id
    }

    pub fn email(&self) -> &Email {
        &self.email
    }

    pub fn occurred_on(&self) -> DateTime<Utc> {
        self.occurred_on
    }

    /// Wire payload published to the event bus
    pub fn to_payload(&self) -> Value {
        json!({
            "eventId": self.event_id.to_string(),
            "eventName": Self::NAME,
            "aggregateId": self.aggregate_id.to_string(),
            "occurredOn": self.occurred_on.to_rfc3339(),
            "email": self.email.as_str(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_event() -> PasswordChanged {
        PasswordChanged::new(
            UserId::generate(),
            Email::new("ana.ruiz@example.com").unwrap(),
        )
    }

    #[test]
    fn test_event_carries_identity_and_subject() {
        let event = sample_event();

        assert_eq!(event.event_name(), "PasswordChanged");
        assert_eq!(event.email().as_str(), "ana.ruiz@example.com");
    }

    #[test]
    fn test_payload_contains_aggregate_id_and_email() {
        let event = sample_event();
        let payload = event.to_payload();

        assert_eq!(payload["eventName"], "PasswordChanged");
        assert_eq!(payload["aggregateId"], event.aggregate_id().to_string());
        assert_eq!(payload["email"], "ana.ruiz@example.com");
        assert_eq!(payload["eventId"], event.event_id().to_string());
        assert!(payload["occurredOn"].is_string());
    }

    #[test]
    fn test_each_event_gets_its_own_identity() {
        let first = sample_event();
        let second = sample_event();

        assert_ne!(first.event_id(), second.event_id());
    }
}
