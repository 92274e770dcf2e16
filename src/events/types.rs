use crate::config::USER_CREATED_QUEUE;
use serde::{Deserialize, Serialize};

/// Payload of a `user_created` event.
///
/// Wire shape on the queue: `{"user_id":42,"email":"a@b.com","name":"A"}`.
/// Consumers must treat redelivery as possible; the payload carries no
/// idempotency key.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserCreatedEvent {
    pub user_id: u64,
    pub email: String,
    pub name: String,
}

/// Domain events emitted after a state-changing operation has durably
/// committed. Published at most once per successful write; a failed publish
/// does not roll the write back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainEvent {
    UserCreated(UserCreatedEvent),
}

impl DomainEvent {
    /// Durable queue this event is routed to.
    pub fn queue_name(&self) -> &'static str {
        match self {
            DomainEvent::UserCreated(_) => USER_CREATED_QUEUE,
        }
    }

    /// JSON body as it goes onto the wire.
    pub fn payload(&self) -> Result<Vec<u8>, serde_json::Error> {
        match self {
            DomainEvent::UserCreated(event) => serde_json::to_vec(event),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_round_trip_is_lossless() {
        let event = UserCreatedEvent {
            user_id: 42,
            email: "a@b.com".to_string(),
            name: "A".to_string(),
        };

        let encoded = DomainEvent::UserCreated(event.clone()).payload().unwrap();
        let decoded: UserCreatedEvent = serde_json::from_slice(&encoded).unwrap();
        assert_eq!(decoded, event);
    }

    #[test]
    fn decodes_the_documented_wire_shape() {
        let decoded: UserCreatedEvent =
            serde_json::from_str(r#"{"user_id":42,"email":"a@b.com","name":"A"}"#).unwrap();
        assert_eq!(decoded.user_id, 42);
        assert_eq!(decoded.email, "a@b.com");
        assert_eq!(decoded.name, "A");
    }

    #[test]
    fn user_created_routes_to_its_queue() {
        let event = DomainEvent::UserCreated(UserCreatedEvent {
            user_id: 1,
            email: "x@y.z".to_string(),
            name: "X".to_string(),
        });
        assert_eq!(event.queue_name(), "user_created_queue");
    }
}
