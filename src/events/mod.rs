// ============================================================================
// Event Pipeline
// ============================================================================
//
// Asynchronous side of the system: a backend service publishes a durable
// `user_created` message after a committed write, and an independent worker
// consumes it later. Publisher and consumer only share the queue name and
// the JSON payload shape; neither knows the other exists.
//
// ============================================================================

pub mod consumer;
pub mod publisher;
pub mod types;

pub use consumer::{EventConsumer, NotificationSender, WelcomeEmailSimulator};
pub use publisher::{AmqpTransport, EventPublisher, QueueTransport};
pub use types::{DomainEvent, UserCreatedEvent};
