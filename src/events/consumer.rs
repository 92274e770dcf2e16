use crate::config::BrokerConfig;
use crate::error::ConsumeError;
use crate::events::types::UserCreatedEvent;
use futures_util::StreamExt;
use lapin::{
    options::{BasicAckOptions, BasicConsumeOptions, BasicQosOptions, QueueDeclareOptions},
    types::FieldTable,
    Connection, ConnectionProperties,
};
use std::sync::Arc;
use tracing::{info, warn};

const CONSUMER_TAG: &str = "notification-worker";

/// Side-effect seam for the consumer: whatever reacts to a new user.
///
/// Delivery is at-least-once — a crash between dispatch and acknowledgment
/// redelivers the message on restart — so implementations must tolerate
/// duplicate sends.
pub trait NotificationSender: Send + Sync {
    fn send_welcome(&self, event: &UserCreatedEvent) -> anyhow::Result<()>;
}

/// Stand-in for a real mail/push integration: logs the send.
pub struct WelcomeEmailSimulator;

impl NotificationSender for WelcomeEmailSimulator {
    fn send_welcome(&self, event: &UserCreatedEvent) -> anyhow::Result<()> {
        info!(
            email = %event.email,
            name = %event.name,
            user_id = event.user_id,
            "Simulating sending welcome email"
        );
        Ok(())
    }
}

/// Decode a queue payload into a `user_created` event.
fn decode_event(payload: &[u8]) -> Result<UserCreatedEvent, ConsumeError> {
    serde_json::from_slice(payload).map_err(|e| ConsumeError::Malformed(e.to_string()))
}

/// Decode and dispatch one payload. A `Malformed` result means the message
/// is poison: the caller still acknowledges it so it is dropped rather than
/// redelivered indefinitely. Dispatch failures are logged and the message
/// is dropped the same way, avoiding a tight redelivery loop.
fn process_payload(sender: &dyn NotificationSender, payload: &[u8]) -> Result<(), ConsumeError> {
    let event = decode_event(payload)?;

    if let Err(e) = sender.send_welcome(&event) {
        warn!(
            error = %e,
            user_id = event.user_id,
            "Notification dispatch failed; dropping message"
        );
    }

    Ok(())
}

/// Long-lived sequential consumer of the user-created queue.
///
/// Runs as a single worker with prefetch 1: the broker hands over one
/// message at a time and the next arrives only after the current one is
/// acknowledged. Horizontal scaling means running more worker processes
/// against the same queue; the broker load-balances between them.
pub struct EventConsumer {
    config: BrokerConfig,
    sender: Arc<dyn NotificationSender>,
}

impl EventConsumer {
    pub fn new(config: BrokerConfig, sender: Arc<dyn NotificationSender>) -> Self {
        Self { config, sender }
    }

    /// Connect, attach to the durable queue, and consume until the broker
    /// connection fails. Only returns on a fatal connection-level error;
    /// the caller decides how to die (fixed back-off, then process exit for
    /// the external supervisor to handle).
    pub async fn run(&self) -> ConsumeError {
        match self.consume_loop().await {
            Ok(()) => ConsumeError::ConnectionLost("consumer stream closed".to_string()),
            Err(e) => e,
        }
    }

    async fn consume_loop(&self) -> Result<(), ConsumeError> {
        let uri = self.config.amqp_uri();
        info!(host = %self.config.host, port = self.config.port, "Connecting to broker");

        let connection = Connection::connect(&uri, ConnectionProperties::default())
            .await
            .map_err(|e| ConsumeError::ConnectionLost(e.to_string()))?;

        let channel = connection
            .create_channel()
            .await
            .map_err(|e| ConsumeError::ConnectionLost(e.to_string()))?;

        channel
            .queue_declare(
                &self.config.queue_name,
                QueueDeclareOptions {
                    durable: true,
                    ..QueueDeclareOptions::default()
                },
                FieldTable::default(),
            )
            .await
            .map_err(|e| ConsumeError::ConnectionLost(e.to_string()))?;

        // One unacknowledged message in flight at a time.
        channel
            .basic_qos(1, BasicQosOptions::default())
            .await
            .map_err(|e| ConsumeError::ConnectionLost(e.to_string()))?;

        let mut consumer = channel
            .basic_consume(
                &self.config.queue_name,
                CONSUMER_TAG,
                BasicConsumeOptions::default(),
                FieldTable::default(),
            )
            .await
            .map_err(|e| ConsumeError::ConnectionLost(e.to_string()))?;

        info!(queue = %self.config.queue_name, "Waiting for messages");

        while let Some(delivery) = consumer.next().await {
            let delivery = delivery.map_err(|e| ConsumeError::ConnectionLost(e.to_string()))?;

            match process_payload(self.sender.as_ref(), &delivery.data) {
                Ok(()) => {}
                Err(e) => {
                    warn!(
                        error = %e,
                        payload = %String::from_utf8_lossy(&delivery.data),
                        "Dropping malformed message"
                    );
                }
            }

            // Acknowledgment is the only way a message leaves the queue;
            // poison messages are acked too, deliberately.
            delivery
                .ack(BasicAckOptions::default())
                .await
                .map_err(|e| ConsumeError::ConnectionLost(e.to_string()))?;
        }

        Ok(())
    }
}
