use crate::config::BrokerConfig;
use crate::error::PublishError;
use crate::events::types::DomainEvent;
use lapin::{
    options::{BasicPublishOptions, QueueDeclareOptions},
    types::FieldTable,
    BasicProperties, Channel, Connection, ConnectionProperties,
};
use std::future::Future;
use tracing::{error, info};

// AMQP delivery mode 2 = persistent: the broker writes the message to disk
// so it survives a broker restart together with the durable queue.
const DELIVERY_MODE_PERSISTENT: u8 = 2;

/// Transport seam under the publisher: hands a serialized payload to a
/// named queue. The production implementation is the AMQP channel; tests
/// substitute a double the same way `NotificationSender` does for the
/// consumer side.
pub trait QueueTransport: Send + Sync {
    fn send(
        &self,
        queue: &str,
        payload: &[u8],
    ) -> impl Future<Output = Result<(), PublishError>> + Send;
}

/// AMQP channel bound to the broker, with the durable queue declared.
pub struct AmqpTransport {
    channel: Channel,
    // Dropping the connection closes the channel; hold it for the
    // transport's lifetime.
    _connection: Connection,
}

impl AmqpTransport {
    /// Connect to the broker and declare the durable queue (idempotent —
    /// safe when the queue already exists with matching properties).
    pub async fn connect(config: &BrokerConfig) -> Result<Self, PublishError> {
        let uri = config.amqp_uri();
        info!(host = %config.host, port = config.port, "Connecting to broker");

        let connection = Connection::connect(&uri, ConnectionProperties::default())
            .await
            .map_err(|e| PublishError::BrokerUnavailable(e.to_string()))?;

        let channel = connection
            .create_channel()
            .await
            .map_err(|e| PublishError::BrokerUnavailable(e.to_string()))?;

        channel
            .queue_declare(
                &config.queue_name,
                QueueDeclareOptions {
                    durable: true,
                    ..QueueDeclareOptions::default()
                },
                FieldTable::default(),
            )
            .await
            .map_err(|e| PublishError::BrokerUnavailable(e.to_string()))?;

        info!(queue = %config.queue_name, "Broker connected, durable queue declared");

        Ok(Self {
            channel,
            _connection: connection,
        })
    }
}

impl QueueTransport for AmqpTransport {
    async fn send(&self, queue: &str, payload: &[u8]) -> Result<(), PublishError> {
        let confirm = self
            .channel
            .basic_publish(
                "",
                queue,
                BasicPublishOptions::default(),
                payload,
                BasicProperties::default().with_delivery_mode(DELIVERY_MODE_PERSISTENT),
            )
            .await
            .map_err(|e| PublishError::BrokerUnavailable(e.to_string()))?;

        confirm
            .await
            .map_err(|e| PublishError::BrokerUnavailable(e.to_string()))?;

        Ok(())
    }
}

/// Publisher side of the event pipeline.
///
/// Publishing is invoked strictly after the triggering write has committed;
/// use [`publish_best_effort`](Self::publish_best_effort) from
/// request-handling code so a broker outage cannot alter the HTTP response
/// already decided for the write.
pub struct EventPublisher<T: QueueTransport = AmqpTransport> {
    transport: T,
}

impl EventPublisher<AmqpTransport> {
    /// Connect to the broker at construction, so a broken broker is
    /// detected at startup rather than on the first write.
    pub async fn connect(config: &BrokerConfig) -> Result<Self, PublishError> {
        Ok(Self {
            transport: AmqpTransport::connect(config).await?,
        })
    }
}

impl<T: QueueTransport> EventPublisher<T> {
    pub fn with_transport(transport: T) -> Self {
        Self { transport }
    }

    /// Publish one domain event, marked persistent, to its queue.
    pub async fn publish(&self, event: &DomainEvent) -> Result<(), PublishError> {
        let payload = event.payload()?;
        let queue = event.queue_name();

        self.transport.send(queue, &payload).await?;

        info!(queue = %queue, "Event published");
        Ok(())
    }

    /// Publish with fire-and-forget semantics relative to the caller's HTTP
    /// response: failures are logged and swallowed. The write has already
    /// succeeded; losing the notification is the accepted inconsistency.
    pub async fn publish_best_effort(&self, event: &DomainEvent) {
        if let Err(e) = self.publish(event).await {
            error!(
                error = %e,
                queue = event.queue_name(),
                "Failed to publish event; primary operation is unaffected"
            );
        }
    }
}
