use std::collections::VecDeque;

use async_trait::async_trait;
use futures_util::StreamExt;
use lapin::{
    options::*,
    protocol::{AMQPErrorKind, AMQPSoftError},
    publisher_confirm::PublisherConfirm,
    types::FieldTable,
    Channel, Connection, ConnectionProperties, Consumer,
};
use tracing::{debug, info};
use uuid::Uuid;

use crate::conversions::{arguments_to_table, delivery_from_amqp, properties_to_amqp};
use crate::options::{connection_name, RabbitMqOptions};
use scoop_core::{
    Broker, Confirmation, ConsumerSession, Delivery, Envelope, PublisherSession, QueueSpec,
    ScoopError, Session,
};

const REPLY_SUCCESS: u16 = 200;

/// Opens one connection (with one channel) per session.
pub struct RabbitBroker {
    opts: RabbitMqOptions,
}

impl RabbitBroker {
    pub fn new(opts: RabbitMqOptions) -> Self {
        Self { opts }
    }

    async fn open(&self, role: &str) -> Result<(Connection, Channel), ScoopError> {
        let props =
            ConnectionProperties::default().with_connection_name(connection_name(role).into());
        let conn = Connection::connect_uri(self.opts.amqp_uri(), props)
            .await
            .map_err(|e| {
                ScoopError::Connection(format!(
                    "failed to create the {role} connection to {}: {e}",
                    self.opts.endpoint()
                ))
            })?;

        let ch = match conn.create_channel().await {
            Ok(ch) => ch,
            Err(e) => {
                let _ = conn.close(REPLY_SUCCESS, "channel setup failed").await;
                return Err(ScoopError::Channel(format!("failed to open the {role} channel: {e}")));
            }
        };

        info!(role, endpoint = %self.opts.endpoint(), "RabbitMQ connected");
        Ok((conn, ch))
    }
}

#[async_trait]
impl Broker for RabbitBroker {
    type Consumer = RabbitConsumer;
    type Publisher = RabbitPublisher;

    async fn connect_consumer(&self) -> Result<RabbitConsumer, ScoopError> {
        let (conn, ch) = self.open("consumer").await?;
        Ok(RabbitConsumer {
            conn,
            ch,
            consumer: None,
            consumer_tag: format!("scoop-{}", Uuid::new_v4()),
        })
    }

    async fn connect_publisher(&self) -> Result<RabbitPublisher, ScoopError> {
        let (conn, ch) = self.open("publisher").await?;
        Ok(RabbitPublisher {
            conn,
            ch,
            pending: VecDeque::new(),
        })
    }
}

async fn declare(ch: &Channel, spec: &QueueSpec) -> Result<u32, ScoopError> {
    let queue = ch
        .queue_declare(
            &spec.name,
            QueueDeclareOptions {
                durable: spec.durable,
                auto_delete: false,
                exclusive: false,
                nowait: false,
                passive: false,
            },
            arguments_to_table(&spec.arguments),
        )
        .await
        .map_err(|e| declaration_error(&spec.name, e))?;
    Ok(queue.message_count())
}

/// PRECONDITION_FAILED means the queue exists with different parameters.
fn declaration_error(queue: &str, err: lapin::Error) -> ScoopError {
    let conflict = matches!(
        &err,
        lapin::Error::ProtocolError(amqp)
            if matches!(amqp.kind(), AMQPErrorKind::Soft(AMQPSoftError::PRECONDITIONFAILED))
    );
    let (queue, reason) = (queue.to_string(), err.to_string());
    if conflict {
        ScoopError::QueueDeclarationConflict { queue, reason }
    } else {
        ScoopError::QueueDeclaration { queue, reason }
    }
}

/// Closes the channel, then the connection. Either may already be gone if the
/// broker closed it first; that is not an error.
async fn close_session(conn: &Connection, ch: &Channel, role: &str) -> Result<(), ScoopError> {
    let channel_result = if ch.status().connected() {
        ch.close(REPLY_SUCCESS, "scoop finished")
            .await
            .map_err(|e| ScoopError::Channel(format!("failed to close the {role} channel: {e}")))
    } else {
        Ok(())
    };

    if conn.status().connected() {
        conn.close(REPLY_SUCCESS, "scoop finished")
            .await
            .map_err(|e| {
                ScoopError::Connection(format!("failed to close the {role} connection: {e}"))
            })?;
    }
    debug!(role, "session closed");
    channel_result
}

pub struct RabbitConsumer {
    conn: Connection,
    ch: Channel,
    consumer: Option<Consumer>,
    consumer_tag: String,
}

#[async_trait]
impl Session for RabbitConsumer {
    async fn declare_queue(&mut self, spec: &QueueSpec) -> Result<u32, ScoopError> {
        declare(&self.ch, spec).await
    }

    async fn close(self) -> Result<(), ScoopError> {
        close_session(&self.conn, &self.ch, "consumer").await
    }
}

#[async_trait]
impl ConsumerSession for RabbitConsumer {
    async fn set_prefetch(&mut self, count: u16) -> Result<(), ScoopError> {
        self.ch
            .basic_qos(count, BasicQosOptions { global: false })
            .await
            .map_err(|e| ScoopError::Channel(format!("basic_qos failed: {e}")))
    }

    async fn start_consuming(&mut self, queue: &str) -> Result<(), ScoopError> {
        // auto-ack must stay off: a message is only settled after its republish is confirmed
        let consumer = self
            .ch
            .basic_consume(
                queue,
                &self.consumer_tag,
                BasicConsumeOptions {
                    no_ack: false,
                    exclusive: false,
                    nowait: false,
                    ..Default::default()
                },
                FieldTable::default(),
            )
            .await
            .map_err(|e| ScoopError::Consume {
                queue: queue.to_string(),
                reason: e.to_string(),
            })?;

        info!(queue, consumer_tag = %self.consumer_tag, "consuming");
        self.consumer = Some(consumer);
        Ok(())
    }

    async fn next_delivery(&mut self) -> Option<Result<Delivery, ScoopError>> {
        let consumer = self.consumer.as_mut()?;
        let delivery = consumer.next().await?;
        Some(
            delivery
                .map(delivery_from_amqp)
                .map_err(|e| ScoopError::Channel(format!("delivery error: {e}"))),
        )
    }

    async fn ack(&mut self, tag: u64) -> Result<(), ScoopError> {
        self.ch
            .basic_ack(tag, BasicAckOptions { multiple: false })
            .await
            .map_err(|e| ScoopError::Acknowledge(format!("ack of delivery {tag} failed: {e}")))
    }

    async fn reject(&mut self, tag: u64) -> Result<(), ScoopError> {
        self.ch
            .basic_nack(
                tag,
                BasicNackOptions {
                    multiple: false,
                    requeue: false,
                },
            )
            .await
            .map_err(|e| ScoopError::Acknowledge(format!("nack of delivery {tag} failed: {e}")))
    }

    async fn stop_consuming(&mut self) -> Result<(), ScoopError> {
        if self.consumer.take().is_none() || !self.ch.status().connected() {
            return Ok(());
        }
        self.ch
            .basic_cancel(&self.consumer_tag, BasicCancelOptions::default())
            .await
            .map_err(|e| ScoopError::Channel(format!("basic_cancel failed: {e}")))
    }
}

pub struct RabbitPublisher {
    conn: Connection,
    ch: Channel,
    /// Publications awaiting their confirmation, oldest first.
    pending: VecDeque<PublisherConfirm>,
}

#[async_trait]
impl Session for RabbitPublisher {
    async fn declare_queue(&mut self, spec: &QueueSpec) -> Result<u32, ScoopError> {
        declare(&self.ch, spec).await
    }

    async fn close(self) -> Result<(), ScoopError> {
        close_session(&self.conn, &self.ch, "publisher").await
    }
}

#[async_trait]
impl PublisherSession for RabbitPublisher {
    async fn enable_confirms(&mut self) -> Result<(), ScoopError> {
        self.ch
            .confirm_select(ConfirmSelectOptions { nowait: false })
            .await
            .map_err(|e| {
                ScoopError::Channel(format!(
                    "unable to put publisher channel into confirm mode: {e}"
                ))
            })
    }

    async fn publish(
        &mut self,
        exchange: &str,
        routing_key: &str,
        envelope: &Envelope,
    ) -> Result<(), ScoopError> {
        let confirm = self
            .ch
            .basic_publish(
                exchange,
                routing_key,
                BasicPublishOptions {
                    mandatory: false,
                    immediate: false,
                },
                &envelope.body,
                properties_to_amqp(&envelope.properties),
            )
            .await
            .map_err(|e| ScoopError::Publish(e.to_string()))?;
        self.pending.push_back(confirm);
        Ok(())
    }

    async fn next_confirmation(&mut self) -> Result<Confirmation, ScoopError> {
        let pending = self
            .pending
            .pop_front()
            .ok_or_else(|| ScoopError::Publish("no publication awaiting confirmation".into()))?;
        let confirm = pending
            .await
            .map_err(|e| ScoopError::Publish(e.to_string()))?;

        if confirm.is_ack() {
            Ok(Confirmation::Ack)
        } else if confirm.is_nack() {
            Ok(Confirmation::Nack)
        } else {
            Err(ScoopError::Publish("publisher channel is not in confirm mode".into()))
        }
    }
}
