// scoop-core/src/bus.rs
use async_trait::async_trait;

use crate::{Confirmation, Delivery, Envelope, QueueSpec, ScoopError};

/// Opens the two independent broker sessions a transfer needs. Each call
/// establishes a fresh connection so publish back-pressure never stalls acks.
#[async_trait]
pub trait Broker: Send + Sync {
    type Consumer: ConsumerSession;
    type Publisher: PublisherSession;

    async fn connect_consumer(&self) -> Result<Self::Consumer, ScoopError>;

    async fn connect_publisher(&self) -> Result<Self::Publisher, ScoopError>;
}

/// Operations shared by both sessions.
#[async_trait]
pub trait Session: Send + Sized {
    /// Declares the queue and returns its live message count.
    async fn declare_queue(&mut self, spec: &QueueSpec) -> Result<u32, ScoopError>;

    /// Closes the channel and then the connection.
    async fn close(self) -> Result<(), ScoopError>;
}

#[async_trait]
pub trait ConsumerSession: Session {
    /// Limits how many unacknowledged deliveries the broker pushes at once.
    async fn set_prefetch(&mut self, count: u16) -> Result<(), ScoopError>;

    /// Subscribes to `queue` with manual acknowledgement.
    async fn start_consuming(&mut self, queue: &str) -> Result<(), ScoopError>;

    /// Next delivery from the subscription, `None` once the broker closed it.
    async fn next_delivery(&mut self) -> Option<Result<Delivery, ScoopError>>;

    async fn ack(&mut self, tag: u64) -> Result<(), ScoopError>;

    /// Negative acknowledgement without requeue.
    async fn reject(&mut self, tag: u64) -> Result<(), ScoopError>;

    /// Stops the subscription; unsettled deliveries return to the queue.
    async fn stop_consuming(&mut self) -> Result<(), ScoopError>;
}

#[async_trait]
pub trait PublisherSession: Session {
    /// Puts the channel into confirm mode.
    async fn enable_confirms(&mut self) -> Result<(), ScoopError>;

    async fn publish(
        &mut self,
        exchange: &str,
        routing_key: &str,
        envelope: &Envelope,
    ) -> Result<(), ScoopError>;

    /// Confirmation for the oldest publication not yet confirmed.
    async fn next_confirmation(&mut self) -> Result<Confirmation, ScoopError>;
}
