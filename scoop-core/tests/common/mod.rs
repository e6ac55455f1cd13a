#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, Once};

use async_trait::async_trait;
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

use scoop_core::{
    Broker, Confirmation, ConsumerSession, Delivery, Envelope, MessageProperties,
    PublisherSession, QueueArguments, QueueSpec, ScoopError, Session, TransferConfig,
};

static TRACING: Once = Once::new();

pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Consumer,
    Publisher,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Declared { role: Role, queue: String, durable: bool },
    Prefetch(u16),
    Consuming(String),
    ConfirmsEnabled,
    Pulled(u64),
    Published { exchange: String, routing_key: String, envelope: Envelope },
    Ack(u64),
    Reject(u64),
    StoppedConsuming,
    Closed(Role),
}

/// Everything both fake sessions did, in order.
#[derive(Debug, Default, Clone)]
pub struct Journal(Arc<Mutex<Vec<Event>>>);

impl Journal {
    fn push(&self, event: Event) {
        self.0.lock().unwrap().push(event);
    }

    pub fn events(&self) -> Vec<Event> {
        self.0.lock().unwrap().clone()
    }

    fn tags(&self, pick: impl Fn(&Event) -> Option<u64>) -> Vec<u64> {
        self.events().iter().filter_map(pick).collect()
    }

    pub fn pulled(&self) -> Vec<u64> {
        self.tags(|e| match e {
            Event::Pulled(tag) => Some(*tag),
            _ => None,
        })
    }

    pub fn acks(&self) -> Vec<u64> {
        self.tags(|e| match e {
            Event::Ack(tag) => Some(*tag),
            _ => None,
        })
    }

    pub fn rejects(&self) -> Vec<u64> {
        self.tags(|e| match e {
            Event::Reject(tag) => Some(*tag),
            _ => None,
        })
    }

    pub fn published(&self) -> Vec<(String, String, Envelope)> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                Event::Published {
                    exchange,
                    routing_key,
                    envelope,
                } => Some((exchange, routing_key, envelope)),
                _ => None,
            })
            .collect()
    }

    pub fn closed(&self) -> Vec<Role> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                Event::Closed(role) => Some(role),
                _ => None,
            })
            .collect()
    }
}

pub fn delivery(tag: u64) -> Delivery {
    Delivery {
        tag,
        redelivered: false,
        envelope: Envelope {
            properties: MessageProperties {
                content_type: Some("text/plain".into()),
                message_id: Some(format!("m-{tag}")),
                ..Default::default()
            },
            body: format!("payload-{tag}").into_bytes(),
        },
    }
}

pub fn config(count: u64) -> TransferConfig {
    TransferConfig::new(
        QueueSpec::new("source", true, QueueArguments::default()),
        QueueSpec::new("destination", true, QueueArguments::default()),
    )
    .with_count(count)
}

pub struct FakeConsumer {
    journal: Journal,
    deliveries: mpsc::UnboundedReceiver<Delivery>,
    declare_error: Option<ScoopError>,
    settle_error: Option<ScoopError>,
}

impl FakeConsumer {
    /// Dropping the returned sender closes the subscription.
    pub fn new(journal: &Journal) -> (Self, mpsc::UnboundedSender<Delivery>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let consumer = Self {
            journal: journal.clone(),
            deliveries: rx,
            declare_error: None,
            settle_error: None,
        };
        (consumer, tx)
    }

    /// Pre-loads deliveries tagged `1..=count`.
    pub fn with_deliveries(
        journal: &Journal,
        count: u64,
    ) -> (Self, mpsc::UnboundedSender<Delivery>) {
        let (consumer, tx) = Self::new(journal);
        for tag in 1..=count {
            tx.send(delivery(tag)).unwrap();
        }
        (consumer, tx)
    }

    pub fn failing_declare(mut self, error: ScoopError) -> Self {
        self.declare_error = Some(error);
        self
    }

    /// Every ack and nack fails with `error`.
    pub fn failing_settlement(mut self, error: ScoopError) -> Self {
        self.settle_error = Some(error);
        self
    }
}

#[async_trait]
impl Session for FakeConsumer {
    async fn declare_queue(&mut self, spec: &QueueSpec) -> Result<u32, ScoopError> {
        if let Some(e) = self.declare_error.clone() {
            return Err(e);
        }
        self.journal.push(Event::Declared {
            role: Role::Consumer,
            queue: spec.name.clone(),
            durable: spec.durable,
        });
        Ok(0)
    }

    async fn close(self) -> Result<(), ScoopError> {
        self.journal.push(Event::Closed(Role::Consumer));
        Ok(())
    }
}

#[async_trait]
impl ConsumerSession for FakeConsumer {
    async fn set_prefetch(&mut self, count: u16) -> Result<(), ScoopError> {
        self.journal.push(Event::Prefetch(count));
        Ok(())
    }

    async fn start_consuming(&mut self, queue: &str) -> Result<(), ScoopError> {
        self.journal.push(Event::Consuming(queue.to_string()));
        Ok(())
    }

    async fn next_delivery(&mut self) -> Option<Result<Delivery, ScoopError>> {
        let delivery = self.deliveries.recv().await?;
        self.journal.push(Event::Pulled(delivery.tag));
        Some(Ok(delivery))
    }

    async fn ack(&mut self, tag: u64) -> Result<(), ScoopError> {
        if let Some(e) = self.settle_error.clone() {
            return Err(e);
        }
        self.journal.push(Event::Ack(tag));
        Ok(())
    }

    async fn reject(&mut self, tag: u64) -> Result<(), ScoopError> {
        if let Some(e) = self.settle_error.clone() {
            return Err(e);
        }
        self.journal.push(Event::Reject(tag));
        Ok(())
    }

    async fn stop_consuming(&mut self) -> Result<(), ScoopError> {
        self.journal.push(Event::StoppedConsuming);
        Ok(())
    }
}

pub struct FakePublisher {
    journal: Journal,
    /// Scripted answers; positive once exhausted.
    confirmations: VecDeque<Confirmation>,
    fail_publish_on: Option<usize>,
    silent: bool,
    published: usize,
    declare_error: Option<ScoopError>,
}

impl FakePublisher {
    pub fn new(journal: &Journal) -> Self {
        Self {
            journal: journal.clone(),
            confirmations: VecDeque::new(),
            fail_publish_on: None,
            silent: false,
            published: 0,
            declare_error: None,
        }
    }

    pub fn confirming(mut self, confirmations: impl IntoIterator<Item = Confirmation>) -> Self {
        self.confirmations = confirmations.into_iter().collect();
        self
    }

    /// The `nth` publish call (1-based) fails.
    pub fn failing_publish_on(mut self, nth: usize) -> Self {
        self.fail_publish_on = Some(nth);
        self
    }

    /// Never answers with a confirmation.
    pub fn silent(mut self) -> Self {
        self.silent = true;
        self
    }

    pub fn failing_declare(mut self, error: ScoopError) -> Self {
        self.declare_error = Some(error);
        self
    }
}

#[async_trait]
impl Session for FakePublisher {
    async fn declare_queue(&mut self, spec: &QueueSpec) -> Result<u32, ScoopError> {
        if let Some(e) = self.declare_error.clone() {
            return Err(e);
        }
        self.journal.push(Event::Declared {
            role: Role::Publisher,
            queue: spec.name.clone(),
            durable: spec.durable,
        });
        Ok(0)
    }

    async fn close(self) -> Result<(), ScoopError> {
        self.journal.push(Event::Closed(Role::Publisher));
        Ok(())
    }
}

#[async_trait]
impl PublisherSession for FakePublisher {
    async fn enable_confirms(&mut self) -> Result<(), ScoopError> {
        self.journal.push(Event::ConfirmsEnabled);
        Ok(())
    }

    async fn publish(
        &mut self,
        exchange: &str,
        routing_key: &str,
        envelope: &Envelope,
    ) -> Result<(), ScoopError> {
        self.published += 1;
        if self.fail_publish_on == Some(self.published) {
            return Err(ScoopError::Publish("connection reset".into()));
        }
        self.journal.push(Event::Published {
            exchange: exchange.to_string(),
            routing_key: routing_key.to_string(),
            envelope: envelope.clone(),
        });
        Ok(())
    }

    async fn next_confirmation(&mut self) -> Result<Confirmation, ScoopError> {
        if self.silent {
            return std::future::pending().await;
        }
        Ok(self.confirmations.pop_front().unwrap_or(Confirmation::Ack))
    }
}

pub struct FakeBroker {
    connects: AtomicUsize,
    consumer: Mutex<Option<FakeConsumer>>,
    publisher: Mutex<Option<FakePublisher>>,
    publisher_error: Option<ScoopError>,
}

impl FakeBroker {
    pub fn new(consumer: FakeConsumer, publisher: FakePublisher) -> Self {
        Self {
            connects: AtomicUsize::new(0),
            consumer: Mutex::new(Some(consumer)),
            publisher: Mutex::new(Some(publisher)),
            publisher_error: None,
        }
    }

    pub fn failing_publisher_connect(mut self, error: ScoopError) -> Self {
        self.publisher_error = Some(error);
        self
    }

    pub fn connects(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Broker for FakeBroker {
    type Consumer = FakeConsumer;
    type Publisher = FakePublisher;

    async fn connect_consumer(&self) -> Result<FakeConsumer, ScoopError> {
        self.connects.fetch_add(1, Ordering::SeqCst);
        self.consumer
            .lock()
            .unwrap()
            .take()
            .ok_or_else(|| ScoopError::Connection("consumer already connected".into()))
    }

    async fn connect_publisher(&self) -> Result<FakePublisher, ScoopError> {
        self.connects.fetch_add(1, Ordering::SeqCst);
        if let Some(e) = self.publisher_error.clone() {
            return Err(e);
        }
        self.publisher
            .lock()
            .unwrap()
            .take()
            .ok_or_else(|| ScoopError::Connection("publisher already connected".into()))
    }
}
