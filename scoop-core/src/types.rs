// scoop-core/src/types.rs
use std::collections::BTreeMap;

use crate::arguments::QueueArguments;

/// Message headers, keyed by header name.
pub type Headers = BTreeMap<String, HeaderValue>;

/// A header value as carried on the wire. Every AMQP field type has its own
/// variant so a header table can be reproduced exactly on republication.
#[derive(Debug, Clone, PartialEq)]
pub enum HeaderValue {
    Bool(bool),
    I8(i8),
    U8(u8),
    I16(i16),
    U16(u16),
    I32(i32),
    U32(u32),
    I64(i64),
    F32(f32),
    F64(f64),
    Decimal { scale: u8, value: u32 },
    ShortString(String),
    LongString(Vec<u8>),
    Array(Vec<HeaderValue>),
    Timestamp(u64),
    Table(Headers),
    Bytes(Vec<u8>),
    Void,
}

/// Basic properties of a message.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MessageProperties {
    pub content_type: Option<String>,
    pub content_encoding: Option<String>,
    pub delivery_mode: Option<u8>,
    pub priority: Option<u8>,
    pub correlation_id: Option<String>,
    pub reply_to: Option<String>,
    pub expiration: Option<String>,
    pub message_id: Option<String>,
    pub timestamp: Option<u64>,
    pub kind: Option<String>,
    pub user_id: Option<String>,
    pub app_id: Option<String>,
    pub headers: Option<Headers>,
}

/// The transferred unit: properties plus payload.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Envelope {
    pub properties: MessageProperties,
    pub body: Vec<u8>,
}

/// A message pulled from the source subscription. It stays unsettled until it
/// is acknowledged or negatively acknowledged by its tag.
#[derive(Debug, Clone, PartialEq)]
pub struct Delivery {
    pub tag: u64,
    pub redelivered: bool,
    pub envelope: Envelope,
}

impl Delivery {
    /// Builds the outbound copy, field for field.
    pub fn to_outbound(&self) -> Envelope {
        self.envelope.clone()
    }
}

/// Broker answer to a single publication on a confirm-mode channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    Ack,
    Nack,
}

/// Everything needed to declare one queue.
#[derive(Debug, Clone, PartialEq)]
pub struct QueueSpec {
    pub name: String,
    pub durable: bool,
    pub arguments: QueueArguments,
}

impl QueueSpec {
    pub fn new(name: impl Into<String>, durable: bool, arguments: QueueArguments) -> Self {
        Self {
            name: name.into(),
            durable,
            arguments,
        }
    }
}
