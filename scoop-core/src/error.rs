// scoop-core/src/error.rs
use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ScoopError {
    #[error("the {0} queue name must be defined")]
    MissingQueueName(&'static str),

    #[error("the from queue name matches the to queue name: '{0}'")]
    SameQueueName(String),

    #[error("queue argument '{0}' is not of the form key:value")]
    MalformedArgument(String),

    #[error("argument with key \"{key}\" does not have a valid integer value, received \"{value}\"")]
    InvalidIntegerArgument { key: String, value: String },

    #[error("message count must be a positive integer, received {0}")]
    InvalidCount(u64),

    #[error("connection error: {0}")]
    Connection(String),

    #[error("channel error: {0}")]
    Channel(String),

    #[error("failed to declare queue '{queue}': {reason}")]
    QueueDeclaration { queue: String, reason: String },

    #[error("queue '{queue}' exists with conflicting parameters: {reason}")]
    QueueDeclarationConflict { queue: String, reason: String },

    #[error("failed to register the consumer on '{queue}': {reason}")]
    Consume { queue: String, reason: String },

    #[error("the consumer channel was unexpectedly closed")]
    ConsumerChannelClosed,

    #[error("publish error: {0}")]
    Publish(String),

    #[error("acknowledgement error: {0}")]
    Acknowledge(String),

    #[error("timed out after {after:?} waiting for {operation}")]
    Timeout { operation: &'static str, after: Duration },
}

impl ScoopError {
    /// Configuration errors are detected before any broker connection is made.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            Self::MissingQueueName(_)
                | Self::SameQueueName(_)
                | Self::MalformedArgument(_)
                | Self::InvalidIntegerArgument { .. }
                | Self::InvalidCount(_)
        )
    }
}
