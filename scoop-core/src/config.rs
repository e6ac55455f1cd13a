// scoop-core/src/config.rs
use std::time::Duration;

use crate::{QueueSpec, ScoopError};

/// Immutable description of one transfer, built once at startup.
#[derive(Debug, Clone, PartialEq)]
pub struct TransferConfig {
    pub from: QueueSpec,
    pub to: QueueSpec,
    /// Exchange to publish through; empty means the default exchange.
    pub exchange: String,
    pub count: u64,
    pub prefetch: u16,
    /// Upper bound on the wait for a publisher confirmation. `None` waits forever.
    pub confirm_timeout: Option<Duration>,
}

impl TransferConfig {
    pub fn new(from: QueueSpec, to: QueueSpec) -> Self {
        Self {
            from,
            to,
            exchange: String::new(),
            count: 1,
            prefetch: 1,
            confirm_timeout: None,
        }
    }

    pub fn with_exchange(mut self, exchange: impl Into<String>) -> Self {
        self.exchange = exchange.into();
        self
    }

    pub fn with_count(mut self, count: u64) -> Self {
        self.count = count;
        self
    }

    pub fn with_prefetch(mut self, prefetch: u16) -> Self {
        self.prefetch = prefetch;
        self
    }

    pub fn with_confirm_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.confirm_timeout = timeout;
        self
    }

    /// Checks everything that can be checked without talking to the broker.
    pub fn validate(&self) -> Result<(), ScoopError> {
        if self.from.name.is_empty() {
            return Err(ScoopError::MissingQueueName("from"));
        }
        if self.to.name.is_empty() {
            return Err(ScoopError::MissingQueueName("to"));
        }
        if self.from.name == self.to.name {
            return Err(ScoopError::SameQueueName(self.from.name.clone()));
        }
        if self.count == 0 {
            return Err(ScoopError::InvalidCount(self.count));
        }
        Ok(())
    }

    /// Publications are routed by the destination queue name.
    pub fn routing_key(&self) -> &str {
        &self.to.name
    }
}
