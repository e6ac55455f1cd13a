pub mod arguments;
pub mod bus;
pub mod config;
pub mod engine;
pub mod error;
pub mod provision;
pub mod signal;
pub mod state;
pub mod transfer;
pub mod types;

pub use arguments::{
    parse_argument, ArgValue, DirectedArguments, QueueArguments, STRING_ARGUMENT_KEYS,
};
pub use bus::{Broker, ConsumerSession, PublisherSession, Session};
pub use config::TransferConfig;
pub use engine::TransferEngine;
pub use error::ScoopError;
pub use provision::provision;
pub use signal::{relay_interrupts, spawn_interrupt_bridge};
pub use state::{Phase, TransferReport, TransferState};
pub use transfer::transfer;
pub use types::{
    Confirmation, Delivery, Envelope, HeaderValue, Headers, MessageProperties, QueueSpec,
};
