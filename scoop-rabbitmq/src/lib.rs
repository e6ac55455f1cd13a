pub mod cli;
pub mod conversions;
mod options;
mod rabbit_broker;

pub use cli::Cli;
pub use options::{connection_name, RabbitMqOptions};
pub use rabbit_broker::{RabbitBroker, RabbitConsumer, RabbitPublisher};
