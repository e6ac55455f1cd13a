use std::time::Duration;

use clap::{ArgAction, Parser};
use scoop_core::{DirectedArguments, QueueSpec, ScoopError, TransferConfig};

use crate::RabbitMqOptions;

#[derive(Parser, Debug)]
#[command(
    name = "scoop",
    version,
    about = "Move messages from one RabbitMQ queue to another",
    long_about = None
)]
pub struct Cli {
    #[arg(long, default_value = "guest")]
    pub username: String,

    #[arg(long, default_value = "guest")]
    pub password: String,

    #[arg(long, default_value = "localhost")]
    pub hostname: String,

    #[arg(long, default_value_t = 5672)]
    pub port: u16,

    #[arg(long, default_value = "/")]
    pub vhost: String,

    #[arg(long, default_value = "", help = "The queue name to consume messages from")]
    pub from: String,

    #[arg(long, default_value = "", help = "The queue name to deliver messages to")]
    pub to: String,

    #[arg(long, help = "Declare the from queue as durable")]
    pub from_durable: bool,

    #[arg(long, help = "Declare the to queue as durable")]
    pub to_durable: bool,

    #[arg(long, default_value = "", help = "The exchange name to deliver messages through")]
    pub exchange: String,

    #[arg(
        long,
        default_value_t = 1,
        value_parser = clap::value_parser!(u64).range(1..),
        help = "The number of messages to move between queues"
    )]
    pub count: u64,

    #[arg(
        long = "arg",
        value_name = "KEY:VALUE",
        help = "Argument(s) to pass to both queue declarations"
    )]
    pub args: Vec<String>,

    #[arg(
        long = "from-arg",
        value_name = "KEY:VALUE",
        help = "Argument(s) for the from queue declaration"
    )]
    pub from_args: Vec<String>,

    #[arg(
        long = "to-arg",
        value_name = "KEY:VALUE",
        help = "Argument(s) for the to queue declaration"
    )]
    pub to_args: Vec<String>,

    #[arg(
        long,
        default_value_t = 1,
        help = "Unacknowledged deliveries the broker may push at once"
    )]
    pub prefetch: u16,

    #[arg(long, help = "Fail if a publisher confirmation takes longer than this")]
    pub confirm_timeout_secs: Option<u64>,

    /// -v, -vv or -vvv; each level includes the ones below it.
    #[arg(short = 'v', action = ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    /// Coerces the queue arguments and assembles the transfer. No I/O.
    pub fn transfer_config(&self) -> Result<TransferConfig, ScoopError> {
        let arguments = DirectedArguments::layered(
            self.args.as_slice(),
            self.from_args.as_slice(),
            self.to_args.as_slice(),
        )?;

        let config = TransferConfig::new(
            QueueSpec::new(&self.from, self.from_durable, arguments.from),
            QueueSpec::new(&self.to, self.to_durable, arguments.to),
        )
        .with_exchange(&self.exchange)
        .with_count(self.count)
        .with_prefetch(self.prefetch)
        .with_confirm_timeout(self.confirm_timeout_secs.map(Duration::from_secs));

        config.validate()?;
        Ok(config)
    }

    pub fn rabbitmq_options(&self) -> RabbitMqOptions {
        RabbitMqOptions {
            username: self.username.clone(),
            password: self.password.clone(),
            hostname: self.hostname.clone(),
            port: self.port,
            vhost: self.vhost.clone(),
        }
    }

    /// Default log directive for our crates when `RUST_LOG` is unset.
    pub fn log_directive(&self) -> String {
        let level = match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        };
        format!("warn,scoop={level},scoop_core={level},scoop_rabbitmq={level}")
    }
}
