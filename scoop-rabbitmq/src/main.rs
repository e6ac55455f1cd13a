//! scoop: move a bounded number of messages from one RabbitMQ queue to another.
//!
//! - Two connections: one consumes and acknowledges, one publishes with confirms
//! - A source message is acked only after its copy is confirmed by the broker
//! - Ctrl-C finishes the message in flight, then stops

use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use scoop_core::{spawn_interrupt_bridge, transfer, ScoopError, TransferReport, TransferState};
use scoop_rabbitmq::{Cli, RabbitBroker};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(cli.log_directive())),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    match cli.verbose {
        0 => {}
        1 => info!("verbose mode enabled"),
        2 => info!("very verbose mode enabled"),
        _ => info!("extremely verbose mode enabled"),
    }

    match run(cli).await {
        Ok(report) => {
            if report.rejected > 0 {
                warn!(
                    rejected = report.rejected,
                    "some messages were refused by the broker and dropped"
                );
            }
            info!(
                report = %serde_json::to_string(&report).unwrap_or_default(),
                "complete"
            );
            ExitCode::SUCCESS
        }
        Err(e) if e.is_config_error() => {
            error!("{e}");
            ExitCode::from(2)
        }
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<TransferReport, ScoopError> {
    let config = cli.transfer_config()?;
    let state = Arc::new(TransferState::new());
    let bridge = spawn_interrupt_bridge(Arc::clone(&state));

    let broker = RabbitBroker::new(cli.rabbitmq_options());
    let result = transfer(&broker, &config, state).await;

    bridge.abort();
    result
}
