// scoop-core/src/transfer.rs
use std::sync::Arc;

use tracing::{info, warn};

use crate::{
    provision, Broker, ConsumerSession, PublisherSession, ScoopError, Session, TransferConfig,
    TransferEngine, TransferReport, TransferState,
};

/// Validates `config`, opens both sessions, provisions the queues and runs the
/// engine. Nothing touches the broker until validation has passed.
pub async fn transfer<B: Broker>(
    broker: &B,
    config: &TransferConfig,
    state: Arc<TransferState>,
) -> Result<TransferReport, ScoopError> {
    config.validate()?;
    info!(
        count = config.count,
        from = %config.from.name,
        to = %config.to.name,
        "moving messages"
    );

    let mut consumer = broker.connect_consumer().await?;
    let mut publisher = match broker.connect_publisher().await {
        Ok(publisher) => publisher,
        Err(e) => {
            close_quietly(consumer, "consumer").await;
            return Err(e);
        }
    };

    if let Err(e) = prepare(&mut consumer, &mut publisher, config).await {
        close_quietly(consumer, "consumer").await;
        close_quietly(publisher, "publisher").await;
        return Err(e);
    }

    warn!("running scoop consumer (press Ctrl-C to cancel)");
    TransferEngine::new(consumer, publisher, config, state).run().await
}

async fn prepare<C, P>(
    consumer: &mut C,
    publisher: &mut P,
    config: &TransferConfig,
) -> Result<(), ScoopError>
where
    C: ConsumerSession,
    P: PublisherSession,
{
    provision(consumer, &config.from).await?;
    provision(publisher, &config.to).await?;

    consumer.set_prefetch(config.prefetch).await?;
    consumer.start_consuming(&config.from.name).await?;
    publisher.enable_confirms().await?;
    Ok(())
}

async fn close_quietly<S: Session>(session: S, role: &'static str) {
    if let Err(e) = session.close().await {
        warn!(error = %e, role, "failed to close session");
    }
}
