// scoop-core/src/engine.rs
use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info, trace, warn};

use crate::{
    Confirmation, ConsumerSession, Delivery, Phase, PublisherSession, ScoopError, Session,
    TransferConfig, TransferReport, TransferState,
};

/// Consume -> publish -> confirm -> acknowledge, one message at a time.
///
/// Each delivery is carried all the way to an ack or a nack before the next one
/// is pulled, so exactly one publication is ever awaiting its confirmation.
/// Cancellation is only observed between messages.
pub struct TransferEngine<C, P> {
    consumer: C,
    publisher: P,
    exchange: String,
    routing_key: String,
    target: u64,
    confirm_timeout: Option<Duration>,
    state: Arc<TransferState>,
}

impl<C, P> TransferEngine<C, P>
where
    C: ConsumerSession,
    P: PublisherSession,
{
    /// `consumer` must already be subscribed and `publisher` in confirm mode.
    pub fn new(
        consumer: C,
        publisher: P,
        config: &TransferConfig,
        state: Arc<TransferState>,
    ) -> Self {
        Self {
            consumer,
            publisher,
            exchange: config.exchange.clone(),
            routing_key: config.routing_key().to_string(),
            target: config.count,
            confirm_timeout: config.confirm_timeout,
            state,
        }
    }

    /// Runs until the target is reached, cancellation is requested, or a fatal
    /// error occurs. Both sessions are closed on every path.
    pub async fn run(mut self) -> Result<TransferReport, ScoopError> {
        let state = Arc::clone(&self.state);
        let target = self.target;
        state.set_phase(Phase::Running);

        let outcome = self.pump().await;
        let phase = match &outcome {
            Ok(phase) => *phase,
            Err(_) => Phase::Failed,
        };
        state.set_phase(phase);
        self.shutdown().await;

        outcome.map(|phase| state.report(phase, target))
    }

    async fn pump(&mut self) -> Result<Phase, ScoopError> {
        let state = Arc::clone(&self.state);
        loop {
            if state.target_reached(self.target) {
                return Ok(Phase::Completed);
            }
            if state.is_cancelled() {
                return Ok(Phase::Draining);
            }

            // Nothing is in flight while waiting, so cancellation may interrupt the wait.
            let next = tokio::select! {
                biased;
                _ = state.cancelled() => return Ok(Phase::Draining),
                next = self.consumer.next_delivery() => next,
            };

            let delivery = match next {
                Some(Ok(delivery)) => delivery,
                Some(Err(e)) => {
                    error!(error = %e, "delivery error");
                    return Err(ScoopError::ConsumerChannelClosed);
                }
                None => return Err(ScoopError::ConsumerChannelClosed),
            };

            self.relay(delivery).await?;
        }
    }

    async fn relay(&mut self, delivery: Delivery) -> Result<(), ScoopError> {
        let tag = delivery.tag;
        let envelope = delivery.to_outbound();

        if let Err(e) = self
            .publisher
            .publish(&self.exchange, &self.routing_key, &envelope)
            .await
        {
            error!(error = %e, tag, "failed to deliver message");
            self.reject_after_failure(tag).await;
            return Err(e);
        }

        match self.await_confirmation().await {
            Ok(Confirmation::Ack) => {
                self.consumer.ack(tag).await?;
                let transferred = self.state.record_transferred();
                trace!(
                    tag,
                    redelivered = delivery.redelivered,
                    "successfully delivered message ({}/{})",
                    transferred,
                    self.target
                );
            }
            Ok(Confirmation::Nack) => {
                self.consumer.reject(tag).await?;
                let rejected = self.state.record_rejected();
                warn!(tag, rejected, "broker refused to acknowledge delivery, message dropped");
            }
            Err(e) => {
                error!(error = %e, tag, "no publisher confirmation");
                self.reject_after_failure(tag).await;
                return Err(e);
            }
        }
        Ok(())
    }

    async fn await_confirmation(&mut self) -> Result<Confirmation, ScoopError> {
        match self.confirm_timeout {
            Some(after) => tokio::time::timeout(after, self.publisher.next_confirmation())
                .await
                .unwrap_or(Err(ScoopError::Timeout {
                    operation: "publisher confirmation",
                    after,
                })),
            None => self.publisher.next_confirmation().await,
        }
    }

    /// The run is already failing; a nack error must not mask the original one.
    async fn reject_after_failure(&mut self, tag: u64) {
        if let Err(e) = self.consumer.reject(tag).await {
            warn!(error = %e, tag, "failed to nack source message");
        }
    }

    async fn shutdown(self) {
        let Self {
            mut consumer,
            publisher,
            ..
        } = self;

        if let Err(e) = consumer.stop_consuming().await {
            warn!(error = %e, "failed to cancel consumer");
        }
        if let Err(e) = consumer.close().await {
            warn!(error = %e, "failed to close consumer session");
        }
        if let Err(e) = publisher.close().await {
            warn!(error = %e, "failed to close publisher session");
        }
        info!("sessions closed");
    }
}
