// scoop-core/src/signal.rs
use std::sync::Arc;

use futures_util::{stream, Stream, StreamExt};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::TransferState;

/// Turns every item of `interrupts` into a cancellation request. Never stops
/// the engine directly; the message in flight is always settled first.
pub async fn relay_interrupts<S>(interrupts: S, state: Arc<TransferState>)
where
    S: Stream<Item = ()>,
{
    let mut interrupts = std::pin::pin!(interrupts);
    while interrupts.next().await.is_some() {
        if state.request_cancel() {
            warn!("finishing up ... (interrupt detected)");
        } else {
            debug!("interrupt detected, already finishing up");
        }
    }
}

/// Ctrl-C, as a stream. Ends if the handler cannot be installed.
pub fn ctrl_c_stream() -> impl Stream<Item = ()> + Send {
    stream::unfold((), |()| async {
        match tokio::signal::ctrl_c().await {
            Ok(()) => Some(((), ())),
            Err(e) => {
                warn!(error = %e, "failed to listen for interrupts");
                None
            }
        }
    })
}

/// Spawns the bridge between process interrupts and `state`.
pub fn spawn_interrupt_bridge(state: Arc<TransferState>) -> JoinHandle<()> {
    tokio::spawn(relay_interrupts(ctrl_c_stream(), state))
}
