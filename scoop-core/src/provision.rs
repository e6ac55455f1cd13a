// scoop-core/src/provision.rs
use tracing::{debug, trace};

use crate::{QueueSpec, ScoopError, Session};

/// Declares `spec` on `session` and returns the queue's current message count.
/// Re-declaring with identical parameters is a no-op on the broker side.
pub async fn provision<S: Session>(session: &mut S, spec: &QueueSpec) -> Result<u32, ScoopError> {
    if !spec.arguments.is_empty() {
        trace!(
            queue = %spec.name,
            arguments = %serde_json::to_string(&spec.arguments).unwrap_or_default(),
            "declaring queue with arguments"
        );
    }

    let messages = session.declare_queue(spec).await?;
    debug!(queue = %spec.name, durable = spec.durable, messages, "queue declared");
    Ok(messages)
}
