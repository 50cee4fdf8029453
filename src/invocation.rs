//! One batch invocation: envelope text in, response bytes out
//!
//! Per-message failures never fail the invocation. Only an envelope that
//! cannot be decoded or a response that cannot be encoded is an error.

use crate::coordinator::BatchCoordinator;
use crate::error::Result;
use crate::persister::Persister;
use crate::types::{BatchEnvelope, BatchOutcome};
use std::time::Duration;
use tokio::time::Instant;

/// Decode a batch envelope and run it through the coordinator
///
/// With a `timeout`, the deadline starts counting when this is called.
pub async fn handle_envelope<P: Persister>(
    coordinator: &BatchCoordinator<P>,
    raw_envelope: &str,
    timeout: Option<Duration>,
) -> Result<BatchOutcome> {
    let envelope: BatchEnvelope = serde_json::from_str(raw_envelope)?;

    let outcome = match timeout {
        Some(timeout) => {
            let deadline = Instant::now() + timeout;
            coordinator
                .process_batch_until(&envelope.records, deadline)
                .await
        }
        None => coordinator.process_batch(&envelope.records).await,
    };

    Ok(outcome)
}

/// Encode the partial-failure response, newline-terminated
pub fn render_response(outcome: &BatchOutcome, pretty: bool) -> Result<Vec<u8>> {
    let mut response = if pretty {
        serde_json::to_vec_pretty(outcome)?
    } else {
        serde_json::to_vec(outcome)?
    };
    response.push(b'\n');
    Ok(response)
}
