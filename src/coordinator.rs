//! Batch coordinator: per-message validation, persistence and
//! partial-failure reporting
//!
//! Every message in a batch is an independent unit of work: a rejection or
//! store failure marks only that message for redelivery and never affects
//! its siblings. The coordinator keeps no state between batches and never
//! retries; redelivery is left to the queue transport.

use crate::persister::Persister;
use crate::types::{BatchOutcome, RawMessage};
use crate::validator::validate;
use futures::StreamExt;
use tokio::time::Instant;

/// Result of processing one message
#[derive(Debug)]
enum MessageStatus {
    Stored,
    Rejected,
    StoreFailed,
    TimedOut,
}

/// Drives a batch through validation and persistence
pub struct BatchCoordinator<P> {
    persister: P,
    concurrency: usize,
}

impl<P: Persister> BatchCoordinator<P> {
    /// Create a sequential coordinator over a persister
    pub fn new(persister: P) -> Self {
        Self {
            persister,
            concurrency: 1,
        }
    }

    /// Process up to `concurrency` messages of a batch at once
    ///
    /// Values below 1 are treated as 1. The outcome keeps input order
    /// regardless of completion order.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Get the configured per-batch concurrency
    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Get a reference to the underlying persister
    pub fn persister(&self) -> &P {
        &self.persister
    }

    /// Process a batch and report the messages the transport must redeliver
    ///
    /// Message-level failures never surface as an error; they only appear
    /// in the returned outcome.
    pub async fn process_batch(&self, batch: &[RawMessage]) -> BatchOutcome {
        self.run(batch, None).await
    }

    /// Like [`process_batch`](Self::process_batch), bounded by an invocation deadline
    ///
    /// A message whose store call has not completed by `deadline` is reported
    /// as failed. Once the deadline has passed no further store calls start
    /// and every remaining message is reported.
    pub async fn process_batch_until(
        &self,
        batch: &[RawMessage],
        deadline: Instant,
    ) -> BatchOutcome {
        self.run(batch, Some(deadline)).await
    }

    async fn run(&self, batch: &[RawMessage], deadline: Option<Instant>) -> BatchOutcome {
        let pending: Vec<_> = batch
            .iter()
            .map(|message| self.process_message(message, deadline))
            .collect();
        let statuses: Vec<MessageStatus> = futures::stream::iter(pending)
            .buffered(self.concurrency)
            .collect()
            .await;

        let mut outcome = BatchOutcome::default();
        let (mut stored, mut rejected, mut store_failed, mut timed_out) =
            (0usize, 0usize, 0usize, 0usize);

        for (message, status) in batch.iter().zip(statuses) {
            match status {
                MessageStatus::Stored => {
                    stored += 1;
                    continue;
                }
                MessageStatus::Rejected => rejected += 1,
                MessageStatus::StoreFailed => store_failed += 1,
                MessageStatus::TimedOut => timed_out += 1,
            }
            outcome.push(message.message_id.clone());
        }

        tracing::info!(
            total = batch.len(),
            stored,
            rejected,
            store_failed,
            timed_out,
            persister = self.persister.name(),
            "Batch processed"
        );

        outcome
    }

    async fn process_message(
        &self,
        message: &RawMessage,
        deadline: Option<Instant>,
    ) -> MessageStatus {
        if deadline.is_some_and(|d| Instant::now() >= d) {
            tracing::warn!(
                message_id = %message.message_id,
                "Invocation deadline passed before processing"
            );
            return MessageStatus::TimedOut;
        }

        tracing::info!(
            message_id = %message.message_id,
            source = message.event_source.as_deref().unwrap_or("unknown"),
            "Received message"
        );

        let event = match validate(&message.body) {
            Ok(event) => event,
            Err(rejection) => {
                tracing::warn!(
                    message_id = %message.message_id,
                    kind = rejection.kind(),
                    reason = %rejection,
                    "Message rejected"
                );
                return MessageStatus::Rejected;
            }
        };

        let stored = match deadline {
            Some(deadline) => {
                match tokio::time::timeout_at(deadline, self.persister.store(&event)).await {
                    Ok(result) => result,
                    Err(_) => {
                        tracing::warn!(
                            message_id = %message.message_id,
                            event_id = %event.event_id,
                            "Invocation deadline exceeded while storing event"
                        );
                        return MessageStatus::TimedOut;
                    }
                }
            }
            None => self.persister.store(&event).await,
        };

        match stored {
            Ok(()) => {
                tracing::debug!(
                    message_id = %message.message_id,
                    event_id = %event.event_id,
                    kind = %event.kind,
                    "Event stored"
                );
                MessageStatus::Stored
            }
            Err(e) => {
                tracing::error!(
                    message_id = %message.message_id,
                    event_id = %event.event_id,
                    error = %e,
                    "Failed to store event"
                );
                MessageStatus::StoreFailed
            }
        }
    }
}
