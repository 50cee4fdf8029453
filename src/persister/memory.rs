//! In-memory persister for development and testing
//!
//! Keeps stored events in a `Vec` and supports failure injection so tests
//! can exercise the store-error path without a real backend.

use super::Persister;
use crate::error::{StoreError, StoreResult};
use crate::types::Event;
use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

/// In-memory persister
///
/// Clones share the same storage, so a test can keep a handle while the
/// coordinator owns another.
#[derive(Clone, Default)]
pub struct MemoryPersister {
    inner: Arc<Inner>,
}

#[derive(Default)]
struct Inner {
    events: RwLock<Vec<Event>>,
    failing_ids: RwLock<HashSet<String>>,
    fail_all: AtomicBool,
    attempts: AtomicUsize,
    delay: Option<Duration>,
    max_events: usize,
}

impl MemoryPersister {
    /// Create an unbounded in-memory persister
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a persister that keeps at most `max_events` (oldest dropped)
    ///
    /// `0` means unbounded.
    pub fn with_capacity(max_events: usize) -> Self {
        Self {
            inner: Arc::new(Inner {
                max_events,
                ..Default::default()
            }),
        }
    }

    /// Create a persister whose every store call first waits `delay`
    pub fn with_delay(delay: Duration) -> Self {
        Self {
            inner: Arc::new(Inner {
                delay: Some(delay),
                ..Default::default()
            }),
        }
    }

    /// Make store calls for this event id fail
    pub async fn fail_event(&self, event_id: impl Into<String>) {
        self.inner.failing_ids.write().await.insert(event_id.into());
    }

    /// Make every store call fail (or stop failing)
    pub fn fail_all(&self, fail: bool) {
        self.inner.fail_all.store(fail, Ordering::SeqCst);
    }

    /// Events stored so far, in store order
    pub async fn stored(&self) -> Vec<Event> {
        self.inner.events.read().await.clone()
    }

    /// Number of events currently held
    pub async fn count(&self) -> usize {
        self.inner.events.read().await.len()
    }

    /// Number of store calls made, successful or not
    pub fn attempts(&self) -> usize {
        self.inner.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Persister for MemoryPersister {
    async fn store(&self, event: &Event) -> StoreResult<()> {
        self.inner.attempts.fetch_add(1, Ordering::SeqCst);

        if let Some(delay) = self.inner.delay {
            tokio::time::sleep(delay).await;
        }

        if self.inner.fail_all.load(Ordering::SeqCst)
            || self.inner.failing_ids.read().await.contains(&event.event_id)
        {
            return Err(StoreError::Rejected(format!(
                "injected failure for event {}",
                event.event_id
            )));
        }

        let mut events = self.inner.events.write().await;
        events.push(event.clone());

        if self.inner.max_events > 0 && events.len() > self.inner.max_events {
            let drain_count = events.len() - self.inner.max_events;
            events.drain(..drain_count);
        }

        tracing::debug!(event_id = %event.event_id, "Event stored in memory");
        Ok(())
    }

    fn name(&self) -> &str {
        "memory"
    }
}
