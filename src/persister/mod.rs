//! Persister trait: the storage capability behind the pipeline
//!
//! The coordinator hands each validated event to a `Persister` and treats
//! any error as "redeliver this message". Backends (in-memory, JSON-lines
//! file, NATS JetStream) implement the trait; tests substitute the
//! in-memory one with failure injection.

use crate::error::StoreResult;
use crate::types::Event;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub mod file;
pub mod memory;
pub mod nats;

/// Durable storage for validated events
///
/// One call stores one event. Implementations must not deduplicate:
/// redelivery after a failure may store the same event twice.
#[async_trait]
pub trait Persister: Send + Sync {
    /// Durably store one event
    async fn store(&self, event: &Event) -> StoreResult<()>;

    /// Backend name (e.g., "memory", "file", "nats")
    fn name(&self) -> &str;
}

#[async_trait]
impl<P: Persister + ?Sized> Persister for std::sync::Arc<P> {
    async fn store(&self, event: &Event) -> StoreResult<()> {
        (**self).store(event).await
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

#[async_trait]
impl<P: Persister + ?Sized> Persister for Box<P> {
    async fn store(&self, event: &Event) -> StoreResult<()> {
        (**self).store(event).await
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

/// Record written by the file and NATS backends
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredRecord {
    /// The stored event
    #[serde(flatten)]
    pub event: Event,

    /// When the record was written
    pub stored_at: DateTime<Utc>,
}

impl StoredRecord {
    /// Stamp an event with the current time
    pub fn now(event: &Event) -> Self {
        Self {
            event: event.clone(),
            stored_at: Utc::now(),
        }
    }
}
