//! NATS JetStream persister
//!
//! Stores each event as a JSON `StoredRecord` on a JetStream stream. A store
//! succeeds only once JetStream has acked the publish. No `Nats-Msg-Id`
//! header is set, so redelivered events are stored again.

mod client;
mod config;

pub use client::NatsClient;
pub use config::{NatsStoreConfig, StorageType};

use super::{Persister, StoredRecord};
use crate::error::StoreResult;
use crate::types::Event;
use async_trait::async_trait;

/// JetStream-backed persister
pub struct NatsPersister {
    client: NatsClient,
}

impl NatsPersister {
    /// Connect to NATS and initialize the JetStream stream
    pub async fn connect(config: NatsStoreConfig) -> StoreResult<Self> {
        let client = NatsClient::connect(config).await?;
        Ok(Self { client })
    }

    /// Get the underlying NATS client for advanced usage
    pub fn client(&self) -> &NatsClient {
        &self.client
    }
}

#[async_trait]
impl Persister for NatsPersister {
    async fn store(&self, event: &Event) -> StoreResult<()> {
        let subject = self
            .client
            .config()
            .event_subject(event.kind.as_str(), &event.client_id);
        let payload = serde_json::to_vec(&StoredRecord::now(event))?;

        let sequence = self.client.publish(subject.clone(), payload.into()).await?;

        tracing::debug!(
            event_id = %event.event_id,
            subject = %subject,
            sequence,
            "Event published"
        );
        Ok(())
    }

    fn name(&self) -> &str {
        "nats"
    }
}
