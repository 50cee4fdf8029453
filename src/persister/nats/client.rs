//! NATS JetStream client: connect, ensure stream, publish records

use super::config::NatsStoreConfig;
use crate::error::{StoreError, StoreResult};
use async_nats::jetstream;
use std::sync::Arc;
use std::time::Duration;

/// NATS JetStream client
///
/// Owns the connection and makes sure the target stream exists before the
/// first publish.
pub struct NatsClient {
    /// NATS client connection
    client: async_nats::Client,

    /// JetStream context
    jetstream: jetstream::Context,

    config: Arc<NatsStoreConfig>,
}

impl NatsClient {
    /// Connect to NATS and initialize the JetStream stream
    pub async fn connect(config: NatsStoreConfig) -> StoreResult<Self> {
        let client = config
            .connect_options()
            .connect(&config.url)
            .await
            .map_err(|e| StoreError::Connection(format!("{}: {}", config.url, e)))?;

        tracing::info!(url = %config.url, "Connected to NATS");

        // Reuses an existing stream as-is; only a missing one is created
        let jetstream = jetstream::new(client.clone());
        let stream = jetstream
            .get_or_create_stream(config.stream_config())
            .await
            .map_err(|e| {
                StoreError::Stream(format!("stream '{}' unavailable: {}", config.stream_name, e))
            })?;

        tracing::info!(
            stream = %stream.cached_info().config.name,
            subjects = ?stream.cached_info().config.subjects,
            "Event stream ready"
        );

        Ok(Self {
            client,
            jetstream,
            config: Arc::new(config),
        })
    }

    /// Publish a payload and wait for the JetStream ack, returning its sequence
    pub async fn publish(&self, subject: String, payload: bytes::Bytes) -> StoreResult<u64> {
        let ack_fut = self
            .jetstream
            .publish(subject.clone(), payload)
            .await
            .map_err(|e| StoreError::Publish {
                subject: subject.clone(),
                reason: e.to_string(),
            })?;

        let timeout_secs = self.config.request_timeout_secs;
        let ack = tokio::time::timeout(Duration::from_secs(timeout_secs), ack_fut)
            .await
            .map_err(|_| {
                StoreError::Timeout(format!(
                    "Publish ack timed out after {}s for subject '{}'",
                    timeout_secs, subject
                ))
            })?
            .map_err(|e| StoreError::Publish {
                subject: subject.clone(),
                reason: format!("ack failed: {}", e),
            })?;

        Ok(ack.sequence)
    }

    /// Get the underlying NATS client
    pub fn nats_client(&self) -> &async_nats::Client {
        &self.client
    }

    /// Get the configuration
    pub fn config(&self) -> &NatsStoreConfig {
        &self.config
    }
}
