//! Processor configuration
//!
//! Loaded from an optional JSON file, then overridden by environment
//! variables. Everything has a default, so an empty config runs the
//! pipeline sequentially against the in-memory store.

use crate::error::{ProcessorError, Result};
use crate::persister::file::FilePersister;
use crate::persister::memory::MemoryPersister;
use crate::persister::nats::{NatsPersister, NatsStoreConfig};
use crate::persister::Persister;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const ENV_CONCURRENCY: &str = "EVENT_PROCESSOR_CONCURRENCY";
pub const ENV_TIMEOUT_MS: &str = "EVENT_PROCESSOR_TIMEOUT_MS";
pub const ENV_STORE_PATH: &str = "EVENT_STORE_PATH";
pub const ENV_NATS_URL: &str = "EVENT_STORE_NATS_URL";
pub const ENV_NATS_STREAM: &str = "EVENT_STORE_STREAM";

/// Top-level processor settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProcessorConfig {
    /// Max messages of one batch processed at once
    pub concurrency: usize,

    /// Deadline for a whole batch invocation, in milliseconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invocation_timeout_ms: Option<u64>,

    /// Where validated events are stored
    pub store: StoreConfig,
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        Self {
            concurrency: 1,
            invocation_timeout_ms: None,
            store: StoreConfig::Memory,
        }
    }
}

/// Store backend selection
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum StoreConfig {
    #[default]
    Memory,
    File {
        path: PathBuf,
    },
    Nats(NatsStoreConfig),
}

impl ProcessorConfig {
    /// Load from an optional JSON file, then apply environment overrides
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok())
    }

    /// Parse a JSON config file
    pub fn from_file(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path).map_err(|e| {
            ProcessorError::Config(format!(
                "Failed to read config file {}: {}",
                path.display(),
                e
            ))
        })?;

        serde_json::from_str(&json).map_err(|e| {
            ProcessorError::Config(format!(
                "Failed to parse config file {}: {}",
                path.display(),
                e
            ))
        })
    }

    /// Apply overrides from an environment lookup
    ///
    /// `EVENT_STORE_NATS_URL` wins over `EVENT_STORE_PATH` when both are set.
    pub fn apply_env(mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        if let Some(value) = lookup(ENV_CONCURRENCY) {
            self.concurrency = parse_env(ENV_CONCURRENCY, &value)?;
        }

        if let Some(value) = lookup(ENV_TIMEOUT_MS) {
            self.invocation_timeout_ms = Some(parse_env(ENV_TIMEOUT_MS, &value)?);
        }

        if let Some(path) = lookup(ENV_STORE_PATH) {
            self.store = StoreConfig::File { path: path.into() };
        }

        if let Some(url) = lookup(ENV_NATS_URL) {
            let mut nats = match self.store {
                StoreConfig::Nats(existing) => existing,
                _ => NatsStoreConfig::default(),
            };
            nats.url = url;
            self.store = StoreConfig::Nats(nats);
        }

        if let Some(stream) = lookup(ENV_NATS_STREAM) {
            if let StoreConfig::Nats(nats) = &mut self.store {
                nats.stream_name = stream;
            }
        }

        self.validate()?;
        Ok(self)
    }

    /// Check settings for values the pipeline cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.concurrency == 0 {
            return Err(ProcessorError::Config(
                "concurrency must be >= 1".to_string(),
            ));
        }

        match &self.store {
            StoreConfig::Memory => {}
            StoreConfig::File { path } => {
                if path.as_os_str().is_empty() {
                    return Err(ProcessorError::Config(
                        "file store path cannot be empty".to_string(),
                    ));
                }
            }
            StoreConfig::Nats(nats) => {
                if nats.url.is_empty() {
                    return Err(ProcessorError::Config("NATS url cannot be empty".to_string()));
                }
                if nats.stream_name.is_empty() {
                    return Err(ProcessorError::Config(
                        "NATS stream name cannot be empty".to_string(),
                    ));
                }
                if nats.subject_prefix.is_empty() {
                    return Err(ProcessorError::Config(
                        "NATS subject prefix cannot be empty".to_string(),
                    ));
                }
            }
        }

        Ok(())
    }

    /// Invocation deadline as a duration
    pub fn invocation_timeout(&self) -> Option<Duration> {
        self.invocation_timeout_ms.map(Duration::from_millis)
    }
}

impl StoreConfig {
    /// Build the configured persister, connecting to remote backends
    pub async fn build(&self) -> Result<Box<dyn Persister>> {
        let persister: Box<dyn Persister> = match self {
            StoreConfig::Memory => Box::new(MemoryPersister::new()),
            StoreConfig::File { path } => Box::new(FilePersister::new(path.clone())),
            StoreConfig::Nats(nats) => Box::new(NatsPersister::connect(nats.clone()).await?),
        };

        tracing::info!(store = persister.name(), "Persister ready");
        Ok(persister)
    }
}

fn parse_env<T: std::str::FromStr>(key: &str, value: &str) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    value.trim().parse().map_err(|e: T::Err| {
        ProcessorError::Config(format!("Invalid value '{}' for {}: {}", value, key, e))
    })
}
