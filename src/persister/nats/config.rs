//! NATS JetStream store configuration

use async_nats::jetstream;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// JetStream storage backend
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StorageType {
    #[default]
    File,
    Memory,
}

/// Connection and stream settings for the NATS persister
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NatsStoreConfig {
    /// Server URL
    pub url: String,

    /// Optional auth token
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,

    /// JetStream stream that holds stored events
    pub stream_name: String,

    /// Subject prefix; events land on `<prefix>.<type>.<clientId>`
    pub subject_prefix: String,

    /// Stream storage backend
    pub storage: StorageType,

    /// Max messages kept in the stream (-1 = unlimited)
    pub max_events: i64,

    /// Max message age in seconds (0 = unlimited)
    pub max_age_secs: u64,

    /// Max stream size in bytes (-1 = unlimited)
    pub max_bytes: i64,

    pub connect_timeout_secs: u64,

    pub request_timeout_secs: u64,
}

impl Default for NatsStoreConfig {
    fn default() -> Self {
        Self {
            url: "nats://127.0.0.1:4222".to_string(),
            token: None,
            stream_name: "EVENTS".to_string(),
            subject_prefix: "events".to_string(),
            storage: StorageType::File,
            max_events: -1,
            max_age_secs: 0,
            max_bytes: -1,
            connect_timeout_secs: 5,
            request_timeout_secs: 10,
        }
    }
}

impl NatsStoreConfig {
    /// Subject for one stored event
    ///
    /// Dots in the client id would add subject tokens, so they are replaced.
    pub fn event_subject(&self, kind: &str, client_id: &str) -> String {
        format!(
            "{}.{}.{}",
            self.subject_prefix,
            kind,
            sanitize_token(client_id)
        )
    }

    /// Subjects bound to the stream
    pub fn stream_subjects(&self) -> Vec<String> {
        vec![format!("{}.>", self.subject_prefix)]
    }

    pub(crate) fn connect_options(&self) -> async_nats::ConnectOptions {
        let opts = async_nats::ConnectOptions::new()
            .connection_timeout(Duration::from_secs(self.connect_timeout_secs))
            .request_timeout(Some(Duration::from_secs(self.request_timeout_secs)));
        match &self.token {
            Some(token) => opts.token(token.clone()),
            None => opts,
        }
    }

    /// Stream definition used when the stream has to be created
    ///
    /// Retention is limits-based: records stay until `max_events`,
    /// `max_bytes` or `max_age_secs` evicts them, never on consumer ack.
    pub(crate) fn stream_config(&self) -> jetstream::stream::Config {
        jetstream::stream::Config {
            name: self.stream_name.clone(),
            subjects: self.stream_subjects(),
            storage: self.storage.into(),
            retention: jetstream::stream::RetentionPolicy::Limits,
            max_messages: self.max_events,
            max_bytes: self.max_bytes,
            max_age: Duration::from_secs(self.max_age_secs),
            ..Default::default()
        }
    }
}

impl From<StorageType> for jetstream::stream::StorageType {
    fn from(storage: StorageType) -> Self {
        match storage {
            StorageType::File => Self::File,
            StorageType::Memory => Self::Memory,
        }
    }
}

fn sanitize_token(token: &str) -> String {
    token
        .chars()
        .map(|c| match c {
            '.' | '*' | '>' => '_',
            c if c.is_whitespace() => '_',
            c => c,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = NatsStoreConfig::default();
        assert_eq!(config.stream_name, "EVENTS");
        assert_eq!(config.stream_subjects(), vec!["events.>"]);
        assert_eq!(config.storage, StorageType::File);
    }

    #[test]
    fn test_event_subject() {
        let config = NatsStoreConfig::default();
        assert_eq!(
            config.event_subject("notification", "client-1"),
            "events.notification.client-1"
        );
    }

    #[test]
    fn test_event_subject_sanitizes_client_id() {
        let config = NatsStoreConfig {
            subject_prefix: "ingest".to_string(),
            ..Default::default()
        };
        assert_eq!(
            config.event_subject("transaction", "acme.eu *>x y"),
            "ingest.transaction.acme_eu___x_y"
        );
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: NatsStoreConfig =
            serde_json::from_str(r#"{"url":"nats://nats:4222","storage":"memory"}"#).unwrap();
        assert_eq!(config.url, "nats://nats:4222");
        assert_eq!(config.storage, StorageType::Memory);
        assert_eq!(config.stream_name, "EVENTS");
    }

    #[test]
    fn test_stream_config_carries_limits() {
        let config = NatsStoreConfig {
            stream_name: "AUDIT".to_string(),
            subject_prefix: "audit".to_string(),
            storage: StorageType::Memory,
            max_events: 500,
            max_age_secs: 3600,
            ..Default::default()
        };
        let stream = config.stream_config();

        assert_eq!(stream.name, "AUDIT");
        assert_eq!(stream.subjects, vec!["audit.>"]);
        assert!(matches!(stream.storage, jetstream::stream::StorageType::Memory));
        assert!(matches!(
            stream.retention,
            jetstream::stream::RetentionPolicy::Limits
        ));
        assert_eq!(stream.max_messages, 500);
        assert_eq!(stream.max_bytes, -1);
        assert_eq!(stream.max_age, Duration::from_secs(3600));
    }
}
