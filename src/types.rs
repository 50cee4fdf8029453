//! Core types for the event-processor pipeline
//!
//! All types use camelCase JSON serialization for wire compatibility.
//! The queue envelope types follow the SQS batch shapes
//! (`Records` in, `batchItemFailures` out).

use serde::{Deserialize, Serialize};
use std::fmt;

/// Recognized event kinds
///
/// The set is closed: anything else is rejected at validation time, so an
/// [`Event`] can never carry an unknown kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EventKind {
    MonitoringAlert,
    Notification,
    Transaction,
}

impl EventKind {
    /// Every recognized kind, in declaration order
    pub const ALL: [EventKind; 3] = [
        EventKind::MonitoringAlert,
        EventKind::Notification,
        EventKind::Transaction,
    ];

    /// Wire name of this kind
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::MonitoringAlert => "monitoringAlert",
            EventKind::Notification => "notification",
            EventKind::Transaction => "transaction",
        }
    }

    /// Look up a kind by its exact wire name (case-sensitive)
    pub fn from_wire(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == value)
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A validated event
///
/// Only the validator constructs these from untrusted input; an `Event`
/// always has non-empty ids, a recognized kind and an object payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    /// Producer-assigned event identifier (not unique-checked)
    pub event_id: String,

    /// Identifier of the producing client
    pub client_id: String,

    /// Event kind
    #[serde(rename = "type")]
    pub kind: EventKind,

    /// Event payload, possibly empty
    pub data: serde_json::Map<String, serde_json::Value>,
}

impl Event {
    /// Create an event with an empty payload
    pub fn new(
        event_id: impl Into<String>,
        client_id: impl Into<String>,
        kind: EventKind,
    ) -> Self {
        Self {
            event_id: event_id.into(),
            client_id: client_id.into(),
            kind,
            data: serde_json::Map::new(),
        }
    }

    /// Add a payload entry
    pub fn with_data(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.data.insert(key.into(), value);
        self
    }
}

/// One message as delivered by the queue transport
///
/// Owned by the transport; the pipeline only reads it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawMessage {
    /// Transport-assigned message identifier
    pub message_id: String,

    /// Unparsed message body
    #[serde(default)]
    pub body: String,

    /// Originating queue or source ARN, used for logging only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_source: Option<String>,
}

impl RawMessage {
    pub fn new(message_id: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            message_id: message_id.into(),
            body: body.into(),
            event_source: None,
        }
    }
}

/// Inbound batch envelope
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchEnvelope {
    #[serde(rename = "Records", default)]
    pub records: Vec<RawMessage>,
}

/// A single message the transport must redeliver
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchItemFailure {
    pub item_identifier: String,
}

/// Partial-failure report for one batch
///
/// Lists failed message ids in input order. Messages absent from the list
/// are considered consumed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchOutcome {
    pub batch_item_failures: Vec<BatchItemFailure>,
}

impl BatchOutcome {
    /// Record a failed message
    pub(crate) fn push(&mut self, message_id: impl Into<String>) {
        self.batch_item_failures.push(BatchItemFailure {
            item_identifier: message_id.into(),
        });
    }

    /// Failed message ids in input order
    pub fn failed_ids(&self) -> Vec<&str> {
        self.batch_item_failures
            .iter()
            .map(|f| f.item_identifier.as_str())
            .collect()
    }

    /// Whether the given message id is marked for redelivery
    pub fn contains(&self, message_id: &str) -> bool {
        self.batch_item_failures
            .iter()
            .any(|f| f.item_identifier == message_id)
    }

    pub fn len(&self) -> usize {
        self.batch_item_failures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.batch_item_failures.is_empty()
    }
}
