//! Error types for event-processor

use thiserror::Error;

/// Why a raw message body was not accepted as an [`Event`](crate::Event)
///
/// Checks run in a fixed order and the first failing one wins, so each
/// body maps to exactly one rejection.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Rejection {
    /// Body is empty or whitespace-only
    #[error("empty message body")]
    EmptyBody,

    /// Body does not decode as an event record
    #[error("failed to unmarshal message body: {0}")]
    MalformedBody(String),

    /// A required field is absent, null or empty
    #[error("missing required event field: {0}")]
    MissingRequiredField(&'static str),

    /// `type` is outside the recognized event kinds
    #[error("unsupported event type: {0}")]
    UnsupportedEventType(String),
}

impl Rejection {
    /// Stable label used as a structured log field
    pub fn kind(&self) -> &'static str {
        match self {
            Rejection::EmptyBody => "empty_body",
            Rejection::MalformedBody(_) => "malformed_body",
            Rejection::MissingRequiredField(_) => "missing_required_field",
            Rejection::UnsupportedEventType(_) => "unsupported_event_type",
        }
    }
}

/// Failure to durably store one event
///
/// Transient and permanent causes are not distinguished; the coordinator
/// treats every variant as "redeliver this message".
#[derive(Debug, Error)]
pub enum StoreError {
    /// Backend connection failure
    #[error("Connection error: {0}")]
    Connection(String),

    /// Publish to the backing stream failed
    #[error("Failed to publish event to subject '{subject}': {reason}")]
    Publish {
        subject: String,
        reason: String,
    },

    /// Stream creation or lookup failed
    #[error("Stream error: {0}")]
    Stream(String),

    /// Local I/O failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Record could not be encoded
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Backend did not answer in time
    #[error("Operation timed out: {0}")]
    Timeout(String),

    /// Backend refused the record
    #[error("Store rejected event: {0}")]
    Rejected(String),
}

/// Errors raised while bootstrapping the processor
///
/// Message-level problems never surface here; they end up in the
/// batch outcome instead.
#[derive(Debug, Error)]
pub enum ProcessorError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Reading input or configuration failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Batch envelope could not be decoded or the response encoded
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The configured store could not be initialized
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Result type alias for processor bootstrap operations
pub type Result<T> = std::result::Result<T, ProcessorError>;

/// Result type alias for persister operations
pub type StoreResult<T> = std::result::Result<T, StoreError>;
