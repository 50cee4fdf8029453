//! # event-processor
//!
//! Batch validation and partial-failure reporting for queue-delivered events.
//!
//! ## Overview
//!
//! A queue transport hands over a batch of raw messages. Each message is
//! validated and stored independently; the caller gets back only the ids
//! that must be redelivered. One poisoned message never causes its siblings
//! to be retried.
//!
//! ## Quick Start
//!
//! ```rust
//! use event_processor::{BatchCoordinator, MemoryPersister, RawMessage};
//!
//! # async fn example() {
//! let coordinator = BatchCoordinator::new(MemoryPersister::new());
//!
//! let batch = vec![
//!     RawMessage::new(
//!         "msg-1",
//!         r#"{"eventId":"1","clientId":"client-1","type":"notification","data":{}}"#,
//!     ),
//!     RawMessage::new("msg-2", ""),
//! ];
//!
//! let outcome = coordinator.process_batch(&batch).await;
//! assert_eq!(outcome.failed_ids(), vec!["msg-2"]);
//! # }
//! ```
//!
//! ## Persisters
//!
//! - **memory**: In-memory store for testing and single-process use
//! - **file**: JSON-lines file
//! - **nats**: NATS JetStream stream
//!
//! ## Architecture
//!
//! - **validate**: pure decode-and-check of one message body
//! - **Persister** trait: storage capability all backends implement
//! - **BatchCoordinator**: drives a batch and builds the partial-failure report
//! - **handle_envelope**: one invocation, envelope text to outcome
//!
//! Delivery is at-least-once: a message redelivered after a store failure
//! may be stored more than once.

pub mod config;
pub mod coordinator;
pub mod error;
pub mod invocation;
pub mod persister;
pub mod types;
pub mod validator;

// Re-export core types
pub use config::{ProcessorConfig, StoreConfig};
pub use coordinator::BatchCoordinator;
pub use error::{ProcessorError, Rejection, Result, StoreError, StoreResult};
pub use invocation::{handle_envelope, render_response};
pub use persister::{Persister, StoredRecord};
pub use types::{BatchEnvelope, BatchItemFailure, BatchOutcome, Event, EventKind, RawMessage};
pub use validator::validate;

// Re-export persisters for convenience
pub use persister::file::FilePersister;
pub use persister::memory::MemoryPersister;
pub use persister::nats::{NatsClient, NatsPersister, NatsStoreConfig, StorageType};
