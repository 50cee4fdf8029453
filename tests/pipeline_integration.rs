//! Pipeline integration tests
//!
//! End-to-end tests exercising envelope decode, validation, persistence
//! and the partial-failure response through the public API.

use event_processor::{
    validate, BatchCoordinator, BatchEnvelope, BatchOutcome, Event, EventKind, FilePersister,
    MemoryPersister, RawMessage, Rejection, StoredRecord,
};
use std::collections::HashSet;
use std::sync::Arc;

fn message(id: &str, body: &str) -> RawMessage {
    RawMessage::new(id, body)
}

fn event_body(event_id: &str, client_id: &str, kind: &str) -> String {
    serde_json::json!({
        "eventId": event_id,
        "clientId": client_id,
        "type": kind,
        "data": {"value": 42, "nested": {"ok": true}}
    })
    .to_string()
}

// ─── Scenarios ───────────────────────────────────────────────────

#[tokio::test]
async fn test_scenario_valid_notification_is_consumed() {
    let persister = MemoryPersister::new();
    let coordinator = BatchCoordinator::new(persister.clone());

    let body = r#"{"eventId":"1","clientId":"client-1","type":"notification","data":{"key":"value"}}"#;
    let outcome = coordinator.process_batch(&[message("msg-1", body)]).await;

    assert!(outcome.is_empty());
    assert_eq!(persister.attempts(), 1);
    assert_eq!(persister.stored().await, vec![validate(body).unwrap()]);
}

#[tokio::test]
async fn test_scenario_empty_body_is_redelivered() {
    let persister = MemoryPersister::new();
    let coordinator = BatchCoordinator::new(persister.clone());

    assert_eq!(validate(""), Err(Rejection::EmptyBody));
    let outcome = coordinator.process_batch(&[message("msg-1", "")]).await;

    assert_eq!(outcome.failed_ids(), vec!["msg-1"]);
    assert_eq!(persister.attempts(), 0);
}

#[tokio::test]
async fn test_scenario_unsupported_type_is_redelivered() {
    let persister = MemoryPersister::new();
    let coordinator = BatchCoordinator::new(persister.clone());

    let body = event_body("1", "client-1", "unsupported");
    assert_eq!(
        validate(&body),
        Err(Rejection::UnsupportedEventType("unsupported".to_string()))
    );

    let outcome = coordinator.process_batch(&[message("msg-1", &body)]).await;
    assert_eq!(outcome.failed_ids(), vec!["msg-1"]);
    assert_eq!(persister.attempts(), 0);
}

#[tokio::test]
async fn test_scenario_three_messages_middle_invalid() {
    let persister = MemoryPersister::new();
    let coordinator = BatchCoordinator::new(persister.clone());

    let batch = vec![
        message("msg-1", &event_body("1", "client-1", "notification")),
        message("msg-2", &event_body("2", "client-2", "unsupported")),
        message("msg-3", &event_body("3", "client-3", "transaction")),
    ];

    let outcome = coordinator.process_batch(&batch).await;

    assert_eq!(outcome.failed_ids(), vec!["msg-2"]);
    assert_eq!(persister.count().await, 2);
}

#[tokio::test]
async fn test_scenario_store_failure_is_redelivered() {
    let persister = MemoryPersister::new();
    persister.fail_event("1").await;
    let coordinator = BatchCoordinator::new(persister.clone());

    let body = event_body("1", "client-1", "transaction");
    assert!(validate(&body).is_ok());

    let outcome = coordinator.process_batch(&[message("msg-1", &body)]).await;
    assert_eq!(outcome.failed_ids(), vec!["msg-1"]);
}

// ─── Envelope & Response ─────────────────────────────────────────

#[tokio::test]
async fn test_sqs_envelope_to_response() {
    let envelope = serde_json::json!({
        "Records": [
            {"messageId": "a", "body": event_body("1", "c1", "monitoringAlert"), "eventSource": "aws:sqs"},
            {"messageId": "b", "body": "{\"eventId\":\"2\""},
            {"messageId": "c", "body": event_body("3", "c3", "notification"), "eventSource": "aws:sqs"},
            {"messageId": "d", "body": "   "}
        ]
    });
    let envelope: BatchEnvelope = serde_json::from_value(envelope).unwrap();

    let coordinator = BatchCoordinator::new(MemoryPersister::new());
    let outcome = coordinator.process_batch(&envelope.records).await;

    let response = serde_json::to_value(&outcome).unwrap();
    assert_eq!(
        response,
        serde_json::json!({
            "batchItemFailures": [{"itemIdentifier": "b"}, {"itemIdentifier": "d"}]
        })
    );

    let parsed: BatchOutcome = serde_json::from_value(response).unwrap();
    assert_eq!(parsed, outcome);
}

// ─── Persisters ──────────────────────────────────────────────────

#[tokio::test]
async fn test_file_persister_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("store").join("events.jsonl");
    let coordinator = BatchCoordinator::new(FilePersister::new(&path)).with_concurrency(3);

    let batch = vec![
        message("m1", &event_body("1", "c1", "notification")),
        message("m2", "garbage"),
        message("m3", &event_body("3", "c3", "transaction")),
        message("m4", &event_body("4", "c4", "monitoringAlert")),
    ];
    let outcome = coordinator.process_batch(&batch).await;
    assert_eq!(outcome.failed_ids(), vec!["m2"]);

    let records: Vec<StoredRecord> = std::fs::read_to_string(&path)
        .unwrap()
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();
    let ids: HashSet<String> = records.into_iter().map(|r| r.event.event_id).collect();
    assert_eq!(ids, HashSet::from(["1".to_string(), "3".to_string(), "4".to_string()]));
}

#[tokio::test]
async fn test_redelivery_stores_duplicates() {
    let persister = MemoryPersister::new();
    let coordinator = BatchCoordinator::new(persister.clone());

    let batch = vec![message("msg-1", &event_body("1", "c1", "notification"))];
    assert!(coordinator.process_batch(&batch).await.is_empty());
    assert!(coordinator.process_batch(&batch).await.is_empty());

    // At-least-once: no deduplication by eventId
    assert_eq!(persister.count().await, 2);
}

#[tokio::test]
async fn test_retry_after_transient_store_failure() {
    let persister = MemoryPersister::new();
    let coordinator = BatchCoordinator::new(persister.clone());
    let batch = vec![
        message("msg-1", &event_body("1", "c1", "notification")),
        message("msg-2", &event_body("2", "c2", "notification")),
    ];

    persister.fail_all(true);
    let first = coordinator.process_batch(&batch).await;
    assert_eq!(first.failed_ids(), vec!["msg-1", "msg-2"]);

    persister.fail_all(false);
    let redelivered: Vec<RawMessage> = batch
        .iter()
        .filter(|m| first.contains(&m.message_id))
        .cloned()
        .collect();
    assert!(coordinator.process_batch(&redelivered).await.is_empty());
    assert_eq!(persister.count().await, 2);
}

// ─── Concurrency ─────────────────────────────────────────────────

#[tokio::test]
async fn test_large_mixed_batch_concurrent_matches_sequential() {
    let bodies: Vec<(String, String)> = (0..200)
        .map(|i| {
            let id = uuid::Uuid::new_v4().to_string();
            let body = match i % 5 {
                0 => String::new(),
                1 => event_body(&id, "client-1", "bogus"),
                2 => r#"{"eventId":"x","clientId":"c","type":"notification"}"#.to_string(),
                3 => event_body(&id, "client-2", "transaction"),
                _ => event_body(&id, "client-3", "monitoringAlert"),
            };
            (format!("msg-{i}"), body)
        })
        .collect();
    let batch: Vec<RawMessage> = bodies.iter().map(|(id, b)| message(id, b)).collect();

    let sequential = BatchCoordinator::new(MemoryPersister::new())
        .process_batch(&batch)
        .await;
    let concurrent_persister = MemoryPersister::new();
    let concurrent = BatchCoordinator::new(concurrent_persister.clone())
        .with_concurrency(16)
        .process_batch(&batch)
        .await;

    assert_eq!(sequential, concurrent);
    assert_eq!(concurrent.len(), 120);
    assert_eq!(concurrent_persister.count().await, 80);
}

#[tokio::test]
async fn test_shared_coordinator_across_batches() {
    let persister = MemoryPersister::new();
    let coordinator = Arc::new(BatchCoordinator::new(persister.clone()));

    let mut handles = Vec::new();
    for b in 0..8 {
        let coordinator = coordinator.clone();
        handles.push(tokio::spawn(async move {
            let batch: Vec<RawMessage> = (0..10)
                .map(|i| {
                    let body = if i == 9 {
                        String::new()
                    } else {
                        event_body(&format!("{b}-{i}"), "client", "notification")
                    };
                    RawMessage::new(format!("b{b}-m{i}"), body)
                })
                .collect();
            coordinator.process_batch(&batch).await
        }));
    }

    for (b, handle) in handles.into_iter().enumerate() {
        let outcome = handle.await.unwrap();
        assert_eq!(outcome.failed_ids(), vec![format!("b{b}-m9")]);
    }
    assert_eq!(persister.count().await, 72);
}

#[test]
fn test_event_kind_boundary() {
    let event = validate(&event_body("1", "c", "monitoringAlert")).unwrap();
    assert_eq!(event.kind, EventKind::MonitoringAlert);
    assert_eq!(
        event,
        Event::new("1", "c", EventKind::MonitoringAlert)
            .with_data("value", serde_json::json!(42))
            .with_data("nested", serde_json::json!({"ok": true}))
    );
}
