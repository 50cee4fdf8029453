//! Message validation: raw body in, typed event or rejection out
//!
//! `validate` is pure. It performs no I/O and does not log, so identical
//! input always yields an identical result.

use crate::error::Rejection;
use crate::types::{Event, EventKind};
use serde_json::{Map, Value};

/// Validate a raw message body
///
/// Checks, first failure wins:
/// 1. empty or whitespace-only body
/// 2. body is not a JSON object of the event shape
/// 3. `eventId`, `clientId`, `type` missing or empty, or `data` missing/null
/// 4. `type` outside [`EventKind`]
///
/// A literal `null` body decodes as an object with no fields. A repeated key
/// keeps its last value.
pub fn validate(raw_body: &str) -> Result<Event, Rejection> {
    if raw_body.trim().is_empty() {
        return Err(Rejection::EmptyBody);
    }

    let mut object = serde_json::from_str::<Option<Map<String, Value>>>(raw_body)
        .map_err(|e| Rejection::MalformedBody(e.to_string()))?
        .unwrap_or_default();

    // Shape errors on any field take precedence over missing fields
    let event_id = take_string(&mut object, "eventId")?;
    let client_id = take_string(&mut object, "clientId")?;
    let kind = take_string(&mut object, "type")?;
    let data = take_object(&mut object, "data")?;

    let event_id = required(event_id, "eventId")?;
    let client_id = required(client_id, "clientId")?;
    let kind = required(kind, "type")?;
    let data = data.ok_or(Rejection::MissingRequiredField("data"))?;

    let kind = EventKind::from_wire(&kind).ok_or(Rejection::UnsupportedEventType(kind))?;

    Ok(Event {
        event_id,
        client_id,
        kind,
        data,
    })
}

fn take_string(
    object: &mut Map<String, Value>,
    field: &str,
) -> Result<Option<String>, Rejection> {
    match object.remove(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(other) => Err(shape_mismatch(field, "a string", &other)),
    }
}

fn take_object(
    object: &mut Map<String, Value>,
    field: &str,
) -> Result<Option<Map<String, Value>>, Rejection> {
    match object.remove(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Object(m)) => Ok(Some(m)),
        Some(other) => Err(shape_mismatch(field, "an object", &other)),
    }
}

fn shape_mismatch(field: &str, expected: &str, found: &Value) -> Rejection {
    let found = match found {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    };
    Rejection::MalformedBody(format!("field `{field}`: expected {expected}, found {found}"))
}

fn required(value: Option<String>, field: &'static str) -> Result<String, Rejection> {
    match value {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(Rejection::MissingRequiredField(field)),
    }
}
