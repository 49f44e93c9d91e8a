//! Request adapter
//!
//! Turns either a host-embedded payload or a standard HTTP request into one
//! [`NormalizedRequest`]. The host payload always wins when it carries
//! anything; the two sources are never merged.

use crate::types::request::HOST_CONTENT_TYPE;
use crate::types::{Fields, NormalizedRequest, RequestSource, TransportInput};
use serde_json::Value;

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Adapt one inbound call.
///
/// `host_slot` is always emptied, so a payload can be consumed at most once.
/// An empty host payload falls through to the transport input.
pub fn adapt(host_slot: &mut Option<Fields>, transport: TransportInput) -> NormalizedRequest {
    if let Some(payload) = host_slot.take() {
        if !payload.is_empty() {
            tracing::debug!("Using host payload with {} field(s)", payload.len());
            return NormalizedRequest::new(payload, HOST_CONTENT_TYPE, RequestSource::Host);
        }
        tracing::debug!("Host payload was empty; falling back to transport input");
    }

    from_transport(transport)
}

/// Adapt a plain HTTP request with no host involvement.
pub fn from_transport(transport: TransportInput) -> NormalizedRequest {
    let mut fields = decode_form(transport.query_string.as_bytes(), "query string");
    fields.extend(decode_body(&transport.content_type, &transport.body));

    let content_type = if transport.content_type.is_empty() {
        FORM_CONTENT_TYPE.to_string()
    } else {
        transport.content_type
    };

    NormalizedRequest::new(fields, content_type, RequestSource::Transport)
}

/// Flatten a JSON object into string fields. Nulls are dropped, scalars are
/// rendered as text and nested values keep their JSON encoding.
pub fn fields_from_json(map: serde_json::Map<String, Value>) -> Fields {
    map.into_iter()
        .filter_map(|(key, value)| {
            let value = match value {
                Value::Null => return None,
                Value::String(s) => s,
                Value::Bool(b) => b.to_string(),
                Value::Number(n) => n.to_string(),
                nested => nested.to_string(),
            };
            Some((key, value))
        })
        .collect()
}

fn decode_body(content_type: &str, body: &[u8]) -> Fields {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Fields::new();
    }

    let mime = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    if mime == "application/json" || mime.ends_with("+json") {
        match serde_json::from_slice::<Value>(body) {
            Ok(Value::Object(map)) => fields_from_json(map),
            Ok(other) => {
                tracing::warn!("Ignoring JSON body that is not an object ({})", json_type(&other));
                Fields::new()
            }
            Err(e) => {
                tracing::warn!("Ignoring undecodable JSON body: {}", e);
                Fields::new()
            }
        }
    } else {
        decode_form(body, "form body")
    }
}

fn decode_form(input: &[u8], what: &str) -> Fields {
    if input.is_empty() {
        return Fields::new();
    }

    match serde_urlencoded::from_bytes::<Vec<(String, String)>>(input) {
        Ok(pairs) => pairs.into_iter().collect(),
        Err(e) => {
            tracing::warn!("Ignoring undecodable {}: {}", what, e);
            Fields::new()
        }
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
