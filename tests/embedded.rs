mod common;

use chatbot_bridge::services::HttpBackend;
use chatbot_bridge::types::{Fields, TransportInput};
use chatbot_bridge::{AppState, Bridge};
use common::ScriptedBackend;
use serde_json::{json, Value};
use std::io::Write;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

fn payload(pairs: &[(&str, &str)]) -> Fields {
    pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
}

#[tokio::test]
async fn test_embedded_call_returns_raw_json() {
    let dir = TempDir::new().unwrap();
    let bridge = Bridge::new(common::state(dir.path(), "", ScriptedBackend::replying("Hello from the shop")));

    let raw = bridge.handle_embedded(payload(&[("query", "hello")])).await;

    let body: Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(body, json!({"success": true, "reply": "Hello from the shop"}));
}

#[tokio::test]
async fn test_host_payload_wins_and_slot_is_cleared() {
    let dir = TempDir::new().unwrap();
    let backend = ScriptedBackend::replying("ok");
    let bridge = Bridge::new(common::state(dir.path(), "", backend.clone()));

    let mut slot = Some(payload(&[("query", "from host")]));
    let transport = TransportInput::json(&json!({"query": "from transport"}));
    bridge.handle(&mut slot, transport, |_| {}).await;

    assert!(slot.is_none());
    assert_eq!(backend.seen()[0].text, "from host");

    // A second call with the now-empty slot uses transport input.
    bridge
        .handle(&mut slot, TransportInput::json(&json!({"query": "second"})), |_| {})
        .await;
    assert_eq!(backend.seen()[1].text, "second");
}

#[tokio::test]
async fn test_incidental_output_never_reaches_host() {
    let dir = TempDir::new().unwrap();
    let bridge = Bridge::new(common::state(dir.path(), "", ScriptedBackend::replying("clean")));

    let mut slot = Some(payload(&[("query", "hi")]));
    let raw = bridge
        .handle(&mut slot, TransportInput::default(), |out| {
            write!(out, "<b>Deprecated:</b> function create_function() is deprecated").unwrap();
        })
        .await;

    assert!(!raw.contains("Deprecated"));
    assert_eq!(serde_json::from_str::<Value>(&raw).unwrap()["reply"], "clean");
}

#[tokio::test]
async fn test_empty_payload_yields_structured_validation_error() {
    let dir = TempDir::new().unwrap();
    let bridge = Bridge::new(common::state(dir.path(), "", ScriptedBackend::replying("unused")));

    let raw = bridge.handle_embedded(Fields::new()).await;
    let body: Value = serde_json::from_str(&raw).unwrap();

    assert_eq!(body["success"], false);
    assert!(body["message"].is_string());
}

#[tokio::test]
async fn test_panic_is_answered_with_structured_error() {
    let dir = TempDir::new().unwrap();
    let bridge = Bridge::new(common::state(dir.path(), "", ScriptedBackend::panicking()));

    let raw = bridge.handle_embedded(payload(&[("query", "hi")])).await;
    let body: Value = serde_json::from_str(&raw).unwrap();

    assert_eq!(body, json!({"success": false, "message": "Server Error"}));
}

#[tokio::test]
async fn test_upstream_decline_passes_through_unchanged() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/query")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"success": false, "message": "Order #1234 was not found"}"#)
        .create_async()
        .await;

    let dir = TempDir::new().unwrap();
    let backend = HttpBackend::new(format!("{}/query", server.url()), Duration::from_secs(5)).unwrap();
    let state = AppState::with_backend(common::config(dir.path(), ""), Arc::new(backend)).unwrap();
    let bridge = Bridge::new(state);

    let raw = bridge.handle_embedded(payload(&[("query", "where is order 1234")])).await;
    let body: Value = serde_json::from_str(&raw).unwrap();

    assert_eq!(body, json!({"success": false, "message": "Order #1234 was not found"}));
}
