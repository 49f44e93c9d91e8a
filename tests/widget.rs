use chatbot_bridge::widget::{Author, ChatHeader, ChatWidget, QueryClient, FALLBACK_REPLY};
use mockito::Matcher;
use serde_json::json;

fn open_widget(endpoint: String) -> ChatWidget {
    let mut widget = ChatWidget::new(QueryClient::new(endpoint), ChatHeader::new("Shop"));
    widget.open();
    widget
}

#[tokio::test]
async fn test_reply_is_appended_after_user_message() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/api/query")
        .match_body(Matcher::Json(json!({"query": "track my order"})))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"reply": "Your order is on the way"}"#)
        .expect(1)
        .create_async()
        .await;

    let widget = open_widget(format!("{}/api/query", server.url()));
    let handle = widget.submit("track my order").await.expect("submission accepted");

    let transcript = widget.transcript().await;
    assert_eq!(transcript.len(), 1);
    assert_eq!(transcript[0].author, Author::User);
    assert_eq!(transcript[0].text, "track my order");

    handle.await.unwrap();

    let transcript = widget.transcript().await;
    assert_eq!(transcript.len(), 2);
    assert_eq!(transcript[1].author, Author::Bot);
    assert_eq!(transcript[1].text, "Your order is on the way");
    mock.assert_async().await;
}

#[tokio::test]
async fn test_network_failure_shows_fallback() {
    // Nothing listens on port 1.
    let widget = open_widget("http://127.0.0.1:1/api/query".to_string());

    widget.submit("hello").await.unwrap().await.unwrap();

    let transcript = widget.transcript().await;
    assert_eq!(transcript.len(), 2);
    assert_eq!(transcript[1].text, FALLBACK_REPLY);
}

#[tokio::test]
async fn test_error_status_and_malformed_body_show_fallback() {
    let mut server = mockito::Server::new_async().await;
    let _error = server
        .mock("POST", "/error")
        .with_status(500)
        .with_body(r#"{"reply": "should be ignored"}"#)
        .create_async()
        .await;
    let _garbage = server
        .mock("POST", "/garbage")
        .with_status(200)
        .with_body("<html>not json</html>")
        .create_async()
        .await;

    for path in ["/error", "/garbage"] {
        let widget = open_widget(format!("{}{}", server.url(), path));
        widget.submit("hi").await.unwrap().await.unwrap();

        let transcript = widget.transcript().await;
        assert_eq!(transcript.last().unwrap().text, FALLBACK_REPLY, "path {}", path);
    }
}

#[tokio::test]
async fn test_blank_submission_does_nothing() {
    let mut server = mockito::Server::new_async().await;
    let mock = server.mock("POST", Matcher::Any).expect(0).create_async().await;

    let mut widget = open_widget(format!("{}/api/query", server.url()));
    assert!(widget.submit("").await.is_none());
    assert!(widget.submit("   \t\n").await.is_none());

    widget.input_mut().set_draft("   ");
    assert!(widget.send_draft().await.is_none());

    assert!(widget.transcript().await.is_empty());
    mock.assert_async().await;
}

#[tokio::test]
async fn test_send_draft_submits_trimmed_text_and_sends_token() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/api/query")
        .match_header("authorization", "Bearer abc")
        .match_body(Matcher::Json(json!({"query": "refund status"})))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"success": true, "reply": "Refund issued"}"#)
        .create_async()
        .await;

    let client = QueryClient::new(format!("{}/api/query", server.url())).with_auth_token("abc");
    let mut widget = ChatWidget::new(client, ChatHeader::new("Shop"));
    widget.open();
    widget.input_mut().set_draft("  refund status ");

    widget.send_draft().await.unwrap().await.unwrap();

    assert_eq!(widget.input_mut().draft(), "");
    assert_eq!(widget.transcript().await[1].text, "Refund issued");
    mock.assert_async().await;
}
