//! Tests for [`llm_client::PlainTextProvider`] against a mockito server.

use futures::StreamExt;
use llm_client::{
    collect_text, stream_deltas, ChatProvider, PlainTextProvider, ProviderError,
    RateLimitSentinel, TransportOptions,
};
use mockito::Matcher;
use prompt::ChatMessage;
use serde_json::json;
use std::sync::Arc;

/// **Test: Request carries model, messages, stream flag and the configured headers; body becomes deltas.**
#[tokio::test]
async fn test_plain_text_stream() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/api/chat")
        .match_header("referer", "https://www.google.com/")
        .match_header("x-extra", "1")
        .match_body(Matcher::PartialJson(json!({
            "model": "deepseek-v3",
            "stream": true,
            "messages": [{"role": "user", "content": "hello"}]
        })))
        .with_status(200)
        .with_body("Hello there!")
        .create_async()
        .await;

    let provider = Arc::new(PlainTextProvider::new(
        "plain",
        format!("{}/api/chat", server.url()),
    ));
    let deltas = stream_deltas(
        provider,
        "deepseek-v3".to_string(),
        vec![ChatMessage::user("hello")],
        TransportOptions::default().with_header("X-Extra", "1"),
        RateLimitSentinel::default(),
    );

    assert_eq!(collect_text(deltas).await.unwrap(), "Hello there!");
    mock.assert_async().await;
}

/// **Test: Non-success status is a Status error and produces no stream.**
#[tokio::test]
async fn test_plain_text_status_error() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/api/chat")
        .with_status(503)
        .create_async()
        .await;

    let provider = PlainTextProvider::new("plain", format!("{}/api/chat", server.url()));
    let result = provider
        .open_stream("gpt-4", &[ChatMessage::user("hi")], &TransportOptions::default())
        .await;

    match result {
        Err(ProviderError::Status { provider, status }) => {
            assert_eq!(provider, "plain");
            assert_eq!(status, 503);
        }
        Err(other) => panic!("unexpected error: {}", other),
        Ok(_) => panic!("expected a status error"),
    }
}

/// **Test: A body carrying the rate-limit message is reported as RateLimited.**
#[tokio::test]
async fn test_plain_text_rate_limited_body() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/api/chat")
        .with_status(200)
        .with_body("You have reached your request limit for the hour.")
        .create_async()
        .await;

    let provider = Arc::new(PlainTextProvider::new(
        "plain",
        format!("{}/api/chat", server.url()),
    ));
    let items: Vec<_> = stream_deltas(
        provider,
        "gpt-4".to_string(),
        vec![ChatMessage::user("hi")],
        TransportOptions::default(),
        RateLimitSentinel::default(),
    )
    .collect()
    .await;

    assert!(matches!(items.last(), Some(Err(e)) if e.is_rate_limited()));
}

/// **Test: A body that ends inside a multibyte character yields U+FFFD for the cut-off bytes.**
#[tokio::test]
async fn test_plain_text_truncated_utf8_tail() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/api/chat")
        .with_status(200)
        .with_body(b"ok\xd0")
        .create_async()
        .await;

    let provider = Arc::new(PlainTextProvider::new(
        "plain",
        format!("{}/api/chat", server.url()),
    ));
    let deltas = stream_deltas(
        provider,
        "gpt-4".to_string(),
        vec![ChatMessage::user("hi")],
        TransportOptions::default(),
        RateLimitSentinel::default(),
    );

    assert_eq!(collect_text(deltas).await.unwrap(), "ok\u{FFFD}");
}

/// **Test: One provider serves consecutive requests with the same options.**
#[tokio::test]
async fn test_plain_text_provider_serves_repeated_calls() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/api/chat")
        .with_status(200)
        .with_body("again")
        .expect(2)
        .create_async()
        .await;

    let provider = Arc::new(PlainTextProvider::new(
        "plain",
        format!("{}/api/chat", server.url()),
    ));
    for _ in 0..2 {
        let deltas = stream_deltas(
            provider.clone(),
            "gpt-4".to_string(),
            vec![ChatMessage::user("hi")],
            TransportOptions::default(),
            RateLimitSentinel::default(),
        );
        assert_eq!(collect_text(deltas).await.unwrap(), "again");
    }
    mock.assert_async().await;
}
