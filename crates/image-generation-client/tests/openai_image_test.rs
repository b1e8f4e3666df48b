//! Tests for [`image_generation_client::OpenAiImageClient`] against a mockito server.

use image_generation_client::{GeneratedImage, ImageGenerator, OpenAiImageClient};
use mockito::Matcher;
use serde_json::json;

/// **Test: The requested model and prompt are sent; the returned URL is passed through.**
#[tokio::test]
async fn test_generate_returns_url() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/images/generations")
        .match_header("authorization", "Bearer test-key")
        .match_body(Matcher::PartialJson(json!({
            "model": "flux",
            "prompt": "a cat on a roof",
            "response_format": "url",
            "n": 1
        })))
        .with_header("content-type", "application/json")
        .with_body(r#"{"created": 1700000000, "data": [{"url": "https://img.example/cat.png"}]}"#)
        .create_async()
        .await;

    let client = OpenAiImageClient::with_base_url("test-key".to_string(), server.url());
    let image = client.generate("flux", "a cat on a roof").await.unwrap();

    assert_eq!(
        image,
        GeneratedImage::Url("https://img.example/cat.png".to_string())
    );
    mock.assert_async().await;
}

/// **Test: An API error is surfaced, not retried.**
#[tokio::test]
async fn test_generate_api_error() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/images/generations")
        .with_status(400)
        .with_header("content-type", "application/json")
        .with_body(r#"{"error": {"message": "bad prompt", "type": "invalid_request_error", "param": null, "code": null}}"#)
        .create_async()
        .await;

    let client = OpenAiImageClient::with_base_url("test-key".to_string(), server.url());
    assert!(client.generate("flux", "x").await.is_err());
}
