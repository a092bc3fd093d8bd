//! HTTP-level tests against a mock OpenAI server.

use base64::Engine;
use gamecrew_llm::{
    AspectRatio, ChatMessage, CompletionRequest, FinishReason, ImageClient, ImageRequest,
    LlmProvider, OpenAIProvider, ProviderConfig, ProviderError, ToolDefinition,
};
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config_for(server: &MockServer) -> ProviderConfig {
    ProviderConfig::openai("sk-test").with_base_url(server.uri())
}

#[tokio::test]
async fn completion_returns_text_and_usage() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("authorization", "Bearer sk-test"))
        .and(body_partial_json(json!({"model": "gpt-4o"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "chatcmpl-1",
            "model": "gpt-4o",
            "choices": [{
                "message": {"role": "assistant", "content": "const maze = [];"},
                "finish_reason": "stop"
            }],
            "usage": {"prompt_tokens": 12, "completion_tokens": 5, "total_tokens": 17}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let provider = OpenAIProvider::new(config_for(&server)).unwrap();
    let request = CompletionRequest::new(vec![ChatMessage::user("Write the maze")])
        .with_model("gpt-4o");
    let response = provider.complete(request).await.unwrap();

    assert_eq!(response.content.as_deref(), Some("const maze = [];"));
    assert_eq!(response.finish_reason, FinishReason::Stop);
    assert_eq!(response.usage.total_tokens, 17);
}

#[tokio::test]
async fn completion_parses_tool_calls() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(body_partial_json(json!({"tools": [{"type": "function"}]})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "chatcmpl-2",
            "model": "gpt-4o-mini",
            "choices": [{
                "message": {
                    "role": "assistant",
                    "content": null,
                    "tool_calls": [{
                        "id": "call_1",
                        "type": "function",
                        "function": {"name": "image_generation", "arguments": "{\"prompt\":\"key\",\"filename\":\"key\"}"}
                    }]
                },
                "finish_reason": "tool_calls"
            }]
        })))
        .mount(&server)
        .await;

    let provider = OpenAIProvider::new(config_for(&server)).unwrap();
    let request = CompletionRequest::new(vec![ChatMessage::user("Draw a key")])
        .with_tools(vec![ToolDefinition::new("image_generation", "Generates images")]);
    let response = provider.complete(request).await.unwrap();

    assert_eq!(response.finish_reason, FinishReason::ToolCalls);
    assert!(response.content.is_none());
    assert_eq!(response.tool_calls.len(), 1);
    assert_eq!(response.tool_calls[0].name, "image_generation");
}

#[tokio::test]
async fn rate_limit_carries_message_and_header() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(
            ResponseTemplate::new(429)
                .insert_header("retry-after", "2")
                .set_body_json(json!({
                    "error": {"message": "Rate limit reached. Please try again in 1.5s.", "type": "tokens"}
                })),
        )
        .mount(&server)
        .await;

    let provider = OpenAIProvider::new(config_for(&server)).unwrap();
    let err = provider
        .complete(CompletionRequest::new(vec![ChatMessage::user("hi")]))
        .await
        .unwrap_err();

    match err {
        ProviderError::RateLimited { retry_after, message } => {
            assert_eq!(retry_after, Some(Duration::from_secs(2)));
            assert!(message.contains("Please try again in 1.5s"));
        }
        other => panic!("expected rate limit, got {other:?}"),
    }
}

#[tokio::test]
async fn oversized_retry_after_is_ignored() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(
            ResponseTemplate::new(429)
                .insert_header("retry-after", "1e20")
                .set_body_json(json!({"error": {"message": "Rate limit reached."}})),
        )
        .mount(&server)
        .await;

    let provider = OpenAIProvider::new(config_for(&server)).unwrap();
    let err = provider
        .complete(CompletionRequest::new(vec![ChatMessage::user("hi")]))
        .await
        .unwrap_err();

    match err {
        ProviderError::RateLimited { retry_after, .. } => assert_eq!(retry_after, None),
        other => panic!("expected rate limit, got {other:?}"),
    }
}

#[tokio::test]
async fn unauthorized_maps_to_authentication_failed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(401).set_body_string("bad key"))
        .mount(&server)
        .await;

    let provider = OpenAIProvider::new(config_for(&server)).unwrap();
    let err = provider
        .complete(CompletionRequest::new(vec![ChatMessage::user("hi")]))
        .await
        .unwrap_err();
    assert!(matches!(err, ProviderError::AuthenticationFailed));
}

#[tokio::test]
async fn image_generation_decodes_png() {
    let png = vec![0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a];
    let encoded = base64::engine::general_purpose::STANDARD.encode(&png);

    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/images/generations"))
        .and(body_partial_json(json!({
            "model": "dall-e-3",
            "prompt": "hidden key, pixel art, high quality, game asset",
            "n": 1,
            "size": "1792x1024",
            "response_format": "b64_json"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{"b64_json": encoded}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = ImageClient::new(config_for(&server)).unwrap();
    let request = ImageRequest::new("hidden key")
        .with_style("pixel art")
        .with_aspect_ratio(AspectRatio::parse("16:9"));
    let bytes = client.generate(&request).await.unwrap();

    assert_eq!(bytes, png);
}

#[tokio::test]
async fn image_generation_surfaces_api_errors() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/images/generations"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({
            "error": {"message": "server exploded"}
        })))
        .mount(&server)
        .await;

    let client = ImageClient::new(config_for(&server)).unwrap();
    let err = client.generate(&ImageRequest::new("torch")).await.unwrap_err();

    match err {
        ProviderError::Api { status, message } => {
            assert_eq!(status, 500);
            assert_eq!(message, "server exploded");
        }
        other => panic!("expected api error, got {other:?}"),
    }
}
