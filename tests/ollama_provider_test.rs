//! Ollama client tests against a `wiremock` server
//!
//! Streamed bodies are served with `set_body_raw(.., "application/x-ndjson")`
//! as Ollama does; the whole body arrives at once, so these tests cover the
//! line splitting across fragments rather than network chunking.

use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use ollama_journal::config::OllamaConfig;
use ollama_journal::providers::{Message, OllamaProvider, Provider};

fn make_provider(host: &str) -> OllamaProvider {
    OllamaProvider::new(OllamaConfig {
        host: host.to_string(),
        timeout_seconds: 5,
        ..OllamaConfig::default()
    })
    .expect("provider should build")
}

fn history() -> Vec<Message> {
    vec![
        Message::user("hi"),
        Message::assistant("hello"),
        Message::user("how are you?"),
    ]
}

#[tokio::test]
async fn test_request_body_carries_only_role_and_content() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .and(body_json(json!({
            "model": "llama3.2:latest",
            "messages": [
                {"role": "user", "content": "hi"},
                {"role": "assistant", "content": "hello"},
                {"role": "user", "content": "how are you?"}
            ],
            "stream": false
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "message": {"role": "assistant", "content": "  fine, thanks  "},
            "done": true
        })))
        .expect(1)
        .mount(&server)
        .await;

    let provider = make_provider(&server.uri());
    let mut chunks = Vec::new();
    let reply = provider
        .chat("llama3.2:latest", &history(), false, &mut |c: &str| {
            chunks.push(c.to_string())
        })
        .await
        .expect("chat should succeed");

    assert_eq!(reply, "fine, thanks");
    assert_eq!(chunks, vec!["fine, thanks".to_string()]);
}

#[tokio::test]
async fn test_streamed_fragments_accumulate_in_order() {
    let server = MockServer::start().await;

    let body = concat!(
        r#"{"message":{"role":"assistant","content":"Hel"},"done":false}"#,
        "\n",
        r#"{"message":{"role":"assistant","content":"lo"},"done":false}"#,
        "\n",
        r#"{"message":{"role":"assistant","content":" world"},"done":false}"#,
        "\n",
        r#"{"message":{"role":"assistant","content":""},"done":true,"eval_count":3}"#,
        "\n"
    );

    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(body.as_bytes().to_vec(), "application/x-ndjson"),
        )
        .mount(&server)
        .await;

    let provider = make_provider(&server.uri());
    let mut chunks = Vec::new();
    let reply = provider
        .chat("m", &history(), true, &mut |c: &str| chunks.push(c.to_string()))
        .await
        .expect("chat should succeed");

    assert_eq!(reply, "Hello world");
    assert_eq!(chunks.concat(), "Hello world");
}

#[tokio::test]
async fn test_malformed_fragment_is_skipped() {
    let server = MockServer::start().await;

    let body = concat!(
        r#"{"message":{"content":"Hel"},"done":false}"#,
        "\n",
        "{not json at all\n",
        r#"{"message":{"content":"lo"},"done":true}"#,
        "\n"
    );

    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(body.as_bytes().to_vec(), "application/x-ndjson"),
        )
        .mount(&server)
        .await;

    let provider = make_provider(&server.uri());
    let reply = provider
        .chat("m", &history(), true, &mut |_: &str| {})
        .await
        .expect("chat should succeed");

    assert_eq!(reply, "Hello");
}

#[tokio::test]
async fn test_server_error_is_an_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string("model not loaded"))
        .mount(&server)
        .await;

    let provider = make_provider(&server.uri());
    for stream in [false, true] {
        let err = provider
            .chat("m", &history(), stream, &mut |_: &str| {})
            .await
            .expect_err("500 must fail");
        assert!(err.to_string().contains("500"), "error: {}", err);
    }
}

#[tokio::test]
async fn test_error_payload_is_an_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "error": "model 'nope' not found"
        })))
        .mount(&server)
        .await;

    let provider = make_provider(&server.uri());
    let err = provider
        .chat("nope", &history(), false, &mut |_: &str| {})
        .await
        .expect_err("error payload must fail");
    assert!(err.to_string().contains("not found"));
}

#[tokio::test]
async fn test_missing_message_yields_empty_reply() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"done": true})))
        .mount(&server)
        .await;

    let provider = make_provider(&server.uri());
    let reply = provider
        .chat("m", &history(), false, &mut |_: &str| {})
        .await
        .expect("chat should succeed");
    assert_eq!(reply, "");
}

#[tokio::test]
async fn test_unreachable_host_is_an_error() {
    let provider = make_provider("http://127.0.0.1:1");
    let result = provider.chat("m", &history(), true, &mut |_: &str| {}).await;
    assert!(result.is_err());
}
