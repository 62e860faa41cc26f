//! End-to-end classification through the remote backend against a mock
//! chat-completions server.

use std::time::Duration;

use censor_classifier::backend::remote::SYSTEM_PROMPT;
use censor_classifier::{BackendKind, ClassificationInput, Classifier, ClassifierConfig, Rating};
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn completion(content: &str) -> serde_json::Value {
    json!({
        "id": "chatcmpl-test",
        "object": "chat.completion",
        "model": "gpt-4o-mini",
        "choices": [{
            "index": 0,
            "message": {"role": "assistant", "content": content},
            "finish_reason": "stop"
        }],
        "usage": {"prompt_tokens": 200, "completion_tokens": 20}
    })
}

fn config_for(server: &MockServer) -> ClassifierConfig {
    ClassifierConfig::default()
        .with_backend(BackendKind::Remote)
        .with_base_url(format!("{}/v1", server.uri()))
        .with_api_key("sk-test")
}

async fn classifier_for(server: &MockServer) -> Classifier {
    Classifier::new(config_for(server))
        .await
        .unwrap_or_else(|e| panic!("classifier construction failed: {}", e))
}

fn sample_input() -> ClassificationInput {
    serde_json::from_value(json!({
        "metadata": {"filename": "test_video.mp4", "duration": 120},
        "transcript": "Family-friendly content with no violence or inappropriate material",
        "vision_labels": ["family", "happy", "outdoor", "nature"]
    }))
    .unwrap()
}

async fn mount_completion(server: &MockServer, content: &str) {
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion(content)))
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn valid_answer_is_returned_unchanged() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("authorization", "Bearer sk-test"))
        .and(body_partial_json(json!({
            "model": "gpt-4o-mini",
            "temperature": 0.1,
            "max_tokens": 150,
            "messages": [{"role": "system", "content": SYSTEM_PROMPT}]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion(
            r#"{"rating": "6+", "reason": "Family-friendly outdoor footage"}"#,
        )))
        .expect(1)
        .mount(&server)
        .await;

    let classifier = classifier_for(&server).await;
    let result = classifier.classify(&sample_input()).await;

    assert_eq!(result.rating, Rating::Six);
    assert_eq!(result.reason, "Family-friendly outdoor footage");
}

#[tokio::test]
async fn prompt_is_sent_as_user_message() {
    let server = MockServer::start().await;
    mount_completion(&server, r#"{"rating": "12+", "reason": "ok"}"#).await;

    let classifier = classifier_for(&server).await;
    classifier.classify(&sample_input()).await;

    let requests = server.received_requests().await.unwrap_or_default();
    assert_eq!(requests.len(), 1);
    let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    let user = body["messages"][1]["content"].as_str().unwrap_or_default();
    assert_eq!(body["messages"][1]["role"], "user");
    assert!(user.starts_with("You are a content rating classifier."));
    assert!(user.contains("\nVISION LABELS: family, happy, outdoor, nature"));
    assert!(user.contains("\"filename\": \"test_video.mp4\""));
}

#[tokio::test]
async fn prose_answer_degrades_to_default() {
    let server = MockServer::start().await;
    mount_completion(&server, "This looks fine for most teenagers.").await;

    let result = classifier_for(&server).await.classify(&sample_input()).await;

    assert_eq!(result.rating, Rating::Twelve);
    assert_eq!(result.reason, "Unable to parse classification response");
}

#[tokio::test]
async fn out_of_taxonomy_rating_is_corrected() {
    let server = MockServer::start().await;
    mount_completion(&server, r#"{"rating": "PG-13", "reason": "x"}"#).await;

    let result = classifier_for(&server).await.classify(&sample_input()).await;

    assert_eq!(result.rating, Rating::Twelve);
    assert_eq!(result.reason, "x");
}

#[tokio::test]
async fn api_error_yields_most_restrictive_rating() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({
            "error": {"message": "upstream overloaded", "type": "server_error"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let result = classifier_for(&server).await.classify(&sample_input()).await;

    assert_eq!(result.rating, Rating::Eighteen);
    assert!(result.reason.starts_with("Classification failed: "));
    assert!(result.reason.contains("upstream overloaded"));
}

#[tokio::test]
async fn non_json_error_page_keeps_http_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(
            ResponseTemplate::new(502)
                .set_body_raw("<html><body>Bad Gateway</body></html>", "text/html"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let result = classifier_for(&server).await.classify(&sample_input()).await;

    assert_eq!(result.rating, Rating::Eighteen);
    assert!(result.reason.contains("API error [502]"));
    assert!(result.reason.contains("Bad Gateway"));
}

#[tokio::test]
async fn transport_timeout_yields_most_restrictive_rating() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(completion(r#"{"rating": "6+", "reason": "late"}"#))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let mut config = config_for(&server);
    config.remote.timeout_secs = 1;
    let classifier = Classifier::new(config)
        .await
        .unwrap_or_else(|e| panic!("classifier construction failed: {}", e));

    let result = classifier.classify(&sample_input()).await;

    assert_eq!(result.rating, Rating::Eighteen);
    assert!(result.reason.starts_with("Classification failed: "));
}

#[tokio::test]
async fn empty_input_still_classifies() {
    let server = MockServer::start().await;
    mount_completion(&server, r#"{"rating": "6+", "reason": "nothing to rate"}"#).await;

    let classifier = classifier_for(&server).await;
    let result = classifier
        .classify_parts(serde_json::Map::new(), "", Vec::new())
        .await;
    assert!(Rating::ALL.contains(&result.rating));

    let requests = server.received_requests().await.unwrap_or_default();
    let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    let user = body["messages"][1]["content"].as_str().unwrap_or_default();
    assert!(!user.contains("METADATA:"));
    assert!(!user.contains("TRANSCRIPT:"));
    assert!(!user.contains("VISION LABELS:"));
}

#[tokio::test]
async fn concurrent_calls_share_one_classifier() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion(
            r#"{"rating": "16+", "reason": "strong language"}"#,
        )))
        .expect(3)
        .mount(&server)
        .await;

    let classifier = classifier_for(&server).await;
    let input = sample_input();
    let (a, b, c) = tokio::join!(
        classifier.classify(&input),
        classifier.classify(&input),
        classifier.classify(&input),
    );

    for result in [a, b, c] {
        assert_eq!(result.rating, Rating::Sixteen);
    }
}
