use ghcs_lib::extractor::{Extractor, GeminiExtractor};
use ghcs_lib::{Error, ExtractorConfig};
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn extractor(server: &MockServer) -> GeminiExtractor {
    GeminiExtractor::new(ExtractorConfig {
        api_key: "test-key".to_string(),
        model: "test-model".to_string(),
        base_url: server.uri(),
    })
    .unwrap()
}

#[tokio::test]
async fn joins_candidate_parts() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1beta/models/test-model:generateContent"))
        .and(header("x-goog-api-key", "test-key"))
        .and(body_partial_json(json!({ "contents": [{ "parts": [{ "text": "find main" }] }] })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{ "content": { "parts": [{ "text": "fn main() {" }, { "text": "}" }] } }]
        })))
        .mount(&server)
        .await;

    let text = extractor(&server).generate("find main").await.unwrap();
    assert_eq!(text, "fn main() {}");
}

#[tokio::test]
async fn api_error_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(400).set_body_string("bad key"))
        .mount(&server)
        .await;

    let err = extractor(&server).generate("x").await.unwrap_err();
    match err {
        Error::Extraction(message) => assert!(message.contains("bad key")),
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn empty_candidates_are_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "candidates": [] })))
        .mount(&server)
        .await;

    assert!(matches!(
        extractor(&server).generate("x").await,
        Err(Error::Extraction(_))
    ));
}
