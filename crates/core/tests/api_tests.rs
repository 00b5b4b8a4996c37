//! Library API integration tests
mod common;

use std::time::Duration;

use common::*;
use precis_core::*;
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client(server: &MockServer) -> GeminiClient {
    let config = GeminiConfig { api_key: API_KEY.to_string(), model: MODEL.to_string(), api_base: server.uri() };
    GeminiClient::new(config).unwrap()
}

fn summarizer(server: &MockServer) -> (Summarizer<GeminiClient>, MemorySink) {
    let sink = MemorySink::new();
    (Summarizer::new(client(server), EventLogger::new(sink.clone())), sink)
}

#[tokio::test]
async fn test_url_pipeline() {
    let server = MockServer::start().await;
    mount_page(&server, "/article", &read_fixture("article.html")).await;
    mount_generation(&server, "Ferris sails away.\nKey Takeaway: crabs can navigate.").await;
    let (mut summarizer, sink) = summarizer(&server);

    let url = format!("{}/article", server.uri());
    let summary = summarizer.summarize_url(&url).await.expect("should summarize");

    assert_eq!(summary, "Ferris sails away.\nKey Takeaway: crabs can navigate.");

    let prompts = sent_prompts(&server).await;
    assert_eq!(prompts.len(), 1);
    assert!(prompts[0].starts_with(PERSONA_PREAMBLE));
    assert!(prompts[0].contains("A small crab named Ferris"));
    assert!(!prompts[0].contains("All rights reserved"));
    assert!(!prompts[0].contains("window.analytics"));

    let records = sink.records();
    assert_eq!(sink.event_types(), vec![EventType::SummaryRequested, EventType::SummaryCompleted]);
    assert_eq!(records[0].session_id, records[1].session_id);
    assert_eq!(records[1].source_type, Some(SourceKind::Url));
    assert_eq!(records[1].source_identifier.as_deref(), Some(url.as_str()));
    assert_eq!(records[1].model, MODEL);
    assert_eq!(records[1].summary_length, Some(summary.chars().count()));
}

#[tokio::test]
async fn test_hello_world_prompt() {
    let server = MockServer::start().await;
    mount_page(&server, "/hello", "<body><p>Hello world</p></body>").await;
    mount_generation(&server, "A greeting.").await;
    let (mut summarizer, _sink) = summarizer(&server);

    summarizer.summarize_url(&format!("{}/hello", server.uri())).await.unwrap();

    assert_eq!(sent_prompts(&server).await, vec![format!("{PERSONA_PREAMBLE}Hello world")]);
}

#[tokio::test]
async fn test_invalid_url_makes_no_request() {
    let server = MockServer::start().await;
    let (mut summarizer, sink) = summarizer(&server);

    let result = summarizer.summarize_url("not-a-url").await;

    assert!(matches!(result, Err(PrecisError::InvalidInput(_))));
    assert_eq!(sink.event_types(), vec![EventType::ValidationError]);
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_http_status_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    Mock::given(method("POST")).respond_with(ResponseTemplate::new(200)).expect(0).mount(&server).await;
    let (mut summarizer, sink) = summarizer(&server);

    let result = summarizer.summarize_url(&format!("{}/missing", server.uri())).await;

    match result {
        Err(PrecisError::Network(NetworkError::Status { status, reason, .. })) => {
            assert_eq!(status, 404);
            assert_eq!(reason, "Not Found");
        }
        other => panic!("expected status error, got {:?}", other),
    }
    assert_eq!(sink.event_types(), vec![EventType::SummaryRequested, EventType::FetchError]);
}

#[tokio::test]
async fn test_fetch_timeout() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(3)))
        .mount(&server)
        .await;
    let (summarizer, sink) = summarizer(&server);
    let mut summarizer = summarizer.with_fetch_config(FetchConfig { timeout: 1, ..Default::default() });

    let result = summarizer.summarize_url(&format!("{}/slow", server.uri())).await;

    assert!(matches!(result, Err(PrecisError::Network(NetworkError::Timeout { timeout: 1 }))));
    assert_eq!(sink.event_types(), vec![EventType::SummaryRequested, EventType::FetchError]);
}

#[tokio::test]
async fn test_connection_refused() {
    let result = fetch_url("http://127.0.0.1:9/", &FetchConfig::default()).await;
    assert!(matches!(result, Err(PrecisError::Network(NetworkError::Connection { .. }))));
}

#[tokio::test]
async fn test_fetch_sends_user_agent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/ua"))
        .and(wiremock::matchers::header("User-Agent", "Mozilla/5.0 (compatible; Precis/1.0)"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<p>ok</p>"))
        .expect(1)
        .mount(&server)
        .await;

    let html = fetch_url(&format!("{}/ua", server.uri()), &FetchConfig::default()).await.unwrap();
    assert_eq!(html, "<p>ok</p>");
}

#[tokio::test]
async fn test_login_wall_is_empty_content() {
    let server = MockServer::start().await;
    mount_page(&server, "/private", &read_fixture("login_wall.html")).await;
    let (mut summarizer, sink) = summarizer(&server);

    let result = summarizer.summarize_url(&format!("{}/private", server.uri())).await;

    assert!(matches!(result, Err(PrecisError::EmptyContent(ContentOrigin::Page))));
    assert_eq!(sink.event_types(), vec![EventType::SummaryRequested, EventType::ValidationError]);
    assert!(sent_prompts(&server).await.is_empty());
}

#[tokio::test]
async fn test_quota_exhaustion() {
    let server = MockServer::start().await;
    mount_page(&server, "/article", &read_fixture("article.html")).await;
    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(ResponseTemplate::new(429).set_body_json(json!({
            "error": {
                "code": 429,
                "message": "You exceeded your current quota.",
                "status": "RESOURCE_EXHAUSTED"
            }
        })))
        .mount(&server)
        .await;
    let (mut summarizer, sink) = summarizer(&server);

    let result = summarizer.summarize_url(&format!("{}/article", server.uri())).await;

    let err = result.unwrap_err();
    assert!(matches!(err, PrecisError::QuotaExceeded(_)));
    assert!(err.to_string().contains(RATE_LIMIT_URL));
    assert_eq!(sink.event_types(), vec![EventType::SummaryRequested, EventType::GeminiError]);
    assert!(!sink.event_types().contains(&EventType::SummaryCompleted));
}

#[tokio::test]
async fn test_resource_exhausted_without_429() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({
            "error": { "code": 403, "message": "Quota gone", "status": "RESOURCE_EXHAUSTED" }
        })))
        .mount(&server)
        .await;

    let err = client(&server).generate("prompt", DEFAULT_TEMPERATURE).await.unwrap_err();
    assert!(matches!(err, PrecisError::QuotaExceeded(_)));
}

#[tokio::test]
async fn test_unexpected_generation_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": { "code": 400, "message": "API key not valid.", "status": "INVALID_ARGUMENT" }
        })))
        .mount(&server)
        .await;

    let err = client(&server).generate("prompt", DEFAULT_TEMPERATURE).await.unwrap_err();
    match err {
        PrecisError::Unexpected(message) => assert!(message.contains("API key not valid.")),
        other => panic!("expected unexpected error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_unexpected_generation_error_in_pipeline() {
    let server = MockServer::start().await;
    mount_page(&server, "/article", &read_fixture("article.html")).await;
    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({
            "error": { "code": 500, "message": "Internal error encountered.", "status": "INTERNAL" }
        })))
        .mount(&server)
        .await;
    let (mut summarizer, sink) = summarizer(&server);

    let result = summarizer.summarize_url(&format!("{}/article", server.uri())).await;

    assert!(matches!(result, Err(PrecisError::Unexpected(ref m)) if m.contains("Internal error encountered.")));
    assert_eq!(sink.event_types(), vec![EventType::SummaryRequested, EventType::GeminiError]);
    let records = sink.records();
    assert_eq!(records[1].level, Level::Error);
    assert!(records[1].error_message.as_deref().is_some_and(|m| m.contains("Internal error encountered.")));
}

#[tokio::test]
async fn test_generation_sends_temperature() {
    let server = MockServer::start().await;
    mount_generation(&server, "done").await;

    let text = client(&server).generate("prompt", 0.7).await.unwrap();
    assert_eq!(text, "done");

    let requests = server.received_requests().await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert!((body["generationConfig"]["temperature"].as_f64().unwrap() - 0.7).abs() < 1e-6);
}

#[tokio::test]
async fn test_list_models_paginated() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1beta/models"))
        .and(query_param("pageToken", "page-2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "models": [
                { "name": "models/gemini-2.0-flash", "supportedGenerationMethods": ["generateContent", "countTokens"] }
            ]
        })))
        .with_priority(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1beta/models"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "models": [
                { "name": "models/gemini-2.5-pro", "supportedGenerationMethods": ["generateContent"] },
                { "name": "models/text-embedding-004", "supportedGenerationMethods": ["embedContent"] },
                { "name": "models/aqa" }
            ],
            "nextPageToken": "page-2"
        })))
        .with_priority(2)
        .mount(&server)
        .await;

    let models = client(&server).list_models().await;

    assert_eq!(models, vec!["gemini-2.0-flash".to_string(), "gemini-2.5-pro".to_string()]);
}

#[tokio::test]
async fn test_list_models_failure_is_empty() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1beta/models"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    assert!(client(&server).list_models().await.is_empty());
}

#[tokio::test]
async fn test_switch_model_between_runs() {
    let server = MockServer::start().await;
    mount_page(&server, "/hello", "<p>Hello world</p>").await;
    Mock::given(method("POST"))
        .and(path("/v1beta/models/gemini-other:generateContent"))
        .respond_with(ResponseTemplate::new(200).set_body_json(candidate_reply("other")))
        .mount(&server)
        .await;
    let (mut summarizer, sink) = summarizer(&server);

    summarizer.generator_mut().set_model("gemini-other");
    let summary = summarizer.summarize_url(&format!("{}/hello", server.uri())).await.unwrap();

    assert_eq!(summary, "other");
    assert!(sink.records().iter().all(|record| record.model == "gemini-other"));
}

#[tokio::test]
async fn test_pdf_pipeline() {
    let server = MockServer::start().await;
    mount_generation(&server, "A two page memo.").await;
    let (mut summarizer, sink) = summarizer(&server);
    let bytes = pdf_with_pages(&["Quarterly results improved", "Outlook remains stable"]);

    let summary = summarizer.summarize(&Source::pdf("memo.pdf", bytes)).await.expect("should summarize");

    assert_eq!(summary, "A two page memo.");
    let prompts = sent_prompts(&server).await;
    assert!(prompts[0].starts_with(PERSONA_PREAMBLE));
    assert!(prompts[0].contains("Quarterly"));
    assert_eq!(sink.event_types(), vec![EventType::SummaryRequested, EventType::SummaryCompleted]);
    assert_eq!(sink.records()[1].source_type, Some(SourceKind::Pdf));
    assert_eq!(sink.records()[1].source_identifier.as_deref(), Some("memo.pdf"));
}

#[tokio::test]
async fn test_scanned_pdf_is_empty_content() {
    let server = MockServer::start().await;
    let (mut summarizer, sink) = summarizer(&server);

    let result = summarizer.summarize_pdf("scan.pdf", &pdf_with_pages(&["", ""])).await;

    assert!(matches!(result, Err(PrecisError::EmptyContent(ContentOrigin::Document))));
    assert_eq!(sink.event_types(), vec![EventType::SummaryRequested, EventType::ValidationError]);
}

#[tokio::test]
async fn test_corrupted_pdf_header() {
    let server = MockServer::start().await;
    let (mut summarizer, sink) = summarizer(&server);
    let mut bytes = pdf_with_pages(&["Hello"]);
    bytes[..5].copy_from_slice(b"GARBA");

    let result = summarizer.summarize_pdf("broken.pdf", &bytes).await;

    assert!(matches!(result, Err(PrecisError::MalformedDocument(_))));
    assert_eq!(sink.event_types(), vec![EventType::SummaryRequested, EventType::PdfError]);
    assert!(server.received_requests().await.unwrap().is_empty());
}
