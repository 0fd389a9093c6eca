//! Messages API client against a loopback stub server

mod common;

use common::{closed_port_url, messages_body, StubServer, ANALYSIS_JSON};
use resume_matcher::config::ApiConfig;
use resume_matcher::input::{InputManager, JobSource};
use resume_matcher::llm::{AnthropicClient, ApiKey, CompletionClient, ResumeAnalyzer};
use resume_matcher::{ErrorCategory, ResumeMatcherError, Session};
use std::path::Path;

fn api_config(base_url: &str) -> ApiConfig {
    ApiConfig {
        base_url: base_url.to_string(),
        timeout_secs: 5,
        ..ApiConfig::default()
    }
}

fn client_for(base_url: &str) -> AnthropicClient {
    let key = ApiKey::from_lookup("TEST_KEY", |_| Some("sk-test-123".to_string())).unwrap();
    AnthropicClient::new(&api_config(base_url), key).unwrap()
}

#[tokio::test]
async fn test_successful_completion() {
    let server = StubServer::start(200, messages_body(ANALYSIS_JSON));
    let client = client_for(&server.base_url);

    let text = client.complete("Compare these documents").await.unwrap();
    assert_eq!(text, ANALYSIS_JSON);

    let requests = server.requests();
    assert_eq!(requests.len(), 1);
    let request = &requests[0];
    assert!(request.head.starts_with("POST /v1/messages"));
    assert_eq!(request.header("x-api-key").as_deref(), Some("sk-test-123"));
    assert_eq!(request.header("anthropic-version").as_deref(), Some("2023-06-01"));

    let body: serde_json::Value = serde_json::from_str(&request.body).unwrap();
    assert_eq!(body["model"], ApiConfig::default().model.as_str());
    assert_eq!(body["max_tokens"], 4000);
    assert_eq!(body["messages"][0]["role"], "user");
    assert_eq!(body["messages"][0]["content"], "Compare these documents");
}

#[tokio::test]
async fn test_unauthorized_is_auth_error() {
    let server = StubServer::start(
        401,
        r#"{"type":"error","error":{"type":"authentication_error","message":"invalid x-api-key"}}"#,
    );
    let err = client_for(&server.base_url).complete("hi").await.unwrap_err();

    assert!(matches!(err, ResumeMatcherError::Authentication(_)));
    assert_eq!(err.category(), ErrorCategory::Auth);
    assert_eq!(server.connections(), 1);
}

#[tokio::test]
async fn test_rate_limit_is_not_retried() {
    let server = StubServer::start(
        429,
        r#"{"type":"error","error":{"type":"rate_limit_error","message":"slow down"}}"#,
    );
    let err = client_for(&server.base_url).complete("hi").await.unwrap_err();

    assert!(matches!(err, ResumeMatcherError::RateLimited(_)));
    assert_eq!(err.category(), ErrorCategory::Quota);
    assert_eq!(server.connections(), 1);
}

#[tokio::test]
async fn test_server_error_is_provider_error() {
    let server = StubServer::start(
        500,
        r#"{"type":"error","error":{"type":"api_error","message":"overloaded"}}"#,
    );
    let err = client_for(&server.base_url).complete("hi").await.unwrap_err();

    match &err {
        ResumeMatcherError::Api { status, message } => {
            assert_eq!(*status, 500);
            assert!(message.contains("overloaded"));
        }
        other => panic!("unexpected error: {:?}", other),
    }
    assert_eq!(err.category(), ErrorCategory::Provider);
}

#[tokio::test]
async fn test_garbage_body_is_invalid_response() {
    let server = StubServer::start(200, "<html>not json</html>");
    let err = client_for(&server.base_url).complete("hi").await.unwrap_err();
    assert!(matches!(err, ResumeMatcherError::InvalidResponse(_)));
}

#[tokio::test]
async fn test_unreachable_endpoint_is_network_error() {
    let err = client_for(&closed_port_url()).complete("hi").await.unwrap_err();
    assert!(matches!(err, ResumeMatcherError::Network(_)));
    assert_eq!(err.category(), ErrorCategory::Transport);
}

#[tokio::test]
async fn test_missing_credential_makes_no_connection() {
    let server = StubServer::start(200, messages_body(ANALYSIS_JSON));
    let config = ApiConfig {
        api_key_env: "RESUME_MATCHER_TEST_KEY_THAT_IS_NEVER_SET".to_string(),
        ..api_config(&server.base_url)
    };

    let err = AnthropicClient::from_config(&config).err().unwrap();
    assert!(matches!(err, ResumeMatcherError::Configuration(_)));
    assert_eq!(err.exit_code(), 3);
    assert_eq!(server.connections(), 0);
}

#[tokio::test]
async fn test_session_end_to_end() {
    let server = StubServer::start(200, messages_body(&format!("```json\n{}\n```", ANALYSIS_JSON)));
    let session = Session::new(
        InputManager::new(),
        ResumeAnalyzer::new(client_for(&server.base_url)),
    );

    let outcome = session
        .run(
            Path::new("tests/fixtures/sample_resume.txt"),
            &JobSource::parse("tests/fixtures/sample_job.txt"),
        )
        .await
        .unwrap();

    assert!(outcome.warnings.is_empty());
    assert_eq!(outcome.result.analysis.match_score, 58);
    assert_eq!(outcome.result.analysis.ats_tips.len(), 2);

    let requests = server.requests();
    assert_eq!(requests.len(), 1);
    let body: serde_json::Value = serde_json::from_str(&requests[0].body).unwrap();
    let prompt = body["messages"][0]["content"].as_str().unwrap();
    assert!(prompt.contains("John Doe"));
    assert!(prompt.contains("Senior Backend Engineer"));
}
