//! Integration tests for input loading and the analysis session

mod common;

use common::{CountingClient, ANALYSIS_JSON};
use regex::Regex;
use resume_matcher::input::{InputManager, JobSource};
use resume_matcher::llm::ResumeAnalyzer;
use resume_matcher::output::Exporter;
use resume_matcher::{ErrorCategory, ResumeMatcherError, Session};
use std::path::Path;

fn session(reply: &str) -> Session<CountingClient> {
    Session::new(InputManager::new(), ResumeAnalyzer::new(CountingClient::new(reply)))
}

fn job_file(path: &str) -> JobSource {
    JobSource::File(Path::new(path).to_path_buf())
}

#[tokio::test]
async fn test_text_extraction_from_txt() {
    let manager = InputManager::new();
    let text = manager
        .extract_text(Path::new("tests/fixtures/sample_resume.txt"))
        .await
        .unwrap();

    assert!(text.contains("John Doe"));
    assert!(text.contains("Software Engineer"));
    assert!(text.contains("React"));
    assert!(text.contains("Node.js"));
}

#[tokio::test]
async fn test_text_extraction_from_markdown() {
    let manager = InputManager::new();
    let text = manager
        .extract_text(Path::new("tests/fixtures/sample_resume.md"))
        .await
        .unwrap();

    assert!(text.contains("John Doe"));
    assert!(text.contains("Software Engineer"));
    assert!(text.contains("React"));
    assert!(text.contains("Node.js"));
    // Should not contain markdown formatting
    assert!(!text.contains("**"));
    assert!(!text.contains("##"));
}

#[tokio::test]
async fn test_unsupported_file_type() {
    let manager = InputManager::new();
    let result = manager
        .extract_text(Path::new("tests/fixtures/unsupported.xyz"))
        .await;
    assert!(matches!(result, Err(ResumeMatcherError::UnsupportedFormat(_))));
}

#[tokio::test]
async fn test_nonexistent_file() {
    let manager = InputManager::new();
    let result = manager
        .extract_text(Path::new("tests/fixtures/nonexistent.txt"))
        .await;
    assert!(matches!(result, Err(ResumeMatcherError::InvalidInput(_))));
}

#[tokio::test]
async fn test_session_produces_stamped_result() {
    let session = session(ANALYSIS_JSON);

    let outcome = session
        .run(
            Path::new("tests/fixtures/sample_resume.txt"),
            &job_file("tests/fixtures/sample_job.txt"),
        )
        .await
        .unwrap();

    assert_eq!(session.analyzer().client().calls(), 1);
    assert!(outcome.warnings.is_empty());

    let result = outcome.result;
    assert_eq!(result.resume_path, "tests/fixtures/sample_resume.txt");
    assert_eq!(result.job_path, "tests/fixtures/sample_job.txt");
    assert_eq!(result.analysis.match_score, 58);
    assert_eq!(result.analysis.missing_keywords.len(), 5);
    assert_eq!(result.analysis.rewritten_bullets.len(), 3);
    assert_eq!(
        result.analysis.rewritten_bullets[2].after,
        "Raised backend test coverage from 40% to 85%"
    );
}

#[tokio::test]
async fn test_missing_resume_makes_no_call() {
    let session = session(ANALYSIS_JSON);

    let err = session
        .run(
            Path::new("tests/fixtures/nonexistent.txt"),
            &job_file("tests/fixtures/sample_job.txt"),
        )
        .await
        .unwrap_err();

    assert_eq!(err.category(), ErrorCategory::UserInput);
    assert_eq!(session.analyzer().client().calls(), 0);
}

#[tokio::test]
async fn test_missing_job_makes_no_call() {
    let session = session(ANALYSIS_JSON);

    let err = session
        .run(
            Path::new("tests/fixtures/sample_resume.txt"),
            &job_file("tests/fixtures/missing_job.txt"),
        )
        .await
        .unwrap_err();

    assert_eq!(err.category(), ErrorCategory::UserInput);
    assert_eq!(session.analyzer().client().calls(), 0);
}

#[tokio::test]
async fn test_empty_input_makes_no_call() {
    let session = session(ANALYSIS_JSON);

    let err = session
        .run(
            Path::new("tests/fixtures/empty.txt"),
            &job_file("tests/fixtures/sample_job.txt"),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, ResumeMatcherError::InvalidInput(_)));
    assert_eq!(session.analyzer().client().calls(), 0);
}

#[tokio::test]
async fn test_partial_response_still_completes() {
    let session = session(r#"```json
{"match_score": 47, "missing_keywords": ["Rust"]}
```"#);

    let outcome = session
        .run(
            Path::new("tests/fixtures/sample_resume.md"),
            &job_file("tests/fixtures/sample_job.txt"),
        )
        .await
        .unwrap();

    assert_eq!(outcome.result.analysis.match_score, 47);
    assert_eq!(outcome.result.analysis.missing_keywords, vec!["Rust"]);
    assert!(outcome.result.analysis.improvements.is_empty());
    assert_eq!(outcome.warnings.len(), 3);
}

#[tokio::test]
async fn test_export_after_session() {
    let dir = tempfile::tempdir().unwrap();
    let session = session(ANALYSIS_JSON);
    let outcome = session
        .run(
            Path::new("tests/fixtures/sample_resume.txt"),
            &job_file("tests/fixtures/sample_job.txt"),
        )
        .await
        .unwrap();

    let path = Exporter::new(dir.path()).export(&outcome.result).unwrap();

    let name = path.file_name().unwrap().to_str().unwrap();
    let pattern = Regex::new(r"^resume_analysis_\d{8}_\d{6}\.json$").unwrap();
    assert!(pattern.is_match(name), "unexpected file name {}", name);

    let loaded = Exporter::load(&path).unwrap();
    assert_eq!(loaded, outcome.result);
}
