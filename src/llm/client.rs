//! Anthropic Messages API client
//!
//! Every call is a single attempt: failures are translated into the crate's
//! error taxonomy and surfaced to the caller, never retried.

use crate::config::ApiConfig;
use crate::error::{Result, ResumeMatcherError};
use log::{debug, info};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::future::Future;
use std::time::Duration;

/// Anything that can turn a prompt into model text.
pub trait CompletionClient {
    fn complete(&self, prompt: &str) -> impl Future<Output = Result<String>> + Send;
}

/// API credential. Never printed.
#[derive(Clone)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn from_env(var: &str) -> Result<Self> {
        Self::from_lookup(var, |name| std::env::var(name).ok())
    }

    pub fn from_lookup(var: &str, lookup: impl FnOnce(&str) -> Option<String>) -> Result<Self> {
        match lookup(var) {
            Some(value) if !value.trim().is_empty() => Ok(Self(value.trim().to_string())),
            _ => Err(ResumeMatcherError::Configuration(format!(
                "{} environment variable not set",
                var
            ))),
        }
    }

    fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(***)")
    }
}

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: Vec<Message<'a>>,
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    block_type: String,
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    input_tokens: u32,
    output_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

impl MessagesResponse {
    fn into_text(self) -> Option<String> {
        let text: String = self
            .content
            .into_iter()
            .filter(|block| block.block_type == "text")
            .filter_map(|block| block.text)
            .collect();
        (!text.trim().is_empty()).then_some(text)
    }
}

pub struct AnthropicClient {
    http: reqwest::Client,
    api_key: ApiKey,
    endpoint: String,
    model: String,
    max_tokens: u32,
    anthropic_version: String,
}

impl AnthropicClient {
    /// Resolve the credential from the environment, then build the client.
    pub fn from_config(config: &ApiConfig) -> Result<Self> {
        let api_key = ApiKey::from_env(&config.api_key_env)?;
        Self::new(config, api_key)
    }

    pub fn new(config: &ApiConfig, api_key: ApiKey) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| {
                ResumeMatcherError::Configuration(format!("Failed to build HTTP client: {}", e))
            })?;

        Ok(Self {
            http,
            api_key,
            endpoint: format!("{}/v1/messages", config.base_url.trim_end_matches('/')),
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            anthropic_version: config.anthropic_version.clone(),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

impl CompletionClient for AnthropicClient {
    async fn complete(&self, prompt: &str) -> Result<String> {
        let body = MessagesRequest {
            model: &self.model,
            max_tokens: self.max_tokens,
            messages: vec![Message {
                role: "user",
                content: prompt,
            }],
        };

        info!("Sending analysis request to {} ({})", self.endpoint, self.model);
        let response = self
            .http
            .post(&self.endpoint)
            .header("x-api-key", self.api_key.expose())
            .header("anthropic-version", &self.anthropic_version)
            .json(&body)
            .send()
            .await
            .map_err(|e| ResumeMatcherError::Network(describe_transport_error(&e)))?;

        let status = response.status();
        debug!("API responded with {}", status);

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(status_error(status, &body));
        }

        let parsed: MessagesResponse = response
            .json()
            .await
            .map_err(|e| ResumeMatcherError::InvalidResponse(format!("Malformed response body: {}", e)))?;

        if let Some(usage) = &parsed.usage {
            debug!(
                "Token usage: input={}, output={}",
                usage.input_tokens, usage.output_tokens
            );
        }

        parsed
            .into_text()
            .ok_or_else(|| ResumeMatcherError::InvalidResponse("Response contained no text".to_string()))
    }
}

fn describe_transport_error(err: &reqwest::Error) -> String {
    if err.is_timeout() {
        format!("Request timed out: {}", err)
    } else if err.is_connect() {
        format!("Could not connect to the API: {}", err)
    } else {
        err.to_string()
    }
}

/// Map a non-success status to the error taxonomy.
pub fn status_error(status: StatusCode, body: &str) -> ResumeMatcherError {
    let message = serde_json::from_str::<ErrorEnvelope>(body)
        .map(|e| e.error.message)
        .unwrap_or_else(|_| {
            if body.trim().is_empty() {
                status.canonical_reason().unwrap_or("no details").to_string()
            } else {
                body.trim().to_string()
            }
        });

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            ResumeMatcherError::Authentication(message)
        }
        StatusCode::TOO_MANY_REQUESTS => ResumeMatcherError::RateLimited(message),
        _ => ResumeMatcherError::Api {
            status: status.as_u16(),
            message,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_or_blank_key_is_configuration_error() {
        let missing = ApiKey::from_lookup("ANTHROPIC_API_KEY", |_| None);
        assert!(matches!(missing, Err(ResumeMatcherError::Configuration(_))));

        let blank = ApiKey::from_lookup("ANTHROPIC_API_KEY", |_| Some("  ".to_string()));
        assert!(matches!(blank, Err(ResumeMatcherError::Configuration(_))));
    }

    #[test]
    fn test_key_is_redacted_in_debug() {
        let key = ApiKey::from_lookup("K", |_| Some("sk-ant-secret".to_string())).unwrap();
        assert_eq!(format!("{:?}", key), "ApiKey(***)");
        assert_eq!(key.expose(), "sk-ant-secret");
    }

    #[test]
    fn test_status_error_mapping() {
        let auth = status_error(
            StatusCode::UNAUTHORIZED,
            r#"{"type":"error","error":{"type":"authentication_error","message":"invalid x-api-key"}}"#,
        );
        match auth {
            ResumeMatcherError::Authentication(msg) => assert_eq!(msg, "invalid x-api-key"),
            other => panic!("unexpected: {:?}", other),
        }

        assert!(matches!(
            status_error(StatusCode::TOO_MANY_REQUESTS, ""),
            ResumeMatcherError::RateLimited(_)
        ));

        match status_error(StatusCode::INTERNAL_SERVER_ERROR, "upstream exploded") {
            ResumeMatcherError::Api { status, message } => {
                assert_eq!(status, 500);
                assert_eq!(message, "upstream exploded");
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_text_blocks_are_joined() {
        let response: MessagesResponse = serde_json::from_str(
            r#"{"content":[{"type":"text","text":"{\"match_score\":"},{"type":"tool_use"},{"type":"text","text":" 70}"}]}"#,
        )
        .unwrap();
        assert_eq!(response.into_text().unwrap(), "{\"match_score\": 70}");
    }

    #[test]
    fn test_endpoint_is_derived_from_base_url() {
        let config = ApiConfig {
            base_url: "http://127.0.0.1:9/".to_string(),
            ..ApiConfig::default()
        };
        let key = ApiKey::from_lookup("K", |_| Some("k".to_string())).unwrap();
        let client = AnthropicClient::new(&config, key).unwrap();
        assert_eq!(client.endpoint, "http://127.0.0.1:9/v1/messages");
        assert_eq!(client.model(), "claude-sonnet-4-5-20250929");
    }
}
