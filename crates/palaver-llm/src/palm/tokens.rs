//! PaLM token counting collaborator
//!
//! A narrow adapter for the token-counting endpoint. It shares the
//! endpoint-resolution and error contracts of the other remote
//! adapters: cancellation-aware, endpoint-override-aware.

use super::{default_http_client, parse_success, post, verify_model};
use crate::endpoint::{EndpointConfig, Operation};
use crate::error::{LlmError, LlmResult, CONTEXT_RESPONSE_DATA};
use async_trait::async_trait;
use palaver_http::HttpClient;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

/// Count tokens for a piece of input text
#[async_trait]
pub trait TokenCounting: Send + Sync {
    async fn count_tokens(&self, input: &str, cancel: &CancellationToken) -> LlmResult<u32>;
}

/// Remote token counter over a PaLM-shaped counting endpoint
pub struct PalmTokenCounter {
    http: HttpClient,
    model: String,
    api_key: Option<String>,
    endpoint: Option<String>,
}

impl PalmTokenCounter {
    /// Create an adapter for `model` using the default transport
    pub fn new(model: impl Into<String>) -> LlmResult<Self> {
        let model = model.into();
        verify_model(&model)?;
        Ok(Self {
            http: default_http_client()?,
            model,
            api_key: None,
            endpoint: None,
        })
    }

    /// Set the API key appended as a `?key=` query parameter
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Override the service endpoint
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Use an injected transport client
    pub fn with_http_client(mut self, http: HttpClient) -> Self {
        self.http = http;
        self
    }

    fn endpoint_config(&self) -> EndpointConfig {
        EndpointConfig {
            explicit_endpoint: self.endpoint.clone(),
            client_base_address: self.http.base_url().map(str::to_string),
            default_endpoint: Some(super::PALM_API_ENDPOINT),
            api_key: self.api_key.clone(),
            model: self.model.clone(),
            operation: Operation::CountMessageTokens,
        }
    }
}

impl std::fmt::Debug for PalmTokenCounter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PalmTokenCounter")
            .field("model", &self.model)
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

#[async_trait]
impl TokenCounting for PalmTokenCounter {
    async fn count_tokens(&self, input: &str, cancel: &CancellationToken) -> LlmResult<u32> {
        let request = TokenRequest {
            prompt: TokenPrompt {
                messages: vec![TokenMessage {
                    content: input.to_string(),
                }],
            },
        };
        let body = serde_json::to_value(&request).map_err(|e| LlmError::unknown(e))?;

        let raw = post(&self.http, &self.endpoint_config(), &body, cancel).await?;
        let response: TokenResponse = parse_success(&raw)?;

        response.token_count.ok_or_else(|| {
            LlmError::invalid_response().with_context(CONTEXT_RESPONSE_DATA, raw)
        })
    }
}

// Wire types

#[derive(Debug, Serialize)]
struct TokenRequest {
    prompt: TokenPrompt,
}

#[derive(Debug, Serialize)]
struct TokenPrompt {
    messages: Vec<TokenMessage>,
}

#[derive(Debug, Serialize)]
struct TokenMessage {
    content: String,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    #[serde(rename = "tokenCount")]
    token_count: Option<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn request_body_shape_is_stable() {
        let request = TokenRequest {
            prompt: TokenPrompt {
                messages: vec![TokenMessage {
                    content: "hello world".to_string(),
                }],
            },
        };
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({"prompt": {"messages": [{"content": "hello world"}]}})
        );
    }

    #[test]
    fn success_body_parses_the_count() {
        let response: TokenResponse = parse_success(r#"{"tokenCount": 2}"#).unwrap();
        assert_eq!(response.token_count, Some(2));
    }
}
