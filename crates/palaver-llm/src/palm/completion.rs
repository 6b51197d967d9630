//! PaLM text completion adapter

use super::{default_http_client, parse_success, post, refusal_error, verify_model};
use crate::endpoint::{EndpointConfig, Operation};
use crate::error::{LlmError, LlmResult, CONTEXT_RESPONSE_DATA};
use crate::provider::{CompletionResult, TextCompletion};
use crate::settings::CompletionSettings;
use async_trait::async_trait;
use palaver_http::HttpClient;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

/// Remote text completion over a PaLM-shaped generation endpoint.
///
/// Constructed once and reused across calls; safe to share between
/// concurrently issued calls.
pub struct PalmTextCompletion {
    http: HttpClient,
    model: String,
    api_key: Option<String>,
    endpoint: Option<String>,
}

impl PalmTextCompletion {
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

    /// Override the service endpoint (takes precedence over the
    /// transport's base address and the default endpoint)
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Use an injected transport client (its base address participates
    /// in endpoint resolution)
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
            operation: Operation::GenerateText,
        }
    }

    async fn execute(
        &self,
        text: &str,
        cancel: &CancellationToken,
    ) -> LlmResult<CompletionResult> {
        let request = TextCompletionRequest {
            prompt: CompletionPrompt {
                text: text.to_string(),
            },
        };
        let body = serde_json::to_value(&request).map_err(|e| LlmError::unknown(e))?;

        let raw = post(&self.http, &self.endpoint_config(), &body, cancel).await?;
        let response: TextCompletionResponse = parse_success(&raw)?;

        // A refusal parses fine but carries no candidates, only a
        // parallel "filters" shape with the reason.
        let Some(candidates) = response.candidates else {
            return Err(refusal_error(&raw));
        };
        let Some(first) = candidates.into_iter().next() else {
            return Err(LlmError::invalid_response().with_context(CONTEXT_RESPONSE_DATA, raw));
        };

        Ok(CompletionResult { text: first.output })
    }
}

impl std::fmt::Debug for PalmTextCompletion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // The API key never appears in diagnostics.
        f.debug_struct("PalmTextCompletion")
            .field("model", &self.model)
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

#[async_trait]
impl TextCompletion for PalmTextCompletion {
    /// The remote endpoint accepts only the prompt text; sampling
    /// settings are bound server-side for this operation family.
    async fn complete(
        &self,
        text: &str,
        _settings: &CompletionSettings,
        cancel: &CancellationToken,
    ) -> LlmResult<Vec<CompletionResult>> {
        Ok(vec![self.execute(text, cancel).await?])
    }
}

// Wire types

#[derive(Debug, Serialize)]
struct TextCompletionRequest {
    prompt: CompletionPrompt,
}

#[derive(Debug, Serialize)]
struct CompletionPrompt {
    text: String,
}

#[derive(Debug, Deserialize)]
struct TextCompletionResponse {
    candidates: Option<Vec<Candidate>>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    output: String,
}
