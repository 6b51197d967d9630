//! PaLM text embedding adapter

use super::{default_http_client, parse_success, post, verify_model};
use crate::endpoint::{EndpointConfig, Operation};
use crate::error::{LlmError, LlmResult, CONTEXT_RESPONSE_DATA};
use crate::provider::{EmbeddingVector, TextEmbedding};
use async_trait::async_trait;
use palaver_http::HttpClient;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

/// Remote text embedding over a PaLM-shaped embedding endpoint.
///
/// The wire protocol embeds one text per request, so [`embed`] joins
/// all input items into a single blob and returns a single vector; see
/// [`TextEmbedding::embed_each`] for per-item vectors.
///
/// [`embed`]: TextEmbedding::embed
pub struct PalmTextEmbedding {
    http: HttpClient,
    model: String,
    api_key: Option<String>,
    endpoint: Option<String>,
}

impl PalmTextEmbedding {
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
            operation: Operation::EmbedText,
        }
    }
}

impl std::fmt::Debug for PalmTextEmbedding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PalmTextEmbedding")
            .field("model", &self.model)
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

#[async_trait]
impl TextEmbedding for PalmTextEmbedding {
    async fn embed(
        &self,
        items: &[String],
        cancel: &CancellationToken,
    ) -> LlmResult<EmbeddingVector> {
        let request = TextEmbeddingRequest {
            text: items.join(" "),
        };
        let body = serde_json::to_value(&request).map_err(|e| LlmError::unknown(e))?;

        let raw = post(&self.http, &self.endpoint_config(), &body, cancel).await?;
        let response: TextEmbeddingResponse = parse_success(&raw)?;

        let Some(embedding) = response.embedding else {
            return Err(LlmError::invalid_response().with_context(CONTEXT_RESPONSE_DATA, raw));
        };

        Ok(EmbeddingVector {
            values: embedding.value,
        })
    }
}

// Wire types

#[derive(Debug, Serialize)]
struct TextEmbeddingRequest {
    text: String,
}

#[derive(Debug, Deserialize)]
struct TextEmbeddingResponse {
    embedding: Option<Embedding>,
}

#[derive(Debug, Deserialize)]
struct Embedding {
    value: Vec<f32>,
}
