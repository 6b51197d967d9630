//! Request URI resolution for remote adapters
//!
//! Callers depend on stable URL shapes for testing, so the precedence
//! chain, trailing-slash normalization and optional-key suffixing here
//! must not change.

use crate::error::{LlmError, LlmResult};
use url::Url;

/// Remote operation family, determining the URI suffix
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    GenerateText,
    EmbedText,
    CountMessageTokens,
}

impl Operation {
    /// Wire suffix appended after the model name
    pub fn suffix(&self) -> &'static str {
        match self {
            Operation::GenerateText => "generateText",
            Operation::EmbedText => "embedText",
            Operation::CountMessageTokens => "countMessageTokens",
        }
    }
}

/// Inputs to request URI resolution, assembled fresh per call
#[derive(Debug, Clone)]
pub struct EndpointConfig {
    /// Endpoint configured directly on the adapter; highest precedence
    pub explicit_endpoint: Option<String>,

    /// Base address configured on the transport client
    pub client_base_address: Option<String>,

    /// Fallback endpoint constant for this operation family
    pub default_endpoint: Option<&'static str>,

    /// API key; when absent the `?key=` parameter is omitted entirely
    pub api_key: Option<String>,

    /// Model name spliced into the URI path
    pub model: String,

    /// Operation family
    pub operation: Operation,
}

impl EndpointConfig {
    /// Compute the final request URI. Deterministic, no I/O.
    ///
    /// Precedence, first non-empty wins: explicit endpoint, then the
    /// transport's base address, then the default endpoint constant.
    pub fn resolve(&self) -> LlmResult<Url> {
        let base = non_empty(self.explicit_endpoint.as_deref())
            .or_else(|| non_empty(self.client_base_address.as_deref()))
            .or_else(|| non_empty(self.default_endpoint))
            .ok_or_else(|| {
                LlmError::configuration(
                    "No endpoint or HTTP client base address has been provided",
                )
            })?;

        let mut url = format!(
            "{}/{}:{}",
            base.trim_end_matches('/'),
            self.model,
            self.operation.suffix()
        );
        if let Some(key) = non_empty(self.api_key.as_deref()) {
            url.push_str("?key=");
            url.push_str(key);
        }

        Url::parse(&url)
            .map_err(|e| LlmError::configuration(format!("Invalid request URL: {}", e)))
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|s| !s.is_empty())
}
