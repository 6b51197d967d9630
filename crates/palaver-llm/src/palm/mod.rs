//! PaLM-style generative language API adapters
//!
//! Remote adapters for the text completion, text embedding and token
//! counting endpoints of a PaLM-shaped generative language service.
//! Wire types are private to each adapter module; callers only see the
//! uniform contracts from [`crate::provider`].

pub mod completion;
pub mod embedding;
pub mod tokens;

pub use completion::PalmTextCompletion;
pub use embedding::PalmTextEmbedding;
pub use tokens::PalmTokenCounter;

use crate::endpoint::EndpointConfig;
use crate::error::{LlmError, LlmResult, CONTEXT_REASON, CONTEXT_RESPONSE_DATA};
use palaver_http::{HttpClient, HttpClientConfig};
use serde::Deserialize;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Fixed identifying header sent with every remote call
pub const HTTP_USER_AGENT: &str = "palaver";

/// Default endpoint for all PaLM operation families
pub const PALM_API_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta2/models";

/// Refusal shape: returned instead of the success shape, without the
/// expected result field
#[derive(Debug, Deserialize)]
struct FilterResponse {
    #[serde(default)]
    filters: Vec<Filter>,
}

#[derive(Debug, Deserialize)]
struct Filter {
    reason: Option<String>,
}

/// Build the transport client the adapters use by default
pub(crate) fn default_http_client() -> LlmResult<HttpClient> {
    HttpClient::new(HttpClientConfig::new().user_agent(HTTP_USER_AGENT))
        .map_err(|e| LlmError::configuration(format!("Failed to build HTTP client: {}", e)))
}

/// Reject empty model names at construction time
pub(crate) fn verify_model(model: &str) -> LlmResult<()> {
    if model.trim().is_empty() {
        return Err(LlmError::configuration("A model name must be provided"));
    }
    Ok(())
}

/// Issue one POST and return the raw response body.
///
/// Applies the shared error contract: transport failures and non-2xx
/// statuses are surfaced as transport errors carrying the original
/// message; everything after this point is body classification.
pub(crate) async fn post(
    http: &HttpClient,
    config: &EndpointConfig,
    body: &serde_json::Value,
    cancel: &CancellationToken,
) -> LlmResult<String> {
    let url = config.resolve()?;
    debug!(
        target: "palaver_llm",
        model = %config.model,
        operation = config.operation.suffix(),
        "PaLM request"
    );

    let response = http
        .post_json(url.as_str(), &[("User-Agent", HTTP_USER_AGENT)], body, cancel)
        .await?;

    if !response.is_success() {
        return Err(LlmError::transport(format!(
            "HTTP {}: {}",
            response.status_code,
            String::from_utf8_lossy(&response.body)
        )));
    }

    // A success status with an undecodable body is a content problem,
    // not a transport one.
    response.text().map_err(|_| {
        LlmError::invalid_response().with_context(
            CONTEXT_RESPONSE_DATA,
            String::from_utf8_lossy(&response.body).into_owned(),
        )
    })
}

/// Deserialize a success body, classifying parse failures
pub(crate) fn parse_success<T: serde::de::DeserializeOwned>(body: &str) -> LlmResult<T> {
    serde_json::from_str(body)
        .map_err(|_| LlmError::invalid_response().with_context(CONTEXT_RESPONSE_DATA, body))
}

/// Classify a body that parsed but lacks the expected result field.
///
/// When a parallel "filters" shape carries a reason, the first one (in
/// list order) is attached as diagnostic context; otherwise the raw
/// body is.
pub(crate) fn refusal_error(body: &str) -> LlmError {
    let reason = serde_json::from_str::<FilterResponse>(body)
        .ok()
        .and_then(|r| r.filters.into_iter().next())
        .and_then(|f| f.reason);

    match reason {
        Some(reason) => LlmError::invalid_response().with_context(CONTEXT_REASON, reason),
        None => LlmError::invalid_response().with_context(CONTEXT_RESPONSE_DATA, body),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn refusal_uses_the_first_filter_reason() {
        let body = r#"{"filters":[{"reason":"SAFETY"},{"reason":"OTHER"}]}"#;
        let err = refusal_error(body);
        assert_eq!(err.kind, ErrorKind::InvalidResponseContent);
        assert_eq!(err.context_value(CONTEXT_REASON), Some("SAFETY"));
    }

    #[test]
    fn refusal_without_reason_falls_back_to_the_raw_body() {
        let body = r#"{"filters":[]}"#;
        let err = refusal_error(body);
        assert_eq!(err.context_value(CONTEXT_RESPONSE_DATA), Some(body));
        assert_eq!(err.context_value(CONTEXT_REASON), None);
    }

    #[test]
    fn parse_success_attaches_the_unparsable_body() {
        let err = parse_success::<FilterResponse>("not json").unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidResponseContent);
        assert_eq!(err.context_value(CONTEXT_RESPONSE_DATA), Some("not json"));
    }

    #[test]
    fn empty_model_is_rejected() {
        assert_eq!(
            verify_model("  ").unwrap_err().kind,
            ErrorKind::Configuration
        );
        assert!(verify_model("text-bison-001").is_ok());
    }
}
