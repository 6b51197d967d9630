//! Adapter error taxonomy and classification

use palaver_http::HttpError;
use std::collections::HashMap;
use thiserror::Error;

/// Diagnostic context key carrying the raw response body
pub const CONTEXT_RESPONSE_DATA: &str = "ResponseData";

/// Diagnostic context key carrying a backend refusal reason
pub const CONTEXT_REASON: &str = "Reason";

/// Closed set of failure kinds observable by callers.
///
/// Every failure surfaced by an adapter carries exactly one of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Setup problem resolvable before the call (missing endpoint or
    /// base address, missing required credential, bad construction
    /// parameters)
    Configuration,

    /// The transport call itself failed (network error, cancellation,
    /// non-success HTTP status)
    Transport,

    /// Body present but unparsable, or parsable but missing the
    /// expected success field; includes provider refusals, with the
    /// refusal reason attached as diagnostic context when available
    InvalidResponseContent,

    /// A backend that signals refusals as a first-class outcome.
    ///
    /// The PaLM wire protocol reports refusals through a parallel
    /// "filters" shape and those surface as [`InvalidResponseContent`]
    /// with a `Reason` context entry, so no PaLM path produces this
    /// kind; it is part of the taxonomy for backends that do.
    ///
    /// [`InvalidResponseContent`]: ErrorKind::InvalidResponseContent
    ProviderRefusal,

    /// Any failure not covered above, with the original message embedded
    Unknown,
}

/// Structured adapter error: one kind, a message, and a diagnostic
/// context map preserving root cause (raw body, refusal reason) so the
/// caller can log it without re-parsing the payload.
///
/// Fatal conditions (aborts, panics) are never represented here; they
/// propagate unwrapped.
#[derive(Error, Debug)]
#[error("{message}")]
pub struct LlmError {
    pub kind: ErrorKind,
    pub message: String,
    pub context: HashMap<String, String>,
}

/// Result type for adapter operations
pub type LlmResult<T> = Result<T, LlmError>;

impl LlmError {
    fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            context: HashMap::new(),
        }
    }

    /// A setup problem detectable before the backend is called
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Configuration, message)
    }

    /// A transport-level failure, wrapping the original message
    pub fn transport(cause: impl std::fmt::Display) -> Self {
        Self::new(
            ErrorKind::Transport,
            format!("Something went wrong: {}", cause),
        )
    }

    /// A response that could not be interpreted as a success.
    ///
    /// Attach the raw body or refusal reason via [`with_context`].
    ///
    /// [`with_context`]: LlmError::with_context
    pub fn invalid_response() -> Self {
        Self::new(
            ErrorKind::InvalidResponseContent,
            "Unexpected response from model",
        )
    }

    /// Any other failure, wrapping the original message
    pub fn unknown(cause: impl std::fmt::Display) -> Self {
        Self::new(
            ErrorKind::Unknown,
            format!("Something went wrong: {}", cause),
        )
    }

    /// Attach a diagnostic context entry
    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }

    /// Look up a diagnostic context entry
    pub fn context_value(&self, key: &str) -> Option<&str> {
        self.context.get(key).map(String::as_str)
    }
}

impl From<HttpError> for LlmError {
    /// Transport failures are surfaced uniformly; the Transport/Unknown
    /// distinction is not observable, and the original message is
    /// always embedded.
    fn from(err: HttpError) -> Self {
        LlmError::transport(err)
    }
}
