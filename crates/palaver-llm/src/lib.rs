//! # palaver-llm
//!
//! Uniform adapter layer over heterogeneous text-generation backends:
//! a locally loaded inference engine and PaLM-shaped remote HTTP APIs
//! (text completion, text embedding, token counting), all behind one
//! contract consumable by an orchestration layer.
//!
//! ## Features
//!
//! - Uniform [`TextCompletion`] / [`TextEmbedding`] traits
//! - Deterministic endpoint resolution with a stable URL shape
//! - A closed error taxonomy ([`ErrorKind`]) carrying diagnostic
//!   context (raw body, refusal reason) through ordinary `Result`s
//! - Cancellation-aware calls via `tokio_util::sync::CancellationToken`
//!
//! ## Example
//!
//! ```rust,ignore
//! use palaver_llm::{CompletionSettings, PalmTextCompletion, TextCompletion};
//! use tokio_util::sync::CancellationToken;
//!
//! let backend = PalmTextCompletion::new("text-bison-001")?.with_api_key("...");
//! let results = backend
//!     .complete("Hello!", &CompletionSettings::default(), &CancellationToken::new())
//!     .await?;
//! ```

pub mod endpoint;
pub mod error;
pub mod local;
pub mod palm;
pub mod provider;
pub mod settings;

// Re-export commonly used types
pub use endpoint::{EndpointConfig, Operation};
pub use error::{ErrorKind, LlmError, LlmResult, CONTEXT_REASON, CONTEXT_RESPONSE_DATA};
pub use local::{InferenceEngine, InferenceParams, LocalEngineParams, LocalTextCompletion};
pub use palm::tokens::TokenCounting;
pub use palm::{PalmTextCompletion, PalmTextEmbedding, PalmTokenCounter, PALM_API_ENDPOINT};
pub use provider::{
    CompletionResult, CompletionStream, EmbeddingVector, TextCompletion, TextEmbedding,
};
pub use settings::CompletionSettings;
