//! Local inference engine adapter
//!
//! Wraps an in-process, incrementally generating inference engine
//! behind the same [`TextCompletion`] contract as the remote adapters.
//! The engine is opaque: anything that can load a model from disk and
//! push generated text fragments through a sink qualifies.

use crate::error::{LlmError, LlmResult};
use crate::provider::{CompletionResult, TextCompletion};
use crate::settings::CompletionSettings;
use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Engine construction parameters, bound once at adapter construction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalEngineParams {
    /// Model file path on disk (required, non-empty)
    pub model_path: PathBuf,

    /// Context window size
    pub context_size: u32,

    /// Sampling seed
    pub seed: u64,

    /// Number of layers offloaded to the GPU
    pub gpu_layer_count: u32,
}

impl LocalEngineParams {
    pub fn new(model_path: impl Into<PathBuf>) -> Self {
        Self {
            model_path: model_path.into(),
            context_size: 1024,
            seed: 1337,
            gpu_layer_count: 5,
        }
    }

    pub fn context_size(mut self, context_size: u32) -> Self {
        self.context_size = context_size;
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn gpu_layer_count(mut self, gpu_layer_count: u32) -> Self {
        self.gpu_layer_count = gpu_layer_count;
        self
    }
}

/// Per-pass generation parameters, snapshotted from the call's settings
#[derive(Debug, Clone, PartialEq)]
pub struct InferenceParams {
    pub temperature: f32,
    pub anti_prompts: Vec<String>,
}

/// An in-process inference engine producing text incrementally.
///
/// `infer` is a blocking, long-running computation; the adapter always
/// invokes it on a dedicated worker thread. Engines are not assumed
/// reentrant: the adapter serializes calls into one engine instance.
pub trait InferenceEngine: Send + 'static {
    /// Load an engine from its bound construction parameters
    fn load(params: &LocalEngineParams) -> anyhow::Result<Self>
    where
        Self: Sized;

    /// Run one generation pass, pushing each produced text fragment
    /// through `emit` until generation stops (end of output or an
    /// anti-prompt was produced)
    fn infer(
        &mut self,
        prompt: &str,
        params: &InferenceParams,
        emit: &mut dyn FnMut(&str),
    ) -> anyhow::Result<()>;
}

/// Local text completion over an exclusively owned inference engine.
///
/// The engine genuinely streams token-by-token, but this adapter
/// accumulates all fragments and emits a single aggregated result so
/// its shape matches the remote adapters. Forwarding the engine's
/// increments directly to the caller is a possible future enhancement,
/// not required for parity.
pub struct LocalTextCompletion<E> {
    // Locked only from the blocking worker; callers never hold it
    // across an await point.
    engine: Arc<Mutex<E>>,
    anti_prompts: Vec<String>,
}

impl<E: InferenceEngine> LocalTextCompletion<E> {
    /// Load an engine from `params` and wrap it.
    ///
    /// `anti_prompts` is the constructed stop-sequence list, used when
    /// a call's settings carry none.
    pub fn load(params: &LocalEngineParams, anti_prompts: Vec<String>) -> LlmResult<Self> {
        if params.model_path.as_os_str().is_empty() {
            return Err(LlmError::configuration("A model path must be provided"));
        }
        let engine = E::load(params).map_err(|e| {
            LlmError::configuration(format!("Failed to load inference engine: {}", e))
        })?;
        Ok(Self::new(engine, anti_prompts))
    }

    /// Wrap an already loaded engine
    pub fn new(engine: E, anti_prompts: Vec<String>) -> Self {
        Self {
            engine: Arc::new(Mutex::new(engine)),
            anti_prompts,
        }
    }
}

impl<E> std::fmt::Debug for LocalTextCompletion<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalTextCompletion")
            .field("anti_prompts", &self.anti_prompts)
            .finish()
    }
}

#[async_trait]
impl<E: InferenceEngine> TextCompletion for LocalTextCompletion<E> {
    async fn complete(
        &self,
        text: &str,
        settings: &CompletionSettings,
        cancel: &CancellationToken,
    ) -> LlmResult<Vec<CompletionResult>> {
        // Per-call snapshot; the instance holds no per-call state.
        let params = InferenceParams {
            temperature: settings.temperature,
            anti_prompts: if settings.anti_prompts.is_empty() {
                self.anti_prompts.clone()
            } else {
                settings.anti_prompts.clone()
            },
        };
        let prompt = text.to_string();
        let engine = Arc::clone(&self.engine);

        debug!(target: "palaver_llm", temperature = params.temperature, "local inference");

        // The inference pass must not block the cooperative scheduler.
        let handle = tokio::task::spawn_blocking(move || {
            let mut engine = engine
                .lock()
                .map_err(|_| anyhow::anyhow!("inference engine lock poisoned"))?;
            let mut content = String::new();
            engine.infer(&prompt, &params, &mut |fragment| content.push_str(fragment))?;
            Ok::<String, anyhow::Error>(content)
        });

        let joined = tokio::select! {
            _ = cancel.cancelled() => {
                // The blocking pass keeps running detached; its output
                // is discarded.
                return Err(LlmError::unknown("inference was cancelled"));
            }
            joined = handle => joined,
        };

        let content = match joined {
            Ok(Ok(content)) => content,
            Ok(Err(engine_err)) => return Err(LlmError::unknown(engine_err)),
            Err(join_err) => {
                // Panics in the engine are fatal: re-raise them
                // unwrapped instead of folding them into the taxonomy.
                if join_err.is_panic() {
                    std::panic::resume_unwind(join_err.into_panic());
                }
                return Err(LlmError::unknown(join_err));
            }
        };

        Ok(vec![CompletionResult { text: content }])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    struct NeverLoads;

    impl InferenceEngine for NeverLoads {
        fn load(_params: &LocalEngineParams) -> anyhow::Result<Self> {
            anyhow::bail!("model file not found")
        }

        fn infer(
            &mut self,
            _prompt: &str,
            _params: &InferenceParams,
            _emit: &mut dyn FnMut(&str),
        ) -> anyhow::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn params_defaults_match_the_engine_contract() {
        let params = LocalEngineParams::new("/models/llama.bin");
        assert_eq!(params.context_size, 1024);
        assert_eq!(params.seed, 1337);
        assert_eq!(params.gpu_layer_count, 5);
    }

    #[test]
    fn empty_model_path_is_a_configuration_error() {
        let params = LocalEngineParams::new("");
        let err = LocalTextCompletion::<NeverLoads>::load(&params, Vec::new()).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Configuration);
        assert!(err.message.contains("model path"));
    }

    #[test]
    fn adapter_is_debuggable_for_any_engine() {
        let adapter = LocalTextCompletion::new(NeverLoads, vec!["User:".to_string()]);
        let rendered = format!("{:?}", adapter);
        assert!(rendered.contains("LocalTextCompletion"));
        assert!(rendered.contains("User:"));
    }

    #[test]
    fn engine_load_failures_are_configuration_errors() {
        let params = LocalEngineParams::new("/models/missing.bin");
        let err = LocalTextCompletion::<NeverLoads>::load(&params, Vec::new()).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Configuration);
        assert!(err.message.contains("model file not found"));
    }
}
