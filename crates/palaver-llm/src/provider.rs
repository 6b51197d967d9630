//! Uniform backend contracts

use crate::error::LlmResult;
use crate::settings::CompletionSettings;
use async_trait::async_trait;
use futures::stream::{self, BoxStream, StreamExt};
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

/// One completed generation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionResult {
    pub text: String,
}

/// One embedding
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbeddingVector {
    pub values: Vec<f32>,
}

/// Stream of completion results
pub type CompletionStream = BoxStream<'static, LlmResult<CompletionResult>>;

/// Uniform text completion contract.
///
/// All backends (remote HTTP APIs, local inference engines) are exposed
/// through this trait. Implementations are constructed once and reused;
/// every per-call value (request body, resolved settings) is call-local,
/// so a shared instance is safe under concurrent calls.
#[async_trait]
pub trait TextCompletion: Send + Sync {
    /// Generate completions for `text`, eagerly collected.
    ///
    /// The token governs only the in-flight backend wait; once response
    /// interpretation begins, cancellation has no effect on the call's
    /// outcome.
    async fn complete(
        &self,
        text: &str,
        settings: &CompletionSettings,
        cancel: &CancellationToken,
    ) -> LlmResult<Vec<CompletionResult>>;

    /// Streaming-shaped variant of [`complete`].
    ///
    /// The sequence may be consumed lazily, but the full response is
    /// retrieved before the first element is produced: with the current
    /// backends this is a one-element stream, not a token-by-token
    /// stream. Backends whose engines genuinely stream could override
    /// this to forward increments directly; none do today.
    ///
    /// [`complete`]: TextCompletion::complete
    async fn complete_stream(
        &self,
        text: &str,
        settings: &CompletionSettings,
        cancel: &CancellationToken,
    ) -> LlmResult<CompletionStream> {
        let results = self.complete(text, settings, cancel).await?;
        Ok(stream::iter(results.into_iter().map(Ok)).boxed())
    }
}

/// Uniform text embedding contract
#[async_trait]
pub trait TextEmbedding: Send + Sync {
    /// Embed `items` as one vector.
    ///
    /// All items are collapsed into a single text before embedding, so
    /// exactly one vector is produced regardless of item count. This is
    /// a limitation of the wrapped backend's request shape; use
    /// [`embed_each`] for per-item vectors.
    ///
    /// [`embed_each`]: TextEmbedding::embed_each
    async fn embed(
        &self,
        items: &[String],
        cancel: &CancellationToken,
    ) -> LlmResult<EmbeddingVector>;

    /// Embed each item independently, one backend call per item.
    async fn embed_each(
        &self,
        items: &[String],
        cancel: &CancellationToken,
    ) -> LlmResult<Vec<EmbeddingVector>> {
        let mut vectors = Vec::with_capacity(items.len());
        for item in items {
            vectors.push(self.embed(std::slice::from_ref(item), cancel).await?);
        }
        Ok(vectors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LlmError;
    use futures::StreamExt;

    struct FixedCompletion(String);

    #[async_trait]
    impl TextCompletion for FixedCompletion {
        async fn complete(
            &self,
            _text: &str,
            _settings: &CompletionSettings,
            _cancel: &CancellationToken,
        ) -> LlmResult<Vec<CompletionResult>> {
            Ok(vec![CompletionResult {
                text: self.0.clone(),
            }])
        }
    }

    struct FixedEmbedding;

    #[async_trait]
    impl TextEmbedding for FixedEmbedding {
        async fn embed(
            &self,
            items: &[String],
            _cancel: &CancellationToken,
        ) -> LlmResult<EmbeddingVector> {
            Ok(EmbeddingVector {
                values: vec![items.len() as f32],
            })
        }
    }

    struct FailingEmbedding;

    #[async_trait]
    impl TextEmbedding for FailingEmbedding {
        async fn embed(
            &self,
            _items: &[String],
            _cancel: &CancellationToken,
        ) -> LlmResult<EmbeddingVector> {
            Err(LlmError::unknown("backend down"))
        }
    }

    #[tokio::test]
    async fn default_stream_yields_the_collected_results() {
        let backend = FixedCompletion("hello".to_string());
        let stream = backend
            .complete_stream("hi", &CompletionSettings::default(), &CancellationToken::new())
            .await
            .unwrap();

        let collected: Vec<_> = stream.collect().await;
        assert_eq!(collected.len(), 1);
        assert_eq!(collected[0].as_ref().unwrap().text, "hello");
    }

    #[tokio::test]
    async fn embed_each_issues_one_call_per_item() {
        let items = vec!["a".to_string(), "b".to_string(), "c".to_string()];
        let vectors = FixedEmbedding
            .embed_each(&items, &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(vectors.len(), 3);
        // Each call saw a single-item slice.
        assert!(vectors.iter().all(|v| v.values == vec![1.0]));
    }

    #[tokio::test]
    async fn embed_each_stops_at_the_first_failure() {
        let items = vec!["a".to_string()];
        let err = FailingEmbedding
            .embed_each(&items, &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(err.message.contains("backend down"));
    }
}
