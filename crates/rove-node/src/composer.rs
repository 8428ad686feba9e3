use rove_types::TextGenerator;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};

/// Substrings that mark a generated response as a refusal.
const REFUSAL_MARKERS: &[&str] = &["cannot", "not able"];

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ComposerConfig {
    /// Generation attempts before giving up on an item
    pub max_attempts: u32,

    /// Maximum reply length in characters
    pub max_len: usize,

    /// Token budget passed to the generator
    pub max_tokens: u32,
}

impl Default for ComposerConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            max_len: 280,
            max_tokens: 120,
        }
    }
}

/// Turns collected content into postable reply text.
///
/// The generator is untrusted: it may fail, refuse, ramble past the
/// length limit, or return nothing. The composer retries a bounded
/// number of times and otherwise reports no usable content; the item is
/// still collected, only the action is skipped.
pub struct ReplyComposer<G> {
    generator: Arc<G>,
    config: ComposerConfig,
}

impl<G: TextGenerator> ReplyComposer<G> {
    pub fn new(generator: Arc<G>) -> Self {
        Self::with_config(generator, ComposerConfig::default())
    }

    pub fn with_config(generator: Arc<G>, config: ComposerConfig) -> Self {
        Self { generator, config }
    }

    /// Compose reply text for the given source content, or `None` if no
    /// usable text could be produced within the attempt budget.
    pub async fn compose(&self, source: &str) -> Option<String> {
        for attempt in 1..=self.config.max_attempts {
            match self.generator.generate(source, self.config.max_tokens).await {
                Ok(raw) => {
                    if let Some(reply) = self.filter(&raw) {
                        return Some(reply);
                    }
                    debug!(attempt, "Generated text unusable, retrying");
                }
                Err(e) => {
                    warn!(attempt, error = %e, "Text generation failed");
                }
            }
        }
        debug!(
            attempts = self.config.max_attempts,
            "No usable reply text produced"
        );
        None
    }

    /// Reject empty, refused, and over-length responses; strip the double
    /// quotes generators like to wrap replies in.
    fn filter(&self, raw: &str) -> Option<String> {
        let cleaned = raw.trim().replace('"', "");
        if cleaned.is_empty() {
            return None;
        }
        let lower = cleaned.to_lowercase();
        if REFUSAL_MARKERS.iter().any(|marker| lower.contains(marker)) {
            return None;
        }
        if cleaned.chars().count() > self.config.max_len {
            return None;
        }
        Some(cleaned)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use rove_types::SurfaceError;
    use std::collections::VecDeque;
    use tokio::sync::Mutex;

    struct ScriptedGenerator {
        responses: Mutex<VecDeque<Result<String, SurfaceError>>>,
    }

    impl ScriptedGenerator {
        fn new(responses: Vec<Result<String, SurfaceError>>) -> Self {
            Self {
                responses: Mutex::new(responses.into()),
            }
        }
    }

    #[async_trait]
    impl TextGenerator for ScriptedGenerator {
        async fn generate(&self, _prompt: &str, _max_tokens: u32) -> Result<String, SurfaceError> {
            self.responses
                .lock()
                .await
                .pop_front()
                .unwrap_or(Ok(String::new()))
        }
    }

    fn composer(responses: Vec<Result<String, SurfaceError>>) -> ReplyComposer<ScriptedGenerator> {
        ReplyComposer::new(Arc::new(ScriptedGenerator::new(responses)))
    }

    #[tokio::test]
    async fn test_clean_response_passes_through() {
        let composer = composer(vec![Ok("nice work".to_string())]);
        assert_eq!(composer.compose("post").await.unwrap(), "nice work");
    }

    #[tokio::test]
    async fn test_quotes_are_stripped() {
        let composer = composer(vec![Ok("\"quoted reply\"".to_string())]);
        assert_eq!(composer.compose("post").await.unwrap(), "quoted reply");
    }

    #[tokio::test]
    async fn test_refusal_is_rejected_then_retried() {
        let composer = composer(vec![
            Ok("I cannot help with that".to_string()),
            Ok("I'm not able to respond".to_string()),
            Ok("a fine reply".to_string()),
        ]);
        assert_eq!(composer.compose("post").await.unwrap(), "a fine reply");
    }

    #[tokio::test]
    async fn test_empty_and_overlong_are_rejected() {
        let long = "x".repeat(281);
        let composer = composer(vec![Ok("   ".to_string()), Ok(long), Ok("ok".to_string())]);
        assert_eq!(composer.compose("post").await.unwrap(), "ok");
    }

    #[tokio::test]
    async fn test_attempt_budget_exhausts_to_none() {
        let composer = composer(vec![
            Err(SurfaceError::Transient("down".into())),
            Ok("cannot".to_string()),
            Ok(String::new()),
        ]);
        assert!(composer.compose("post").await.is_none());
    }

    #[tokio::test]
    async fn test_length_boundary_is_inclusive() {
        let exactly = "y".repeat(280);
        let composer = composer(vec![Ok(exactly.clone())]);
        assert_eq!(composer.compose("post").await.unwrap(), exactly);
    }
}
