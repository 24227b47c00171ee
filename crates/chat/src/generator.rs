//! Answer generation over the hosted model.
//!
//! Every call is bounded by a timeout and retried at most once.

use crate::text::truncate_words;
use guide_core::config::LlmSettings;
use guide_core::{AppError, AppResult};
use guide_llm::{LlmClient, LlmRequest};
use guide_prompt::BuiltPrompt;
use std::sync::Arc;
use std::time::Duration;

#[derive(Clone)]
pub struct AnswerGenerator {
    client: Arc<dyn LlmClient>,
    model: String,
    temperature: f32,
    max_output_tokens: u32,
    timeout: Duration,
    max_retries: u32,
    backoff: Duration,
    word_limit: usize,
}

impl std::fmt::Debug for AnswerGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnswerGenerator")
            .field("provider", &self.client.provider_name())
            .field("model", &self.model)
            .field("timeout", &self.timeout)
            .field("max_retries", &self.max_retries)
            .finish()
    }
}

impl AnswerGenerator {
    pub fn new(client: Arc<dyn LlmClient>, settings: &LlmSettings) -> Self {
        Self {
            client,
            model: settings.model.clone(),
            temperature: settings.temperature,
            max_output_tokens: settings.max_output_tokens,
            timeout: Duration::from_secs(settings.timeout_secs.max(1)),
            max_retries: settings.max_retries.min(1),
            backoff: Duration::from_millis(settings.retry_backoff_ms),
            word_limit: settings.answer_word_limit,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_backoff(mut self, backoff: Duration) -> Self {
        self.backoff = backoff;
        self
    }

    pub fn provider_name(&self) -> &str {
        self.client.provider_name()
    }

    /// Generate a user-facing answer, capped at the configured word limit.
    pub async fn generate(&self, prompt: &BuiltPrompt) -> AppResult<String> {
        let text = self.generate_raw(prompt).await?;
        Ok(truncate_words(&text, self.word_limit))
    }

    /// Generate without the word cap (used for intent labels).
    pub async fn generate_raw(&self, prompt: &BuiltPrompt) -> AppResult<String> {
        let request = LlmRequest::new(prompt.user.clone(), self.model.clone())
            .with_system(prompt.system.clone())
            .with_sampling(self.temperature, self.max_output_tokens);

        let attempts = 1 + self.max_retries;
        let mut last_error = String::new();

        for attempt in 1..=attempts {
            match self.attempt(&request).await {
                Ok(text) => {
                    tracing::debug!(attempt, chars = text.len(), "Generation succeeded");
                    return Ok(text);
                }
                Err(e) => {
                    tracing::warn!("Generation attempt {}/{} failed: {}", attempt, attempts, e);
                    last_error = e;
                    if attempt < attempts {
                        tokio::time::sleep(self.backoff).await;
                    }
                }
            }
        }

        Err(AppError::Generation(format!(
            "{} failed after {} attempt(s): {}",
            self.client.provider_name(),
            attempts,
            last_error
        )))
    }

    async fn attempt(&self, request: &LlmRequest) -> Result<String, String> {
        let response = tokio::time::timeout(self.timeout, self.client.complete(request))
            .await
            .map_err(|_| format!("timed out after {:?}", self.timeout))?
            .map_err(|e| e.to_string())?;

        let text = response.content.trim();
        if text.is_empty() {
            return Err("model returned an empty answer".to_string());
        }
        Ok(text.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use guide_llm::{MockBehavior, MockClient};
    use guide_prompt::BuiltPromptMetadata;

    fn prompt() -> BuiltPrompt {
        BuiltPrompt {
            system: Some("You are a guide.".to_string()),
            user: "Question: where is Hundru Falls?".to_string(),
            metadata: BuiltPromptMetadata::default(),
        }
    }

    fn generator(client: Arc<MockClient>) -> AnswerGenerator {
        AnswerGenerator::new(client, &LlmSettings::default())
            .with_timeout(Duration::from_millis(50))
            .with_backoff(Duration::from_millis(1))
    }

    #[tokio::test]
    async fn test_generate_passes_system_and_user() {
        let client = Arc::new(MockClient::replying("Hundru Falls is near Ranchi."));
        let answer = generator(client.clone()).generate(&prompt()).await.unwrap();

        assert_eq!(answer, "Hundru Falls is near Ranchi.");
        let requests = client.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].system.as_deref(), Some("You are a guide."));
        assert!(requests[0].prompt.contains("Hundru"));
    }

    #[tokio::test]
    async fn test_timeout_fails_after_two_attempts() {
        let client = Arc::new(MockClient::hanging());
        let err = generator(client.clone()).generate(&prompt()).await.unwrap_err();

        assert!(matches!(err, AppError::Generation(_)));
        assert_eq!(client.calls(), 2);
    }

    #[tokio::test]
    async fn test_retry_recovers_from_one_failure() {
        let client = Arc::new(MockClient::replying("Recovered."));
        client.push(MockBehavior::Fail("503 Service Unavailable".to_string()));

        let answer = generator(client.clone()).generate(&prompt()).await.unwrap();
        assert_eq!(answer, "Recovered.");
        assert_eq!(client.calls(), 2);
    }

    #[tokio::test]
    async fn test_retries_clamped_to_one() {
        let settings = LlmSettings {
            max_retries: 5,
            ..LlmSettings::default()
        };
        let client = Arc::new(MockClient::failing("quota exceeded"));
        let generator = AnswerGenerator::new(client.clone(), &settings)
            .with_backoff(Duration::from_millis(1));

        assert!(generator.generate(&prompt()).await.is_err());
        assert_eq!(client.calls(), 2);
    }

    #[tokio::test]
    async fn test_empty_answer_is_an_error() {
        let client = Arc::new(MockClient::replying("   "));
        let err = generator(client).generate(&prompt()).await.unwrap_err();
        assert_eq!(err.kind(), "generation");
    }

    #[tokio::test]
    async fn test_answer_capped_at_word_limit() {
        let settings = LlmSettings {
            answer_word_limit: 3,
            ..LlmSettings::default()
        };
        let client = Arc::new(MockClient::replying("one two three four five"));
        let generator = AnswerGenerator::new(client, &settings);

        let answer = generator.generate(&prompt()).await.unwrap();
        assert_eq!(answer, "one two three...");
    }
}
