//! Scripted offline LLM client.
//!
//! Counts every call and records the requests it receives, so callers can
//! assert that a code path made no provider call at all.

use crate::client::{LlmClient, LlmRequest, LlmResponse, LlmUsage};
use guide_core::{AppError, AppResult};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

const DEFAULT_REPLY: &str = "This is a placeholder answer from the offline mock provider.";

/// What the mock does on a call.
#[derive(Debug, Clone)]
pub enum MockBehavior {
    /// Return the given text.
    Reply(String),
    /// Fail with an `AppError::Llm` carrying the message.
    Fail(String),
    /// Sleep before replying; used to trip caller timeouts.
    Delay(Duration, String),
}

/// Mock LLM client.
///
/// Scripted behaviors are consumed in order; once the script is exhausted
/// every call uses the fallback behavior.
pub struct MockClient {
    fallback: MockBehavior,
    script: Mutex<VecDeque<MockBehavior>>,
    calls: AtomicUsize,
    requests: Mutex<Vec<LlmRequest>>,
}

impl MockClient {
    pub fn new() -> Self {
        Self::with_behavior(MockBehavior::Reply(DEFAULT_REPLY.to_string()))
    }

    pub fn with_behavior(fallback: MockBehavior) -> Self {
        Self {
            fallback,
            script: Mutex::new(VecDeque::new()),
            calls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Always answer with `text`.
    pub fn replying(text: impl Into<String>) -> Self {
        Self::with_behavior(MockBehavior::Reply(text.into()))
    }

    /// Always fail.
    pub fn failing(message: impl Into<String>) -> Self {
        Self::with_behavior(MockBehavior::Fail(message.into()))
    }

    /// Sleep far longer than any sane timeout.
    pub fn hanging() -> Self {
        Self::with_behavior(MockBehavior::Delay(
            Duration::from_secs(3600),
            String::new(),
        ))
    }

    /// Queue a one-shot behavior ahead of the fallback.
    pub fn push(&self, behavior: MockBehavior) -> &Self {
        self.script
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push_back(behavior);
        self
    }

    /// Number of `complete` calls made so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Copies of every request received.
    pub fn requests(&self) -> Vec<LlmRequest> {
        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    fn next_behavior(&self) -> MockBehavior {
        self.script
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .pop_front()
            .unwrap_or_else(|| self.fallback.clone())
    }
}

impl Default for MockClient {
    fn default() -> Self {
        Self::new()
    }
}

fn reply(request: &LlmRequest, text: String) -> LlmResponse {
    let completion = text.split_whitespace().count() as u32;
    let prompt = request.prompt.split_whitespace().count() as u32;
    LlmResponse {
        content: text,
        model: request.model.clone(),
        usage: LlmUsage::new(prompt, completion),
        finish_reason: Some("STOP".to_string()),
    }
}

#[async_trait::async_trait]
impl LlmClient for MockClient {
    fn provider_name(&self) -> &str {
        "mock"
    }

    async fn complete(&self, request: &LlmRequest) -> AppResult<LlmResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(request.clone());

        match self.next_behavior() {
            MockBehavior::Reply(text) => Ok(reply(request, text)),
            MockBehavior::Fail(message) => Err(AppError::Llm(message)),
            MockBehavior::Delay(delay, text) => {
                tokio::time::sleep(delay).await;
                Ok(reply(request, text))
            }
        }
    }
}
