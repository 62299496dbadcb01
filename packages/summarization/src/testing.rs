//! Testing utilities including a mock generator.
//!
//! Useful for testing code that drives the summarization pipeline without
//! loading a model or running an inference server.

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};
use std::time::Duration;

use crate::error::{Result, SummarizationError};
use crate::traits::generator::Generator;

/// A mock generator for testing.
///
/// Responses are scripted by prompt substring (first registered match
/// wins), falling back to a default. Every call is recorded, including
/// calls that were made to fail.
#[derive(Default)]
pub struct MockGenerator {
    /// Scripted responses: (prompt substring, response)
    responses: Arc<RwLock<Vec<(String, String)>>>,

    /// Response when no substring matches
    default_response: String,

    /// Number of upcoming calls that fail
    fail_remaining: AtomicUsize,

    /// Calls whose prompt contains one of these fail
    fail_markers: Vec<String>,

    /// Simulated latency per call
    delay: Option<Duration>,

    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,

    /// Call tracking for assertions
    calls: Arc<RwLock<Vec<MockGeneratorCall>>>,
}

/// Record of a call made to the mock generator.
#[derive(Debug, Clone)]
pub struct MockGeneratorCall {
    pub prompt: String,
    /// Prompt length in characters
    pub prompt_len: usize,
    pub max_tokens: usize,
}

impl MockGenerator {
    /// Create a new mock generator that answers every prompt with "".
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer prompts containing `needle` with `response`.
    pub fn with_response(self, needle: impl Into<String>, response: impl Into<String>) -> Self {
        self.responses
            .write()
            .unwrap()
            .push((needle.into(), response.into()));
        self
    }

    pub fn with_default_response(mut self, response: impl Into<String>) -> Self {
        self.default_response = response.into();
        self
    }

    /// Fail the next `n` calls with a generation error.
    pub fn fail_first(self, n: usize) -> Self {
        self.fail_remaining.store(n, Ordering::SeqCst);
        self
    }

    /// Fail every call whose prompt contains `marker`.
    pub fn fail_when_contains(mut self, marker: impl Into<String>) -> Self {
        self.fail_markers.push(marker.into());
        self
    }

    /// Sleep this long inside every call.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Get all calls made to this mock.
    pub fn calls(&self) -> Vec<MockGeneratorCall> {
        self.calls.read().unwrap().clone()
    }

    /// Clear call history.
    pub fn clear_calls(&self) {
        self.calls.write().unwrap().clear();
    }

    /// Highest number of calls observed in flight at the same time.
    pub fn max_concurrent_calls(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    fn should_fail(&self, prompt: &str) -> bool {
        let scheduled = self
            .fail_remaining
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        scheduled || self.fail_markers.iter().any(|m| prompt.contains(m.as_str()))
    }

    fn response_for(&self, prompt: &str) -> String {
        self.responses
            .read()
            .unwrap()
            .iter()
            .find(|(needle, _)| prompt.contains(needle.as_str()))
            .map(|(_, response)| response.clone())
            .unwrap_or_else(|| self.default_response.clone())
    }
}

#[async_trait]
impl Generator for MockGenerator {
    async fn generate(&self, prompt: &str, max_tokens: usize) -> Result<String> {
        self.calls.write().unwrap().push(MockGeneratorCall {
            prompt: prompt.to_string(),
            prompt_len: prompt.chars().count(),
            max_tokens,
        });

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if self.should_fail(prompt) {
            return Err(SummarizationError::generation("mock generation failure"));
        }
        Ok(self.response_for(prompt))
    }
}
