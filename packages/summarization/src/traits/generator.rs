//! Generator trait for text generation.
//!
//! The pipeline consumes exactly one capability from the model layer:
//! turn a prompt into text within a token budget. Loading, decryption and
//! runtime tuning of the model all live behind this trait.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

use crate::error::Result;

/// Sequences at which every backend must stop generating.
pub const STOP_SEQUENCES: &[&str] = &[
    "</s>",
    "<|assistant|>",
    "<|user|>",
    "<|system|>",
    "</TEKST>",
    "[INST]",
    "[/INST]",
    "</TEKST_WAAR_HET_OM_GAAT>",
    "JOUW ANTWOORD:",
    "JOUW ANTWOORD",
];

/// Text generation capability.
///
/// Implementations wrap a specific inference engine (llama.cpp, an HTTP
/// completion server, ...) and must honor [`STOP_SEQUENCES`].
#[async_trait]
pub trait Generator: Send + Sync {
    /// Complete `prompt`, producing at most `max_tokens` new tokens.
    ///
    /// Returns the raw generated text, trimmed.
    async fn generate(&self, prompt: &str, max_tokens: usize) -> Result<String>;
}

#[async_trait]
impl<G: Generator + ?Sized> Generator for Arc<G> {
    async fn generate(&self, prompt: &str, max_tokens: usize) -> Result<String> {
        (**self).generate(prompt, max_tokens).await
    }
}

#[async_trait]
impl<G: Generator + ?Sized> Generator for &G {
    async fn generate(&self, prompt: &str, max_tokens: usize) -> Result<String> {
        (**self).generate(prompt, max_tokens).await
    }
}

#[async_trait]
impl<G: Generator + ?Sized> Generator for Box<G> {
    async fn generate(&self, prompt: &str, max_tokens: usize) -> Result<String> {
        (**self).generate(prompt, max_tokens).await
    }
}

/// A generator guarded so at most one call is in flight at a time.
///
/// Inference engines are not safe under concurrent invocation. Wrap the
/// backend once, share the wrapper (e.g. in an `Arc`) between every
/// pipeline invocation, and all calls - including a lazy model load on
/// first use - are serialized behind one lock.
pub struct SerializedGenerator<G> {
    inner: G,
    lock: Mutex<()>,
}

impl<G: Generator> SerializedGenerator<G> {
    pub fn new(inner: G) -> Self {
        Self {
            inner,
            lock: Mutex::new(()),
        }
    }

    /// Get a reference to the wrapped backend.
    pub fn inner(&self) -> &G {
        &self.inner
    }

    pub fn into_inner(self) -> G {
        self.inner
    }
}

#[async_trait]
impl<G: Generator> Generator for SerializedGenerator<G> {
    async fn generate(&self, prompt: &str, max_tokens: usize) -> Result<String> {
        let _guard = self.lock.lock().await;
        debug!(prompt_chars = prompt.len(), max_tokens, "generation lock acquired");
        self.inner.generate(prompt, max_tokens).await
    }
}
