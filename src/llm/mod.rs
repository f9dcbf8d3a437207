//! Language model access.
//!
//! Both model-backed stages go through the [`LanguageModel`] trait: a prompt
//! goes in, model text comes out. Parsing that text into JSON lives in
//! [`json`], so every caller applies the same defensive extraction.

mod client;
mod error;
pub mod json;

use std::time::Duration;

use async_trait::async_trait;

pub use client::OllamaClient;
pub use error::{LlmError, LlmResult};

/// A text-in, text-out language model.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Run one completion for `prompt`.
    async fn complete(&self, prompt: &str) -> LlmResult<String>;
}

/// Run one completion, failing with [`LlmError::Timeout`] past `timeout`.
pub async fn complete_within<M>(model: &M, prompt: &str, timeout: Duration) -> LlmResult<String>
where
    M: LanguageModel + ?Sized,
{
    match tokio::time::timeout(timeout, model.complete(prompt)).await {
        Ok(result) => result,
        Err(_) => Err(LlmError::Timeout(timeout.as_secs())),
    }
}
