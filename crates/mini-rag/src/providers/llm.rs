//! Chat model provider trait for generating answers

use async_trait::async_trait;
use crate::error::Result;

/// Trait for single-shot chat completion
///
/// Implementations:
/// - `GeminiChat`: Google Generative Language API (gemini-1.5-flash)
#[async_trait]
pub trait ChatProvider: Send + Sync {
    /// Complete one system + user exchange, returning the model text
    async fn complete(&self, system_prompt: &str, user_prompt: &str) -> Result<String>;

    /// Get provider name for logging
    fn name(&self) -> &str;

    /// Get the model being used
    fn model(&self) -> &str;
}
