//! Grounded answer generation with source attribution

use std::sync::Arc;

use super::citation::{CitationParser, NO_ANSWER_MESSAGE};
use super::prompt::PromptBuilder;
use crate::error::Result;
use crate::providers::ChatProvider;
use crate::types::{AnswerResult, Chunk};

/// Produces a cited answer from ranked chunks with a single model call
pub struct AnswerSynthesizer {
    chat: Arc<dyn ChatProvider>,
}

impl AnswerSynthesizer {
    pub fn new(chat: Arc<dyn ChatProvider>) -> Self {
        Self { chat }
    }

    /// Answer `query` from `chunks`, which are numbered from 1 in the given order
    pub async fn synthesize(&self, query: &str, chunks: &[Chunk]) -> Result<AnswerResult> {
        let system_prompt = PromptBuilder::build_system_prompt(chunks);
        let user_prompt = PromptBuilder::build_user_prompt(query);

        tracing::info!(
            "Generating answer from {} chunks with {} ({})",
            chunks.len(),
            self.chat.name(),
            self.chat.model()
        );
        let answer = self.chat.complete(&system_prompt, &user_prompt).await?;

        if CitationParser::is_refusal(&answer) {
            tracing::info!("Model could not answer from the provided context");
            return Ok(AnswerResult {
                answer: NO_ANSWER_MESSAGE.to_string(),
                sources: Vec::new(),
            });
        }

        let sources = CitationParser::link_sources(&answer, chunks);
        Ok(AnswerResult { answer, sources })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockChat;

    fn ranked() -> Vec<Chunk> {
        vec![
            Chunk::new("Paris is the capital of France.", "A.pdf", 0),
            Chunk::new("Berlin is the capital of Germany.", "B.pdf", 1),
        ]
    }

    #[tokio::test]
    async fn test_cited_answer() {
        let chat = Arc::new(MockChat::new("Paris is the capital [1]."));
        let synthesizer = AnswerSynthesizer::new(chat.clone());

        let result = synthesizer
            .synthesize("What is the capital of France?", &ranked())
            .await
            .unwrap();

        assert_eq!(result.answer, "Paris is the capital [1].");
        assert_eq!(result.sources.len(), 1);
        assert_eq!(result.sources[0].citation_id, 1);
        assert_eq!(result.sources[0].source, "A.pdf");

        assert_eq!(chat.calls(), 1);
        let (system, user) = chat.prompts.lock()[0].clone();
        assert!(system.contains("Source [2]: B.pdf"));
        assert_eq!(user, "Question: What is the capital of France?");
    }

    #[tokio::test]
    async fn test_refusal_overrides_markers() {
        let chat = Arc::new(MockChat::new("I cannot find that in the documents [1]."));
        let synthesizer = AnswerSynthesizer::new(chat);

        let result = synthesizer.synthesize("q", &ranked()).await.unwrap();
        assert_eq!(result.answer, NO_ANSWER_MESSAGE);
        assert!(result.sources.is_empty());
    }

    #[tokio::test]
    async fn test_uncited_answer_has_no_sources() {
        let chat = Arc::new(MockChat::new("Both are capitals [7]."));
        let synthesizer = AnswerSynthesizer::new(chat);

        let result = synthesizer.synthesize("q", &ranked()).await.unwrap();
        assert_eq!(result.answer, "Both are capitals [7].");
        assert!(result.sources.is_empty());
    }

    #[tokio::test]
    async fn test_no_chunks_still_calls_model() {
        let chat = Arc::new(MockChat::new("Nothing to say."));
        let synthesizer = AnswerSynthesizer::new(chat.clone());

        let result = synthesizer.synthesize("q", &[]).await.unwrap();
        assert!(result.sources.is_empty());
        assert_eq!(chat.calls(), 1);
    }
}
