//! Prompt templates for grounded answer generation

use crate::types::Chunk;

/// Prompt builder for RAG queries
///
/// Chunks are numbered from 1 in the order given; the same numbering is used
/// for the `[n]` markers the model is asked to emit.
pub struct PromptBuilder;

impl PromptBuilder {
    /// Build the context block from ranked chunks
    pub fn build_context(chunks: &[Chunk]) -> String {
        chunks
            .iter()
            .enumerate()
            .map(|(i, chunk)| format!("Chunk from Source [{}]:\n{}\n", i + 1, chunk.text))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Build the numbered source list
    pub fn build_sources(chunks: &[Chunk]) -> String {
        chunks
            .iter()
            .enumerate()
            .map(|(i, chunk)| format!("Source [{}]: {}", i + 1, chunk.source()))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Build the system instruction with the context and sources embedded
    pub fn build_system_prompt(chunks: &[Chunk]) -> String {
        format!(
            r#"You are a helpful assistant for a document Q&A application. Answer the user's question
based ONLY on the context below. If the answer is not available in the context, state that
you cannot find the answer. Do not make up any information.

Use inline citations in the format [source_id], for example: "The sky is blue [1]."
The source_id is the number of the source in the list below.

Context:
{context}

Sources:
{sources}"#,
            context = Self::build_context(chunks),
            sources = Self::build_sources(chunks),
        )
    }

    /// Build the user turn
    pub fn build_user_prompt(question: &str) -> String {
        format!("Question: {}", question)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunks() -> Vec<Chunk> {
        vec![
            Chunk::new("Paris is the capital of France.", "geo.pdf", 0),
            Chunk::new("Berlin is the capital of Germany.", "Pasted Text", 3),
        ]
    }

    #[test]
    fn test_context_numbering() {
        let context = PromptBuilder::build_context(&chunks());
        assert_eq!(
            context,
            "Chunk from Source [1]:\nParis is the capital of France.\n\n\
             Chunk from Source [2]:\nBerlin is the capital of Germany.\n"
        );
    }

    #[test]
    fn test_sources_list() {
        assert_eq!(
            PromptBuilder::build_sources(&chunks()),
            "Source [1]: geo.pdf\nSource [2]: Pasted Text"
        );
    }

    #[test]
    fn test_system_prompt_embeds_context() {
        let prompt = PromptBuilder::build_system_prompt(&chunks());
        assert!(prompt.contains("Chunk from Source [2]:\nBerlin"));
        assert!(prompt.contains("Source [1]: geo.pdf"));
        assert_eq!(PromptBuilder::build_user_prompt("why?"), "Question: why?");
    }

    #[test]
    fn test_empty_chunks() {
        assert_eq!(PromptBuilder::build_context(&[]), "");
        assert_eq!(PromptBuilder::build_sources(&[]), "");
    }
}
