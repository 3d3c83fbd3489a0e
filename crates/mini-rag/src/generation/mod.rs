//! Answer generation with citation handling

pub mod citation;
pub mod prompt;
mod synthesizer;

pub use citation::{CitationParser, NO_ANSWER_MESSAGE};
pub use prompt::PromptBuilder;
pub use synthesizer::AnswerSynthesizer;
