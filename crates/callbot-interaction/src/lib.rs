//! Network collaborators of the callbot: the chat model used for scoring
//! and summaries, the outcome sink and the transcription gateway.

pub mod chat_client;
pub mod error;
mod http;
pub mod llm_judge;
pub mod llm_summarizer;
pub mod outcome_sink;
pub mod transcriber;

pub use chat_client::{ChatModel, OpenAiChatClient};
pub use error::InteractionError;
pub use llm_judge::LlmScoredJudge;
pub use llm_summarizer::LlmSummarizer;
pub use outcome_sink::HttpOutcomeSink;
pub use transcriber::HttpTranscriber;
