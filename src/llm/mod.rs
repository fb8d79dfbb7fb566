// Summarization service abstraction layer

pub mod groq;
pub mod provider;

pub use provider::{CompletionAdapter, CompletionRequest, SummaryClient, DEFAULT_SYSTEM_ROLE};
