//! LLM providers and grounded answer generation.

pub mod answer;
pub mod provider;
pub mod providers;

pub use answer::{build_rag_prompt, Answerer};
pub use provider::{LlmError, LlmProvider, Message, Role};
pub use providers::create_provider;
