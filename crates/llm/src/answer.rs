use papier_core::config::{LlmConfig, OllamaConfig};
use tracing::debug;

use crate::provider::{LlmError, LlmProvider, Message, Role};
use crate::providers::create_provider;

/// Turns a question plus retrieved chunks into a grounded answer.
pub struct Answerer {
    provider: Box<dyn LlmProvider>,
    temperature: f32,
    max_tokens: u32,
}

impl Answerer {
    pub fn new(provider: Box<dyn LlmProvider>, temperature: f32, max_tokens: u32) -> Self {
        Self {
            provider,
            temperature,
            max_tokens,
        }
    }

    /// Build from config, creating the appropriate provider.
    pub fn from_config(llm: &LlmConfig, ollama: &OllamaConfig) -> Result<Self, LlmError> {
        let provider = create_provider(llm, ollama)?;
        Ok(Self::new(provider, llm.temperature, llm.max_tokens))
    }

    /// Generate an answer grounded in the given context texts.
    pub async fn answer(&self, question: &str, contexts: &[String]) -> Result<String, LlmError> {
        let prompt = build_rag_prompt(question, contexts);
        debug!(contexts = contexts.len(), "sending RAG prompt");

        let messages = vec![Message {
            role: Role::User,
            content: prompt,
        }];

        self.provider
            .complete(messages, self.temperature, self.max_tokens)
            .await
    }
}

/// Prompt layout: numbered context blocks, the question, and instructions
/// that keep the model grounded in the retrieved text.
pub fn build_rag_prompt(question: &str, contexts: &[String]) -> String {
    let context_text = contexts
        .iter()
        .enumerate()
        .map(|(i, ctx)| format!("Context {}:\n{}", i + 1, ctx))
        .collect::<Vec<_>>()
        .join("\n\n");

    format!(
        r#"You are a helpful AI assistant. Answer the user's question based on the provided context documents.

Context Documents:
{context_text}

User Question: {question}

Instructions:
- Answer based primarily on the provided context
- If the context doesn't contain enough information, say so
- Be concise and accurate
- Cite which context(s) you used if relevant

Answer:"#
    )
}
