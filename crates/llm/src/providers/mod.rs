pub mod claude;
pub mod ollama;
pub mod openai;

use papier_core::config::{LlmConfig, OllamaConfig};

use crate::provider::{LlmError, LlmProvider};

/// Create the appropriate LLM provider based on config.
pub fn create_provider(
    llm: &LlmConfig,
    ollama: &OllamaConfig,
) -> Result<Box<dyn LlmProvider>, LlmError> {
    match llm.provider.as_str() {
        "openai" => {
            let api_key = llm
                .openai_api_key
                .as_ref()
                .ok_or_else(|| LlmError::NotConfigured("OPENAI_API_KEY not set".into()))?;
            Ok(Box::new(openai::OpenAiProvider::new(
                api_key.clone(),
                llm.openai_model.clone(),
                &llm.openai_base_url,
            )))
        }
        "anthropic" | "claude" => {
            let api_key = llm
                .anthropic_api_key
                .as_ref()
                .ok_or_else(|| LlmError::NotConfigured("ANTHROPIC_API_KEY not set".into()))?;
            Ok(Box::new(claude::ClaudeProvider::new(
                api_key.clone(),
                llm.anthropic_model.clone(),
            )))
        }
        "ollama" => Ok(Box::new(ollama::OllamaProvider::new(
            ollama.url.clone(),
            ollama.model.clone(),
        ))),
        other => Err(LlmError::NotConfigured(format!(
            "unknown LLM provider: '{}'",
            other
        ))),
    }
}
