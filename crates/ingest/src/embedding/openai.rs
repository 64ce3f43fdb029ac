use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::traits::{Embedder, EmbeddingError};

/// Backend for the OpenAI `/embeddings` endpoint. Any OpenAI-compatible
/// server works by pointing the base URL at it; the URL is expected to
/// include the version path (e.g. `https://api.openai.com/v1`).
pub struct OpenAiEmbedder {
    client: Client,
    api_key: String,
    model: String,
    endpoint: String,
    dimensions: usize,
}

impl OpenAiEmbedder {
    pub fn new(api_key: String, model: String, base_url: &str, dimensions: usize) -> Self {
        Self {
            // Large batches of long chunks can take a while.
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(120))
                .build()
                .unwrap_or_else(|_| Client::new()),
            api_key,
            model,
            endpoint: format!("{}/embeddings", base_url.trim_end_matches('/')),
            dimensions,
        }
    }
}

#[derive(Serialize)]
struct EmbedRequest {
    model: String,
    input: Vec<String>,
}

#[derive(Deserialize)]
struct EmbedResponse {
    data: Vec<EmbedItem>,
}

#[derive(Deserialize)]
struct EmbedItem {
    embedding: Vec<f32>,
    index: usize,
}

#[async_trait]
impl Embedder for OpenAiEmbedder {
    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        let request = EmbedRequest {
            model: self.model.clone(),
            input: texts.iter().map(|t| t.to_string()).collect(),
        };

        let response = self
            .client
            .post(&self.endpoint)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(EmbeddingError::Api(format!("{status}: {body}")));
        }

        let mut parsed: EmbedResponse = response.json().await?;

        // The API does not guarantee response order; the index field does.
        parsed.data.sort_by_key(|item| item.index);

        let embeddings: Vec<Vec<f32>> = parsed.data.into_iter().map(|item| item.embedding).collect();

        if let Some(first) = embeddings.first() {
            if first.len() != self.dimensions {
                return Err(EmbeddingError::DimensionMismatch {
                    expected: self.dimensions,
                    actual: first.len(),
                });
            }
        }

        Ok(embeddings)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_handles_trailing_slash() {
        let a = OpenAiEmbedder::new("k".into(), "m".into(), "https://api.openai.com/v1", 4);
        let b = OpenAiEmbedder::new("k".into(), "m".into(), "https://api.openai.com/v1/", 4);
        assert_eq!(a.endpoint, "https://api.openai.com/v1/embeddings");
        assert_eq!(a.endpoint, b.endpoint);
    }
}
