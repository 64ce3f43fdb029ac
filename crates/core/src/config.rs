use std::env;

use serde::{Deserialize, Serialize};

/// Load .env file (silently ignores if missing).
pub fn load_dotenv() {
    dotenvy::dotenv().ok();
}

fn env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|s| !s.is_empty())
}

/// Read a profiled env var: tries {PROFILE}_{KEY} first, falls back to {KEY}.
fn profiled_env_opt(profile: &str, key: &str) -> Option<String> {
    if !profile.is_empty() {
        let prefixed = format!("{}_{}", profile, key);
        if let Some(v) = env_opt(&prefixed) {
            return Some(v);
        }
    }
    env_opt(key)
}

fn profiled_env_or(profile: &str, key: &str, default: &str) -> String {
    profiled_env_opt(profile, key).unwrap_or_else(|| default.to_string())
}

fn profiled_env_usize(profile: &str, key: &str, default: usize) -> usize {
    profiled_env_opt(profile, key)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn profiled_env_u64(profile: &str, key: &str, default: u64) -> u64 {
    profiled_env_opt(profile, key)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn profiled_env_u32(profile: &str, key: &str, default: u32) -> u32 {
    profiled_env_opt(profile, key)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

// ── Top-level config ──────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Active profile name (empty = default).
    pub profile: String,
    pub chunking: ChunkingConfig,
    pub embedding: EmbeddingConfig,
    pub llm: LlmConfig,
    pub ollama: OllamaConfig,
    pub retrieval: RetrievalConfig,
    pub store: StoreConfig,
    pub ingest: IngestConfig,
}

/// Well-known env keys that identify a profile when prefixed.
const PROFILE_MARKER_KEYS: &[&str] = &[
    "OPENAI_API_KEY",
    "ANTHROPIC_API_KEY",
    "OLLAMA_URL",
    "EMBEDDING_MODEL",
];

impl Config {
    /// Build config from environment variables (call `load_dotenv()` first).
    /// Profile is read from `PAPIER_PROFILE`. When set (e.g. `PROD`), every
    /// key is first looked up as `{PROFILE}_{KEY}`, falling back to `{KEY}`.
    pub fn from_env() -> Self {
        let profile = profiled_env_or("", "PAPIER_PROFILE", "").to_uppercase();
        Self::for_profile(&profile)
    }

    /// Build config for a specific named profile (empty string = default).
    pub fn for_profile(profile: &str) -> Self {
        let p = profile.to_uppercase();
        let p = p.as_str();
        Self {
            profile: p.to_string(),
            chunking: ChunkingConfig::from_env_profiled(p),
            embedding: EmbeddingConfig::from_env_profiled(p),
            llm: LlmConfig::from_env_profiled(p),
            ollama: OllamaConfig::from_env_profiled(p),
            retrieval: RetrievalConfig::from_env_profiled(p),
            store: StoreConfig::from_env_profiled(p),
            ingest: IngestConfig::from_env_profiled(p),
        }
    }

    /// Discover available profiles by scanning env vars for `{PREFIX}_{MARKER_KEY}` patterns.
    /// Always includes "default" (the unprefixed config).
    pub fn available_profiles() -> Vec<String> {
        let mut profiles = std::collections::BTreeSet::new();
        profiles.insert("default".to_string());

        for (key, _) in env::vars() {
            for marker in PROFILE_MARKER_KEYS {
                if let Some(prefix) = key.strip_suffix(&format!("_{}", marker)) {
                    if !prefix.is_empty()
                        && prefix.chars().all(|c| c.is_ascii_uppercase() || c == '_')
                    {
                        profiles.insert(prefix.to_string());
                    }
                }
            }
        }

        profiles.into_iter().collect()
    }

    pub fn profile_label(&self) -> &str {
        if self.profile.is_empty() { "default" } else { &self.profile }
    }

    /// Print a redacted summary for startup logs.
    pub fn log_summary(&self) {
        tracing::info!("Config loaded (profile: {}):", self.profile_label());
        tracing::info!(
            "  chunking:   chunk_size={}, chunk_overlap={}",
            self.chunking.chunk_size,
            self.chunking.chunk_overlap
        );
        tracing::info!(
            "  embedding:  provider={}, model={}, dimensions={}",
            self.embedding.provider,
            self.embedding.model,
            self.embedding.dimensions
        );
        tracing::info!("  llm:        provider={}", self.llm.provider);
        tracing::info!("  ollama:     url={}", self.ollama.url);
        tracing::info!("  retrieval:  top_k={}", self.retrieval.top_k);
        tracing::info!("  store:      backend={}", self.store.backend);
        tracing::info!("  ingest:     max_file_bytes={}", self.ingest.max_file_bytes);
    }

    /// Return a redacted view safe for display (no secrets).
    pub fn redacted_summary(&self) -> serde_json::Value {
        serde_json::json!({
            "profile": self.profile_label(),
            "chunking": {
                "chunk_size": self.chunking.chunk_size,
                "chunk_overlap": self.chunking.chunk_overlap,
            },
            "embedding": {
                "provider": self.embedding.provider,
                "model": self.embedding.model,
                "dimensions": self.embedding.dimensions,
                "configured": self.embedding.is_configured(),
            },
            "llm": {
                "provider": self.llm.provider,
                "configured": self.llm.is_configured(),
            },
            "ollama": { "url": self.ollama.url, "model": self.ollama.model },
            "retrieval": { "top_k": self.retrieval.top_k },
            "store": { "backend": self.store.backend },
            "ingest": { "max_file_bytes": self.ingest.max_file_bytes },
        })
    }
}

// ── Chunking ──────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkingConfig {
    /// Maximum tokens per chunk.
    pub chunk_size: usize,
    /// Tokens of trailing content carried into the next chunk.
    pub chunk_overlap: usize,
}

impl ChunkingConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            chunk_size: profiled_env_usize(p, "CHUNK_SIZE", 500),
            chunk_overlap: profiled_env_usize(p, "CHUNK_OVERLAP", 50),
        }
    }
}

// ── Embedding ─────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    /// "openai" (any OpenAI-compatible endpoint) or "ollama".
    pub provider: String,
    pub model: String,
    pub api_key: Option<String>,
    pub base_url: String,
    pub dimensions: usize,
    /// Entries kept in the in-process embedding cache.
    pub cache_size: usize,
}

impl EmbeddingConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            provider: profiled_env_or(p, "EMBEDDING_PROVIDER", "openai"),
            model: profiled_env_or(p, "EMBEDDING_MODEL", "text-embedding-3-small"),
            api_key: profiled_env_opt(p, "OPENAI_API_KEY"),
            base_url: profiled_env_or(p, "OPENAI_BASE_URL", "https://api.openai.com/v1"),
            dimensions: profiled_env_usize(p, "EMBEDDING_DIMENSIONS", 1536),
            cache_size: profiled_env_usize(p, "EMBEDDING_CACHE_SIZE", 10_000),
        }
    }

    pub fn is_configured(&self) -> bool {
        match self.provider.as_str() {
            "openai" => self.api_key.is_some(),
            "ollama" => true,
            _ => false,
        }
    }
}

// ── LLM (OpenAI-compatible / Anthropic / Ollama) ──────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// "openai", "anthropic", "ollama"
    pub provider: String,
    pub openai_api_key: Option<String>,
    pub openai_model: String,
    pub openai_base_url: String,
    pub anthropic_api_key: Option<String>,
    pub anthropic_model: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl LlmConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            provider: profiled_env_or(p, "LLM_PROVIDER", "openai"),
            openai_api_key: profiled_env_opt(p, "OPENAI_API_KEY"),
            openai_model: profiled_env_or(p, "LLM_MODEL", "gpt-4o-mini"),
            openai_base_url: profiled_env_or(p, "OPENAI_BASE_URL", "https://api.openai.com/v1"),
            anthropic_api_key: profiled_env_opt(p, "ANTHROPIC_API_KEY"),
            anthropic_model: profiled_env_or(p, "ANTHROPIC_MODEL", "claude-3-5-sonnet-latest"),
            temperature: profiled_env_or(p, "LLM_TEMPERATURE", "0.7")
                .parse()
                .unwrap_or(0.7),
            max_tokens: profiled_env_u32(p, "LLM_MAX_TOKENS", 1000),
        }
    }

    pub fn is_configured(&self) -> bool {
        match self.provider.as_str() {
            "openai" => self.openai_api_key.is_some(),
            "anthropic" => self.anthropic_api_key.is_some(),
            "ollama" => true,
            _ => false,
        }
    }
}

// ── Ollama (local models) ─────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OllamaConfig {
    pub url: String,
    pub model: String,
    pub embedding_model: String,
}

impl OllamaConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            url: profiled_env_or(p, "OLLAMA_URL", "http://localhost:11434"),
            model: profiled_env_or(p, "OLLAMA_MODEL", "llama3.2"),
            embedding_model: profiled_env_or(p, "OLLAMA_EMBEDDING_MODEL", "nomic-embed-text"),
        }
    }
}

// ── Retrieval ─────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    /// Default number of chunks retrieved per query.
    pub top_k: usize,
}

impl RetrievalConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            top_k: profiled_env_usize(p, "TOP_K_RESULTS", 5),
        }
    }
}

// ── Vector store ──────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Vector store backend ("memory").
    pub backend: String,
}

impl StoreConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            backend: profiled_env_or(p, "VECTOR_STORE", "memory"),
        }
    }
}

// ── Ingest limits ─────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestConfig {
    /// Maximum accepted upload size in bytes.
    pub max_file_bytes: u64,
}

impl IngestConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            max_file_bytes: profiled_env_u64(p, "MAX_UPLOAD_BYTES", 50 * 1024 * 1024),
        }
    }
}
