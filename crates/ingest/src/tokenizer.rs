//! Token counting for chunk sizing.

use once_cell::sync::Lazy;
use tiktoken_rs::{cl100k_base, CoreBPE};

/// Deterministic token counting used for all sizing decisions.
///
/// Counts must be identical across calls for identical input. Nothing here
/// assumes counts are additive across concatenation; callers that join
/// fragments recount the joined text.
pub trait TokenCounter: Send + Sync {
    fn count_tokens(&self, text: &str) -> usize;
}

// Shared BPE instance -- loading the vocabulary is expensive.
static CL100K: Lazy<CoreBPE> =
    Lazy::new(|| cl100k_base().expect("failed to load cl100k_base tokenizer"));

/// cl100k_base BPE counting, the vocabulary of the OpenAI embedding and
/// chat model families.
#[derive(Debug, Clone, Copy, Default)]
pub struct Cl100kTokenizer;

impl TokenCounter for Cl100kTokenizer {
    fn count_tokens(&self, text: &str) -> usize {
        CL100K.encode_with_special_tokens(text).len()
    }
}
