//! Greedy sentence accumulation with backward overlap seeding.

use std::sync::Arc;

use super::segment;
use super::types::{Chunk, ChunkError, ChunkerConfig};
use crate::tokenizer::TokenCounter;

/// Token-bounded chunking over sentence boundaries.
///
/// One instance is shared per pipeline; `chunk` is a pure function of its
/// input and the configuration, safe to call from concurrent tasks.
pub struct TextChunker {
    config: ChunkerConfig,
    counter: Arc<dyn TokenCounter>,
}

impl TextChunker {
    /// Rejects configurations that cannot hold any content
    /// (`ChunkError::InvalidChunkSize`).
    pub fn new(config: ChunkerConfig, counter: Arc<dyn TokenCounter>) -> Result<Self, ChunkError> {
        config.validate()?;
        Ok(Self { config, counter })
    }

    /// Split `text` into ordered, token-bounded chunks with overlap.
    ///
    /// Empty or whitespace-only input produces no chunks. The accumulator is
    /// two locals threaded through a single pass: the open chunk's fragments
    /// and their additive token total. Packing decisions use the additive
    /// total; each emitted chunk's `token_count` is recounted on the joined
    /// text so the stored number is exact.
    pub fn chunk(&self, text: &str) -> Vec<Chunk> {
        let size = self.config.chunk_size;
        let sentences = segment::split_sentences(&segment::normalize(text));

        let mut chunks: Vec<Chunk> = Vec::new();
        let mut open: Vec<String> = Vec::new();
        let mut open_tokens = 0usize;

        for sentence in sentences {
            let sentence_tokens = self.counter.count_tokens(&sentence);

            if sentence_tokens > size {
                // The sentence alone exceeds the budget: flush whatever is
                // open, then pack the sentence's words. Overlap seeding does
                // not run in this branch.
                if !open.is_empty() {
                    self.emit(&mut chunks, &open);
                    open.clear();
                    open_tokens = 0;
                }
                let (group, group_tokens) = self.pack_words(&sentence, &mut chunks);
                if !group.is_empty() {
                    open = group;
                    open_tokens = group_tokens;
                }
            } else if open_tokens + sentence_tokens > size {
                // Flush, then seed the next chunk with trailing fragments of
                // the flushed one, capped at `chunk_overlap` tokens.
                self.emit(&mut chunks, &open);
                let (mut seeded, seeded_tokens) = self.overlap_tail(&open);
                seeded.push(sentence);
                open = seeded;
                open_tokens = seeded_tokens + sentence_tokens;
            } else {
                open.push(sentence);
                open_tokens += sentence_tokens;
            }
        }

        if !open.is_empty() {
            self.emit(&mut chunks, &open);
        }

        for (i, chunk) in chunks.iter_mut().enumerate() {
            chunk.index = i;
        }
        chunks
    }

    /// Join fragments with single spaces and emit, recounting tokens on the
    /// joined text.
    fn emit(&self, out: &mut Vec<Chunk>, fragments: &[String]) {
        let text = fragments.join(" ");
        let token_count = self.counter.count_tokens(&text);
        out.push(Chunk {
            index: 0, // assigned after the full pass
            text,
            token_count,
        });
    }

    /// Greedily pack the words of an oversized sentence into groups capped
    /// at `chunk_size`. Completed groups are emitted; the final group is
    /// returned so accumulation continues from it. A word is never split:
    /// one word over the cap forms its own oversized group.
    fn pack_words(&self, sentence: &str, out: &mut Vec<Chunk>) -> (Vec<String>, usize) {
        let size = self.config.chunk_size;
        let mut group: Vec<String> = Vec::new();
        let mut group_tokens = 0usize;

        for word in sentence.split_whitespace() {
            let word_tokens = self.counter.count_tokens(word);
            if group_tokens + word_tokens > size {
                if !group.is_empty() {
                    self.emit(out, &group);
                }
                group = vec![word.to_string()];
                group_tokens = word_tokens;
            } else {
                group.push(word.to_string());
                group_tokens += word_tokens;
            }
        }

        (group, group_tokens)
    }

    /// Walk backward through a flushed chunk's fragments, keeping the
    /// trailing run (in original order) whose total stays within
    /// `chunk_overlap`. Stops at the first fragment that would exceed the
    /// budget; never keeps part of a fragment.
    fn overlap_tail(&self, flushed: &[String]) -> (Vec<String>, usize) {
        let mut kept: Vec<String> = Vec::new();
        let mut kept_tokens = 0usize;

        for fragment in flushed.iter().rev() {
            let fragment_tokens = self.counter.count_tokens(fragment);
            if kept_tokens + fragment_tokens <= self.config.chunk_overlap {
                kept.push(fragment.clone());
                kept_tokens += fragment_tokens;
            } else {
                break;
            }
        }

        kept.reverse();
        (kept, kept_tokens)
    }
}
