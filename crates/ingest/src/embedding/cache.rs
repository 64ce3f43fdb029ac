use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use lru::LruCache;
use tokio::sync::Mutex;

use super::traits::{Embedder, EmbeddingError};

/// Wraps another embedder with an LRU cache keyed by text hash.
///
/// Re-ingesting a document (or asking the same question twice) hits the
/// cache instead of the embedding API. Partial hits within a batch are
/// fine: only the texts the cache has never seen go out over the wire.
pub struct CachedEmbedder {
    inner: Box<dyn Embedder>,
    cache: Mutex<LruCache<u64, Vec<f32>>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl CachedEmbedder {
    pub fn new(inner: Box<dyn Embedder>, capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            inner,
            cache: Mutex::new(LruCache::new(capacity)),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    fn hash_text(text: &str) -> u64 {
        let mut hasher = DefaultHasher::new();
        text.hash(&mut hasher);
        hasher.finish()
    }

    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }

    pub fn hit_rate(&self) -> f64 {
        let total = self.hits() + self.misses();
        if total == 0 {
            0.0
        } else {
            self.hits() as f64 / total as f64
        }
    }
}

#[async_trait]
impl Embedder for CachedEmbedder {
    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        let mut results: Vec<Option<Vec<f32>>> = vec![None; texts.len()];
        let mut missing: Vec<usize> = Vec::new();

        {
            let mut cache = self.cache.lock().await;
            for (i, text) in texts.iter().enumerate() {
                match cache.get(&Self::hash_text(text)) {
                    Some(vector) => results[i] = Some(vector.clone()),
                    None => missing.push(i),
                }
            }
        }
        self.hits
            .fetch_add((texts.len() - missing.len()) as u64, Ordering::Relaxed);
        self.misses.fetch_add(missing.len() as u64, Ordering::Relaxed);

        if !missing.is_empty() {
            let batch: Vec<&str> = missing.iter().map(|&i| texts[i]).collect();
            let fresh = self.inner.embed_batch(&batch).await?;
            if fresh.len() != batch.len() {
                return Err(EmbeddingError::Api(format!(
                    "expected {} embeddings, got {}",
                    batch.len(),
                    fresh.len()
                )));
            }

            let mut cache = self.cache.lock().await;
            for (&i, vector) in missing.iter().zip(fresh) {
                cache.put(Self::hash_text(texts[i]), vector.clone());
                results[i] = Some(vector);
            }
        }

        // Every slot is filled: cached ones above, the rest from the fetch.
        Ok(results.into_iter().flatten().collect())
    }

    fn dimensions(&self) -> usize {
        self.inner.dimensions()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    type BatchLog = Arc<std::sync::Mutex<Vec<Vec<String>>>>;

    /// Fake backend that records every batch it is asked to embed.
    struct RecordingEmbedder {
        batches: BatchLog,
    }

    #[async_trait]
    impl Embedder for RecordingEmbedder {
        async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
            self.batches
                .lock()
                .unwrap()
                .push(texts.iter().map(|t| t.to_string()).collect());
            // Vector encodes the text length so order mixups are visible.
            Ok(texts.iter().map(|t| vec![t.len() as f32, 1.0]).collect())
        }

        fn dimensions(&self) -> usize {
            2
        }
    }

    fn cached(capacity: usize) -> (CachedEmbedder, BatchLog) {
        let batches: BatchLog = Arc::default();
        let inner = Box::new(RecordingEmbedder {
            batches: batches.clone(),
        });
        (CachedEmbedder::new(inner, capacity), batches)
    }

    #[tokio::test]
    async fn repeated_batches_are_served_from_cache() {
        let (embedder, batches) = cached(100);

        embedder.embed_batch(&["alpha", "beta"]).await.unwrap();
        embedder.embed_batch(&["alpha", "beta"]).await.unwrap();

        assert_eq!(batches.lock().unwrap().len(), 1);
        assert_eq!(embedder.hits(), 2);
        assert_eq!(embedder.misses(), 2);
    }

    #[tokio::test]
    async fn partial_hits_only_fetch_missing_texts() {
        let (embedder, batches) = cached(100);

        embedder.embed_batch(&["a"]).await.unwrap();
        let results = embedder.embed_batch(&["a", "bbb"]).await.unwrap();

        assert_eq!(
            batches.lock().unwrap().last().unwrap(),
            &vec!["bbb".to_string()]
        );

        // Order preserved even when some vectors come from the cache.
        assert_eq!(results[0][0], 1.0);
        assert_eq!(results[1][0], 3.0);
    }

    #[tokio::test]
    async fn eviction_forces_a_refetch() {
        let (embedder, batches) = cached(1);

        embedder.embed_batch(&["a"]).await.unwrap();
        embedder.embed_batch(&["b"]).await.unwrap();
        embedder.embed_batch(&["a"]).await.unwrap();

        assert_eq!(batches.lock().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn hit_rate_tracks_lookups() {
        let (embedder, _) = cached(100);
        assert_eq!(embedder.hit_rate(), 0.0);

        embedder.embed_batch(&["x"]).await.unwrap();
        embedder.embed_batch(&["x"]).await.unwrap();
        assert!((embedder.hit_rate() - 0.5).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn dimensions_pass_through() {
        let (embedder, _) = cached(10);
        assert_eq!(embedder.dimensions(), 2);
    }
}
