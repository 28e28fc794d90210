//! In-memory embedding cache.
//!
//! Reference answers are scored against many submissions, so their embeddings are
//! worth keeping. Keys are BLAKE3 hashes of the exact input text.

use std::sync::Arc;

use moka::sync::Cache;

/// Cache key for a piece of text.
#[inline]
pub fn text_key(text: &str) -> [u8; 32] {
    *blake3::hash(text.as_bytes()).as_bytes()
}

/// Bounded embedding cache. A capacity of zero disables caching.
pub struct EmbeddingCache {
    entries: Option<Cache<[u8; 32], Arc<[f32]>>>,
}

impl std::fmt::Debug for EmbeddingCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmbeddingCache")
            .field("enabled", &self.is_enabled())
            .field("entries", &self.len())
            .finish()
    }
}

impl EmbeddingCache {
    pub fn with_capacity(capacity: u64) -> Self {
        let entries = (capacity > 0).then(|| Cache::builder().max_capacity(capacity).build());
        Self { entries }
    }

    pub fn disabled() -> Self {
        Self { entries: None }
    }

    #[inline]
    pub fn is_enabled(&self) -> bool {
        self.entries.is_some()
    }

    pub fn get(&self, text: &str) -> Option<Arc<[f32]>> {
        self.entries.as_ref()?.get(&text_key(text))
    }

    pub fn insert(&self, text: &str, embedding: Arc<[f32]>) {
        if let Some(entries) = &self.entries {
            entries.insert(text_key(text), embedding);
        }
    }

    /// Returns the cached embedding or computes, stores and returns it.
    pub fn get_or_try_insert<E>(
        &self,
        text: &str,
        compute: impl FnOnce() -> Result<Vec<f32>, E>,
    ) -> Result<Arc<[f32]>, E> {
        if let Some(hit) = self.get(text) {
            return Ok(hit);
        }

        let embedding: Arc<[f32]> = compute()?.into();
        self.insert(text, Arc::clone(&embedding));
        Ok(embedding)
    }

    /// Approximate number of entries (moka applies writes lazily).
    pub fn len(&self) -> u64 {
        self.entries.as_ref().map_or(0, |c| {
            c.run_pending_tasks();
            c.entry_count()
        })
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        if let Some(entries) = &self.entries {
            entries.invalidate_all();
        }
    }
}
