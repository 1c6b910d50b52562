//! Exact BPE token counting via `tiktoken-rs`.

use std::sync::Arc;

use moka::sync::Cache;
use tiktoken_rs::CoreBPE;
use tracing::debug;

use docsearch_core::{Result, SearchError, TokenCounter};

/// Token counter using the BPE of an OpenAI model.
/// Caches results per blake3 content hash.
pub struct TiktokenCounter {
    bpe: Arc<CoreBPE>,
    cache: Cache<String, usize>,
}

impl TiktokenCounter {
    /// Resolve the BPE used by `model` (e.g. `gpt-4o-mini` -> `o200k_base`).
    pub fn for_model(model: &str, cache_capacity: u64) -> Result<Self> {
        let bpe = tiktoken_rs::get_bpe_from_model(model).map_err(|e| {
            SearchError::tokenizer(format!("No tokenizer for model {}: {}", model, e))
        })?;
        debug!("Loaded BPE for model {}", model);

        Ok(Self {
            bpe: Arc::new(bpe),
            cache: Cache::new(cache_capacity),
        })
    }

    /// Count tokens in the given text (uncached).
    pub fn count(&self, text: &str) -> usize {
        self.bpe.encode_ordinary(text).len()
    }

    /// Count tokens with content-hash caching.
    pub fn count_cached(&self, text: &str) -> usize {
        let hash = blake3::hash(text.as_bytes()).to_hex().to_string();
        self.cache.get_with(hash, || self.count(text))
    }
}

impl TokenCounter for TiktokenCounter {
    fn count_tokens(&self, text: &str) -> Result<usize> {
        Ok(self.count_cached(text))
    }
}
