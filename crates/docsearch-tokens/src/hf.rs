//! Token counting with a HuggingFace `tokenizer.json`.

use std::path::Path;

use tokenizers::Tokenizer;
use tracing::info;

use docsearch_core::{Result, SearchError, TokenCounter};

/// Counts tokens with a HuggingFace tokenizer.
pub struct HfTokenCounter {
    tokenizer: Tokenizer,
}

impl HfTokenCounter {
    /// Load a tokenizer from a `tokenizer.json` file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        info!("Loading tokenizer from {:?}", path);

        let tokenizer = Tokenizer::from_file(path)
            .map_err(|e| SearchError::tokenizer(format!("Failed to load tokenizer: {}", e)))?;

        Ok(Self::new(tokenizer))
    }

    /// Wrap an already constructed tokenizer.
    pub fn new(tokenizer: Tokenizer) -> Self {
        Self { tokenizer }
    }
}

impl TokenCounter for HfTokenCounter {
    fn count_tokens(&self, text: &str) -> Result<usize> {
        // Special tokens are not charged to the budget.
        let encoding = self
            .tokenizer
            .encode(text, false)
            .map_err(|e| SearchError::tokenizer(format!("Tokenization failed: {}", e)))?;
        Ok(encoding.get_ids().len())
    }
}
