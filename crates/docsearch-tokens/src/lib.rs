//! docsearch-tokens - Token counting for evidence budgets
//!
//! The evidence budget is only meaningful when passages are counted the way
//! the downstream language model counts them. This crate provides:
//!
//! - [`TiktokenCounter`]: exact BPE counts for OpenAI models via `tiktoken-rs`,
//!   cached per content hash.
//! - [`HfTokenCounter`]: counts from a HuggingFace `tokenizer.json`.
//! - [`ApproxTokenCounter`]: a ~4 bytes/token estimate for tests and offline use.

mod approx;
mod hf;
mod tiktoken;

use std::sync::Arc;

use tracing::info;

pub use approx::ApproxTokenCounter;
pub use hf::HfTokenCounter;
pub use tiktoken::TiktokenCounter;

pub use docsearch_core::TokenCounter;
use docsearch_core::{Result, SearchError, TokenizerConfig, TokenizerKind};

/// Build the token counter described by `config`.
pub fn build_token_counter(config: &TokenizerConfig) -> Result<Arc<dyn TokenCounter>> {
    info!("Using {:?} tokenizer for model {}", config.kind, config.model);

    let counter: Arc<dyn TokenCounter> = match config.kind {
        TokenizerKind::Tiktoken => Arc::new(TiktokenCounter::for_model(
            &config.model,
            config.cache_capacity,
        )?),
        TokenizerKind::HuggingFace => {
            let path = config.path.as_ref().ok_or_else(|| {
                SearchError::config("tokenizer.path is required for the huggingface tokenizer")
            })?;
            Arc::new(HfTokenCounter::from_file(path)?)
        }
        TokenizerKind::Approximate => Arc::new(ApproxTokenCounter::new()),
    };

    Ok(counter)
}
