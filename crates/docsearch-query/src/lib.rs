//! docsearch-query - Hybrid ranking and evidence selection
//!
//! This crate combines a lexical index and a vector index into one ranked,
//! deduplicated, token-bounded evidence set for a language model.
//!
//! # Pipeline
//!
//! - Allowed-document filtering of each index's hits
//! - Per-index score normalization ([`normalize_scores`])
//! - Weighted fusion with dedup-key summing ([`weighted_fusion`])
//! - Token- and hit-bounded selection ([`select_within_budget`])
//!
//! # Example
//!
//! ```rust,ignore
//! use docsearch_query::{HybridSearch, SearchRequest};
//! use std::sync::Arc;
//!
//! let engine = HybridSearch::new(Arc::new(bm25), Arc::new(vectors), Arc::new(tokenizer));
//! let request = SearchRequest::new(["lease.txt"], 15).with_min_score(0.2);
//! let results = engine.search("governing law", request).await?;
//! ```

mod budget;
mod engine;
mod fusion;
mod normalize;

pub use budget::{select_within_budget, Budget, Selection};
pub use engine::{HybridSearch, SearchRequest};
pub use fusion::weighted_fusion;
pub use normalize::{normalize_scores, NormalizeError};

// Re-export for convenience
pub use docsearch_core::{HybridSearchResults, SelectedPassage};
