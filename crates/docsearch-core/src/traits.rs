//! Core traits defining the interfaces between components.

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{IndexHit, IndexKind};

/// A searchable passage index (lexical or vector).
///
/// Implementations own their scoring; the engine only relies on
/// "higher raw score means more relevant" within a single index.
#[async_trait]
pub trait PassageIndex: Send + Sync {
    /// Which kind of index this is.
    fn kind(&self) -> IndexKind;

    /// Return up to `top_k` hits for `query`, best first.
    async fn search(&self, query: &str, top_k: usize) -> Result<Vec<IndexHit>>;
}

/// Token accounting for the downstream language model.
pub trait TokenCounter: Send + Sync {
    /// Count tokens in text.
    fn count_tokens(&self, text: &str) -> Result<usize>;
}
