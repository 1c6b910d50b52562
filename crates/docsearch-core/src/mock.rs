//! In-memory index returning recorded hits, for tests and offline replay.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SearchError};
use crate::traits::PassageIndex;
use crate::types::{IndexHit, IndexKind, Passage};

/// A recorded hit as stored in replay files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordedHit {
    pub source: String,
    pub text: String,
    pub score: f32,
}

impl From<RecordedHit> for IndexHit {
    fn from(hit: RecordedHit) -> Self {
        IndexHit::new(Passage::new(hit.source, hit.text), hit.score)
    }
}

/// An index that ignores the query and returns a fixed hit list.
pub struct MockIndex {
    kind: IndexKind,
    hits: Vec<IndexHit>,
    failure: Option<String>,
    queries: AtomicUsize,
}

impl MockIndex {
    /// Create an index returning `hits` in the given order.
    pub fn new(kind: IndexKind, hits: Vec<IndexHit>) -> Self {
        Self {
            kind,
            hits,
            failure: None,
            queries: AtomicUsize::new(0),
        }
    }

    /// Create an index from `(source, text, score)` triples.
    pub fn from_triples(kind: IndexKind, hits: &[(&str, &str, f32)]) -> Self {
        let hits = hits
            .iter()
            .map(|(source, text, score)| IndexHit::new(Passage::new(*source, *text), *score))
            .collect();
        Self::new(kind, hits)
    }

    /// Create an index whose every query fails with `message`.
    pub fn failing(kind: IndexKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            hits: Vec::new(),
            failure: Some(message.into()),
            queries: AtomicUsize::new(0),
        }
    }

    /// Number of queries served so far.
    pub fn query_count(&self) -> usize {
        self.queries.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl PassageIndex for MockIndex {
    fn kind(&self) -> IndexKind {
        self.kind
    }

    async fn search(&self, _query: &str, top_k: usize) -> Result<Vec<IndexHit>> {
        self.queries.fetch_add(1, Ordering::Relaxed);

        if let Some(message) = &self.failure {
            return Err(SearchError::index(self.kind, message.clone()));
        }

        Ok(self.hits.iter().take(top_k).cloned().collect())
    }
}
