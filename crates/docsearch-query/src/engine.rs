//! Hybrid search orchestration.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info, warn};

use docsearch_core::{
    ChannelOutcome, ChannelReport, DocSearchConfig, HybridSearchResults, IndexConfig, IndexHit,
    IndexKind, NormalizedHit, PassageIndex, Result, SearchConfig, SearchError, SelectedPassage,
    TokenCounter,
};

use crate::budget::{select_within_budget, Budget};
use crate::fusion::weighted_fusion;
use crate::normalize::{normalize_scores, NormalizeError};

/// Parameters for a single search.
#[derive(Debug, Clone)]
pub struct SearchRequest {
    /// Documents (by filename) whose passages may be returned.
    pub allowed_documents: HashSet<String>,

    /// Hit-count ceiling.
    pub max_hits: usize,

    /// Weight for the lexical index.
    pub lexical_weight: f32,

    /// Weight for the vector index.
    pub vector_weight: f32,

    /// Score floor (None keeps everything that fits).
    pub min_score: Option<f32>,
}

impl SearchRequest {
    /// Request with equal 0.5/0.5 weights and no score floor.
    pub fn new<I, S>(allowed_documents: I, max_hits: usize) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            allowed_documents: allowed_documents.into_iter().map(Into::into).collect(),
            max_hits,
            lexical_weight: 0.5,
            vector_weight: 0.5,
            min_score: None,
        }
    }

    /// Set the per-index weights.
    pub fn with_weights(mut self, lexical_weight: f32, vector_weight: f32) -> Self {
        self.lexical_weight = lexical_weight;
        self.vector_weight = vector_weight;
        self
    }

    /// Set the score floor.
    pub fn with_min_score(mut self, min_score: f32) -> Self {
        self.min_score = Some(min_score);
        self
    }

    fn validate(&self) -> Result<()> {
        if !self.lexical_weight.is_finite() || !self.vector_weight.is_finite() {
            return Err(SearchError::invalid_argument(format!(
                "weights must be finite (lexical={}, vector={})",
                self.lexical_weight, self.vector_weight
            )));
        }
        if let Some(min_score) = self.min_score {
            if !min_score.is_finite() {
                return Err(SearchError::invalid_argument(format!(
                    "min_score must be finite, got {}",
                    min_score
                )));
            }
        }
        Ok(())
    }
}

/// Hybrid lexical + vector search engine.
///
/// Queries both indexes concurrently, keeps hits from allowed documents,
/// normalizes each index against its own maximum score, fuses the weighted
/// scores (summing for passages both indexes found), and selects the best
/// passages that fit the token budget. Holds no per-call state, so one
/// engine can serve concurrent searches.
pub struct HybridSearch<L: ?Sized, V: ?Sized, T: ?Sized> {
    /// Term-frequency index.
    lexical: Arc<L>,

    /// Embedding similarity index.
    vector: Arc<V>,

    /// Token accounting of the downstream model.
    tokenizer: Arc<T>,

    search: SearchConfig,
    index: IndexConfig,
}

impl<L, V, T> HybridSearch<L, V, T>
where
    L: PassageIndex + ?Sized,
    V: PassageIndex + ?Sized,
    T: TokenCounter + ?Sized,
{
    /// Create an engine with the default configuration.
    pub fn new(lexical: Arc<L>, vector: Arc<V>, tokenizer: Arc<T>) -> Self {
        Self::with_config(lexical, vector, tokenizer, &DocSearchConfig::default())
    }

    /// Create an engine using the search and index sections of `config`.
    pub fn with_config(
        lexical: Arc<L>,
        vector: Arc<V>,
        tokenizer: Arc<T>,
        config: &DocSearchConfig,
    ) -> Self {
        if lexical.kind() != IndexKind::Lexical || vector.kind() != IndexKind::Vector {
            warn!(
                "Index roles look swapped: lexical slot holds a {} index, vector slot a {} index",
                lexical.kind(),
                vector.kind()
            );
        }

        Self {
            lexical,
            vector,
            tokenizer,
            search: config.search.clone(),
            index: config.index.clone(),
        }
    }

    /// A request pre-filled with the configured weights, floor and hit count.
    pub fn request<I, S>(&self, allowed_documents: I) -> SearchRequest
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut request = SearchRequest::new(allowed_documents, self.search.default_max_hits)
            .with_weights(self.search.lexical_weight, self.search.vector_weight);
        request.min_score = self.search.min_score;
        request
    }

    /// Search and return only the selected passages.
    pub async fn hybrid_search<I, S>(
        &self,
        query: &str,
        allowed_documents: I,
        max_hits: usize,
        lexical_weight: f32,
        vector_weight: f32,
        min_score: Option<f32>,
    ) -> Result<Vec<SelectedPassage>>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut request =
            SearchRequest::new(allowed_documents, max_hits).with_weights(lexical_weight, vector_weight);
        request.min_score = min_score;

        Ok(self.search(query, request).await?.results)
    }

    /// Perform a hybrid search.
    pub async fn search(&self, query: &str, request: SearchRequest) -> Result<HybridSearchResults> {
        let start = Instant::now();
        request.validate()?;

        let budget = Budget::for_documents(
            self.search.tokens_per_document,
            request.allowed_documents.len(),
            request.max_hits,
            request.min_score,
        );

        info!(
            "Searching for: {:?} across {} document(s)",
            query,
            request.allowed_documents.len()
        );

        if request.allowed_documents.is_empty() {
            debug!("No allowed documents, skipping index queries");
            return Ok(HybridSearchResults {
                query: query.to_string(),
                total_results: 0,
                token_budget: budget.token_budget,
                tokens_used: 0,
                budget_exhausted: false,
                lexical: ChannelReport::skipped(IndexKind::Lexical),
                vector: ChannelReport::skipped(IndexKind::Vector),
                latency_ms: start.elapsed().as_millis() as u64,
                results: Vec::new(),
            });
        }

        // Perform searches in parallel
        let (lexical_results, vector_results): (Result<Vec<IndexHit>>, Result<Vec<IndexHit>>) = tokio::join!(
            self.lexical.search(query, self.index.lexical_top_k),
            self.vector.search(query, self.index.vector_top_k)
        );

        let lexical_results = lexical_results?;
        let vector_results = vector_results?;

        debug!(
            "Lexical search returned {} results, vector search returned {} results",
            lexical_results.len(),
            vector_results.len()
        );

        let (lexical_hits, lexical) =
            prepare_channel(IndexKind::Lexical, lexical_results, &request.allowed_documents);
        let (vector_hits, vector) =
            prepare_channel(IndexKind::Vector, vector_results, &request.allowed_documents);

        // Vector hits first: on a dedup collision the vector passage is kept.
        let fused = weighted_fusion(
            vec![
                (vector_hits, request.vector_weight),
                (lexical_hits, request.lexical_weight),
            ],
            self.search.dedup_prefix_chars,
        );

        debug!("Fused to {} unique passages", fused.len());

        let selection = select_within_budget(fused, &budget, self.tokenizer.as_ref())?;

        let latency_ms = start.elapsed().as_millis() as u64;

        info!(
            "Search completed in {}ms, returned {} results ({} of {} tokens)",
            latency_ms,
            selection.passages.len(),
            selection.tokens_used,
            budget.token_budget
        );

        Ok(HybridSearchResults {
            query: query.to_string(),
            total_results: selection.passages.len(),
            token_budget: budget.token_budget,
            tokens_used: selection.tokens_used,
            budget_exhausted: selection.budget_exhausted,
            lexical,
            vector,
            latency_ms,
            results: selection.passages,
        })
    }
}

/// Filter one index's hits to allowed documents and normalize them.
///
/// Empty and zero-signal lists contribute nothing to fusion.
fn prepare_channel(
    kind: IndexKind,
    hits: Vec<IndexHit>,
    allowed_documents: &HashSet<String>,
) -> (Vec<NormalizedHit>, ChannelReport) {
    let returned = hits.len();

    let filtered: Vec<IndexHit> = hits
        .into_iter()
        .filter(|hit| allowed_documents.contains(hit.passage.document_id()))
        .collect();
    let allowed = filtered.len();

    let (normalized, outcome) = match normalize_scores(kind, filtered) {
        Ok(normalized) => (normalized, ChannelOutcome::Used),
        Err(NormalizeError::EmptyInput) => {
            debug!("No {} results in allowed documents", kind);
            (Vec::new(), ChannelOutcome::Empty)
        }
        Err(e) => {
            warn!("Ignoring {} results ({} hits): {}", kind, allowed, e);
            (Vec::new(), ChannelOutcome::NoSignal)
        }
    };

    let report = ChannelReport {
        index: kind,
        returned,
        allowed,
        outcome,
    };

    (normalized, report)
}
