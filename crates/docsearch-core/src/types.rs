//! Core domain types for hybrid passage retrieval.

use serde::{Deserialize, Serialize};

/// Which index produced a hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndexKind {
    /// Term-frequency (BM25-style) index.
    Lexical,
    /// Embedding similarity index.
    Vector,
}

impl std::fmt::Display for IndexKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Lexical => "lexical",
            Self::Vector => "vector",
        };
        write!(f, "{}", s)
    }
}

/// A contiguous chunk of source text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Passage {
    /// Passage text.
    pub text: String,

    /// Provenance of the passage, usually the path of the source file.
    pub source: String,
}

impl Passage {
    /// Create a new passage.
    pub fn new(source: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            source: source.into(),
        }
    }

    /// Document identifier: the last `/`-separated component of the source.
    ///
    /// `data/AzulSa/txt/lease.txt` and `lease.txt` both identify `lease.txt`.
    pub fn document_id(&self) -> &str {
        self.source.rsplit('/').next().unwrap_or(&self.source)
    }

    /// Key used to recognize the same passage returned by several indexes.
    ///
    /// `prefix_chars` counts Unicode scalar values, not bytes.
    pub fn dedup_key(&self, prefix_chars: usize) -> DedupKey {
        DedupKey {
            source: self.source.clone(),
            prefix: self.text.chars().take(prefix_chars).collect(),
        }
    }
}

/// Identity of a passage for deduplication: source plus leading text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DedupKey {
    /// Provenance path of the passage.
    pub source: String,

    /// Leading characters of the passage text.
    pub prefix: String,
}

impl std::fmt::Display for DedupKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}_{}", self.source, self.prefix)
    }
}

/// A passage as returned by one index, with that index's raw score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexHit {
    /// The matched passage.
    pub passage: Passage,

    /// Index-specific relevance score (higher is better, scale is opaque).
    pub raw_score: f32,
}

impl IndexHit {
    /// Create a new hit.
    pub fn new(passage: Passage, raw_score: f32) -> Self {
        Self { passage, raw_score }
    }
}

/// A hit rescaled against the maximum score of its own index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedHit {
    /// The matched passage.
    pub passage: Passage,

    /// Index that produced the hit.
    pub origin: IndexKind,

    /// Score as reported by the index.
    pub raw_score: f32,

    /// `raw_score` divided by the index's maximum raw score.
    pub normalized_score: f32,
}

/// One index's share of a fused score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Contribution {
    /// Index that produced the hit.
    pub origin: IndexKind,

    /// Score as reported by the index.
    pub raw_score: f32,

    /// Score after normalization.
    pub normalized_score: f32,

    /// Weight applied to this index.
    pub weight: f32,

    /// `weight * normalized_score`.
    pub weighted_score: f32,
}

/// A deduplicated passage with its combined score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FusedHit {
    /// The passage (first occurrence wins when several indexes return it).
    pub passage: Passage,

    /// Sum of every contribution that mapped to this passage.
    pub weighted_score: f32,

    /// Per-index provenance, in encounter order.
    pub contributions: Vec<Contribution>,
}

impl FusedHit {
    /// Whether the given index contributed to this hit.
    pub fn found_by(&self, origin: IndexKind) -> bool {
        self.contributions.iter().any(|c| c.origin == origin)
    }
}

/// A passage selected as evidence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectedPassage {
    /// Result rank (1-indexed).
    pub rank: u32,

    /// The selected passage.
    pub passage: Passage,

    /// Combined score used for ranking.
    pub weighted_score: f32,

    /// Token count charged against the budget.
    pub token_count: usize,

    /// Per-index provenance.
    pub contributions: Vec<Contribution>,
}

/// What happened to one index's results during a search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChannelOutcome {
    /// Results were normalized and fused.
    Used,
    /// Nothing survived document filtering.
    Empty,
    /// Scores carried no usable signal (zero, negative or non-finite maximum).
    NoSignal,
}

/// Per-index diagnostics for a search.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelReport {
    /// The index this report describes.
    pub index: IndexKind,

    /// Hits returned by the index.
    pub returned: usize,

    /// Hits left after allowed-document filtering.
    pub allowed: usize,

    /// Whether the index contributed to fusion.
    pub outcome: ChannelOutcome,
}

impl ChannelReport {
    /// Report for an index that was never queried.
    pub fn skipped(index: IndexKind) -> Self {
        Self {
            index,
            returned: 0,
            allowed: 0,
            outcome: ChannelOutcome::Empty,
        }
    }
}

/// Search results container.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HybridSearchResults {
    /// The query as sent to both indexes.
    pub query: String,

    /// Total results returned.
    pub total_results: usize,

    /// Token ceiling for this call.
    pub token_budget: usize,

    /// Tokens consumed by the returned results.
    pub tokens_used: usize,

    /// Whether selection stopped because the next passage did not fit.
    pub budget_exhausted: bool,

    /// Lexical index diagnostics.
    pub lexical: ChannelReport,

    /// Vector index diagnostics.
    pub vector: ChannelReport,

    /// Search latency in milliseconds.
    pub latency_ms: u64,

    /// Selected passages, best first.
    pub results: Vec<SelectedPassage>,
}
