//! Per-index score normalization.

use thiserror::Error;

use docsearch_core::{IndexHit, IndexKind, NormalizedHit};

/// Why a result set could not be normalized.
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum NormalizeError {
    /// Nothing to normalize.
    #[error("cannot normalize an empty result set")]
    EmptyInput,

    /// Every score is zero.
    #[error("maximum score is zero")]
    DivideByZero,

    /// The best score is below zero, so dividing would invert the ranking.
    #[error("maximum score {max} is negative")]
    NegativeMax { max: f32 },

    /// A score is NaN or infinite, or overflows when divided by the maximum.
    #[error("result set contains a non-finite score")]
    NonFiniteScore,
}

/// Rescale one index's hits by that index's maximum raw score.
///
/// The best hit ends up at exactly 1.0. Scales differ arbitrarily between
/// indexes, so callers must normalize each index's list on its own.
pub fn normalize_scores(
    origin: IndexKind,
    hits: Vec<IndexHit>,
) -> Result<Vec<NormalizedHit>, NormalizeError> {
    if hits.is_empty() {
        return Err(NormalizeError::EmptyInput);
    }
    if hits.iter().any(|h| !h.raw_score.is_finite()) {
        return Err(NormalizeError::NonFiniteScore);
    }

    let max = hits
        .iter()
        .map(|h| h.raw_score)
        .fold(f32::NEG_INFINITY, f32::max);

    if max == 0.0 {
        return Err(NormalizeError::DivideByZero);
    }
    if max < 0.0 {
        return Err(NormalizeError::NegativeMax { max });
    }

    // A tiny maximum can push a large negative score past f32::MIN.
    if hits.iter().any(|h| !(h.raw_score / max).is_finite()) {
        return Err(NormalizeError::NonFiniteScore);
    }

    Ok(hits
        .into_iter()
        .map(|hit| NormalizedHit {
            normalized_score: hit.raw_score / max,
            raw_score: hit.raw_score,
            origin,
            passage: hit.passage,
        })
        .collect())
}
