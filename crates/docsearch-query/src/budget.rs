//! Budget-constrained evidence selection.

use tracing::debug;

use docsearch_core::{FusedHit, Result, SelectedPassage, TokenCounter};

/// Per-call selection limits.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Budget {
    /// Hit-count ceiling.
    pub max_hits: usize,

    /// Ceiling on the summed token count of selected passages.
    pub token_budget: usize,

    /// Score floor, applied after the other limits.
    pub min_score: Option<f32>,
}

impl Budget {
    /// Budget granting `tokens_per_document` for each allowed document.
    pub fn for_documents(
        tokens_per_document: usize,
        document_count: usize,
        max_hits: usize,
        min_score: Option<f32>,
    ) -> Self {
        Self {
            max_hits,
            token_budget: tokens_per_document.saturating_mul(document_count),
            min_score,
        }
    }
}

/// Outcome of [`select_within_budget`].
#[derive(Debug, Clone, Default)]
pub struct Selection {
    /// Selected passages, best first, ranked from 1.
    pub passages: Vec<SelectedPassage>,

    /// Tokens consumed by `passages`.
    pub tokens_used: usize,

    /// Whether the walk stopped on a passage that did not fit.
    pub budget_exhausted: bool,
}

/// Rank fused hits and keep the best ones that fit the budget.
///
/// 1. Stable sort by descending `weighted_score` (ties keep input order).
/// 2. Accept passages while the running token total stays within
///    `token_budget`. The walk stops at the first passage that does not fit;
///    shorter passages further down are never considered.
/// 3. Keep at most `max_hits`.
/// 4. Drop anything below `min_score`.
///
/// A zero token budget yields an empty selection without tokenizing.
pub fn select_within_budget<T>(
    mut hits: Vec<FusedHit>,
    budget: &Budget,
    counter: &T,
) -> Result<Selection>
where
    T: TokenCounter + ?Sized,
{
    if budget.token_budget == 0 || budget.max_hits == 0 {
        debug!("Degenerate budget {:?}, selecting nothing", budget);
        return Ok(Selection::default());
    }

    hits.sort_by(|a, b| b.weighted_score.total_cmp(&a.weighted_score));

    let mut accepted: Vec<(FusedHit, usize)> = Vec::with_capacity(budget.max_hits.min(hits.len()));
    let mut running = 0usize;
    let mut budget_exhausted = false;

    for hit in hits {
        if accepted.len() == budget.max_hits {
            break;
        }

        let tokens = counter.count_tokens(&hit.passage.text)?;
        if running.saturating_add(tokens) > budget.token_budget {
            debug!(
                "Token budget reached: {} + {} > {}",
                running, tokens, budget.token_budget
            );
            budget_exhausted = true;
            break;
        }

        running += tokens;
        accepted.push((hit, tokens));
    }

    if let Some(min_score) = budget.min_score {
        let before = accepted.len();
        accepted.retain(|(hit, _)| hit.weighted_score >= min_score);
        debug!(
            "Score floor {} removed {} of {} passages",
            min_score,
            before - accepted.len(),
            before
        );
    }

    let tokens_used = accepted.iter().map(|(_, tokens)| tokens).sum();
    let passages = accepted
        .into_iter()
        .enumerate()
        .map(|(i, (hit, token_count))| SelectedPassage {
            rank: i as u32 + 1,
            passage: hit.passage,
            weighted_score: hit.weighted_score,
            token_count,
            contributions: hit.contributions,
        })
        .collect();

    Ok(Selection {
        passages,
        tokens_used,
        budget_exhausted,
    })
}
