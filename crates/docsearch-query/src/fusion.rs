//! Weighted score fusion with passage deduplication.

use std::collections::HashMap;

use tracing::debug;

use docsearch_core::{Contribution, DedupKey, FusedHit, NormalizedHit};

/// Combine normalized result lists using weighted fusion.
///
/// Each hit contributes `weight * normalized_score`. Lists are walked in the
/// order given; hits sharing a dedup key (source plus the first
/// `prefix_chars` characters of text) collapse into one [`FusedHit`] whose
/// score is the **sum** of the colliding contributions, so a passage found
/// by both indexes outranks a single-index hit of equal strength. The first
/// passage seen for a key is the one kept.
///
/// A contribution whose weighted score, or whose sum with the entry it joins,
/// is not finite is dropped.
///
/// # Arguments
/// * `results` - Vector of (normalized hits, weight) pairs
/// * `prefix_chars` - Leading characters of text used in the dedup key
///
/// # Returns
/// Unique hits in first-encounter order (not ranked)
pub fn weighted_fusion(
    results: Vec<(Vec<NormalizedHit>, f32)>,
    prefix_chars: usize,
) -> Vec<FusedHit> {
    let mut positions: HashMap<DedupKey, usize> = HashMap::new();
    let mut fused: Vec<FusedHit> = Vec::new();

    for (result_list, weight) in results {
        for hit in result_list {
            let contribution = Contribution {
                origin: hit.origin,
                raw_score: hit.raw_score,
                normalized_score: hit.normalized_score,
                weight,
                weighted_score: weight * hit.normalized_score,
            };

            if !contribution.weighted_score.is_finite() {
                debug!(
                    "Dropping non-finite {} contribution for {}",
                    hit.origin, hit.passage.source
                );
                continue;
            }

            let key = hit.passage.dedup_key(prefix_chars);
            match positions.get(&key) {
                Some(&pos) => {
                    let entry = &mut fused[pos];
                    let total = entry.weighted_score + contribution.weighted_score;
                    if !total.is_finite() {
                        debug!("Dropping {} contribution: sum overflows", hit.origin);
                        continue;
                    }
                    entry.weighted_score = total;
                    entry.contributions.push(contribution);
                }
                None => {
                    positions.insert(key, fused.len());
                    fused.push(FusedHit {
                        passage: hit.passage,
                        weighted_score: contribution.weighted_score,
                        contributions: vec![contribution],
                    });
                }
            }
        }
    }

    fused
}

#[cfg(test)]
mod tests {
    use super::*;
    use docsearch_core::{IndexKind, Passage};

    fn hit(origin: IndexKind, source: &str, text: &str, normalized: f32) -> NormalizedHit {
        NormalizedHit {
            passage: Passage::new(source, text),
            origin,
            raw_score: normalized * 10.0,
            normalized_score: normalized,
        }
    }

    fn score_of<'a>(fused: &'a [FusedHit], text: &str) -> &'a FusedHit {
        fused
            .iter()
            .find(|h| h.passage.text == text)
            .expect("passage missing from fused results")
    }

    #[test]
    fn test_shared_passage_sums_contributions() {
        let lexical = vec![hit(IndexKind::Lexical, "A.txt", "Term X appears", 1.0)];
        let vector = vec![hit(IndexKind::Vector, "A.txt", "Term X appears", 1.0)];

        let fused = weighted_fusion(vec![(vector, 0.5), (lexical, 0.5)], 30);

        assert_eq!(fused.len(), 1);
        assert_eq!(fused[0].weighted_score, 1.0);
        assert_eq!(fused[0].contributions.len(), 2);
        assert!(fused[0].found_by(IndexKind::Lexical));
        assert!(fused[0].found_by(IndexKind::Vector));
    }

    #[test]
    fn test_sum_is_not_max_or_mean() {
        let lexical = vec![hit(IndexKind::Lexical, "A.txt", "indemnification", 0.6)];
        let vector = vec![hit(IndexKind::Vector, "A.txt", "indemnification", 0.8)];

        let fused = weighted_fusion(vec![(vector, 1.0), (lexical, 1.0)], 30);

        assert_eq!(fused.len(), 1);
        assert!((fused[0].weighted_score - 1.4).abs() < 1e-6);
    }

    #[test]
    fn test_dual_hit_outranks_single_hit() {
        let lexical = vec![
            hit(IndexKind::Lexical, "A.txt", "dual", 0.6),
            hit(IndexKind::Lexical, "A.txt", "single", 1.0),
        ];
        let vector = vec![hit(IndexKind::Vector, "A.txt", "dual", 0.6)];

        let fused = weighted_fusion(vec![(vector, 0.5), (lexical, 0.5)], 30);

        assert!(score_of(&fused, "dual").weighted_score > score_of(&fused, "single").weighted_score);
    }

    #[test]
    fn test_key_uses_prefix_only() {
        let lexical = vec![hit(
            IndexKind::Lexical,
            "A.txt",
            "Section 24. GOVERNING LAW AND ARBITRATION (lexical chunk)",
            1.0,
        )];
        let vector = vec![hit(
            IndexKind::Vector,
            "A.txt",
            "Section 24. GOVERNING LAW AND ARBITRATION (vector chunk)",
            0.5,
        )];

        let fused = weighted_fusion(vec![(vector, 0.5), (lexical, 0.5)], 30);

        assert_eq!(fused.len(), 1);
        // First encountered passage is kept.
        assert!(fused[0].passage.text.ends_with("(vector chunk)"));
        assert!((fused[0].weighted_score - 0.75).abs() < 1e-6);
    }

    #[test]
    fn test_same_text_different_documents_kept_apart() {
        let lexical = vec![
            hit(IndexKind::Lexical, "A.txt", "Confidentiality", 1.0),
            hit(IndexKind::Lexical, "B.txt", "Confidentiality", 0.5),
        ];

        let fused = weighted_fusion(vec![(lexical, 0.5)], 30);
        assert_eq!(fused.len(), 2);
    }

    #[test]
    fn test_first_encounter_order() {
        let lexical = vec![
            hit(IndexKind::Lexical, "A.txt", "l1", 1.0),
            hit(IndexKind::Lexical, "A.txt", "shared", 0.5),
        ];
        let vector = vec![
            hit(IndexKind::Vector, "A.txt", "shared", 1.0),
            hit(IndexKind::Vector, "A.txt", "v2", 0.2),
        ];

        let fused = weighted_fusion(vec![(vector, 0.5), (lexical, 0.5)], 30);
        let texts: Vec<&str> = fused.iter().map(|h| h.passage.text.as_str()).collect();
        assert_eq!(texts, vec!["shared", "v2", "l1"]);
    }

    #[test]
    fn test_weights_need_not_sum_to_one() {
        let lexical = vec![hit(IndexKind::Lexical, "A.txt", "a", 1.0)];
        let vector = vec![hit(IndexKind::Vector, "A.txt", "b", 0.5)];

        let fused = weighted_fusion(vec![(vector, 2.0), (lexical, 0.25)], 30);

        assert_eq!(score_of(&fused, "a").weighted_score, 0.25);
        assert_eq!(score_of(&fused, "b").weighted_score, 1.0);
    }

    #[test]
    fn test_non_finite_contributions_dropped() {
        let lexical = vec![
            hit(IndexKind::Lexical, "A.txt", "good", 1.0),
            hit(IndexKind::Lexical, "A.txt", "overflow", -3e38),
        ];
        let vector = vec![
            hit(IndexKind::Vector, "A.txt", "good", 1.0),
            hit(IndexKind::Vector, "A.txt", "sum", 3e38),
        ];
        let lexical_sum = vec![hit(IndexKind::Lexical, "A.txt", "sum", 3e38)];

        let fused = weighted_fusion(vec![(vector, 1.0), (lexical, 2.0), (lexical_sum, 1.0)], 30);

        assert!(fused.iter().all(|h| h.weighted_score.is_finite()));
        assert!(fused.iter().all(|h| h.passage.text != "overflow"));
        assert_eq!(score_of(&fused, "good").weighted_score, 3.0);
        let sum = score_of(&fused, "sum");
        assert_eq!(sum.weighted_score, 3e38);
        assert_eq!(sum.contributions.len(), 1);
    }

    #[test]
    fn test_empty_lists() {
        let fused = weighted_fusion(vec![(Vec::new(), 0.5), (Vec::new(), 0.5)], 30);
        assert!(fused.is_empty());
    }
}
