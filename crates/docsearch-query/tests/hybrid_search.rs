use std::sync::Arc;

use docsearch_core::{ChannelOutcome, DocSearchConfig, IndexKind, MockIndex};
use docsearch_query::{HybridSearch, SearchRequest};
use docsearch_tokens::{ApproxTokenCounter, TiktokenCounter};

const AGREEMENT: &str = "AzulSa_20170303_F-1A_EX-10.3_Maintenance Agreement2.txt";

fn lexical() -> MockIndex {
    MockIndex::from_triples(
        IndexKind::Lexical,
        &[
            (
                "./data/AzulSa/txt/AzulSa_20170303_F-1A_EX-10.3_Maintenance Agreement2.txt",
                "24. GOVERNING LAW AND ARBITRATION. This Agreement shall be governed by the laws of the State of New York.",
                12.4,
            ),
            (
                "./data/AzulSa/txt/AzulSa_20170303_F-1A_EX-10.3_Maintenance Agreement2.txt",
                "In case of any inconsistency between this Agreement and its Annexes, this Agreement prevails.",
                7.1,
            ),
            (
                "./data/Other/txt/Unrelated Lease.txt",
                "This lease shall be governed by the laws of England.",
                15.0,
            ),
        ],
    )
}

fn vector() -> MockIndex {
    MockIndex::from_triples(
        IndexKind::Vector,
        &[
            (
                "./data/AzulSa/txt/AzulSa_20170303_F-1A_EX-10.3_Maintenance Agreement2.txt",
                "24. GOVERNING LAW AND ARBITRATION. This Agreement shall be governed by the laws of the State of New York.",
                0.83,
            ),
            (
                "./data/AzulSa/txt/AzulSa_20170303_F-1A_EX-10.3_Maintenance Agreement2.txt",
                "The parties irrevocably submit to the jurisdiction of the courts of New York.",
                0.79,
            ),
        ],
    )
}

#[tokio::test]
async fn consensus_passage_ranks_first() {
    let engine = HybridSearch::new(
        Arc::new(lexical()),
        Arc::new(vector()),
        Arc::new(TiktokenCounter::for_model("gpt-4o-mini", 100).unwrap()),
    );

    let results = engine
        .search("governing law", SearchRequest::new([AGREEMENT], 15))
        .await
        .unwrap();

    assert_eq!(results.total_results, 3);
    assert!(results.results[0].passage.text.starts_with("24. GOVERNING LAW"));
    assert!((results.results[0].weighted_score - 1.0).abs() < 1e-6);
    assert!(results.results[0].token_count > 0);
    assert!(results
        .results
        .iter()
        .all(|r| r.passage.document_id() == AGREEMENT));
    assert_eq!(results.lexical.outcome, ChannelOutcome::Used);
    assert_eq!(results.vector.outcome, ChannelOutcome::Used);
    assert_eq!(results.token_budget, 8000);
}

#[tokio::test]
async fn budget_below_cheapest_passage_returns_nothing() {
    let mut config = DocSearchConfig::default();
    config.search.tokens_per_document = 2;

    let engine = HybridSearch::with_config(
        Arc::new(lexical()),
        Arc::new(vector()),
        Arc::new(ApproxTokenCounter::new()),
        &config,
    );

    let results = engine
        .search("governing law", SearchRequest::new([AGREEMENT], 5))
        .await
        .unwrap();

    assert!(results.results.is_empty());
    assert!(results.budget_exhausted);
}

#[tokio::test]
async fn empty_allowed_set_returns_nothing() {
    let engine = HybridSearch::new(
        Arc::new(lexical()),
        Arc::new(vector()),
        Arc::new(ApproxTokenCounter::new()),
    );

    let results = engine
        .hybrid_search("governing law", Vec::<String>::new(), 15, 0.5, 0.5, None)
        .await
        .unwrap();

    assert!(results.is_empty());
}

#[tokio::test]
async fn min_score_prunes_single_index_hits() {
    let engine = HybridSearch::new(
        Arc::new(lexical()),
        Arc::new(vector()),
        Arc::new(ApproxTokenCounter::new()),
    );

    let results = engine
        .hybrid_search("governing law", [AGREEMENT], 15, 0.5, 0.5, Some(0.6))
        .await
        .unwrap();

    assert_eq!(results.len(), 1);
    assert!(results[0].passage.text.starts_with("24. GOVERNING LAW"));
}

#[tokio::test]
async fn dyn_collaborators() {
    let lexical: Arc<dyn docsearch_core::PassageIndex> = Arc::new(lexical());
    let vector: Arc<dyn docsearch_core::PassageIndex> = Arc::new(vector());
    let tokenizer = docsearch_tokens::build_token_counter(&docsearch_core::TokenizerConfig {
        kind: docsearch_core::TokenizerKind::Approximate,
        ..Default::default()
    })
    .unwrap();

    let engine = HybridSearch::new(lexical, vector, tokenizer);
    let results = engine
        .search("arbitration", engine.request([AGREEMENT]))
        .await
        .unwrap();

    assert_eq!(results.total_results, 3);
}
