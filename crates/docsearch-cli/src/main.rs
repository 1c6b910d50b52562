//! docsearch CLI - inspect ranking and token budgets offline.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand};
use serde::Deserialize;
use tracing::{debug, info, Level};
use tracing_subscriber::FmtSubscriber;

use docsearch_core::{
    ChannelReport, DocSearchConfig, HybridSearchResults, IndexHit, IndexKind, MockIndex,
    RecordedHit,
};
use docsearch_query::HybridSearch;
use docsearch_tokens::{build_token_counter, TokenCounter};

/// docsearch - hybrid lexical + vector evidence selection
#[derive(Parser)]
#[command(name = "docsearch")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Configuration file (default: <config dir>/docsearch/config.toml, then ./docsearch.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the effective configuration
    Config,

    /// Count tokens the way the configured model does
    Tokens {
        /// Text to count
        text: String,
    },

    /// Rank recorded index results for a query
    Replay {
        /// Search query
        query: String,

        /// JSON file with recorded `lexical` and `vector` hits
        #[arg(long)]
        hits: PathBuf,

        /// Allowed document (filename); repeat for several
        #[arg(short, long = "doc")]
        docs: Vec<String>,

        /// Maximum number of results
        #[arg(short = 'k', long)]
        max_hits: Option<usize>,

        /// Weight for the lexical index
        #[arg(long)]
        lexical_weight: Option<f32>,

        /// Weight for the vector index
        #[arg(long)]
        vector_weight: Option<f32>,

        /// Drop results scoring below this
        #[arg(long)]
        min_score: Option<f32>,

        /// Print results as JSON
        #[arg(long)]
        json: bool,
    },
}

/// Recorded output of both indexes for one query.
#[derive(Debug, Default, Deserialize)]
struct ReplayFile {
    #[serde(default)]
    lexical: Vec<RecordedHit>,

    #[serde(default)]
    vector: Vec<RecordedHit>,
}

impl ReplayFile {
    fn load(path: &Path) -> docsearch_core::Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    fn into_indexes(self) -> (MockIndex, MockIndex) {
        let lexical: Vec<IndexHit> = self.lexical.into_iter().map(Into::into).collect();
        let vector: Vec<IndexHit> = self.vector.into_iter().map(Into::into).collect();
        (
            MockIndex::new(IndexKind::Lexical, lexical),
            MockIndex::new(IndexKind::Vector, vector),
        )
    }
}

fn setup_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::WARN };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber).ok();
}

fn load_config(path: Option<&Path>) -> Result<DocSearchConfig, docsearch_core::SearchError> {
    match path {
        Some(path) => DocSearchConfig::load(path),
        None => DocSearchConfig::load_default(),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    setup_logging(cli.verbose);

    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Config => {
            print!("{}", config.to_toml()?);
        }
        Commands::Tokens { text } => {
            let counter = build_token_counter(&config.tokenizer)?;
            println!("{}", counter.count_tokens(&text)?);
        }
        Commands::Replay {
            query,
            hits,
            docs,
            max_hits,
            lexical_weight,
            vector_weight,
            min_score,
            json,
        } => {
            info!("Replaying {} for {:?}", hits.display(), query);

            debug!(
                "Index settings: lexical_top_k={}, vector_top_k={}, embedding_model={}, chunk_size={}, language={}",
                config.index.lexical_top_k,
                config.index.vector_top_k,
                config.index.embedding_model,
                config.index.chunk_size,
                config.index.language
            );

            let (lexical, vector) = ReplayFile::load(&hits)?.into_indexes();
            let tokenizer = build_token_counter(&config.tokenizer)?;
            let engine =
                HybridSearch::with_config(Arc::new(lexical), Arc::new(vector), tokenizer, &config);

            let mut request = engine.request(docs);
            if let Some(max_hits) = max_hits {
                request.max_hits = max_hits;
            }
            if let Some(weight) = lexical_weight {
                request.lexical_weight = weight;
            }
            if let Some(weight) = vector_weight {
                request.vector_weight = weight;
            }
            if min_score.is_some() {
                request.min_score = min_score;
            }

            let results = engine.search(&query, request).await?;

            if json {
                println!("{}", serde_json::to_string_pretty(&results)?);
            } else {
                print!("{}", render(&results));
            }
        }
    }

    Ok(())
}

fn render(results: &HybridSearchResults) -> String {
    let mut output = format!(
        "Found {} results in {}ms ({} of {} tokens{}):\n",
        results.total_results,
        results.latency_ms,
        results.tokens_used,
        results.token_budget,
        if results.budget_exhausted {
            ", budget exhausted"
        } else {
            ""
        }
    );
    output.push_str(&render_channel(&results.lexical));
    output.push_str(&render_channel(&results.vector));
    output.push('\n');

    for result in &results.results {
        let via: Vec<String> = result
            .contributions
            .iter()
            .map(|c| format!("{} {:.3}", c.origin, c.weighted_score))
            .collect();

        output.push_str(&format!(
            "---\n[{}] {} (score: {:.3}, tokens: {}, via: {})\n",
            result.rank,
            result.passage.document_id(),
            result.weighted_score,
            result.token_count,
            via.join(" + ")
        ));
        output.push_str(&format!("{}\n\n", result.passage.text));
    }

    output
}

fn render_channel(report: &ChannelReport) -> String {
    format!(
        "  {}: {} returned, {} in allowed documents ({:?})\n",
        report.index, report.returned, report.allowed, report.outcome
    )
}
