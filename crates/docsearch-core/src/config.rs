//! Configuration types for docsearch.
//!
//! Everything the engine and the index builders need is carried here
//! explicitly; nothing is read from process-wide state.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{Result, SearchError};

/// Main configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocSearchConfig {
    /// Ranking and selection configuration.
    #[serde(default)]
    pub search: SearchConfig,

    /// Settings for the components that build the passage indexes.
    #[serde(default)]
    pub index: IndexConfig,

    /// Tokenizer configuration.
    #[serde(default)]
    pub tokenizer: TokenizerConfig,
}

/// Ranking and selection configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Token allowance per allowed document.
    #[serde(default = "default_tokens_per_document")]
    pub tokens_per_document: usize,

    /// Default hit-count ceiling.
    #[serde(default = "default_max_hits")]
    pub default_max_hits: usize,

    /// Weight for the lexical index.
    #[serde(default = "default_weight")]
    pub lexical_weight: f32,

    /// Weight for the vector index.
    #[serde(default = "default_weight")]
    pub vector_weight: f32,

    /// Default score floor (none = keep everything).
    #[serde(default)]
    pub min_score: Option<f32>,

    /// Leading characters of passage text used in the dedup key.
    #[serde(default = "default_dedup_prefix_chars")]
    pub dedup_prefix_chars: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            // The model accepts ~10K tokens per document; leave room for other calls.
            tokens_per_document: 8000,
            default_max_hits: 15,
            lexical_weight: 0.5,
            vector_weight: 0.5,
            min_score: None,
            dedup_prefix_chars: 30,
        }
    }
}

/// Settings handed to whatever constructs the passage indexes.
///
/// The engine itself only reads `lexical_top_k` and `vector_top_k`. The
/// remaining fields describe how the indexes were built and are passed
/// through unchanged to external index builders. `docsearch config` prints
/// them and `docsearch replay --verbose` logs them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexConfig {
    /// Hits requested from the lexical index.
    #[serde(default = "default_lexical_top_k")]
    pub lexical_top_k: usize,

    /// Hits requested from the vector index.
    #[serde(default = "default_vector_top_k")]
    pub vector_top_k: usize,

    /// Embedding model used to build the vector index.
    #[serde(default = "default_embedding_model")]
    pub embedding_model: String,

    /// Passage size used when the corpus was chunked.
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// Stemmer language for the lexical index.
    #[serde(default = "default_language")]
    pub language: String,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            lexical_top_k: 80,
            vector_top_k: 100,
            embedding_model: default_embedding_model(),
            chunk_size: 1024,
            language: default_language(),
        }
    }
}

/// Which tokenizer implementation to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenizerKind {
    /// tiktoken BPE for an OpenAI model.
    Tiktoken,
    /// HuggingFace `tokenizer.json`.
    HuggingFace,
    /// ~4 bytes per token.
    Approximate,
}

/// Tokenizer configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenizerConfig {
    /// Tokenizer implementation.
    #[serde(default = "default_tokenizer_kind")]
    pub kind: TokenizerKind,

    /// Downstream model whose token accounting is matched.
    #[serde(default = "default_tokenizer_model")]
    pub model: String,

    /// Path to `tokenizer.json` (HuggingFace only).
    #[serde(default)]
    pub path: Option<PathBuf>,

    /// Number of cached token counts.
    #[serde(default = "default_cache_capacity")]
    pub cache_capacity: u64,
}

impl Default for TokenizerConfig {
    fn default() -> Self {
        Self {
            kind: TokenizerKind::Tiktoken,
            model: default_tokenizer_model(),
            path: None,
            cache_capacity: 10_000,
        }
    }
}

// Default value functions

fn default_tokens_per_document() -> usize {
    8000
}

fn default_max_hits() -> usize {
    15
}

fn default_weight() -> f32 {
    0.5
}

fn default_dedup_prefix_chars() -> usize {
    30
}

fn default_lexical_top_k() -> usize {
    80
}

fn default_vector_top_k() -> usize {
    100
}

fn default_embedding_model() -> String {
    "text-embedding-3-small".to_string()
}

fn default_chunk_size() -> usize {
    1024
}

fn default_language() -> String {
    "english".to_string()
}

fn default_tokenizer_kind() -> TokenizerKind {
    TokenizerKind::Tiktoken
}

fn default_tokenizer_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_cache_capacity() -> u64 {
    10_000
}

impl DocSearchConfig {
    /// Load configuration from file.
    pub fn load(path: &std::path::Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)
            .map_err(|e| SearchError::config(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from default paths.
    pub fn load_default() -> Result<Self> {
        // Try user config first
        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("docsearch").join("config.toml");
            if user_config.exists() {
                return Self::load(&user_config);
            }
        }

        let local_config = PathBuf::from("docsearch.toml");
        if local_config.exists() {
            return Self::load(&local_config);
        }

        Ok(Self::default())
    }

    /// Serialize to TOML.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| SearchError::config(format!("Failed to serialize config: {}", e)))
    }

    /// Reject settings the engine cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.search.dedup_prefix_chars == 0 {
            return Err(SearchError::config("search.dedup_prefix_chars must be at least 1"));
        }
        if !self.search.lexical_weight.is_finite() || !self.search.vector_weight.is_finite() {
            return Err(SearchError::config("search weights must be finite"));
        }
        if self.search.min_score.is_some_and(|s| !s.is_finite()) {
            return Err(SearchError::config("search.min_score must be finite"));
        }
        if self.tokenizer.kind == TokenizerKind::HuggingFace && self.tokenizer.path.is_none() {
            return Err(SearchError::config(
                "tokenizer.path is required for the huggingface tokenizer",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = DocSearchConfig::default();
        assert_eq!(config.search.tokens_per_document, 8000);
        assert_eq!(config.search.dedup_prefix_chars, 30);
        assert_eq!(config.index.lexical_top_k, 80);
        assert_eq!(config.index.vector_top_k, 100);
        assert_eq!(config.tokenizer.kind, TokenizerKind::Tiktoken);
        assert_eq!(config.tokenizer.model, "gpt-4o-mini");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = DocSearchConfig::from_toml(
            r#"
            [search]
            tokens_per_document = 4000
            min_score = 0.2

            [tokenizer]
            kind = "approximate"
            "#,
        )
        .unwrap();

        assert_eq!(config.search.tokens_per_document, 4000);
        assert_eq!(config.search.min_score, Some(0.2));
        assert_eq!(config.search.lexical_weight, 0.5);
        assert_eq!(config.index.vector_top_k, 100);
        assert_eq!(config.tokenizer.kind, TokenizerKind::Approximate);
        assert_eq!(config.tokenizer.cache_capacity, 10_000);
    }

    #[test]
    fn test_invalid_toml() {
        let err = DocSearchConfig::from_toml("[search\nfoo").unwrap_err();
        assert_eq!(err.error_code(), "CONFIG_ERROR");
    }

    #[test]
    fn test_validate_rejects_zero_prefix() {
        let err = DocSearchConfig::from_toml("[search]\ndedup_prefix_chars = 0").unwrap_err();
        assert!(err.to_string().contains("dedup_prefix_chars"));
    }

    #[test]
    fn test_huggingface_requires_path() {
        let err = DocSearchConfig::from_toml("[tokenizer]\nkind = \"huggingface\"").unwrap_err();
        assert!(err.to_string().contains("tokenizer.path"));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[index]\nlexical_top_k = 20").unwrap();

        let config = DocSearchConfig::load(file.path()).unwrap();
        assert_eq!(config.index.lexical_top_k, 20);
    }

    #[test]
    fn test_toml_round_trip() {
        let config = DocSearchConfig::default();
        let text = config.to_toml().unwrap();
        let parsed = DocSearchConfig::from_toml(&text).unwrap();
        assert_eq!(parsed.search.tokens_per_document, config.search.tokens_per_document);
        assert_eq!(parsed.tokenizer.kind, config.tokenizer.kind);
    }

    #[test]
    fn test_index_build_settings_pass_through() {
        let config = DocSearchConfig::from_toml(
            r#"
            [index]
            embedding_model = "text-embedding-3-large"
            chunk_size = 512
            language = "german"
            "#,
        )
        .unwrap();

        let text = config.to_toml().unwrap();
        assert!(text.contains("embedding_model = \"text-embedding-3-large\""));
        assert!(text.contains("chunk_size = 512"));
        assert!(text.contains("language = \"german\""));
    }
}
