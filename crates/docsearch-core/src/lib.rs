//! docsearch-core - Core types and traits for hybrid passage retrieval
//!
//! This crate provides the passage and score types, collaborator traits,
//! configuration, and error handling used throughout docsearch.

pub mod config;
pub mod error;
pub mod mock;
pub mod traits;
pub mod types;

pub use config::*;
pub use error::{Result, SearchError};
pub use mock::{MockIndex, RecordedHit};
pub use traits::*;
pub use types::*;
