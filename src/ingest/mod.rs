//! Ingestion pipeline: fetch, walk, classify, extract, emit.
//!
//! This module provides:
//! - Suffix-based file eligibility
//! - Heuristic function name detection per line
//! - Per-line document construction
//! - A best-effort tree walker
//! - The indexing session tying repositories to a store

mod document;
pub mod extractor;
mod fetch;
pub mod filter;
mod session;
mod walker;

pub use document::CodeLine;
pub use extractor::{extract_function_name, match_dialect};
pub use fetch::{Fetcher, GitFetcher};
pub use filter::is_eligible;
pub use session::{IndexingSession, RepoOutcome, RepoReport, SessionReport};
pub use walker::{walk_tree, LineSink, WalkStats};

/// Default destination index for code search documents.
pub const CODESEARCH_INDEX: &str = "codesearch";
