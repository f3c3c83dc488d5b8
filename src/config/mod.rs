//! Configuration management for codesearch.
//!
//! Supports configuration from:
//! - Command-line arguments (highest priority)
//! - Environment variables
//! - The repository list file (`repos.yaml`)

mod repos;
mod settings;

pub use repos::{RepoList, RepoSpec};
pub use settings::{Config, StoreKind};
