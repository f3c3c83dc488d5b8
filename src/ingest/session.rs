//! One indexing run over all configured repositories.
//!
//! The destination index is dropped first so every run starts clean. Each
//! repository is then fetched and walked in turn; a repository that fails
//! never stops the ones after it.

use std::path::{Path, PathBuf};

use super::document::CodeLine;
use super::fetch::Fetcher;
use super::walker::{walk_tree, LineSink, WalkStats};
use crate::config::{RepoList, RepoSpec};
use crate::storage::DocumentStore;
use crate::telemetry::metrics::REPOSITORIES;
use crate::{Error, Result};

/// What happened to one repository.
#[derive(Debug)]
pub enum RepoOutcome {
    /// Walked to the end.
    Indexed(WalkStats),
    /// The local tree could not be produced; nothing was indexed.
    FetchFailed(Error),
    /// The walk stopped early on a file that could not be opened.
    WalkAborted(Error),
}

impl RepoOutcome {
    /// Short label used in logs and metrics.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Indexed(_) => "indexed",
            Self::FetchFailed(_) => "fetch_failed",
            Self::WalkAborted(_) => "walk_aborted",
        }
    }

    /// Walk statistics, if the repository was walked to the end.
    #[must_use]
    pub const fn stats(&self) -> Option<&WalkStats> {
        match self {
            Self::Indexed(stats) => Some(stats),
            _ => None,
        }
    }
}

/// Outcome for a named repository.
#[derive(Debug)]
pub struct RepoReport {
    pub name: String,
    pub outcome: RepoOutcome,
}

/// Summary of a whole run, in configuration order.
#[derive(Debug, Default)]
pub struct SessionReport {
    pub repos: Vec<RepoReport>,
}

impl SessionReport {
    /// Number of repositories walked to the end.
    #[must_use]
    pub fn indexed(&self) -> usize {
        self.repos
            .iter()
            .filter(|r| matches!(r.outcome, RepoOutcome::Indexed(_)))
            .count()
    }

    /// Number of repositories that failed to fetch or walk.
    #[must_use]
    pub fn failed(&self) -> usize {
        self.repos.len() - self.indexed()
    }

    /// Lines indexed across all fully walked repositories.
    #[must_use]
    pub fn lines_emitted(&self) -> u64 {
        self.repos
            .iter()
            .filter_map(|r| r.outcome.stats())
            .map(|s| s.lines_emitted)
            .sum()
    }
}

/// Forwards walked lines into a named index.
struct IndexSink<'a, S> {
    store: &'a S,
    index: &'a str,
}

impl<S: DocumentStore> LineSink for IndexSink<'_, S> {
    async fn emit(&mut self, line: CodeLine) -> Result<()> {
        self.store.index_document(self.index, &line).await
    }
}

/// Drives fetch, walk and store for a list of repositories.
#[derive(Debug)]
pub struct IndexingSession<S, F> {
    store: S,
    fetcher: F,
    index: String,
    workdir: PathBuf,
}

impl<S: DocumentStore, F: Fetcher> IndexingSession<S, F> {
    /// Create a session writing into `index`, cloning under `workdir`.
    pub fn new(store: S, fetcher: F, index: impl Into<String>, workdir: impl Into<PathBuf>) -> Self {
        Self {
            store,
            fetcher,
            index: index.into(),
            workdir: workdir.into(),
        }
    }

    /// The destination store.
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// The destination index name.
    pub fn index(&self) -> &str {
        &self.index
    }

    /// Directory repositories are materialized under.
    pub fn workdir(&self) -> &Path {
        &self.workdir
    }

    /// Run a full session: prepare, reset the index, then ingest every
    /// repository in order.
    ///
    /// # Errors
    ///
    /// Returns an error only for setup failures: the working directory
    /// cannot be created or the index cannot be checked or dropped.
    /// Repository and line failures are reported in the [`SessionReport`].
    pub async fn run(&self, repos: &RepoList) -> Result<SessionReport> {
        tokio::fs::create_dir_all(&self.workdir).await.map_err(|e| {
            Error::config(format!(
                "failed to create working directory '{}': {e}",
                self.workdir.display()
            ))
        })?;

        self.reset_index().await?;

        let mut report = SessionReport::default();
        for repo in &repos.repos {
            let outcome = self.process_repository(repo).await;
            REPOSITORIES.with_label_values(&[outcome.label()]).inc();
            report.repos.push(RepoReport {
                name: repo.name.clone(),
                outcome,
            });
        }

        tracing::info!(
            index = %self.index,
            repos = report.repos.len(),
            indexed = report.indexed(),
            failed = report.failed(),
            lines = report.lines_emitted(),
            "Indexing run complete"
        );

        Ok(report)
    }

    /// Drop the destination index if it exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the existence check or the deletion fails.
    pub async fn reset_index(&self) -> Result<()> {
        let exists = self.store.index_exists(&self.index).await.map_err(|e| {
            tracing::error!(index = %self.index, error = %e, "error checking if index exists");
            e
        })?;

        if exists {
            self.store.delete_index(&self.index).await.map_err(|e| {
                tracing::error!(index = %self.index, error = %e, "failed to delete existing index");
                e
            })?;
            tracing::info!(index = %self.index, "deleted existing index");
        }

        Ok(())
    }

    /// Fetch and index one repository. Never fails; see [`RepoOutcome`].
    pub async fn process_repository(&self, repo: &RepoSpec) -> RepoOutcome {
        tracing::info!(repo = %repo.name, url = %repo.url, "processing repository");

        let local = match self.fetcher.ensure_local(repo, &self.workdir).await {
            Ok(path) => path,
            Err(e) => {
                tracing::warn!(repo = %repo.name, error = %e, "repo processing error");
                return RepoOutcome::FetchFailed(e);
            }
        };

        let mut sink = IndexSink {
            store: &self.store,
            index: &self.index,
        };

        match walk_tree(&local, &repo.url, &mut sink).await {
            Ok(stats) => {
                tracing::info!(
                    repo = %repo.name,
                    files = stats.files_indexed,
                    lines = stats.lines_emitted,
                    line_failures = stats.line_failures,
                    entry_errors = stats.entry_errors,
                    "Repository indexed"
                );
                RepoOutcome::Indexed(stats)
            }
            Err(e) => {
                tracing::error!(repo = %repo.name, error = %e, "indexing error");
                RepoOutcome::WalkAborted(e.into())
            }
        }
    }
}
