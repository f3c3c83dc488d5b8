//! codesearch - line-granular code search indexer
//!
//! Entry point for a single indexing run.

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

use std::path::PathBuf;

use clap::Parser;
use codesearch::config::{RepoList, StoreKind};
use codesearch::ingest::{GitFetcher, IndexingSession, SessionReport, CODESEARCH_INDEX};
use codesearch::storage::{DocumentStore, ElasticStore, SqliteStore};
use codesearch::telemetry::{init_metrics, init_tracing, write_metrics, TracingConfig};
use codesearch::{Config, Result};

/// codesearch - index git repositories line by line
#[derive(Parser, Debug)]
#[command(name = "codesearch")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// YAML file listing the repositories to index
    #[arg(short, long, env = "CODESEARCH_CONFIG", default_value = "repos.yaml")]
    config: PathBuf,

    /// Directory repositories are cloned into
    #[arg(short, long, env = "CODESEARCH_WORKDIR", default_value = "cloned_repos")]
    workdir: PathBuf,

    /// Store receiving the documents
    #[arg(long, env = "CODESEARCH_STORE", value_enum, default_value = "elasticsearch")]
    store: StoreKind,

    /// Elasticsearch base URL
    #[arg(long, env = "CODESEARCH_ELASTICSEARCH_URL", default_value = "http://localhost:9200")]
    elasticsearch_url: String,

    /// `SQLite` database path, used with `--store sqlite`
    #[arg(long, env = "CODESEARCH_SQLITE_PATH", default_value = "./data/codesearch.db")]
    sqlite_path: PathBuf,

    /// Destination index name
    #[arg(short, long, env = "CODESEARCH_INDEX", default_value = CODESEARCH_INDEX)]
    index: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "CODESEARCH_LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// Enable JSON logging output
    #[arg(long, env = "CODESEARCH_LOG_JSON")]
    log_json: bool,

    /// Write Prometheus metrics to this file when the run ends
    #[arg(long, env = "CODESEARCH_METRICS_OUT")]
    metrics_out: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(&TracingConfig {
        level: cli.log_level.clone(),
        json: cli.log_json,
    });

    tracing::info!("codesearch v{} starting...", env!("CARGO_PKG_VERSION"));

    let config = Config {
        repos_file: cli.config,
        workdir: cli.workdir,
        store: cli.store,
        elasticsearch_url: cli.elasticsearch_url,
        sqlite_path: cli.sqlite_path,
        index: cli.index,
        log_level: cli.log_level,
        metrics_out: cli.metrics_out,
    };

    tracing::debug!(?config, "Configuration loaded");
    config.validate()?;

    let repos = RepoList::load(&config.repos_file)?;
    tracing::info!(
        repos = repos.len(),
        index = %config.index,
        store = ?config.store,
        "Repository list loaded"
    );

    init_metrics();

    let report = match config.store {
        StoreKind::Elasticsearch => {
            let store = ElasticStore::connect(config.elasticsearch_url.as_str()).await?;
            run_session(store, &config, &repos).await?
        }
        StoreKind::Sqlite => {
            let store = SqliteStore::open(&config.sqlite_path)?;
            run_session(store, &config, &repos).await?
        }
    };

    for repo in report.repos.iter().filter(|r| r.outcome.stats().is_none()) {
        tracing::warn!(repo = %repo.name, outcome = repo.outcome.label(), "Repository not fully indexed");
    }

    if let Some(path) = &config.metrics_out {
        if let Err(e) = write_metrics(path) {
            tracing::warn!(path = %path.display(), error = %e, "Failed to write metrics");
        }
    }

    Ok(())
}

async fn run_session<S: DocumentStore>(
    store: S,
    config: &Config,
    repos: &RepoList,
) -> Result<SessionReport> {
    let session = IndexingSession::new(store, GitFetcher::new(), &config.index, &config.workdir);
    session.run(repos).await
}
