//! Prometheus metrics definitions.

use std::path::Path;

use once_cell::sync::Lazy;
use prometheus::{
    register_int_counter, register_int_counter_vec, Encoder, IntCounter, IntCounterVec,
    TextEncoder,
};

use crate::error::Error;
use crate::Result;

/// Lines handed to the store successfully.
pub static LINES_INDEXED: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "codesearch_lines_indexed_total",
        "Total number of source lines indexed"
    )
    .unwrap()
});

/// Lines the store rejected.
pub static LINE_ERRORS: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "codesearch_line_errors_total",
        "Total number of lines that failed to index"
    )
    .unwrap()
});

/// Eligible files read to the end.
pub static FILES_INDEXED: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "codesearch_files_indexed_total",
        "Total number of files indexed"
    )
    .unwrap()
});

/// Repositories processed, by outcome.
pub static REPOSITORIES: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "codesearch_repositories_total",
        "Total number of repositories processed",
        &["outcome"]
    )
    .unwrap()
});

/// Initialize all metrics (call once at startup).
pub fn init_metrics() {
    let _ = &*LINES_INDEXED;
    let _ = &*LINE_ERRORS;
    let _ = &*FILES_INDEXED;
    let _ = &*REPOSITORIES;

    tracing::debug!("Prometheus metrics initialized");
}

/// Render the default registry in the Prometheus text format.
///
/// # Errors
///
/// Returns an error if encoding fails.
pub fn render_metrics() -> Result<String> {
    let mut buf = Vec::new();
    TextEncoder::new()
        .encode(&prometheus::gather(), &mut buf)
        .map_err(|e| Error::internal(format!("failed to encode metrics: {e}")))?;
    String::from_utf8(buf).map_err(|e| Error::internal(format!("metrics are not UTF-8: {e}")))
}

/// Write the current metrics to `path` for a textfile collector.
///
/// # Errors
///
/// Returns an error if the metrics cannot be rendered or written.
pub fn write_metrics(path: &Path) -> Result<()> {
    let text = render_metrics()?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, text)?;
    tracing::debug!(path = %path.display(), "Metrics written");
    Ok(())
}
