//! Directory walker producing one document per source line.
//!
//! Entry errors (unreadable directories, vanished files) skip that entry and
//! the walk goes on. Failing to open an eligible file aborts the walk and is
//! returned to the caller. A failed `emit` drops that line only.

use std::future::Future;
use std::path::Path;

use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, BufReader};
use walkdir::WalkDir;

use super::document::CodeLine;
use super::filter::is_eligible;
use crate::error::WalkError;
use crate::telemetry::metrics::{FILES_INDEXED, LINES_INDEXED, LINE_ERRORS};
use crate::Result;

/// Receives the documents produced by a walk, one call per line.
pub trait LineSink {
    /// Hand over one document. Errors are logged by the walker and the
    /// walk continues with the next line.
    fn emit(&mut self, line: CodeLine) -> impl Future<Output = Result<()>>;
}

impl LineSink for Vec<CodeLine> {
    async fn emit(&mut self, line: CodeLine) -> Result<()> {
        self.push(line);
        Ok(())
    }
}

/// Counters for a single walk.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct WalkStats {
    pub files_seen: u64,
    pub files_indexed: u64,
    pub files_skipped: u64,
    pub entry_errors: u64,
    pub read_errors: u64,
    pub lines_emitted: u64,
    pub line_failures: u64,
}

/// Walk `root` and emit a [`CodeLine`] for every line of every eligible file.
///
/// Entries are visited depth-first in file name order. Symlinks are not
/// followed.
///
/// # Errors
///
/// Returns [`WalkError::Open`] if an eligible file cannot be opened; the
/// remaining tree is not walked.
pub async fn walk_tree<S: LineSink>(
    root: &Path,
    repository: &str,
    sink: &mut S,
) -> std::result::Result<WalkStats, WalkError> {
    let mut stats = WalkStats::default();

    tracing::debug!(root = %root.display(), "Starting tree walk");

    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                tracing::debug!(error = %e, "Skipping unreadable entry");
                stats.entry_errors += 1;
                continue;
            }
        };

        if entry.file_type().is_dir() {
            continue;
        }

        stats.files_seen += 1;
        let path = entry.path();

        if !is_eligible(path) {
            stats.files_skipped += 1;
            continue;
        }

        let file = File::open(path).await.map_err(|source| WalkError::Open {
            path: path.to_path_buf(),
            source,
        })?;

        emit_lines(file, path, repository, sink, &mut stats).await;
        stats.files_indexed += 1;
        FILES_INDEXED.inc();
    }

    tracing::debug!(
        root = %root.display(),
        files = stats.files_indexed,
        lines = stats.lines_emitted,
        "Tree walk complete"
    );

    Ok(stats)
}

async fn emit_lines<S: LineSink>(
    file: File,
    path: &Path,
    repository: &str,
    sink: &mut S,
    stats: &mut WalkStats,
) {
    let file_path = path.to_string_lossy();
    let mut reader = BufReader::new(file);
    let mut buf = Vec::new();
    let mut line_no = 0u64;

    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf).await {
            Ok(0) => break,
            Ok(_) => {}
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Read error, skipping rest of file");
                stats.read_errors += 1;
                break;
            }
        }

        strip_line_ending(&mut buf);
        line_no += 1;

        let content = String::from_utf8_lossy(&buf).into_owned();
        let doc = CodeLine::build(repository, &*file_path, line_no, content);

        match sink.emit(doc).await {
            Ok(()) => {
                stats.lines_emitted += 1;
                LINES_INDEXED.inc();
            }
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    line = line_no,
                    error = %e,
                    "indexing error"
                );
                stats.line_failures += 1;
                LINE_ERRORS.inc();
            }
        }
    }
}

fn strip_line_ending(buf: &mut Vec<u8>) {
    if buf.last() == Some(&b'\n') {
        buf.pop();
    }
    if buf.last() == Some(&b'\r') {
        buf.pop();
    }
}
