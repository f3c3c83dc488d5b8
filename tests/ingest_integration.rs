//! Integration tests for full indexing runs.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use codesearch::config::{RepoList, RepoSpec};
use codesearch::ingest::{
    walk_tree, CodeLine, Fetcher, GitFetcher, IndexingSession, RepoOutcome, CODESEARCH_INDEX,
};
use codesearch::storage::{DocumentStore, SqliteStore};
use codesearch::{Error, Result};
use tempfile::TempDir;

/// Fetcher that hands out an existing directory per repository name.
struct LocalFetcher {
    root: PathBuf,
}

impl Fetcher for LocalFetcher {
    async fn ensure_local(&self, repo: &RepoSpec, _base: &Path) -> Result<PathBuf> {
        let path = self.root.join(&repo.name);
        if path.is_dir() {
            Ok(path)
        } else {
            Err(Error::internal(format!("no such repository: {}", repo.name)))
        }
    }
}

/// Store that rejects every document whose content contains a marker.
struct PickyStore {
    inner: SqliteStore,
    reject: &'static str,
}

impl DocumentStore for PickyStore {
    async fn index_exists(&self, index: &str) -> Result<bool> {
        self.inner.index_exists(index).await
    }

    async fn delete_index(&self, index: &str) -> Result<()> {
        self.inner.delete_index(index).await
    }

    async fn index_document(&self, index: &str, doc: &CodeLine) -> Result<()> {
        if doc.content.contains(self.reject) {
            return Err(Error::internal("rejected by store"));
        }
        self.inner.index_document(index, doc).await
    }
}

fn write_sources(root: &Path) {
    let api = root.join("api");
    fs::create_dir_all(api.join("handlers")).unwrap();
    fs::write(
        api.join("main.go"),
        "package main\n\nfunc main() {\n\tserve()\n}\n",
    )
    .unwrap();
    fs::write(
        api.join("handlers").join("users.py"),
        "class Users:\n    def list(self, req):\n        return []\n",
    )
    .unwrap();
    fs::write(api.join("logo.png"), [0u8, 1, 2, 3]).unwrap();

    let web = root.join("web");
    fs::create_dir_all(&web).unwrap();
    fs::write(web.join("Makefile"), "build:\n\tnpm run build\n").unwrap();
    fs::write(
        web.join("app.ts"),
        "const start = (port) => {\n  listen(port);\n};\n",
    )
    .unwrap();
}

fn repos(names: &[&str]) -> RepoList {
    RepoList {
        repos: names
            .iter()
            .map(|n| RepoSpec {
                name: (*n).to_string(),
                url: format!("https://git.example.com/{n}.git"),
            })
            .collect(),
    }
}

#[tokio::test]
async fn test_full_run_indexes_every_line() {
    let tmp = TempDir::new().unwrap();
    write_sources(&tmp.path().join("src"));

    let store = SqliteStore::open(tmp.path().join("index.db")).unwrap();
    let fetcher = LocalFetcher {
        root: tmp.path().join("src"),
    };
    let session = IndexingSession::new(store, fetcher, CODESEARCH_INDEX, tmp.path().join("work"));

    let report = session.run(&repos(&["api", "web"])).await.unwrap();
    assert_eq!(report.indexed(), 2);

    let store = session.store();
    // 5 + 3 lines in api, 2 + 3 lines in web
    assert_eq!(store.count_documents(CODESEARCH_INDEX).unwrap(), 13);

    let main_go = tmp.path().join("src").join("api").join("main.go");
    let lines = store
        .documents_for_file(CODESEARCH_INDEX, &main_go.to_string_lossy())
        .unwrap();
    let numbers: Vec<u64> = lines.iter().map(|l| l.line).collect();
    assert_eq!(numbers, vec![1, 2, 3, 4, 5]);
    assert_eq!(lines[2].function, "main");
    assert_eq!(lines[3].content, "\tserve()");
    assert!(lines
        .iter()
        .all(|l| l.repository == "https://git.example.com/api.git"));

    let all = store.documents(CODESEARCH_INDEX).unwrap();
    assert!(all.iter().any(|l| l.function == "list"));
    assert!(all.iter().any(|l| l.function == "start"));
    assert!(!all.iter().any(|l| l.file_path.ends_with("logo.png")));
}

#[tokio::test]
async fn test_rerun_is_idempotent() {
    let tmp = TempDir::new().unwrap();
    write_sources(&tmp.path().join("src"));
    let db_path = tmp.path().join("index.db");

    let mut snapshots = Vec::new();
    for _ in 0..2 {
        let store = SqliteStore::open(&db_path).unwrap();
        let fetcher = LocalFetcher {
            root: tmp.path().join("src"),
        };
        let session =
            IndexingSession::new(store, fetcher, CODESEARCH_INDEX, tmp.path().join("work"));
        session.run(&repos(&["api", "web"])).await.unwrap();
        snapshots.push(session.store().documents(CODESEARCH_INDEX).unwrap());
    }

    assert_eq!(snapshots[0].len(), 13);
    assert_eq!(snapshots[0], snapshots[1]);
}

#[tokio::test]
async fn test_missing_repository_does_not_block_others() {
    let tmp = TempDir::new().unwrap();
    write_sources(&tmp.path().join("src"));

    let store = SqliteStore::open_in_memory().unwrap();
    let fetcher = LocalFetcher {
        root: tmp.path().join("src"),
    };
    let session = IndexingSession::new(store, fetcher, CODESEARCH_INDEX, tmp.path().join("work"));

    let report = session
        .run(&repos(&["ghost", "web"]))
        .await
        .unwrap();

    assert!(matches!(report.repos[0].outcome, RepoOutcome::FetchFailed(_)));
    assert!(matches!(report.repos[1].outcome, RepoOutcome::Indexed(_)));
    assert_eq!(session.store().count_documents(CODESEARCH_INDEX).unwrap(), 5);
}

#[tokio::test]
async fn test_store_rejections_are_isolated() {
    let tmp = TempDir::new().unwrap();
    write_sources(&tmp.path().join("src"));

    let store = PickyStore {
        inner: SqliteStore::open_in_memory().unwrap(),
        reject: "func main",
    };
    let fetcher = LocalFetcher {
        root: tmp.path().join("src"),
    };
    let session = IndexingSession::new(store, fetcher, CODESEARCH_INDEX, tmp.path().join("work"));

    let report = session.run(&repos(&["api"])).await.unwrap();
    let stats = report.repos[0].outcome.stats().copied().unwrap();
    assert_eq!(stats.line_failures, 1);
    assert_eq!(stats.lines_emitted, 7);

    let docs = session.store().inner.documents(CODESEARCH_INDEX).unwrap();
    assert_eq!(docs.len(), 7);
    // the lines after the rejected one, and the next file, still made it
    assert!(docs.iter().any(|d| d.content == "\tserve()"));
    assert!(docs.iter().any(|d| d.file_path.ends_with("users.py")));
}

#[cfg(unix)]
#[tokio::test]
async fn test_unopenable_file_aborts_repository() {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().join("src");
    write_sources(&root);
    std::os::unix::fs::symlink(root.join("nowhere.go"), root.join("api").join("broken.go"))
        .unwrap();

    let mut lines = Vec::new();
    let err = walk_tree(&root.join("api"), "r", &mut lines).await.unwrap_err();
    assert!(err.to_string().contains("broken.go"));

    let store = SqliteStore::open_in_memory().unwrap();
    let fetcher = LocalFetcher { root };
    let session = IndexingSession::new(store, fetcher, CODESEARCH_INDEX, tmp.path().join("work"));

    let report = session.run(&repos(&["api", "web"])).await.unwrap();
    assert!(matches!(report.repos[0].outcome, RepoOutcome::WalkAborted(_)));
    assert!(matches!(report.repos[1].outcome, RepoOutcome::Indexed(_)));
}

fn git(dir: &Path, args: &[&str]) -> bool {
    Command::new("git")
        .args(["-c", "user.name=test", "-c", "user.email=test@example.com"])
        .args(args)
        .current_dir(dir)
        .output()
        .is_ok_and(|o| o.status.success())
}

#[tokio::test]
async fn test_git_backed_run_twice() {
    let tmp = TempDir::new().unwrap();
    let origin = tmp.path().join("origin");
    fs::create_dir_all(&origin).unwrap();
    if !git(&origin, &["init", "--quiet"]) {
        // git not installed
        return;
    }
    fs::write(origin.join("lib.rs"), "fn helper() {}\n\npub fn run() {}\n").unwrap();
    assert!(git(&origin, &["add", "."]));
    assert!(git(&origin, &["commit", "--quiet", "-m", "init"]));

    let list = RepoList {
        repos: vec![RepoSpec {
            name: "lib".to_string(),
            url: origin.to_string_lossy().to_string(),
        }],
    };
    let db_path = tmp.path().join("index.db");

    let mut counts = Vec::new();
    for _ in 0..2 {
        let store = SqliteStore::open(&db_path).unwrap();
        let session =
            IndexingSession::new(store, GitFetcher::new(), "codesearch", tmp.path().join("work"));
        let report = session.run(&list).await.unwrap();
        assert_eq!(report.indexed(), 1);
        counts.push(session.store().count_documents("codesearch").unwrap());
    }

    assert_eq!(counts, vec![3, 3]);
}
