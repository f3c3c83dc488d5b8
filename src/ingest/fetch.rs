//! Materializing repositories on local disk.

use std::future::Future;
use std::path::{Path, PathBuf};

use tokio::process::Command;

use crate::config::RepoSpec;
use crate::error::FetchError;
use crate::Result;

/// Produces a readable local tree for a configured repository.
pub trait Fetcher {
    /// Make `repo` available under `base` and return its local path.
    ///
    /// Calling this again for a repository that is already present must
    /// update it in place; having nothing new to fetch is not an error.
    fn ensure_local(
        &self,
        repo: &RepoSpec,
        base: &Path,
    ) -> impl Future<Output = Result<PathBuf>>;
}

/// Fetcher driving the `git` command line client.
#[derive(Debug, Clone)]
pub struct GitFetcher {
    git: PathBuf,
}

impl Default for GitFetcher {
    fn default() -> Self {
        Self {
            git: PathBuf::from("git"),
        }
    }
}

impl GitFetcher {
    /// Create a fetcher using `git` from `PATH`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a fetcher using a specific git executable.
    #[must_use]
    pub fn with_binary(git: impl Into<PathBuf>) -> Self {
        Self { git: git.into() }
    }

    fn command(&self, dir: Option<&Path>) -> Command {
        let mut cmd = Command::new(&self.git);
        cmd.env("GIT_TERMINAL_PROMPT", "0");
        if let Some(dir) = dir {
            cmd.current_dir(dir);
        }
        cmd
    }

    async fn run(&self, mut cmd: Command, args: &[&str]) -> Result<String> {
        let output = cmd
            .args(args)
            .output()
            .await
            .map_err(|e| FetchError::GitUnavailable(e.to_string()))?;

        if output.status.success() {
            Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
        } else {
            Err(FetchError::command_failed(
                format!("git {}", args.join(" ")),
                String::from_utf8_lossy(&output.stderr).trim().to_string(),
            )
            .into())
        }
    }

    async fn clone_repo(&self, repo: &RepoSpec, target: &Path) -> Result<()> {
        let target_str = target.to_string_lossy();
        self.run(
            self.command(None),
            &["clone", "--quiet", "--", &repo.url, &target_str],
        )
            .await?;
        tracing::info!(repo = %repo.name, path = %target.display(), "Cloned repository");
        Ok(())
    }

    async fn update_repo(&self, repo: &RepoSpec, target: &Path) -> Result<()> {
        // the target itself must be a work tree, not a directory inside one;
        // git ignores relative ceiling entries
        let absolute = tokio::fs::canonicalize(target).await?;
        let mut check = self.command(Some(&absolute));
        if let Some(parent) = absolute.parent() {
            check.env("GIT_CEILING_DIRECTORIES", parent);
        }
        if self
            .run(check, &["rev-parse", "--is-inside-work-tree"])
            .await
            .is_err()
        {
            return Err(FetchError::NotARepository {
                path: target.to_path_buf(),
            }
            .into());
        }

        // a failed pull still leaves a usable tree to index
        let pull = self.command(Some(target));
        match self.run(pull, &["pull", "--quiet", "origin"]).await {
            Ok(_) => tracing::debug!(repo = %repo.name, "Pulled repository"),
            Err(e) => tracing::warn!(repo = %repo.name, error = %e, "pull warning"),
        }
        Ok(())
    }
}

impl Fetcher for GitFetcher {
    async fn ensure_local(&self, repo: &RepoSpec, base: &Path) -> Result<PathBuf> {
        let target = base.join(&repo.name);

        if tokio::fs::try_exists(&target).await.unwrap_or(false) {
            self.update_repo(repo, &target).await?;
        } else {
            self.clone_repo(repo, &target).await?;
        }

        Ok(target)
    }
}
