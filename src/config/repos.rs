//! Repository list loaded from YAML.

use std::path::{Component, Path};

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// One configured repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoSpec {
    /// Local name, used as the clone directory under the working directory.
    pub name: String,

    /// Source location handed to git (URL or local path).
    pub url: String,
}

/// Ordered list of repositories to index.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoList {
    #[serde(default)]
    pub repos: Vec<RepoSpec>,
}

impl RepoList {
    /// Read and validate a repository list file.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the file cannot be read, is not
    /// valid YAML, or contains an invalid entry.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let data = std::fs::read_to_string(path).map_err(|e| {
            Error::config(format!("failed to read '{}': {e}", path.display()))
        })?;

        let list = Self::parse(&data)
            .map_err(|e| Error::config(format!("{}: {e}", path.display())))?;

        tracing::debug!(
            path = %path.display(),
            repos = list.repos.len(),
            "Repository list loaded"
        );

        Ok(list)
    }

    /// Parse and validate a repository list from YAML text.
    ///
    /// # Errors
    ///
    /// Returns a configuration error on malformed YAML or an invalid entry.
    pub fn parse(yaml: &str) -> Result<Self> {
        let list: Self = serde_yaml::from_str(yaml)
            .map_err(|e| Error::config(format!("malformed repository list: {e}")))?;
        list.validate()?;
        Ok(list)
    }

    /// Validate every entry.
    ///
    /// # Errors
    ///
    /// Returns an error naming the first invalid entry.
    pub fn validate(&self) -> Result<()> {
        for (i, repo) in self.repos.iter().enumerate() {
            if repo.url.trim().is_empty() {
                return Err(Error::config(format!("repos[{i}]: url cannot be empty")));
            }
            if !is_single_component(&repo.name) {
                return Err(Error::config(format!(
                    "repos[{i}]: invalid name '{}', must be a plain directory name",
                    repo.name
                )));
            }
        }
        Ok(())
    }

    /// Number of configured repositories.
    #[must_use]
    pub fn len(&self) -> usize {
        self.repos.len()
    }

    /// Whether no repository is configured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.repos.is_empty()
    }
}

fn is_single_component(name: &str) -> bool {
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    ) && !name.contains(['/', '\\'])
}
