use crate::error::{Result, VersionGeneratorError};
use git2::Repository as Git2Repo;
use std::path::Path;

/// Wrapper around git2::Repository with our trait interface
pub struct Git2Repository {
    repo: Git2Repo,
}

impl Git2Repository {
    /// Open or discover a git repository
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let repo = Git2Repo::discover(path)?;

        Ok(Git2Repository { repo })
    }

    /// Create from existing git2::Repository
    pub fn from_git2(repo: Git2Repo) -> Self {
        Git2Repository { repo }
    }
}

impl super::Repository for Git2Repository {
    fn head_commit_hash(&self) -> Result<String> {
        let head = self.repo.head().map_err(|e| {
            VersionGeneratorError::config(format!("Cannot resolve HEAD: {}", e.message()))
        })?;

        let commit = head.peel_to_commit()?;
        Ok(commit.id().to_string())
    }
}
