use crate::error::{Result, VersionGeneratorError};
use crate::git::Repository;

/// Mock repository for testing without actual git operations
#[derive(Debug, Clone, Default)]
pub struct MockRepository {
    head: Option<String>,
}

impl MockRepository {
    /// Create a mock repository with an unborn `HEAD`
    pub fn new() -> Self {
        MockRepository { head: None }
    }

    /// Create a mock repository whose `HEAD` is `hash`
    pub fn with_head(hash: impl Into<String>) -> Self {
        MockRepository {
            head: Some(hash.into()),
        }
    }
}

impl Repository for MockRepository {
    fn head_commit_hash(&self) -> Result<String> {
        self.head
            .clone()
            .ok_or_else(|| VersionGeneratorError::config("Cannot resolve HEAD: unborn branch"))
    }
}
