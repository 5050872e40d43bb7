use thiserror::Error;

/// Unified error type for version generation
#[derive(Error, Debug)]
pub enum VersionGeneratorError {
    #[error("Unable to parse version: {0}")]
    VersionSyntax(String),

    #[error("Unable to process metadata pattern: {0}")]
    MetadataPattern(String),

    #[error("Invalid regular expression: {0}")]
    RegexSyntax(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Git operation failed: {0}")]
    Git(#[from] git2::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience type alias for Results in version-generator
pub type Result<T> = std::result::Result<T, VersionGeneratorError>;

impl VersionGeneratorError {
    /// Create a version syntax error with context
    pub fn version(msg: impl Into<String>) -> Self {
        VersionGeneratorError::VersionSyntax(msg.into())
    }

    /// Create a metadata pattern error with context
    pub fn metadata(msg: impl Into<String>) -> Self {
        VersionGeneratorError::MetadataPattern(msg.into())
    }

    /// Create a regex syntax error with context
    pub fn regex(msg: impl Into<String>) -> Self {
        VersionGeneratorError::RegexSyntax(msg.into())
    }

    /// Create a configuration error with context
    pub fn config(msg: impl Into<String>) -> Self {
        VersionGeneratorError::Config(msg.into())
    }
}
