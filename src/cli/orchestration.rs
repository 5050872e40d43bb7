//! Main workflow orchestration logic
//!
//! Turns a fully built [Config] into computed versions and extracted values. Argument parsing
//! and printing stay in `main.rs`; everything here is callable programmatically.

use crate::config::Config;
use crate::domain::Version;
use crate::error::Result;
use crate::extract::{self, ExtractPattern, ExtractSource, Extraction};
use crate::generator::{self, BuildContext, GeneratedVersions};
use crate::git::Repository;

/// Result of a successful run
#[derive(Debug, Clone, PartialEq)]
pub struct WorkflowResult {
    /// Current, release, next and next-release versions
    pub versions: GeneratedVersions,

    /// Values found by data extraction, empty when no patterns are configured
    pub extraction: Extraction,
}

/// Run the whole pipeline:
/// 1. Validate the configuration
/// 2. Resolve and parse the current version
/// 3. Generate release, next and next-release versions
/// 4. Run data extraction, if configured
///
/// Any failure aborts the run; nothing is partially recovered.
pub fn run_workflow(config: &Config, context: &BuildContext) -> Result<WorkflowResult> {
    config.validate()?;

    let raw = config.resolve_version()?;
    let current = Version::parse(&raw)?;
    let versions = generator::generate_all(&current, config, context)?;

    let extraction = if config.extract.patterns.is_empty() {
        Extraction::default()
    } else {
        let patterns = config
            .extract
            .patterns
            .iter()
            .map(|p| ExtractPattern::parse(p))
            .collect::<Result<Vec<_>>>()?;
        let sources = config
            .extract
            .files
            .iter()
            .map(|f| ExtractSource::read(f))
            .collect::<Result<Vec<_>>>()?;
        extract::extract(&patterns, &sources, config.extract.name.as_deref())
    };

    Ok(WorkflowResult {
        versions,
        extraction,
    })
}

/// Pick the commit identifier for `{hash}`.
///
/// An explicit, non-blank hash wins. Otherwise the repository returned by `open` is asked for
/// its `HEAD`; `open` is only called when `needed` is true, so runs that never generate
/// metadata work outside a git checkout and get an empty hash.
pub fn resolve_commit_hash<R, F>(explicit: Option<&str>, needed: bool, open: F) -> Result<String>
where
    R: Repository,
    F: FnOnce() -> Result<R>,
{
    if let Some(hash) = explicit.map(str::trim).filter(|h| !h.is_empty()) {
        return Ok(hash.to_string());
    }

    if !needed {
        return Ok(String::new());
    }

    open()?.head_commit_hash()
}
