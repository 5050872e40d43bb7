use crate::domain::prerelease;
use crate::error::{Result, VersionGeneratorError};
use regex::Regex;
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

/// Regular expression suggested by https://semver.org/ for parsing version strings
const SEMANTIC_VERSION_PATTERN: &str = r"^(?P<major>0|[1-9]\d*)\.(?P<minor>0|[1-9]\d*)\.(?P<patch>0|[1-9]\d*)(?:-(?P<prerelease>(?:0|[1-9]\d*|\d*[a-zA-Z-][0-9a-zA-Z-]*)(?:\.(?:0|[1-9]\d*|\d*[a-zA-Z-][0-9a-zA-Z-]*))*))?(?:\+(?P<buildmetadata>[0-9a-zA-Z-]+(?:\.[0-9a-zA-Z-]+)*))?$";

fn semantic_version_regex() -> &'static Regex {
    static SEMANTIC_VERSION: OnceLock<Regex> = OnceLock::new();
    SEMANTIC_VERSION
        .get_or_init(|| Regex::new(SEMANTIC_VERSION_PATTERN).expect("semver regex is valid"))
}

/// Semantic version with optional prerelease and build metadata sections.
///
/// Values are never mutated in place: every derivation goes through one of the `with_*`
/// builders and yields an independent copy. `raw` keeps the text the version was parsed from
/// and is ignored by equality.
#[derive(Debug, Clone, Default)]
pub struct Version {
    pub raw: String,
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
    pub prerelease: Option<String>,
    pub build_metadata: Option<String>,
}

impl Version {
    /// Create a release version without prerelease or build metadata
    pub fn new(major: u64, minor: u64, patch: u64) -> Self {
        Version {
            raw: String::new(),
            major,
            minor,
            patch,
            prerelease: None,
            build_metadata: None,
        }
    }

    /// Parse a version string following the semver.org grammar.
    ///
    /// # Returns
    /// * `Ok(Version)` - Parsed version, with `raw` set to `text`
    /// * `Err(VersionSyntax)` - If `text` is not a semantic version
    ///
    /// # Example
    /// ```
    /// use version_generator::domain::Version;
    ///
    /// let v = Version::parse("5.0.3-SNAPSHOT").unwrap();
    /// assert_eq!((v.major, v.minor, v.patch), (5, 0, 3));
    /// assert_eq!(v.prerelease.as_deref(), Some("SNAPSHOT"));
    /// assert_eq!(v.build_metadata, None);
    /// ```
    pub fn parse(text: &str) -> Result<Self> {
        let syntax_error = || {
            VersionGeneratorError::version(format!(
                "'{}'; please check your version syntax, refer: https://semver.org/",
                text
            ))
        };

        let captures = semantic_version_regex()
            .captures(text)
            .ok_or_else(syntax_error)?;

        let number = |name: &str| -> Result<u64> {
            captures[name].parse::<u64>().map_err(|_| {
                VersionGeneratorError::version(format!(
                    "'{}'; {} version '{}' is too large",
                    text, name, &captures[name]
                ))
            })
        };

        Ok(Version {
            raw: text.to_string(),
            major: number("major")?,
            minor: number("minor")?,
            patch: number("patch")?,
            prerelease: captures.name("prerelease").map(|m| m.as_str().to_string()),
            build_metadata: captures
                .name("buildmetadata")
                .map(|m| m.as_str().to_string()),
        })
    }

    pub fn with_major(&self, major: u64) -> Self {
        Version {
            major,
            ..self.clone()
        }
    }

    pub fn with_minor(&self, minor: u64) -> Self {
        Version {
            minor,
            ..self.clone()
        }
    }

    pub fn with_patch(&self, patch: u64) -> Self {
        Version {
            patch,
            ..self.clone()
        }
    }

    pub fn with_prerelease(&self, prerelease: Option<String>) -> Self {
        Version {
            prerelease,
            ..self.clone()
        }
    }

    pub fn with_build_metadata(&self, build_metadata: Option<String>) -> Self {
        Version {
            build_metadata,
            ..self.clone()
        }
    }

    /// Increment the ALPHA/BETA/RC counter of the prerelease section, if there is one
    pub fn increment_prerelease(&self) -> Self {
        self.update_prerelease(false)
    }

    /// Restart the ALPHA/BETA/RC counter of the prerelease section at 1, if there is one
    pub fn reset_prerelease(&self) -> Self {
        self.update_prerelease(true)
    }

    fn update_prerelease(&self, reset: bool) -> Self {
        let prerelease = self
            .prerelease
            .as_deref()
            .map(|text| prerelease::update(text, reset));
        self.with_prerelease(prerelease)
    }

    /// Prerelease section, if present and non-empty
    pub fn prerelease(&self) -> Option<&str> {
        self.prerelease.as_deref().filter(|s| !s.is_empty())
    }

    /// Build metadata section, if present and non-empty
    pub fn build_metadata(&self) -> Option<&str> {
        self.build_metadata.as_deref().filter(|s| !s.is_empty())
    }

    /// Decomposed components as `(suffix, value)` pairs, absent sections omitted
    pub fn components(&self) -> Vec<(&'static str, String)> {
        let mut components = vec![
            ("MAJOR", self.major.to_string()),
            ("MINOR", self.minor.to_string()),
            ("PATCH", self.patch.to_string()),
        ];
        if let Some(prerelease) = self.prerelease() {
            components.push(("PRERELEASE", prerelease.to_string()));
        }
        if let Some(build_metadata) = self.build_metadata() {
            components.push(("BUILDMETADATA", build_metadata.to_string()));
        }
        components
    }
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.major == other.major
            && self.minor == other.minor
            && self.patch == other.patch
            && self.prerelease == other.prerelease
            && self.build_metadata == other.build_metadata
    }
}

impl Eq for Version {}

impl FromStr for Version {
    type Err = VersionGeneratorError;

    fn from_str(s: &str) -> Result<Self> {
        Version::parse(s)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)?;
        if let Some(prerelease) = self.prerelease() {
            write!(f, "-{}", prerelease)?;
        }
        if let Some(build_metadata) = self.build_metadata() {
            write!(f, "+{}", build_metadata)?;
        }
        Ok(())
    }
}
