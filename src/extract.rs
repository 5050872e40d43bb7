//! Regex driven data extraction from text files
//!
//! Used both to read the current version out of a build file and to export arbitrary named
//! values (`/name: (.+)/`-style descriptors) alongside the computed versions.

use crate::error::{Result, VersionGeneratorError};
use crate::warning::ExtractWarning;
use regex::{Captures, Regex, RegexBuilder};
use std::fmt;
use std::fs;
use std::path::Path;

/// A compiled `/pattern/flags` descriptor
#[derive(Debug, Clone)]
pub struct ExtractPattern {
    descriptor: String,
    regex: Regex,
}

impl ExtractPattern {
    /// Parse a delimited descriptor such as `/version=(.+)/i`.
    ///
    /// Supported flags: `i` (case-insensitive), `m` (multi-line anchors), `s` (dot matches
    /// newline), `x` (ignore whitespace), `U` (swap greed). `g` and `u` are accepted and
    /// ignored: every match is always collected and matching is always Unicode-aware.
    pub fn parse(descriptor: &str) -> Result<Self> {
        let trimmed = descriptor.trim();
        let invalid = |reason: &str| {
            VersionGeneratorError::regex(format!("'{}'; {}", descriptor, reason))
        };

        let body = trimmed
            .strip_prefix('/')
            .ok_or_else(|| invalid("expected /pattern/flags"))?;
        let close = body
            .rfind('/')
            .ok_or_else(|| invalid("missing closing '/'"))?;
        let (pattern, flags) = (&body[..close], &body[close + 1..]);

        let mut builder = RegexBuilder::new(pattern);
        for flag in flags.chars() {
            match flag {
                'i' => builder.case_insensitive(true),
                'm' => builder.multi_line(true),
                's' => builder.dot_matches_new_line(true),
                'x' => builder.ignore_whitespace(true),
                'U' => builder.swap_greed(true),
                'g' | 'u' => &mut builder,
                other => return Err(invalid(&format!("unsupported flag '{}'", other))),
            };
        }

        let regex = builder.build().map_err(|e| invalid(&e.to_string()))?;

        Ok(ExtractPattern {
            descriptor: trimmed.to_string(),
            regex,
        })
    }

    /// Parse newline separated descriptors, ignoring blank lines
    pub fn parse_list(text: &str) -> Result<Vec<Self>> {
        text.lines()
            .filter(|line| !line.trim().is_empty())
            .map(ExtractPattern::parse)
            .collect()
    }

    pub fn regex(&self) -> &Regex {
        &self.regex
    }

    fn group_count(&self) -> usize {
        self.regex.captures_len() - 1
    }
}

impl fmt::Display for ExtractPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.descriptor)
    }
}

/// Text searched by the extractor, labelled for reporting
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractSource {
    pub label: String,
    pub content: String,
}

impl ExtractSource {
    pub fn new(label: impl Into<String>, content: impl Into<String>) -> Self {
        ExtractSource {
            label: label.into(),
            content: content.into(),
        }
    }

    /// Read a file into a source labelled with its path
    pub fn read(path: &Path) -> Result<Self> {
        Ok(ExtractSource::new(path.display().to_string(), read_lossy(path)?))
    }
}

/// Values extracted from one source, in match order
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ExtractedValues {
    pub source: String,
    pub values: Vec<(String, String)>,
}

/// Result of running every pattern over every source
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Extraction {
    pub files: Vec<ExtractedValues>,
    pub warnings: Vec<ExtractWarning>,
}

impl Extraction {
    /// All extracted values across sources, in order
    pub fn values(&self) -> impl Iterator<Item = &(String, String)> {
        self.files.iter().flat_map(|file| file.values.iter())
    }
}

/// Apply `patterns` to every source.
///
/// With a `base_name`, each match contributes its first capture group (or the whole match when
/// the pattern has no groups). The first value is named `base_name`; later ones, counted across
/// all patterns and sources, get `_1`, `_2`, ... appended.
///
/// Without a `base_name`, group 1 names the variable (see [`variable_name`]) and group 2 is the
/// value. Matches that cannot provide both are skipped with a warning.
pub fn extract(
    patterns: &[ExtractPattern],
    sources: &[ExtractSource],
    base_name: Option<&str>,
) -> Extraction {
    let mut extraction = Extraction::default();
    let mut matched = 0usize;

    for source in sources {
        let mut file = ExtractedValues {
            source: source.label.clone(),
            values: Vec::new(),
        };

        for pattern in patterns {
            for captures in pattern.regex.captures_iter(&source.content) {
                match base_name {
                    Some(base) => {
                        let name = if matched == 0 {
                            base.to_string()
                        } else {
                            format!("{}_{}", base, matched)
                        };
                        matched += 1;
                        file.values.push((name, first_group_or_match(&captures)));
                    }
                    None => match named_value(pattern, source, &captures) {
                        Ok(pair) => file.values.push(pair),
                        Err(warning) => extraction.warnings.push(warning),
                    },
                }
            }
        }

        extraction.files.push(file);
    }

    extraction
}

fn first_group_or_match(captures: &Captures) -> String {
    captures
        .get(1)
        .or_else(|| captures.get(0))
        .map(|m| m.as_str().to_string())
        .unwrap_or_default()
}

fn named_value(
    pattern: &ExtractPattern,
    source: &ExtractSource,
    captures: &Captures,
) -> std::result::Result<(String, String), ExtractWarning> {
    let matched = captures
        .get(0)
        .map(|m| m.as_str().to_string())
        .unwrap_or_default();

    if pattern.group_count() < 2 {
        return Err(ExtractWarning::TooFewGroups {
            source: source.label.clone(),
            pattern: pattern.to_string(),
            matched,
        });
    }

    let name = captures.get(1).map(|m| variable_name(m.as_str()));
    match (name, captures.get(2)) {
        (Some(name), Some(value)) if !name.is_empty() => Ok((name, value.as_str().to_string())),
        _ => Err(ExtractWarning::UnmatchedGroup {
            source: source.label.clone(),
            pattern: pattern.to_string(),
            matched,
        }),
    }
}

/// Turn arbitrary text into an environment-style variable name.
///
/// Uppercases the text and collapses each run of non-alphanumeric characters into a single
/// underscore, trimming underscores at both ends: `app.version-code` -> `APP_VERSION_CODE`.
pub fn variable_name(text: &str) -> String {
    let mut name = String::with_capacity(text.len());
    let mut pending_separator = false;

    for c in text.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_separator && !name.is_empty() {
                name.push('_');
            }
            pending_separator = false;
            name.push(c.to_ascii_uppercase());
        } else {
            pending_separator = true;
        }
    }

    name
}

/// Read the current version out of `path`.
///
/// `pattern` is a plain (undelimited) regular expression. The first match wins; its first
/// capture group is returned when the pattern has groups, the whole match otherwise.
///
/// # Returns
/// * `Ok(Some(String))` - The matched version text
/// * `Ok(None)` - If nothing matched, or group 1 did not take part in the match
/// * `Err(RegexSyntax)` - If `pattern` is not a valid regular expression
/// * `Err(Io)` - If the file cannot be read
pub fn read_version_from_file(path: &Path, pattern: &str) -> Result<Option<String>> {
    find_version(&read_lossy(path)?, pattern)
}

/// Read a text file, replacing invalid UTF-8 sequences with U+FFFD
fn read_lossy(path: &Path) -> Result<String> {
    let bytes = fs::read(path)?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Same as [`read_version_from_file`] on in-memory text
pub fn find_version(content: &str, pattern: &str) -> Result<Option<String>> {
    let regex = Regex::new(pattern)
        .map_err(|e| VersionGeneratorError::regex(format!("'{}'; {}", pattern, e)))?;

    let Some(captures) = regex.captures(content) else {
        return Ok(None);
    };

    let found = if regex.captures_len() > 1 {
        captures.get(1)
    } else {
        captures.get(0)
    };

    Ok(found.map(|m| m.as_str().to_string()))
}
