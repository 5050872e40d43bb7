//! Build metadata template engine
//!
//! A metadata pattern mixes literal identifier characters with `{date}` and `{hash}`
//! placeholders, each optionally carrying a bracketed format:
//!
//! - `{date}` / `{date[YYYYMMDD.HHmm]}` - the build timestamp, moment-style format tokens
//! - `{hash}` / `{hash[0, 12]}` - a substring of the commit identifier
//!
//! Placeholders are resolved left to right over the pattern as written. Resolved values are
//! copied into the output as opaque text and are never scanned again.

use crate::error::{Result, VersionGeneratorError};
use chrono::{DateTime, Datelike, Local, NaiveDate, NaiveDateTime, Timelike};
use regex::Regex;
use std::fmt;
use std::num::IntErrorKind;
use std::str::FromStr;
use std::sync::OnceLock;

fn validation_regex() -> &'static Regex {
    static VALIDATION: OnceLock<Regex> = OnceLock::new();
    VALIDATION.get_or_init(|| {
        Regex::new(r"^(?:[0-9a-zA-Z.\-]*\{(?:date|hash)(?:\[[^\]]*\])?\})*[0-9a-zA-Z.\-]*$")
            .expect("metadata validation regex is valid")
    })
}

fn placeholder_regex() -> &'static Regex {
    static PLACEHOLDER: OnceLock<Regex> = OnceLock::new();
    PLACEHOLDER.get_or_init(|| {
        Regex::new(r"\{(date|hash)(?:\[([^\]]*)\])?\}").expect("metadata placeholder regex is valid")
    })
}

/// Values substituted into a metadata pattern
#[derive(Debug, Clone, PartialEq)]
pub struct MetadataModel {
    /// Build timestamp as local wall-clock time
    pub date: NaiveDateTime,
    /// Full commit identifier
    pub hash: String,
}

impl MetadataModel {
    pub fn new(date: NaiveDateTime, hash: impl Into<String>) -> Self {
        MetadataModel {
            date,
            hash: hash.into(),
        }
    }
}

/// Placeholder word recognised inside `{...}`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placeholder {
    Date,
    Hash,
}

impl Placeholder {
    /// Format used when the placeholder carries no (or an empty) bracketed format
    pub fn default_format(self) -> &'static str {
        match self {
            Placeholder::Date => "YYYY-MM-DD",
            Placeholder::Hash => "0, 8",
        }
    }

    fn resolve(self, format: &str, model: &MetadataModel) -> Result<String> {
        match self {
            Placeholder::Date => Ok(format_date(&model.date, format.trim())),
            Placeholder::Hash => format_hash(&model.hash, format),
        }
    }
}

impl FromStr for Placeholder {
    type Err = VersionGeneratorError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "date" => Ok(Placeholder::Date),
            "hash" => Ok(Placeholder::Hash),
            other => Err(VersionGeneratorError::metadata(format!(
                "unknown word: '{}'",
                other
            ))),
        }
    }
}

impl fmt::Display for Placeholder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Placeholder::Date => write!(f, "date"),
            Placeholder::Hash => write!(f, "hash"),
        }
    }
}

/// Expand every placeholder of `pattern` using `model`.
///
/// # Returns
/// * `Ok(String)` - The expanded metadata
/// * `Err(MetadataPattern)` - If the pattern contains characters outside `[0-9A-Za-z.-]`,
///   malformed placeholders, or a hash format that is not a pair of integers
///
/// # Example
/// ```
/// use chrono::NaiveDate;
/// use version_generator::metadata::{expand, MetadataModel};
///
/// let date = NaiveDate::from_ymd_opt(2017, 3, 2).unwrap().and_hms_opt(17, 33, 3).unwrap();
/// let model = MetadataModel::new(date, "622161f9e2993288c026f9c8eb71a0659ed933ee");
/// assert_eq!(expand("build.{date}.{hash}", &model).unwrap(), "build.2017-03-02.622161f9");
/// ```
pub fn expand(pattern: &str, model: &MetadataModel) -> Result<String> {
    if !validation_regex().is_match(pattern) {
        return Err(VersionGeneratorError::metadata(format!(
            "'{}'; please check your pattern syntax or ensure it doesn't contain incorrect symbols, see also: https://semver.org/",
            pattern
        )));
    }

    let mut metadata = String::with_capacity(pattern.len());
    let mut cursor = 0;

    for captures in placeholder_regex().captures_iter(pattern) {
        let (Some(whole), Some(word)) = (captures.get(0), captures.get(1)) else {
            continue;
        };

        let placeholder: Placeholder = word.as_str().parse().map_err(|e| {
            VersionGeneratorError::metadata(format!("'{}'; {}", pattern, inner_message(e)))
        })?;

        let format = captures
            .get(2)
            .map(|m| m.as_str())
            .filter(|f| !f.trim().is_empty())
            .unwrap_or_else(|| placeholder.default_format());

        let value = placeholder.resolve(format, model).map_err(|e| {
            VersionGeneratorError::metadata(format!("'{}'; {}", pattern, inner_message(e)))
        })?;

        metadata.push_str(&pattern[cursor..whole.start()]);
        metadata.push_str(&value);
        cursor = whole.end();
    }

    metadata.push_str(&pattern[cursor..]);
    Ok(metadata)
}

fn inner_message(err: VersionGeneratorError) -> String {
    match err {
        VersionGeneratorError::MetadataPattern(msg) => msg,
        other => other.to_string(),
    }
}

/// Take a substring of `hash` described by `format` (`"start, end"`).
///
/// Indices behave like JavaScript's `substring`: they are clamped into `[0, len]`, overflowing
/// values saturate, and a start greater than the end swaps the two.
pub fn format_hash(hash: &str, format: &str) -> Result<String> {
    let values: Vec<&str> = format.split(',').map(str::trim).collect();
    let invalid = || {
        VersionGeneratorError::metadata(format!(
            "invalid hash format '{}', expected '<start>, <end>'",
            format
        ))
    };

    let len = hash.chars().count();
    let (start, end) = match values.as_slice() {
        [start, end] => (
            parse_index(start).ok_or_else(invalid)?,
            parse_index(end).ok_or_else(invalid)?,
        ),
        _ => return Err(invalid()),
    };

    let clamp = |index: i64| index.clamp(0, len as i64) as usize;
    let (mut start, mut end) = (clamp(start), clamp(end));
    if start > end {
        std::mem::swap(&mut start, &mut end);
    }

    Ok(hash.chars().skip(start).take(end - start).collect())
}

fn parse_index(text: &str) -> Option<i64> {
    match text.parse::<i64>() {
        Ok(index) => Some(index),
        Err(e) => match e.kind() {
            IntErrorKind::PosOverflow => Some(i64::MAX),
            IntErrorKind::NegOverflow => Some(i64::MIN),
            _ => None,
        },
    }
}

/// Moment-style tokens, longest first so that `YYYY` wins over `YY`
const DATE_TOKENS: &[&str] = &[
    "YYYY", "YY", "Y", "Q", "MMMM", "MMM", "MM", "M", "DDDD", "DDD", "DD", "Do", "D", "dddd",
    "ddd", "dd", "d", "E", "HH", "H", "hh", "h", "kk", "k", "mm", "m", "ss", "s", "SSS", "SS",
    "S", "A", "a",
];

/// Format `date` with moment-style tokens.
///
/// Text inside `[...]` is copied literally, as is every character that does not start a known
/// token. Formatting never fails.
pub fn format_date(date: &NaiveDateTime, format: &str) -> String {
    let mut out = String::with_capacity(format.len() * 2);
    let mut rest = format;

    while !rest.is_empty() {
        if let Some(escaped) = rest.strip_prefix('[') {
            if let Some(close) = escaped.find(']') {
                out.push_str(&escaped[..close]);
                rest = &escaped[close + 1..];
                continue;
            }
        }

        if let Some(token) = DATE_TOKENS.iter().find(|t| rest.starts_with(**t)) {
            out.push_str(&render_token(date, token));
            rest = &rest[token.len()..];
            continue;
        }

        let mut chars = rest.chars();
        if let Some(c) = chars.next() {
            out.push(c);
        }
        rest = chars.as_str();
    }

    out
}

fn render_token(date: &NaiveDateTime, token: &str) -> String {
    let millis = (date.nanosecond() / 1_000_000).min(999);
    let (pm, hour12) = date.hour12();

    match token {
        "YYYY" => format!("{:04}", date.year()),
        "YY" => format!("{:02}", date.year().rem_euclid(100)),
        "Y" => date.year().to_string(),
        "Q" => (date.month0() / 3 + 1).to_string(),
        "MMMM" => date.format("%B").to_string(),
        "MMM" => date.format("%b").to_string(),
        "MM" => format!("{:02}", date.month()),
        "M" => date.month().to_string(),
        "DDDD" => format!("{:03}", date.ordinal()),
        "DDD" => date.ordinal().to_string(),
        "DD" => format!("{:02}", date.day()),
        "Do" => ordinal(date.day()),
        "D" => date.day().to_string(),
        "dddd" => date.format("%A").to_string(),
        "ddd" => date.format("%a").to_string(),
        "dd" => date.format("%a").to_string().chars().take(2).collect(),
        "d" => date.weekday().num_days_from_sunday().to_string(),
        "E" => date.weekday().number_from_monday().to_string(),
        "HH" => format!("{:02}", date.hour()),
        "H" => date.hour().to_string(),
        "hh" => format!("{:02}", hour12),
        "h" => hour12.to_string(),
        "kk" => format!("{:02}", hour24_from_one(date.hour())),
        "k" => hour24_from_one(date.hour()).to_string(),
        "mm" => format!("{:02}", date.minute()),
        "m" => date.minute().to_string(),
        "ss" => format!("{:02}", date.second()),
        "s" => date.second().to_string(),
        "SSS" => format!("{:03}", millis),
        "SS" => format!("{:02}", millis / 10),
        "S" => (millis / 100).to_string(),
        "A" => (if pm { "PM" } else { "AM" }).to_string(),
        "a" => (if pm { "pm" } else { "am" }).to_string(),
        other => other.to_string(),
    }
}

fn hour24_from_one(hour: u32) -> u32 {
    if hour == 0 {
        24
    } else {
        hour
    }
}

fn ordinal(day: u32) -> String {
    let suffix = match (day % 10, day % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    };
    format!("{}{}", day, suffix)
}

const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Parse a configured build timestamp.
///
/// Accepts RFC 3339 (converted to local wall-clock time), ISO-8601 date-times without an
/// offset, and plain `YYYY-MM-DD` dates (midnight).
pub fn parse_datetime(text: &str) -> Result<NaiveDateTime> {
    let text = text.trim();

    if let Ok(datetime) = DateTime::parse_from_rfc3339(text) {
        return Ok(datetime.with_timezone(&Local).naive_local());
    }

    if let Some(datetime) = NAIVE_DATETIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
    {
        return Ok(datetime);
    }

    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .ok_or_else(|| {
            VersionGeneratorError::config(format!(
                "Unable to parse build metadata datetime: '{}'",
                text
            ))
        })
}
