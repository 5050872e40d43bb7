//! Prerelease counter handling
//!
//! A prerelease section such as `BETA-16-SNAPSHOT` or `rc.3` may embed a numeric counter right
//! after one of the stage markers `ALPHA`, `BETA` or `RC`. The marker may be separated from the
//! counter by a single `.` or `-`. Only the first such counter is ever touched; the rest of the
//! prerelease text is preserved byte for byte.

use regex::Regex;
use std::ops::Range;
use std::sync::OnceLock;

fn counter_regex() -> &'static Regex {
    static COUNTER: OnceLock<Regex> = OnceLock::new();
    COUNTER.get_or_init(|| {
        Regex::new(r"(?i)(?:ALPHA|BETA|RC)[-.]?([0-9]+)").expect("prerelease counter regex is valid")
    })
}

/// Location and value of a stage counter inside a prerelease string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrereleaseCounter {
    /// Byte range of the digits within the prerelease string
    pub span: Range<usize>,
    /// Parsed counter value
    pub value: u64,
}

impl PrereleaseCounter {
    /// Find the first stage counter in `prerelease`.
    ///
    /// Returns `None` when no marker is immediately followed (optionally via `.` or `-`) by
    /// digits, or when the digits do not fit in a `u64`.
    pub fn find(prerelease: &str) -> Option<Self> {
        let digits = counter_regex().captures(prerelease)?.get(1)?;
        let value = digits.as_str().parse::<u64>().ok()?;

        Some(PrereleaseCounter {
            span: digits.range(),
            value,
        })
    }

    /// Replace the counter digits in `prerelease` with `value`
    fn splice(&self, prerelease: &str, value: u64) -> String {
        format!(
            "{}{}{}",
            &prerelease[..self.span.start],
            value,
            &prerelease[self.span.end..]
        )
    }
}

/// Increment (or, with `reset`, restart at 1) the stage counter in `prerelease`.
///
/// The input is returned unchanged when no counter is found, so callers compare the result with
/// the input to detect the no-op case.
pub fn update(prerelease: &str, reset: bool) -> String {
    let Some(counter) = PrereleaseCounter::find(prerelease) else {
        return prerelease.to_string();
    };

    let next = if reset {
        Some(1)
    } else {
        counter.value.checked_add(1)
    };

    match next {
        Some(value) => counter.splice(prerelease, value),
        None => prerelease.to_string(),
    }
}

/// Increment the stage counter, see [`update`]
pub fn increment(prerelease: &str) -> String {
    update(prerelease, false)
}

/// Reset the stage counter to 1, see [`update`]
pub fn reset(prerelease: &str) -> String {
    update(prerelease, true)
}
