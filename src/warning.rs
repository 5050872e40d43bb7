use std::fmt;

/// Non-fatal issues found while extracting data from files.
/// These are reported to the user but never abort a run.
#[derive(Debug, Clone, PartialEq)]
pub enum ExtractWarning {
    /// Without a base name a match needs a name group and a value group
    TooFewGroups {
        source: String,
        pattern: String,
        matched: String,
    },
    /// The name or value group did not take part in the match
    UnmatchedGroup {
        source: String,
        pattern: String,
        matched: String,
    },
}

impl fmt::Display for ExtractWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExtractWarning::TooFewGroups {
                source,
                pattern,
                matched,
            } => write!(
                f,
                "Skipping match '{}' of {} in '{}': at least two capture groups are required without a variable name",
                matched, pattern, source
            ),
            ExtractWarning::UnmatchedGroup {
                source,
                pattern,
                matched,
            } => write!(
                f,
                "Skipping match '{}' of {} in '{}': name or value group is empty",
                matched, pattern, source
            ),
        }
    }
}
