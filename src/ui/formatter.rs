//! Pure formatting functions for UI output.
//!
//! Diagnostics go to stderr so that stdout carries nothing but the computed values.

use crate::error::{Result, VersionGeneratorError};
use crate::warning::ExtractWarning;
use console::style;
use serde::Serialize;
use std::collections::BTreeMap;

/// Format and print an error message in red.
pub fn display_error(message: &str) {
    eprintln!("{} {}", style("ERROR:").red(), message);
}

/// Format and print a success message with green checkmark.
pub fn display_success(message: &str) {
    eprintln!("{} {}", style("✓").green(), message);
}

/// Format and print a status message with yellow arrow.
pub fn display_status(message: &str) {
    eprintln!("{} {}", style("→").yellow(), message);
}

/// Display an extraction warning to the user.
pub fn display_extract_warning(warning: &ExtractWarning) {
    eprintln!("{} {}", style("⚠ WARNING:").yellow(), warning);
}

/// Render outputs as `NAME=value` lines, one per output.
pub fn render_env(outputs: &[(String, String)]) -> String {
    outputs
        .iter()
        .map(|(name, value)| format!("{}={}\n", name, value))
        .collect()
}

#[derive(Serialize)]
struct TomlReport<'a> {
    versions: BTreeMap<&'a str, &'a str>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    extracted: BTreeMap<&'a str, &'a str>,
}

/// Render version outputs and extracted values as a TOML document.
///
/// # Arguments
/// * `versions` - Named version outputs
/// * `extracted` - Named values found by data extraction
pub fn render_toml(versions: &[(String, String)], extracted: &[(String, String)]) -> Result<String> {
    let report = TomlReport {
        versions: as_map(versions),
        extracted: as_map(extracted),
    };

    toml::to_string(&report)
        .map_err(|e| VersionGeneratorError::config(format!("Cannot render TOML output: {}", e)))
}

fn as_map(pairs: &[(String, String)]) -> BTreeMap<&str, &str> {
    pairs
        .iter()
        .map(|(name, value)| (name.as_str(), value.as_str()))
        .collect()
}
