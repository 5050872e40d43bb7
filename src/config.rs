use crate::error::{Result, VersionGeneratorError};
use crate::extract;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// File name looked up in the working directory
pub const LOCAL_CONFIG_FILE: &str = "versiongen.toml";

/// File name looked up in the user configuration directory
pub const USER_CONFIG_FILE: &str = ".versiongen.toml";

/// Represents the complete configuration for version-generator.
///
/// Built once at the program boundary (configuration file plus command-line overrides) and
/// passed by reference into the generators, which never consult the process environment.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
pub struct Config {
    #[serde(default)]
    pub version: VersionSourceConfig,

    #[serde(default)]
    pub release: ReleasePolicy,

    #[serde(default)]
    pub next: NextPolicy,

    #[serde(default)]
    pub extract: ExtractConfig,
}

/// Where the current version comes from.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum VersionSource {
    /// Extracted from a file with a regular expression
    File,
    /// Given literally in the configuration
    #[default]
    Variable,
}

/// Version source selection.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
pub struct VersionSourceConfig {
    #[serde(default)]
    pub source: VersionSource,

    /// File to read when `source = "file"`
    #[serde(default)]
    pub file: Option<PathBuf>,

    /// Pattern locating the version inside `file`; group 1 wins over the whole match
    #[serde(default)]
    pub extraction_pattern: Option<String>,

    /// Literal version when `source = "variable"`
    #[serde(default)]
    pub value: Option<String>,
}

fn default_true() -> bool {
    true
}

/// Returns the default build metadata pattern.
fn default_metadata_pattern() -> String {
    "build.{date}.{hash}".to_string()
}

/// Flags controlling how the release version is derived from the current one.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ReleasePolicy {
    #[serde(default)]
    pub cut_prerelease: bool,

    #[serde(default = "default_true")]
    pub cut_snapshot: bool,

    #[serde(default = "default_true")]
    pub cut_metadata: bool,

    #[serde(default)]
    pub generate_metadata: bool,

    #[serde(default = "default_metadata_pattern")]
    pub metadata_pattern: String,

    /// Timestamp used for `{date}`; the build time when unset
    #[serde(default)]
    pub metadata_time: Option<String>,
}

impl Default for ReleasePolicy {
    fn default() -> Self {
        ReleasePolicy {
            cut_prerelease: false,
            cut_snapshot: true,
            cut_metadata: true,
            generate_metadata: false,
            metadata_pattern: default_metadata_pattern(),
            metadata_time: None,
        }
    }
}

/// Flags controlling how the next development version is derived.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct NextPolicy {
    #[serde(default)]
    pub cut_prerelease: bool,

    #[serde(default = "default_true")]
    pub cut_metadata: bool,

    /// Copy the release version's build metadata onto the next version
    #[serde(default)]
    pub put_metadata: bool,

    #[serde(default)]
    pub increment_major: bool,

    #[serde(default)]
    pub increment_minor: bool,

    #[serde(default)]
    pub increment_patch: bool,

    #[serde(default)]
    pub increment_prerelease: bool,
}

impl NextPolicy {
    /// True when at least one explicit increment flag is set
    pub fn has_explicit_increment(&self) -> bool {
        self.increment_major
            || self.increment_minor
            || self.increment_patch
            || self.increment_prerelease
    }
}

impl Default for NextPolicy {
    fn default() -> Self {
        NextPolicy {
            cut_prerelease: false,
            cut_metadata: true,
            put_metadata: false,
            increment_major: false,
            increment_minor: false,
            increment_patch: false,
            increment_prerelease: false,
        }
    }
}

/// Data extraction settings.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
pub struct ExtractConfig {
    /// Delimited patterns such as `/version=(.+)/i`
    #[serde(default)]
    pub patterns: Vec<String>,

    #[serde(default)]
    pub files: Vec<PathBuf>,

    /// Base variable name; without it every match names itself through group 1
    #[serde(default)]
    pub name: Option<String>,
}

impl Config {
    /// Check that every input required by the selected options is present.
    pub fn validate(&self) -> Result<()> {
        match self.version.source {
            VersionSource::File => {
                if self.version.file.is_none() {
                    return Err(VersionGeneratorError::config(
                        "version source 'file' requires a version file",
                    ));
                }
                if is_blank(self.version.extraction_pattern.as_deref()) {
                    return Err(VersionGeneratorError::config(
                        "version source 'file' requires an extraction pattern",
                    ));
                }
            }
            VersionSource::Variable => {
                if is_blank(self.version.value.as_deref()) {
                    return Err(VersionGeneratorError::config(
                        "version source 'variable' requires a version value",
                    ));
                }
            }
        }

        if (self.release.generate_metadata || self.next.put_metadata)
            && self.release.metadata_pattern.trim().is_empty()
        {
            return Err(VersionGeneratorError::config(
                "a build metadata pattern is required to generate or put build metadata",
            ));
        }

        if !self.extract.patterns.is_empty() && self.extract.files.is_empty() {
            return Err(VersionGeneratorError::config(
                "data extraction patterns were given without any file to search",
            ));
        }

        Ok(())
    }

    /// Resolve the raw current version text from the configured source.
    ///
    /// # Returns
    /// * `Ok(String)` - Version text, not yet parsed
    /// * `Err(Config)` - If the file holds no match for the extraction pattern
    /// * `Err(Io)` - If the version file cannot be read
    pub fn resolve_version(&self) -> Result<String> {
        let found = match self.version.source {
            VersionSource::Variable => self.version.value.clone(),
            VersionSource::File => {
                let (Some(file), Some(pattern)) = (
                    self.version.file.as_deref(),
                    self.version.extraction_pattern.as_deref(),
                ) else {
                    return Err(VersionGeneratorError::config(
                        "version source 'file' requires a version file and an extraction pattern",
                    ));
                };
                extract::read_version_from_file(file, pattern)?
            }
        };

        found
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .ok_or_else(|| VersionGeneratorError::config("Unable to get version: nothing found"))
    }
}

fn is_blank(value: Option<&str>) -> bool {
    value.map_or(true, |v| v.trim().is_empty())
}

/// Loads configuration from file or returns defaults.
///
/// Attempts to load configuration in the following order:
/// 1. Custom path provided as parameter
/// 2. `versiongen.toml` in current directory
/// 3. `.versiongen.toml` in the user config directory
/// 4. Default configuration if no file found
///
/// # Arguments
/// * `config_path` - Optional path to custom configuration file
///
/// # Returns
/// * `Ok(Config)` - Loaded or default configuration
/// * `Err` - If file exists but cannot be read or parsed
pub fn load_config(config_path: Option<&Path>) -> Result<Config> {
    let config_str = if let Some(path) = config_path {
        fs::read_to_string(path)?
    } else if Path::new(LOCAL_CONFIG_FILE).exists() {
        fs::read_to_string(LOCAL_CONFIG_FILE)?
    } else if let Some(config_dir) = dirs::config_dir() {
        let config_path = config_dir.join(USER_CONFIG_FILE);
        if config_path.exists() {
            fs::read_to_string(config_path)?
        } else {
            return Ok(Config::default());
        }
    } else {
        return Ok(Config::default());
    };

    parse_config(&config_str)
}

/// Parse configuration from TOML text.
pub fn parse_config(text: &str) -> Result<Config> {
    toml::from_str(text).map_err(|e| VersionGeneratorError::config(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_defaults() {
        let config = Config::default();
        assert_eq!(config.version.source, VersionSource::Variable);
        assert!(config.release.cut_snapshot);
        assert!(config.release.cut_metadata);
        assert!(!config.release.generate_metadata);
        assert_eq!(config.release.metadata_pattern, "build.{date}.{hash}");
        assert!(config.next.cut_metadata);
        assert!(!config.next.has_explicit_increment());
    }

    #[test]
    fn test_parse_partial_config_uses_defaults() {
        let config = parse_config(
            r#"
[version]
value = "1.2.3"

[next]
increment_minor = true
"#,
        )
        .unwrap();

        assert_eq!(config.version.value.as_deref(), Some("1.2.3"));
        assert!(config.next.increment_minor);
        assert!(config.next.cut_metadata);
        assert_eq!(config.release, ReleasePolicy::default());
    }

    #[test]
    fn test_parse_invalid_config() {
        let err = parse_config("[version]\nsource = \"registry\"").unwrap_err();
        assert!(matches!(err, VersionGeneratorError::Config(_)));
    }

    #[test]
    fn test_validate_variable_source() {
        let mut config = Config::default();
        assert!(config.validate().is_err());

        config.version.value = Some("1.0.0".to_string());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_file_source() {
        let mut config = Config::default();
        config.version.source = VersionSource::File;
        config.version.file = Some(PathBuf::from("gradle.properties"));
        assert!(config.validate().is_err());

        config.version.extraction_pattern = Some("version=(.+)".to_string());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_metadata_pattern_required() {
        let mut config = Config::default();
        config.version.value = Some("1.0.0".to_string());
        config.release.metadata_pattern = " ".to_string();
        assert!(config.validate().is_ok());

        config.next.put_metadata = true;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_extract_requires_files() {
        let mut config = Config::default();
        config.version.value = Some("1.0.0".to_string());
        config.extract.patterns = vec!["/name=(.+)/".to_string()];
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_resolve_version_from_variable() {
        let mut config = Config::default();
        config.version.value = Some(" 5.0.3-SNAPSHOT\n".to_string());
        assert_eq!(config.resolve_version().unwrap(), "5.0.3-SNAPSHOT");

        config.version.value = None;
        assert!(config.resolve_version().is_err());
    }
}
