//! Release and next version generation
//!
//! Both generators take the parsed current version by reference and return fresh values; the
//! caller's version is never modified.

use crate::config::{Config, NextPolicy, ReleasePolicy};
use crate::domain::Version;
use crate::error::{Result, VersionGeneratorError};
use crate::metadata::{self, MetadataModel};
use chrono::{Local, NaiveDateTime};

/// Conventional prerelease marker of an in-progress build
pub const SNAPSHOT: &str = "SNAPSHOT";

/// Build facts supplied by the caller for metadata generation
#[derive(Debug, Clone, PartialEq)]
pub struct BuildContext {
    /// Full commit identifier used for `{hash}`
    pub commit_hash: String,
    /// Fallback for `{date}` when no metadata time is configured
    pub now: NaiveDateTime,
}

impl BuildContext {
    pub fn new(commit_hash: impl Into<String>, now: NaiveDateTime) -> Self {
        BuildContext {
            commit_hash: commit_hash.into(),
            now,
        }
    }

    /// Context stamped with the current local time
    pub fn at_current_time(commit_hash: impl Into<String>) -> Self {
        BuildContext::new(commit_hash, Local::now().naive_local())
    }
}

/// Derive the release version from `current`.
///
/// Steps, in order:
/// 1. `cut_prerelease` drops the prerelease; otherwise `cut_snapshot` removes a `SNAPSHOT`
///    prerelease or a trailing `-SNAPSHOT` / `.SNAPSHOT`.
/// 2. `cut_metadata` drops the build metadata.
/// 3. `generate_metadata` replaces the build metadata with the expanded metadata pattern. An
///    empty expansion leaves the release without build metadata.
///
/// # Returns
/// * `Ok(Version)` - The release version
/// * `Err(MetadataPattern)` - If the pattern is invalid or expands to invalid build metadata
/// * `Err(Config)` - If the configured metadata time cannot be parsed
pub fn generate_release(
    current: &Version,
    policy: &ReleasePolicy,
    context: &BuildContext,
) -> Result<Version> {
    let mut release = if policy.cut_prerelease {
        current.with_prerelease(None)
    } else if policy.cut_snapshot {
        current.with_prerelease(cut_snapshot(current.prerelease.as_deref()))
    } else {
        current.clone()
    };

    if policy.cut_metadata {
        release = release.with_build_metadata(None);
    }

    if policy.generate_metadata {
        let date = match policy.metadata_time.as_deref().map(str::trim) {
            Some(time) if !time.is_empty() => metadata::parse_datetime(time)?,
            _ => context.now,
        };
        let model = MetadataModel::new(date, context.commit_hash.as_str());
        let build_metadata = metadata::expand(&policy.metadata_pattern, &model)?;
        if build_metadata.is_empty() {
            release = release.with_build_metadata(None);
        } else {
            check_build_metadata(&policy.metadata_pattern, &build_metadata)?;
            release = release.with_build_metadata(Some(build_metadata));
        }
    }

    Ok(release)
}

fn cut_snapshot(prerelease: Option<&str>) -> Option<String> {
    let prerelease = prerelease?;
    if prerelease == SNAPSHOT {
        return None;
    }

    let stripped = prerelease
        .strip_suffix(SNAPSHOT)
        .and_then(|rest| rest.strip_suffix('-').or_else(|| rest.strip_suffix('.')));

    Some(stripped.unwrap_or(prerelease).to_string())
}

fn check_build_metadata(pattern: &str, build_metadata: &str) -> Result<()> {
    semver::BuildMetadata::new(build_metadata)
        .map(|_| ())
        .map_err(|e| {
            VersionGeneratorError::metadata(format!(
                "'{}'; expanded to invalid build metadata '{}': {}",
                pattern, build_metadata, e
            ))
        })
}

/// Derive the next development version from `current`.
///
/// Without explicit increment flags the prerelease counter is bumped, falling back to a patch
/// bump when the prerelease carries no ALPHA/BETA/RC counter (or is going to be cut anyway).
/// Explicit flags apply in the order prerelease, patch, minor, major; each of the last three
/// restarts the prerelease counter at 1 and zeroes the lower fields.
///
/// # Returns
/// * `Ok(Version)` - The next version
/// * `Err(VersionSyntax)` - If a bumped component would overflow `u64`
pub fn generate_next(current: &Version, release: &Version, policy: &NextPolicy) -> Result<Version> {
    let bump = |name: &str, value: u64| {
        value.checked_add(1).ok_or_else(|| {
            VersionGeneratorError::version(format!(
                "'{}'; {} version {} cannot be incremented",
                source_text(current),
                name,
                value
            ))
        })
    };

    let mut next = current.clone();

    if !policy.has_explicit_increment() {
        if policy.cut_prerelease {
            next = next.with_patch(bump("patch", next.patch)?);
        } else {
            let incremented = next.increment_prerelease();
            next = if incremented.prerelease == next.prerelease {
                next.with_patch(bump("patch", next.patch)?)
            } else {
                incremented
            };
        }
    } else {
        if policy.increment_prerelease {
            next = next.increment_prerelease();
        }
        if policy.increment_patch {
            next = next
                .reset_prerelease()
                .with_patch(bump("patch", next.patch)?);
        }
        if policy.increment_minor {
            next = next
                .reset_prerelease()
                .with_patch(0)
                .with_minor(bump("minor", next.minor)?);
        }
        if policy.increment_major {
            next = next
                .reset_prerelease()
                .with_minor(0)
                .with_patch(0)
                .with_major(bump("major", next.major)?);
        }
    }

    if policy.cut_prerelease {
        next = next.with_prerelease(None);
    }
    if policy.cut_metadata {
        next = next.with_build_metadata(None);
    }
    if policy.put_metadata {
        next = next.with_build_metadata(release.build_metadata.clone());
    }

    Ok(next)
}

fn source_text(version: &Version) -> String {
    if version.raw.is_empty() {
        version.to_string()
    } else {
        version.raw.clone()
    }
}

/// Every version computed for one run
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedVersions {
    pub current: Version,
    pub release: Version,
    pub next: Version,
    /// Release policy applied to the next version
    pub next_release: Version,
}

/// Compute release, next and next-release versions for `current`.
pub fn generate_all(
    current: &Version,
    config: &Config,
    context: &BuildContext,
) -> Result<GeneratedVersions> {
    let release = generate_release(current, &config.release, context)?;
    let next = generate_next(current, &release, &config.next)?;
    let next_release = generate_release(&next, &config.release, context)?;

    Ok(GeneratedVersions {
        current: current.clone(),
        release,
        next,
        next_release,
    })
}

impl GeneratedVersions {
    /// Named outputs: each version followed by its decomposed components
    pub fn outputs(&self) -> Vec<(String, String)> {
        let versions = [
            ("CURRENT_VERSION", &self.current),
            ("RELEASE_VERSION", &self.release),
            ("NEXT_VERSION", &self.next),
            ("NEXT_RELEASE_VERSION", &self.next_release),
        ];

        let mut outputs = Vec::new();
        for (name, version) in versions {
            outputs.push((name.to_string(), version.to_string()));
            for (suffix, value) in version.components() {
                outputs.push((format!("{}_{}", name, suffix), value));
            }
        }
        outputs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rstest::rstest;

    const HASH: &str = "622161f9e2993288c026f9c8eb71a0659ed933ee";

    fn context() -> BuildContext {
        let now = NaiveDate::from_ymd_opt(2017, 3, 2)
            .unwrap()
            .and_hms_opt(17, 33, 3)
            .unwrap();
        BuildContext::new(HASH, now)
    }

    fn version(text: &str) -> Version {
        Version::parse(text).unwrap()
    }

    fn release_policy() -> ReleasePolicy {
        ReleasePolicy {
            cut_prerelease: false,
            cut_snapshot: false,
            cut_metadata: false,
            generate_metadata: false,
            ..ReleasePolicy::default()
        }
    }

    fn next_policy() -> NextPolicy {
        NextPolicy {
            cut_metadata: false,
            ..NextPolicy::default()
        }
    }

    #[rstest]
    #[case("1.2.3-BETA-7-SNAPSHOT", "1.2.3-BETA-7")]
    #[case("1.2.3-BETA-7.SNAPSHOT", "1.2.3-BETA-7")]
    #[case("5.0.3-SNAPSHOT", "5.0.3")]
    #[case("1.2.3-SNAPSHOT-BETA", "1.2.3-SNAPSHOT-BETA")]
    #[case("1.2.3-BETASNAPSHOT", "1.2.3-BETASNAPSHOT")]
    #[case("1.2.3", "1.2.3")]
    fn test_release_cut_snapshot(#[case] current: &str, #[case] expected: &str) {
        let policy = ReleasePolicy {
            cut_snapshot: true,
            ..release_policy()
        };
        let release = generate_release(&version(current), &policy, &context()).unwrap();
        assert_eq!(release.to_string(), expected);
    }

    #[test]
    fn test_release_cut_prerelease_wins_over_snapshot() {
        for cut_snapshot in [false, true] {
            let policy = ReleasePolicy {
                cut_prerelease: true,
                cut_snapshot,
                ..release_policy()
            };
            let release =
                generate_release(&version("1.2.3-BETA-7-SNAPSHOT+meta"), &policy, &context())
                    .unwrap();
            assert_eq!(release.prerelease, None);
            assert_eq!(release.to_string(), "1.2.3+meta");
        }
    }

    #[test]
    fn test_release_cut_and_generate_metadata() {
        let current = version("1.2.3-SNAPSHOT+old");
        let cut = ReleasePolicy {
            cut_metadata: true,
            ..release_policy()
        };
        assert_eq!(
            generate_release(&current, &cut, &context()).unwrap().to_string(),
            "1.2.3-SNAPSHOT"
        );

        let generate = ReleasePolicy {
            cut_metadata: true,
            cut_snapshot: true,
            generate_metadata: true,
            ..release_policy()
        };
        assert_eq!(
            generate_release(&current, &generate, &context())
                .unwrap()
                .to_string(),
            "1.2.3+build.2017-03-02.622161f9"
        );
    }

    #[test]
    fn test_release_metadata_time_overrides_now() {
        let policy = ReleasePolicy {
            generate_metadata: true,
            metadata_pattern: "{date[YYYYMMDDHHmm]}".to_string(),
            metadata_time: Some("2020-12-31T23:59:00".to_string()),
            ..release_policy()
        };
        let release = generate_release(&version("1.0.0"), &policy, &context()).unwrap();
        assert_eq!(release.build_metadata.as_deref(), Some("202012312359"));
    }

    #[test]
    fn test_release_metadata_errors() {
        let bad_pattern = ReleasePolicy {
            generate_metadata: true,
            metadata_pattern: "build+{hash}".to_string(),
            ..release_policy()
        };
        assert!(matches!(
            generate_release(&version("1.0.0"), &bad_pattern, &context()),
            Err(VersionGeneratorError::MetadataPattern(_))
        ));

        let trailing_dot = ReleasePolicy {
            generate_metadata: true,
            metadata_pattern: "build.{hash[0,0]}".to_string(),
            ..release_policy()
        };
        let err = generate_release(&version("1.0.0"), &trailing_dot, &context()).unwrap_err();
        assert!(matches!(err, VersionGeneratorError::MetadataPattern(_)));
        assert!(err.to_string().contains("build."));

        let bad_time = ReleasePolicy {
            generate_metadata: true,
            metadata_time: Some("tomorrow".to_string()),
            ..release_policy()
        };
        assert!(matches!(
            generate_release(&version("1.0.0"), &bad_time, &context()),
            Err(VersionGeneratorError::Config(_))
        ));
    }

    #[test]
    fn test_release_empty_expansion_has_no_metadata() {
        let policy = ReleasePolicy {
            generate_metadata: true,
            metadata_pattern: "{hash}".to_string(),
            ..release_policy()
        };
        let empty_hash = BuildContext::new("", context().now);
        let release = generate_release(&version("1.0.0+old"), &policy, &empty_hash).unwrap();
        assert_eq!(release.build_metadata, None);
        assert_eq!(release.to_string(), "1.0.0");
    }

    #[rstest]
    #[case("1.2.3-BETA-7-SNAPSHOT", "1.2.3-BETA-8-SNAPSHOT")]
    #[case("5.0.0-TESTNG6-RC1", "5.0.0-TESTNG6-RC2")]
    #[case("1.2.3-SNAPSHOT", "1.2.4-SNAPSHOT")]
    #[case("1.2.3-BETA-SNAPSHOT-7", "1.2.4-BETA-SNAPSHOT-7")]
    #[case("1.2.3", "1.2.4")]
    fn test_next_auto(#[case] current: &str, #[case] expected: &str) {
        let current = version(current);
        let next = generate_next(&current, &current, &next_policy()).unwrap();
        assert_eq!(next.to_string(), expected);
    }

    #[test]
    fn test_next_auto_with_cut_prerelease_bumps_patch() {
        let policy = NextPolicy {
            cut_prerelease: true,
            ..next_policy()
        };
        let current = version("1.2.3-BETA-7-SNAPSHOT");
        assert_eq!(generate_next(&current, &current, &policy).unwrap().to_string(), "1.2.4");
    }

    #[rstest]
    #[case(true, false, false, false, "1.2.3-BETA-8")]
    #[case(false, true, false, false, "1.2.4-BETA-1")]
    #[case(false, false, true, false, "1.3.0-BETA-1")]
    #[case(false, false, false, true, "2.0.0-BETA-1")]
    #[case(true, true, false, false, "1.2.4-BETA-1")]
    #[case(false, true, true, false, "1.3.0-BETA-1")]
    #[case(false, true, true, true, "2.0.0-BETA-1")]
    fn test_next_explicit_increments(
        #[case] increment_prerelease: bool,
        #[case] increment_patch: bool,
        #[case] increment_minor: bool,
        #[case] increment_major: bool,
        #[case] expected: &str,
    ) {
        let policy = NextPolicy {
            increment_prerelease,
            increment_patch,
            increment_minor,
            increment_major,
            ..next_policy()
        };
        let current = version("1.2.3-BETA-7");
        assert_eq!(generate_next(&current, &current, &policy).unwrap().to_string(), expected);
    }

    #[test]
    fn test_next_explicit_prerelease_without_counter_is_unchanged() {
        let policy = NextPolicy {
            increment_prerelease: true,
            ..next_policy()
        };
        let current = version("1.2.3-SNAPSHOT");
        assert_eq!(generate_next(&current, &current, &policy).unwrap(), current);
    }

    #[test]
    fn test_next_patch_overflow_is_an_error() {
        let current = version("1.2.18446744073709551615");
        let err = generate_next(&current, &current, &NextPolicy::default()).unwrap_err();
        assert!(matches!(err, VersionGeneratorError::VersionSyntax(_)));
        assert!(err.to_string().contains("1.2.18446744073709551615"));

        assert!(generate_all(&current, &Config::default(), &context()).is_err());
    }

    #[test]
    fn test_next_major_overflow_is_an_error() {
        let policy = NextPolicy {
            increment_major: true,
            ..next_policy()
        };
        let current = version("18446744073709551615.0.0");
        let err = generate_next(&current, &current, &policy).unwrap_err();
        assert!(matches!(err, VersionGeneratorError::VersionSyntax(_)));
        assert!(err.to_string().contains("18446744073709551615.0.0"));

        let minor = NextPolicy {
            increment_minor: true,
            ..next_policy()
        };
        assert_eq!(
            generate_next(&current, &current, &minor).unwrap().to_string(),
            "18446744073709551615.1.0"
        );
    }

    #[test]
    fn test_next_metadata_handling() {
        let current = version("1.2.3-RC1+current");
        let release = version("1.2.3+build.2017-03-02.622161f9");

        let cut = NextPolicy {
            cut_metadata: true,
            ..next_policy()
        };
        assert_eq!(generate_next(&current, &release, &cut).unwrap().to_string(), "1.2.3-RC2");

        let put = NextPolicy {
            cut_metadata: true,
            put_metadata: true,
            ..next_policy()
        };
        let next = generate_next(&current, &release, &put).unwrap();
        assert_eq!(next.build_metadata, release.build_metadata);

        let put_absent = generate_next(&current, &version("1.2.3"), &put).unwrap();
        assert_eq!(put_absent.build_metadata, None);
    }

    #[test]
    fn test_generators_do_not_touch_current() {
        let current = version("1.2.3-BETA-7-SNAPSHOT+meta");
        let config = Config::default();
        let generated = generate_all(&current, &config, &context()).unwrap();

        assert_eq!(current.to_string(), "1.2.3-BETA-7-SNAPSHOT+meta");
        assert_eq!(generated.current, current);
        assert_eq!(generated.release.to_string(), "1.2.3-BETA-7");
        assert_eq!(generated.next.to_string(), "1.2.3-BETA-8-SNAPSHOT");
        assert_eq!(generated.next_release.to_string(), "1.2.3-BETA-8");
    }

    #[test]
    fn test_outputs() {
        let config = Config::default();
        let generated = generate_all(&version("5.0.3-SNAPSHOT"), &config, &context()).unwrap();
        let outputs = generated.outputs();

        let get = |name: &str| {
            outputs
                .iter()
                .find(|(n, _)| n == name)
                .map(|(_, v)| v.as_str())
        };
        assert_eq!(get("CURRENT_VERSION"), Some("5.0.3-SNAPSHOT"));
        assert_eq!(get("CURRENT_VERSION_PRERELEASE"), Some("SNAPSHOT"));
        assert_eq!(get("RELEASE_VERSION"), Some("5.0.3"));
        assert_eq!(get("RELEASE_VERSION_PRERELEASE"), None);
        assert_eq!(get("NEXT_VERSION"), Some("5.0.4-SNAPSHOT"));
        assert_eq!(get("NEXT_VERSION_PATCH"), Some("4"));
        assert_eq!(get("NEXT_RELEASE_VERSION"), Some("5.0.4"));
        assert_eq!(outputs[0].0, "CURRENT_VERSION");
    }
}
