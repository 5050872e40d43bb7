// tests/config_test.rs
use serial_test::serial;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use version_generator::config::{load_config, VersionSource, LOCAL_CONFIG_FILE};

#[test]
fn test_load_from_file() {
    let mut temp_file = NamedTempFile::new().unwrap();
    let toml_content = r#"
[version]
source = "variable"
value = "2.0.0-RC1"

[release]
cut_prerelease = true

[next]
increment_major = true
put_metadata = true
"#;
    temp_file.write_all(toml_content.as_bytes()).unwrap();
    temp_file.flush().unwrap();

    let config = load_config(Some(temp_file.path())).unwrap();
    assert_eq!(config.version.source, VersionSource::Variable);
    assert_eq!(config.version.value.as_deref(), Some("2.0.0-RC1"));
    assert!(config.release.cut_prerelease);
    assert!(config.release.cut_snapshot);
    assert!(config.next.increment_major);
    assert!(config.next.put_metadata);
    assert!(config.next.cut_metadata);
}

#[test]
#[serial]
fn test_load_fixture() {
    let config = load_config(Some(Path::new("tests/fixtures/versiongen.toml")))
        .expect("Failed to load test config");
    assert_eq!(config.version.source, VersionSource::File);
    assert_eq!(
        config.version.file,
        Some(PathBuf::from("tests/fixtures/simple_gradle.properties"))
    );
    assert_eq!(
        config.release.metadata_time.as_deref(),
        Some("2017-03-02T17:33:03")
    );
    assert_eq!(config.extract.patterns.len(), 1);
    assert!(config.validate().is_ok());
}

#[test]
#[serial]
fn test_load_missing_file_is_io_error() {
    let err = load_config(Some(Path::new("tests/fixtures/no_such_config.toml"))).unwrap_err();
    assert!(matches!(
        err,
        version_generator::VersionGeneratorError::Io(ref e) if e.kind() == std::io::ErrorKind::NotFound
    ));
}

#[test]
fn test_load_malformed_file() {
    let mut temp_file = NamedTempFile::new().unwrap();
    temp_file.write_all(b"[release\ncut_prerelease = ").unwrap();
    temp_file.flush().unwrap();

    assert!(load_config(Some(temp_file.path())).is_err());
}

#[test]
#[serial]
fn test_load_from_working_directory() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join(LOCAL_CONFIG_FILE),
        "[version]\nvalue = \"3.1.4\"\n",
    )
    .unwrap();

    let original = std::env::current_dir().unwrap();
    std::env::set_current_dir(dir.path()).unwrap();
    let loaded = load_config(None);
    std::env::set_current_dir(original).unwrap();

    assert_eq!(loaded.unwrap().version.value.as_deref(), Some("3.1.4"));
}
