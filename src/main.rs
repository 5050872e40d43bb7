use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use version_generator::cli::{resolve_commit_hash, run_workflow};
use version_generator::config::{self, Config, VersionSource};
use version_generator::generator::BuildContext;
use version_generator::git::Git2Repository;
use version_generator::ui;

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
enum OutputFormat {
    /// `NAME=value` lines
    Env,
    /// A TOML document with `[versions]` and `[extracted]` tables
    Toml,
}

#[derive(clap::Parser)]
#[command(
    name = "version-generator",
    about = "Compute current, release and next semantic versions for a build"
)]
struct Args {
    #[arg(short, long, help = "Custom configuration file path")]
    config: Option<PathBuf>,

    #[arg(long, help = "Current version, overrides the configured version source")]
    current: Option<String>,

    #[arg(long, help = "File to extract the current version from")]
    version_file: Option<PathBuf>,

    #[arg(long, help = "Regular expression locating the version in the version file")]
    version_pattern: Option<String>,

    #[arg(long, value_name = "BOOL", help = "Drop the prerelease of the release version")]
    release_cut_prerelease: Option<bool>,

    #[arg(long, value_name = "BOOL", help = "Drop a SNAPSHOT marker from the release version")]
    release_cut_snapshot: Option<bool>,

    #[arg(long, value_name = "BOOL", help = "Drop build metadata from the release version")]
    release_cut_metadata: Option<bool>,

    #[arg(long, value_name = "BOOL", help = "Generate build metadata for the release version")]
    release_generate_metadata: Option<bool>,

    #[arg(long, help = "Build metadata pattern, e.g. build.{date}.{hash}")]
    metadata_pattern: Option<String>,

    #[arg(long, help = "Timestamp used for {date} instead of the current time")]
    metadata_time: Option<String>,

    #[arg(long, value_name = "BOOL", help = "Drop the prerelease of the next version")]
    next_cut_prerelease: Option<bool>,

    #[arg(long, value_name = "BOOL", help = "Drop build metadata from the next version")]
    next_cut_metadata: Option<bool>,

    #[arg(long, value_name = "BOOL", help = "Copy release build metadata onto the next version")]
    next_put_metadata: Option<bool>,

    #[arg(long, value_name = "BOOL", help = "Increment the major version")]
    next_increment_major: Option<bool>,

    #[arg(long, value_name = "BOOL", help = "Increment the minor version")]
    next_increment_minor: Option<bool>,

    #[arg(long, value_name = "BOOL", help = "Increment the patch version")]
    next_increment_patch: Option<bool>,

    #[arg(long, value_name = "BOOL", help = "Increment the prerelease counter")]
    next_increment_prerelease: Option<bool>,

    #[arg(long, env = "GITHUB_SHA", help = "Commit hash for {hash}, defaults to HEAD")]
    commit: Option<String>,

    #[arg(long = "extract", value_name = "/PATTERN/FLAGS", help = "Data extraction pattern")]
    extract: Vec<String>,

    #[arg(long = "extract-file", value_name = "FILE", help = "File searched by data extraction")]
    extract_files: Vec<PathBuf>,

    #[arg(long, help = "Base variable name for extracted values")]
    extract_name: Option<String>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Env, help = "Output format")]
    format: OutputFormat,

    #[arg(short, long, help = "Only print results")]
    quiet: bool,

    #[arg(short, long, help = "Print version information")]
    version: bool,
}

fn main() {
    if let Err(e) = run() {
        ui::display_error(&format!("{:#}", e));
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let args = Args::parse();

    if args.version {
        println!("version-generator {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    let mut config =
        config::load_config(args.config.as_deref()).context("Error loading config")?;
    apply_overrides(&mut config, &args);

    let commit_hash = resolve_commit_hash(
        args.commit.as_deref(),
        config.release.generate_metadata,
        || Git2Repository::open("."),
    )
    .context("Unable to determine the commit hash")?;
    let context = BuildContext::at_current_time(commit_hash);

    let result = run_workflow(&config, &context)?;
    let versions = &result.versions;

    if !args.quiet {
        ui::display_status(&format!("Got version extracted: {}", versions.current));
        ui::display_status(&format!("Got release version: {}", versions.release));
        ui::display_status(&format!("Got next version: {}", versions.next));
    }
    for warning in &result.extraction.warnings {
        ui::display_extract_warning(warning);
    }

    let outputs = versions.outputs();
    let extracted: Vec<(String, String)> = result.extraction.values().cloned().collect();

    match args.format {
        OutputFormat::Env => {
            print!("{}", ui::render_env(&outputs));
            print!("{}", ui::render_env(&extracted));
        }
        OutputFormat::Toml => print!("{}", ui::render_toml(&outputs, &extracted)?),
    }

    if !args.quiet {
        ui::display_success(&format!(
            "Computed {} outputs and {} extracted values",
            outputs.len(),
            extracted.len()
        ));
    }

    Ok(())
}

/// Layer command-line values over the loaded configuration
fn apply_overrides(config: &mut Config, args: &Args) {
    if let Some(current) = &args.current {
        config.version.source = VersionSource::Variable;
        config.version.value = Some(current.clone());
    } else if let Some(file) = &args.version_file {
        config.version.source = VersionSource::File;
        config.version.file = Some(file.clone());
    }
    if let Some(pattern) = &args.version_pattern {
        config.version.extraction_pattern = Some(pattern.clone());
    }

    let release = &mut config.release;
    override_flag(&mut release.cut_prerelease, args.release_cut_prerelease);
    override_flag(&mut release.cut_snapshot, args.release_cut_snapshot);
    override_flag(&mut release.cut_metadata, args.release_cut_metadata);
    override_flag(&mut release.generate_metadata, args.release_generate_metadata);
    if let Some(pattern) = &args.metadata_pattern {
        release.metadata_pattern = pattern.clone();
    }
    if let Some(time) = &args.metadata_time {
        release.metadata_time = Some(time.clone());
    }

    let next = &mut config.next;
    override_flag(&mut next.cut_prerelease, args.next_cut_prerelease);
    override_flag(&mut next.cut_metadata, args.next_cut_metadata);
    override_flag(&mut next.put_metadata, args.next_put_metadata);
    override_flag(&mut next.increment_major, args.next_increment_major);
    override_flag(&mut next.increment_minor, args.next_increment_minor);
    override_flag(&mut next.increment_patch, args.next_increment_patch);
    override_flag(&mut next.increment_prerelease, args.next_increment_prerelease);

    if !args.extract.is_empty() {
        config.extract.patterns = args.extract.clone();
    }
    if !args.extract_files.is_empty() {
        config.extract.files = args.extract_files.clone();
    }
    if let Some(name) = &args.extract_name {
        config.extract.name = Some(name.clone());
    }
}

fn override_flag(flag: &mut bool, value: Option<bool>) {
    if let Some(value) = value {
        *flag = value;
    }
}
