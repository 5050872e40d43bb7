pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod extract;
pub mod generator;
pub mod git;
pub mod metadata;
pub mod ui;
pub mod warning;

pub use domain::Version;
pub use error::{Result, VersionGeneratorError};
