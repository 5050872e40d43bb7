//! Domain logic - the version model and its prerelease counter rules

pub mod prerelease;
pub mod version;

pub use prerelease::PrereleaseCounter;
pub use version::Version;
