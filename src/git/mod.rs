//! Git access for build metadata
//!
//! The generators only need the identifier of the commit being built. It is read through the
//! [Repository] trait so that the binary can use a real repository while tests use
//! [mock::MockRepository].
//!
//! - [repository::Git2Repository]: implementation using the `git2` crate
//! - [mock::MockRepository]: fixed answers for tests

pub mod mock;
pub mod repository;

pub use mock::MockRepository;
pub use repository::Git2Repository;

use crate::error::Result;

/// Source of the commit identifier used in `{hash}` placeholders
pub trait Repository {
    /// Full hexadecimal identifier of the commit `HEAD` points to
    ///
    /// # Returns
    /// * `Ok(String)` - 40 character commit hash
    /// * `Err` - If `HEAD` is unborn or does not resolve to a commit
    fn head_commit_hash(&self) -> Result<String>;
}
