//! Program boundary shared by the binary and integration tests

pub mod orchestration;

pub use orchestration::{resolve_commit_hash, run_workflow, WorkflowResult};
