//! User interface module - diagnostics and result rendering.

pub mod formatter;

// Re-export formatter functions for convenience
pub use formatter::{
    display_error, display_extract_warning, display_status, display_success, render_env,
    render_toml,
};
