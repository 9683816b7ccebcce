//! Filesystem module.
//!
//! Provides:
//! - Request-scoped workspaces
//! - Filename generation and validation

pub mod naming;
pub mod workspace;

pub use naming::{
    archive_filename, content_disposition, media_filename, post_basename, sanitize_filename,
    sanitize_path_component,
};
pub use workspace::Workspace;
