//! Download module for media retrieval and packaging.
//!
//! This module provides:
//! - Single media downloads
//! - Whole-post downloads
//! - ZIP archiving
//! - Streaming preview relay

pub mod archive;
pub mod media;
pub mod post;
pub mod proxy;

pub use archive::zip_directory;
pub use media::{download_one, download_to_file};
pub use post::download_post;
pub use proxy::{relay, Relay};
