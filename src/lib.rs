//! Instagram Downloader - extract and download media from Instagram posts.
//!
//! This library backs a small HTTP service that resolves post links,
//! enumerates their media, relays media for preview and packages downloads.
//!
//! # Features
//!
//! - Ordered login chain (session file, secret file, credentials)
//! - Post metadata extraction, including carousel posts
//! - Streaming media proxy for client-side previews
//! - Single media downloads and whole-post ZIP archives
//! - Request-scoped temporary workspaces with guaranteed cleanup
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use instagram_downloader::{server, Config, InstagramApi, SessionProvider};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load(Path::new("config.toml"))?;
//!     let auth = SessionProvider::from_config(&config).establish().await;
//!     let api = InstagramApi::new(&config, auth)?;
//!
//!     server::serve(&config, api).await?;
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod cli;
pub mod config;
pub mod download;
pub mod error;
pub mod fs;
pub mod media;
pub mod output;
pub mod server;

// Re-exports for convenience
pub use api::{AuthContext, InstagramApi, SessionProvider};
pub use config::Config;
pub use error::{Error, Result};
pub use media::{resolve, ExtractionResult, MediaItem, MediaType, Shortcode};
