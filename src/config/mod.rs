//! Configuration module for the instagram-downloader.
//!
//! This module handles:
//! - Loading configuration from TOML files
//! - CLI argument and environment merging (see `cli`)
//! - Configuration validation

pub mod loader;
pub mod validation;

pub use loader::{Config, InstagramConfig, OptionsConfig, ServerConfig};
pub use validation::validate_config;
