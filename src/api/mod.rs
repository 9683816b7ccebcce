//! Instagram API module.
//!
//! This module provides:
//! - HTTP client for the Instagram web/GraphQL API
//! - Session bootstrapping via an ordered login chain
//! - API response types

pub mod auth;
pub mod client;
pub mod types;

pub use auth::{AuthContext, LoginStrategy, SessionProvider};
pub use client::InstagramApi;
pub use types::*;
