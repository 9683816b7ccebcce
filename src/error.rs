//! Error types for the instagram-downloader service.

use thiserror::Error;

/// Main error type for the application.
#[derive(Error, Debug)]
pub enum Error {
    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid configuration value for '{field}': {message}")]
    ConfigValidation { field: String, message: String },

    #[error("Missing required configuration: {0}")]
    MissingConfig(String),

    // Login errors (startup only, never fatal)
    #[error("Login failed: {0}")]
    Login(String),

    // URL resolution errors
    #[error("Not a valid Instagram post URL: {0}")]
    InvalidUrl(String),

    // Upstream platform errors
    #[error("API error: {0}")]
    Api(String),

    #[error("Authentication required: {0}")]
    Authentication(String),

    #[error("Post not found: {0}")]
    PostNotFound(String),

    #[error("Rate limited by Instagram (HTTP {0})")]
    RateLimited(u16),

    // Download errors
    #[error("Download failed: {0}")]
    Download(String),

    #[error("Proxy request failed: {0}")]
    Proxy(String),

    #[error("Archive error: {0}")]
    Archive(String),

    // File system errors
    #[error("Invalid filename (path traversal attempt): {0}")]
    InvalidFilename(String),

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // HTTP errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    // Serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    // URL parsing errors
    #[error("Invalid URL: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),
}

impl Error {
    /// Whether the error was caused by the caller's input rather than upstream.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Error::InvalidUrl(_) | Error::InvalidFilename(_))
    }
}

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Process exit codes.
pub mod exit_codes {
    pub const SUCCESS: i32 = 0;
    pub const CONFIG_ERROR: i32 = 3;
    pub const SERVER_ERROR: i32 = 4;
    pub const UNEXPECTED_ERROR: i32 = 5;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_errors() {
        assert!(Error::InvalidUrl("https://example.com".into()).is_client_error());
        assert!(Error::InvalidFilename("../x".into()).is_client_error());
        assert!(!Error::Api("boom".into()).is_client_error());
        assert!(!Error::Proxy("HTTP 404".into()).is_client_error());
    }

    #[test]
    fn test_messages_carry_detail() {
        let err = Error::PostNotFound("ABC123".into());
        assert_eq!(err.to_string(), "Post not found: ABC123");

        let err = Error::RateLimited(429);
        assert!(err.to_string().contains("429"));
    }
}
