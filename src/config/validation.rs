//! Configuration validation logic.

use std::net::SocketAddr;

use crate::config::loader::Config;
use crate::error::{Error, Result};

/// Minimum length for user agent.
const MIN_USER_AGENT_LENGTH: usize = 20;

/// Validate the entire configuration.
pub fn validate_config(config: &Config) -> Result<()> {
    validate_bind(&config.server.bind)?;
    validate_user_agent(&config.instagram.user_agent)?;
    validate_base_url(&config.instagram.base_url)?;

    if config.options.request_timeout_secs == 0 {
        return Err(Error::ConfigValidation {
            field: "request_timeout_secs".to_string(),
            message: "Timeout must be greater than zero".to_string(),
        });
    }

    if config.options.connect_timeout_secs == 0 {
        return Err(Error::ConfigValidation {
            field: "connect_timeout_secs".to_string(),
            message: "Timeout must be greater than zero".to_string(),
        });
    }

    Ok(())
}

/// Validate the listen address.
pub fn validate_bind(bind: &str) -> Result<()> {
    bind.parse::<SocketAddr>()
        .map(|_| ())
        .map_err(|e| Error::ConfigValidation {
            field: "bind".to_string(),
            message: format!("'{}' is not a socket address: {}", bind, e),
        })
}

/// Validate the user agent string.
pub fn validate_user_agent(user_agent: &str) -> Result<()> {
    if user_agent.is_empty() {
        return Err(Error::MissingConfig("user_agent".to_string()));
    }

    if user_agent.len() < MIN_USER_AGENT_LENGTH {
        return Err(Error::ConfigValidation {
            field: "user_agent".to_string(),
            message: format!(
                "User agent must be at least {} characters (got {})",
                MIN_USER_AGENT_LENGTH,
                user_agent.len()
            ),
        });
    }

    Ok(())
}

/// Validate the upstream base URL.
pub fn validate_base_url(base_url: &str) -> Result<()> {
    let parsed = url::Url::parse(base_url)?;
    match parsed.scheme() {
        "http" | "https" => Ok(()),
        other => Err(Error::ConfigValidation {
            field: "base_url".to_string(),
            message: format!("Unsupported scheme '{}'", other),
        }),
    }
}
