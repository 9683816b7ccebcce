//! Configuration structures and loading logic.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub instagram: InstagramConfig,

    #[serde(default)]
    pub options: OptionsConfig,
}

/// HTTP server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Socket address to listen on.
    #[serde(default = "default_bind")]
    pub bind: String,

    /// Front-end document served at `/`. Falls back to the bundled page.
    #[serde(default)]
    pub frontend: Option<PathBuf>,

    /// Allowed CORS origins. Empty means any origin.
    #[serde(default)]
    pub allowed_origins: Vec<String>,
}

/// Instagram account and endpoint configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstagramConfig {
    /// Account username (used for credential login and session file naming).
    #[serde(default)]
    pub username: Option<String>,

    /// Account password for credential login.
    #[serde(default)]
    pub password: Option<String>,

    /// Pre-provisioned session file.
    #[serde(default)]
    pub session_file: Option<PathBuf>,

    /// Platform-managed secret file holding a session.
    #[serde(default = "default_secret_file")]
    pub secret_file: PathBuf,

    /// Browser user agent string.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Base URL of the Instagram web API.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// GraphQL document ID for the shortcode media query.
    #[serde(default = "default_doc_id")]
    pub doc_id: String,
}

/// Service options.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptionsConfig {
    /// Read timeout for upstream requests, in seconds.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Connect timeout for upstream requests, in seconds.
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,

    /// Directory under which per-request workspaces are created.
    #[serde(default)]
    pub workspace_root: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            frontend: None,
            allowed_origins: Vec::new(),
        }
    }
}

impl Default for InstagramConfig {
    fn default() -> Self {
        Self {
            username: None,
            password: None,
            session_file: None,
            secret_file: default_secret_file(),
            user_agent: default_user_agent(),
            base_url: default_base_url(),
            doc_id: default_doc_id(),
        }
    }
}

impl Default for OptionsConfig {
    fn default() -> Self {
        Self {
            request_timeout_secs: default_request_timeout(),
            connect_timeout_secs: default_connect_timeout(),
            workspace_root: None,
        }
    }
}

fn default_bind() -> String {
    "0.0.0.0:5000".to_string()
}

fn default_secret_file() -> PathBuf {
    PathBuf::from("/etc/secrets/instagram_session")
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36".to_string()
}

fn default_base_url() -> String {
    "https://www.instagram.com".to_string()
}

fn default_doc_id() -> String {
    "8845758582119845".to_string()
}

fn default_request_timeout() -> u64 {
    30
}

fn default_connect_timeout() -> u64 {
    10
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::Config(format!(
                    "Configuration file not found: {}. Create one from config.example.toml",
                    path.display()
                ))
            } else {
                Error::Io(e)
            }
        })?;

        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Get the effective session file path.
    ///
    /// An explicit path wins; otherwise the path is derived from the username.
    pub fn session_file(&self) -> Option<PathBuf> {
        if let Some(path) = &self.instagram.session_file {
            return Some(path.clone());
        }

        let username = self.instagram.username.as_deref()?;
        let home = std::env::var_os("HOME")?;
        Some(
            PathBuf::from(home)
                .join(".config")
                .join("instagram-downloader")
                .join(format!("session-{}", username)),
        )
    }

    /// Get the effective workspace root directory.
    pub fn workspace_root(&self) -> PathBuf {
        self.options
            .workspace_root
            .clone()
            .unwrap_or_else(std::env::temp_dir)
    }

    /// Read timeout for upstream requests.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.options.request_timeout_secs)
    }

    /// Connect timeout for upstream requests.
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.options.connect_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_partial_config_uses_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[server]
bind = "127.0.0.1:8080"

[instagram]
username = "someone"
"#
        )
        .unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.server.bind, "127.0.0.1:8080");
        assert_eq!(config.instagram.username.as_deref(), Some("someone"));
        assert_eq!(config.instagram.base_url, "https://www.instagram.com");
        assert_eq!(
            config.instagram.secret_file,
            PathBuf::from("/etc/secrets/instagram_session")
        );
        assert_eq!(config.options.request_timeout_secs, 30);
    }

    #[test]
    fn test_load_missing_file() {
        let err = Config::load(Path::new("/nonexistent/config.toml")).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_load_invalid_toml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[server\nbind = ").unwrap();
        assert!(matches!(
            Config::load(file.path()),
            Err(Error::TomlParse(_))
        ));
    }

    #[test]
    fn test_explicit_session_file_wins() {
        let mut config = Config::default();
        config.instagram.username = Some("someone".into());
        config.instagram.session_file = Some(PathBuf::from("/srv/session"));
        assert_eq!(config.session_file(), Some(PathBuf::from("/srv/session")));
    }

    #[test]
    fn test_session_file_requires_username() {
        let config = Config::default();
        assert!(config.instagram.session_file.is_none());
        assert_eq!(config.session_file(), None);
    }

    #[test]
    fn test_workspace_root_default() {
        let config = Config::default();
        assert_eq!(config.workspace_root(), std::env::temp_dir());
    }
}
