//! Command-line argument definitions using clap.

use clap::Parser;
use std::path::PathBuf;

use crate::config::Config;

/// Instagram media downloader service.
#[derive(Parser, Debug)]
#[command(
    name = "instagram-downloader",
    version,
    about = "Extract and download media from Instagram posts over HTTP",
    long_about = "An HTTP service that extracts photos and videos from Instagram posts,\n\
                  relays them for preview and packages them as downloads or ZIP archives."
)]
pub struct Args {
    /// Path to configuration file.
    #[arg(short, long, default_value = "config.toml")]
    pub config: PathBuf,

    /// Socket address to listen on.
    #[arg(short, long, env = "BIND_ADDRESS")]
    pub bind: Option<String>,

    /// Port to listen on (keeps the configured host).
    #[arg(short, long, env = "PORT")]
    pub port: Option<u16>,

    /// Instagram username.
    #[arg(short, long, env = "INSTAGRAM_USERNAME")]
    pub username: Option<String>,

    /// Instagram password.
    #[arg(long, env = "INSTAGRAM_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Pre-provisioned session file.
    #[arg(short, long = "session-file", env = "INSTAGRAM_SESSION_FILE")]
    pub session_file: Option<PathBuf>,

    /// Platform-managed secret file holding a session.
    #[arg(long = "secret-file", env = "INSTAGRAM_SECRET_FILE")]
    pub secret_file: Option<PathBuf>,

    /// Front-end document served at `/`.
    #[arg(long)]
    pub frontend: Option<PathBuf>,

    /// Upstream read timeout in seconds.
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Enable debug logging.
    #[arg(long)]
    pub debug: bool,
}

impl Args {
    /// Merge CLI arguments into an existing config, overriding where specified.
    pub fn merge_into_config(self, config: &mut Config) {
        if let Some(bind) = self.bind {
            config.server.bind = bind;
        }

        // Platforms hand out only a port; keep whatever host was configured
        if let Some(port) = self.port {
            config.server.bind = replace_port(&config.server.bind, port);
        }

        if let Some(username) = self.username {
            config.instagram.username = Some(username);
        }

        if let Some(password) = self.password {
            config.instagram.password = Some(password);
        }

        if let Some(session_file) = self.session_file {
            config.instagram.session_file = Some(session_file);
        }

        if let Some(secret_file) = self.secret_file {
            config.instagram.secret_file = secret_file;
        }

        if let Some(frontend) = self.frontend {
            config.server.frontend = Some(frontend);
        }

        if let Some(timeout) = self.timeout {
            config.options.request_timeout_secs = timeout;
        }
    }
}

/// Replace the port of a `host:port` bind string.
fn replace_port(bind: &str, port: u16) -> String {
    match bind.rsplit_once(':') {
        Some((host, _)) => format!("{}:{}", host, port),
        None => format!("{}:{}", bind, port),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_overrides() {
        let args = Args::parse_from([
            "instagram-downloader",
            "--username",
            "someone",
            "--port",
            "10000",
            "--timeout",
            "45",
        ]);

        let mut config = Config::default();
        args.merge_into_config(&mut config);

        assert_eq!(config.instagram.username.as_deref(), Some("someone"));
        assert_eq!(config.server.bind, "0.0.0.0:10000");
        assert_eq!(config.options.request_timeout_secs, 45);
    }

    #[test]
    fn test_merge_keeps_config_values() {
        let args = Args::parse_from(["instagram-downloader", "--config", "other.toml"]);
        let mut config = Config::default();
        config.instagram.username = Some("from_file".into());
        args.merge_into_config(&mut config);

        assert_eq!(config.instagram.username.as_deref(), Some("from_file"));
        assert_eq!(config.server.bind, "0.0.0.0:5000");
    }

    #[test]
    fn test_replace_port() {
        assert_eq!(replace_port("127.0.0.1:5000", 8080), "127.0.0.1:8080");
        assert_eq!(replace_port("[::1]:5000", 8080), "[::1]:8080");
        assert_eq!(replace_port("0.0.0.0", 80), "0.0.0.0:80");
    }
}
