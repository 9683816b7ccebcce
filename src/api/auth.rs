//! Session bootstrapping for the Instagram web API.
//!
//! At startup the service walks an ordered chain of login strategies and keeps
//! the first session that works. A failed chain is not fatal: the service
//! runs with an anonymous context and upstream requests may be rate limited
//! or return partial data.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use reqwest::cookie::{CookieStore, Jar};
use reqwest::{header, Client};
use serde::Deserialize;
use url::Url;

use crate::config::Config;
use crate::error::{Error, Result};

/// Name of the session cookie that marks a logged-in context.
const SESSION_COOKIE: &str = "sessionid";

/// Name of the anti-CSRF cookie mirrored into `X-CSRFToken`.
const CSRF_COOKIE: &str = "csrftoken";

/// Instagram web app ID sent with API requests.
pub const IG_APP_ID: &str = "936619743392459";

/// Authenticated (or anonymous) context shared read-only by all requests.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthContext {
    username: Option<String>,
    cookies: BTreeMap<String, String>,
}

impl AuthContext {
    /// Context with no session; only unauthenticated fetches are possible.
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// Build a context from session cookies.
    pub fn from_cookies(username: Option<String>, cookies: BTreeMap<String, String>) -> Result<Self> {
        match cookies.get(SESSION_COOKIE) {
            Some(value) if !value.is_empty() => Ok(Self { username, cookies }),
            _ => Err(Error::Login(format!("no '{}' cookie in session", SESSION_COOKIE))),
        }
    }

    /// Whether the context carries a session.
    pub fn is_authenticated(&self) -> bool {
        self.cookies.contains_key(SESSION_COOKIE)
    }

    /// Account the session belongs to, if known.
    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    /// CSRF token to echo in `X-CSRFToken`.
    pub fn csrf_token(&self) -> Option<&str> {
        self.cookies.get(CSRF_COOKIE).map(String::as_str)
    }

    /// Render the session cookies as a `Cookie` header value.
    pub fn cookie_header(&self) -> Option<String> {
        if self.cookies.is_empty() {
            return None;
        }

        Some(
            self.cookies
                .iter()
                .map(|(name, value)| format!("{}={}", name, value))
                .collect::<Vec<_>>()
                .join("; "),
        )
    }
}

/// One way of obtaining a session.
#[async_trait]
pub trait LoginStrategy: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Try to obtain a session. Called once at startup.
    async fn attempt(&self) -> Result<AuthContext>;
}

/// On-disk session format: cookie name to value, plus an optional username.
#[derive(Debug, Deserialize)]
struct SessionFile {
    #[serde(default)]
    username: Option<String>,
    #[serde(flatten)]
    cookies: BTreeMap<String, serde_json::Value>,
}

/// Load a session file into a context.
pub fn load_session_file(path: &Path) -> Result<AuthContext> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            Error::Login(format!("session file not found: {}", path.display()))
        } else {
            Error::Io(e)
        }
    })?;

    let session: SessionFile = serde_json::from_str(&content)
        .map_err(|e| Error::Login(format!("malformed session file {}: {}", path.display(), e)))?;

    // Only string values are cookies
    let cookies = session
        .cookies
        .into_iter()
        .filter_map(|(name, value)| match value {
            serde_json::Value::String(s) => Some((name, s)),
            _ => None,
        })
        .collect();

    AuthContext::from_cookies(session.username, cookies)
}

/// Session file provisioned alongside the deployment.
pub struct SessionFileLogin {
    path: PathBuf,
}

impl SessionFileLogin {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

#[async_trait]
impl LoginStrategy for SessionFileLogin {
    fn name(&self) -> &'static str {
        "session file"
    }

    async fn attempt(&self) -> Result<AuthContext> {
        load_session_file(&self.path)
    }
}

/// Session stored by the hosting platform as a secret file.
pub struct SecretFileLogin {
    path: PathBuf,
}

impl SecretFileLogin {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

#[async_trait]
impl LoginStrategy for SecretFileLogin {
    fn name(&self) -> &'static str {
        "secret file"
    }

    async fn attempt(&self) -> Result<AuthContext> {
        load_session_file(&self.path)
    }
}

/// Login reply from the web login endpoint.
#[derive(Debug, Deserialize)]
struct LoginResponse {
    #[serde(default)]
    authenticated: bool,
    #[serde(default)]
    user: bool,
    #[serde(default)]
    two_factor_required: bool,
    #[serde(default)]
    message: Option<String>,
}

/// Username/password login through the web login endpoint.
pub struct CredentialLogin {
    base_url: String,
    user_agent: String,
    username: String,
    password: String,
    connect_timeout: Duration,
    request_timeout: Duration,
}

impl CredentialLogin {
    pub fn new(base_url: String, user_agent: String, username: String, password: String) -> Self {
        Self {
            base_url,
            user_agent,
            username,
            password,
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
        }
    }

    /// Bound each login request. A stalled upstream fails the attempt instead
    /// of holding up startup.
    pub fn with_timeouts(mut self, connect: Duration, request: Duration) -> Self {
        self.connect_timeout = connect;
        self.request_timeout = request;
        self
    }
}

/// Wrap a password in the browser login envelope.
pub fn encrypt_password_envelope(password: &str, timestamp: u64) -> String {
    format!("#PWD_INSTAGRAM_BROWSER:0:{}:{}", timestamp, password)
}

#[async_trait]
impl LoginStrategy for CredentialLogin {
    fn name(&self) -> &'static str {
        "credentials"
    }

    async fn attempt(&self) -> Result<AuthContext> {
        let base = Url::parse(&self.base_url)?;
        let jar = Arc::new(Jar::default());
        let client = Client::builder()
            .user_agent(&self.user_agent)
            .cookie_provider(jar.clone())
            .connect_timeout(self.connect_timeout)
            .timeout(self.request_timeout)
            .build()
            .map_err(|e| Error::Login(format!("Failed to create HTTP client: {}", e)))?;

        // Landing page hands out the csrftoken cookie
        let landing = client.get(base.clone()).send().await?;
        tracing::debug!("Login landing page status: {}", landing.status());

        let csrf_token = cookie_value(&jar, &base, CSRF_COOKIE).unwrap_or_default();

        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default();
        let enc_password = encrypt_password_envelope(&self.password, timestamp);

        let login_url = base.join("/api/v1/web/accounts/login/ajax/")?;
        let response = client
            .post(login_url)
            .header("X-CSRFToken", &csrf_token)
            .header("X-IG-App-ID", IG_APP_ID)
            .header("X-Requested-With", "XMLHttpRequest")
            .header(header::REFERER, base.as_str())
            .form(&[
                ("username", self.username.as_str()),
                ("enc_password", enc_password.as_str()),
                ("queryParams", "{}"),
                ("optIntoOneTap", "false"),
            ])
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        tracing::debug!("Login response status: {}", status);

        let reply: LoginResponse = serde_json::from_str(&text).map_err(|e| {
            Error::Login(format!(
                "unexpected login response (HTTP {}): {}",
                status, e
            ))
        })?;

        if reply.two_factor_required {
            return Err(Error::Login("two-factor authentication required".into()));
        }

        if !reply.authenticated {
            let detail = reply.message.unwrap_or_else(|| {
                if reply.user {
                    "wrong password".to_string()
                } else {
                    "user does not exist".to_string()
                }
            });
            return Err(Error::Login(detail));
        }

        let cookies = all_cookies(&jar, &base);
        AuthContext::from_cookies(Some(self.username.clone()), cookies)
    }
}

/// Read every cookie the jar would send to `url`.
fn all_cookies(jar: &Jar, url: &Url) -> BTreeMap<String, String> {
    let Some(header) = jar.cookies(url) else {
        return BTreeMap::new();
    };

    header
        .to_str()
        .unwrap_or_default()
        .split(';')
        .filter_map(|pair| {
            let (name, value) = pair.trim().split_once('=')?;
            Some((name.to_string(), value.to_string()))
        })
        .collect()
}

fn cookie_value(jar: &Jar, url: &Url, name: &str) -> Option<String> {
    all_cookies(jar, url).remove(name)
}

/// Usernames left over from a config template.
fn is_placeholder_username(username: &str) -> bool {
    matches!(
        username.to_lowercase().as_str(),
        "replaceme" | "username" | "your_username"
    )
}

/// Ordered chain of login strategies; first success wins.
pub struct SessionProvider {
    strategies: Vec<Box<dyn LoginStrategy>>,
}

impl SessionProvider {
    pub fn new(strategies: Vec<Box<dyn LoginStrategy>>) -> Self {
        Self { strategies }
    }

    /// Build the chain from configuration: session file, secret file, credentials.
    pub fn from_config(config: &Config) -> Self {
        let mut strategies: Vec<Box<dyn LoginStrategy>> = Vec::new();

        if let Some(path) = config.session_file() {
            strategies.push(Box::new(SessionFileLogin::new(path)));
        }

        strategies.push(Box::new(SecretFileLogin::new(
            config.instagram.secret_file.clone(),
        )));

        let username = config
            .instagram
            .username
            .as_deref()
            .map(|u| u.trim().trim_start_matches('@'))
            .filter(|u| !u.is_empty());
        let password = config.instagram.password.as_deref().filter(|p| !p.is_empty());

        match (username, password) {
            (Some(username), Some(_)) if is_placeholder_username(username) => {
                tracing::warn!(
                    "Username '{}' looks like a template placeholder, skipping credential login",
                    username
                );
            }
            (Some(username), Some(password)) => {
                strategies.push(Box::new(
                    CredentialLogin::new(
                        config.instagram.base_url.clone(),
                        config.instagram.user_agent.clone(),
                        username.to_string(),
                        password.to_string(),
                    )
                    .with_timeouts(config.connect_timeout(), config.request_timeout()),
                ));
            }
            (None, Some(_)) => {
                tracing::warn!("Password given without a username, skipping credential login");
            }
            _ => {}
        }

        Self::new(strategies)
    }

    /// Names of the configured strategies, in order.
    pub fn strategy_names(&self) -> Vec<&'static str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    /// Run the chain once. Never fails; falls back to an anonymous context.
    pub async fn establish(&self) -> AuthContext {
        for strategy in &self.strategies {
            tracing::info!("Trying login via {}", strategy.name());
            match strategy.attempt().await {
                Ok(context) => {
                    tracing::info!(
                        "Logged in via {} as {}",
                        strategy.name(),
                        context.username().unwrap_or("<unknown>")
                    );
                    return context;
                }
                Err(e) => {
                    tracing::warn!("Login via {} failed: {}", strategy.name(), e);
                }
            }
        }

        tracing::warn!("No login strategy succeeded, continuing without a session");
        AuthContext::anonymous()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn session_file(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{}", content).unwrap();
        file
    }

    struct Failing;

    #[async_trait]
    impl LoginStrategy for Failing {
        fn name(&self) -> &'static str {
            "failing"
        }

        async fn attempt(&self) -> Result<AuthContext> {
            Err(Error::Login("nope".into()))
        }
    }

    struct Fixed(&'static str);

    #[async_trait]
    impl LoginStrategy for Fixed {
        fn name(&self) -> &'static str {
            self.0
        }

        async fn attempt(&self) -> Result<AuthContext> {
            let mut cookies = BTreeMap::new();
            cookies.insert("sessionid".to_string(), self.0.to_string());
            AuthContext::from_cookies(Some(self.0.to_string()), cookies)
        }
    }

    #[test]
    fn test_anonymous_context() {
        let ctx = AuthContext::anonymous();
        assert!(!ctx.is_authenticated());
        assert_eq!(ctx.cookie_header(), None);
        assert_eq!(ctx.csrf_token(), None);
    }

    #[test]
    fn test_load_session_file() {
        let file = session_file(
            r#"{"username": "someone", "sessionid": "abc", "csrftoken": "tok", "ds_user_id": "42", "extra": 1}"#,
        );
        let ctx = load_session_file(file.path()).unwrap();

        assert!(ctx.is_authenticated());
        assert_eq!(ctx.username(), Some("someone"));
        assert_eq!(ctx.csrf_token(), Some("tok"));
        assert_eq!(
            ctx.cookie_header().unwrap(),
            "csrftoken=tok; ds_user_id=42; sessionid=abc"
        );
    }

    #[test]
    fn test_session_file_without_sessionid() {
        let file = session_file(r#"{"csrftoken": "tok"}"#);
        assert!(matches!(
            load_session_file(file.path()),
            Err(Error::Login(_))
        ));
    }

    #[test]
    fn test_session_file_malformed() {
        let file = session_file("not json");
        assert!(matches!(
            load_session_file(file.path()),
            Err(Error::Login(_))
        ));
    }

    #[test]
    fn test_session_file_missing() {
        assert!(matches!(
            load_session_file(Path::new("/nonexistent/session")),
            Err(Error::Login(_))
        ));
    }

    #[test]
    fn test_password_envelope() {
        assert_eq!(
            encrypt_password_envelope("hunter2", 1700000000),
            "#PWD_INSTAGRAM_BROWSER:0:1700000000:hunter2"
        );
    }

    #[tokio::test]
    async fn test_first_success_wins() {
        let provider = SessionProvider::new(vec![
            Box::new(Failing),
            Box::new(Fixed("second")),
            Box::new(Fixed("third")),
        ]);

        let ctx = provider.establish().await;
        assert_eq!(ctx.username(), Some("second"));
    }

    #[tokio::test]
    async fn test_all_failures_fall_back_to_anonymous() {
        let provider = SessionProvider::new(vec![Box::new(Failing), Box::new(Failing)]);
        let ctx = provider.establish().await;
        assert_eq!(ctx, AuthContext::anonymous());
    }

    #[tokio::test]
    async fn test_empty_chain_is_anonymous() {
        let ctx = SessionProvider::new(Vec::new()).establish().await;
        assert!(!ctx.is_authenticated());
    }

    #[test]
    fn test_chain_order_from_config() {
        let mut config = Config::default();
        config.instagram.session_file = Some(PathBuf::from("/srv/session"));
        config.instagram.username = Some("someone".into());
        config.instagram.password = Some("secret".into());

        let provider = SessionProvider::from_config(&config);
        assert_eq!(
            provider.strategy_names(),
            vec!["session file", "secret file", "credentials"]
        );
    }

    #[test]
    fn test_chain_skips_placeholder_username() {
        let mut config = Config::default();
        config.instagram.username = Some("your_username".into());
        config.instagram.password = Some("secret".into());

        let provider = SessionProvider::from_config(&config);
        assert!(!provider.strategy_names().contains(&"credentials"));
    }

    #[test]
    fn test_chain_accepts_email_login() {
        let mut config = Config::default();
        config.instagram.username = Some("someone@example.com".into());
        config.instagram.password = Some("secret".into());

        let provider = SessionProvider::from_config(&config);
        assert_eq!(provider.strategy_names().last(), Some(&"credentials"));
    }

    #[test]
    fn test_chain_skips_password_without_username() {
        let mut config = Config::default();
        config.instagram.password = Some("secret".into());

        let provider = SessionProvider::from_config(&config);
        assert_eq!(provider.strategy_names(), vec!["secret file"]);
    }

    #[test]
    fn test_chain_without_credentials() {
        let provider = SessionProvider::from_config(&Config::default());
        assert_eq!(provider.strategy_names(), vec!["secret file"]);
    }

    #[tokio::test]
    async fn test_credential_login_success() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(
                ResponseTemplate::new(200).insert_header("Set-Cookie", "csrftoken=tok; Path=/"),
            )
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(path("/api/v1/web/accounts/login/ajax/"))
            .and(body_string_contains("username=someone"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("Set-Cookie", "sessionid=sess; Path=/")
                    .set_body_string(r#"{"authenticated": true, "user": true, "status": "ok"}"#),
            )
            .mount(&server)
            .await;

        let login = CredentialLogin::new(
            server.uri(),
            "test-agent".into(),
            "someone".into(),
            "secret".into(),
        );
        let ctx = login.attempt().await.unwrap();

        assert!(ctx.is_authenticated());
        assert_eq!(ctx.username(), Some("someone"));
        assert_eq!(ctx.csrf_token(), Some("tok"));
    }

    #[tokio::test]
    async fn test_credential_login_wrong_password() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(path("/api/v1/web/accounts/login/ajax/"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(r#"{"authenticated": false, "user": true, "status": "ok"}"#),
            )
            .mount(&server)
            .await;

        let login = CredentialLogin::new(
            server.uri(),
            "test-agent".into(),
            "someone".into(),
            "wrong".into(),
        );
        let err = login.attempt().await.unwrap_err();
        assert!(err.to_string().contains("wrong password"));
    }

    #[tokio::test]
    async fn test_credential_login_times_out_on_stalled_upstream() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(30)))
            .mount(&server)
            .await;

        let login = CredentialLogin::new(
            server.uri(),
            "test-agent".into(),
            "someone".into(),
            "secret".into(),
        )
        .with_timeouts(Duration::from_millis(200), Duration::from_millis(300));

        let outcome = tokio::time::timeout(Duration::from_secs(10), login.attempt()).await;
        assert!(matches!(outcome, Ok(Err(_))));
    }

    #[tokio::test]
    async fn test_stalled_login_falls_back_to_anonymous() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(30)))
            .mount(&server)
            .await;

        let mut config = Config::default();
        config.instagram.base_url = server.uri();
        config.instagram.secret_file = PathBuf::from("/nonexistent/secret");
        config.instagram.username = Some("someone".into());
        config.instagram.password = Some("secret".into());
        config.options.request_timeout_secs = 1;
        config.options.connect_timeout_secs = 1;

        let provider = SessionProvider::from_config(&config);
        let ctx = tokio::time::timeout(Duration::from_secs(15), provider.establish())
            .await
            .unwrap();
        assert!(!ctx.is_authenticated());
    }
}
