//! Instagram web API HTTP client.

use std::sync::Arc;

use reqwest::{header, Client, Response, StatusCode};

use crate::api::auth::{AuthContext, IG_APP_ID};
use crate::api::types::{GraphQlResponse, ShortcodeMedia};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::media::Shortcode;

/// Instagram API client carrying the process-wide auth context.
///
/// Cheap to clone; clones share the connection pool and the context.
#[derive(Clone)]
pub struct InstagramApi {
    client: Client,
    base_url: String,
    doc_id: String,
    user_agent: String,
    auth: Arc<AuthContext>,
}

impl InstagramApi {
    /// Create a new API client from configuration and an established context.
    pub fn new(config: &Config, auth: AuthContext) -> Result<Self> {
        let client = Client::builder()
            .user_agent(&config.instagram.user_agent)
            .connect_timeout(config.connect_timeout())
            .read_timeout(config.request_timeout())
            .build()
            .map_err(|e| Error::Api(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.instagram.base_url.trim_end_matches('/').to_string(),
            doc_id: config.instagram.doc_id.clone(),
            user_agent: config.instagram.user_agent.clone(),
            auth: Arc::new(auth),
        })
    }

    /// The auth context this client was built with.
    pub fn auth(&self) -> &AuthContext {
        &self.auth
    }

    /// Build common headers for API requests.
    fn build_headers(&self) -> header::HeaderMap {
        let mut headers = header::HeaderMap::new();

        headers.insert("x-ig-app-id", header::HeaderValue::from_static(IG_APP_ID));
        headers.insert(
            "x-requested-with",
            header::HeaderValue::from_static("XMLHttpRequest"),
        );
        headers.insert(header::ACCEPT, header::HeaderValue::from_static("*/*"));

        if let Ok(referer) = header::HeaderValue::from_str(&format!("{}/", self.base_url)) {
            headers.insert(header::REFERER, referer);
        }

        if let Some(cookies) = self.auth.cookie_header() {
            match header::HeaderValue::from_str(&cookies) {
                Ok(value) => {
                    headers.insert(header::COOKIE, value);
                }
                Err(e) => tracing::warn!("Session cookies are not a valid header: {}", e),
            }
        }

        if let Some(token) = self.auth.csrf_token() {
            if let Ok(value) = header::HeaderValue::from_str(token) {
                headers.insert("x-csrftoken", value);
            }
        }

        headers
    }

    /// Fetch post metadata by shortcode.
    pub async fn get_post(&self, shortcode: &Shortcode) -> Result<ShortcodeMedia> {
        let url = format!("{}/api/graphql", self.base_url);
        let variables = serde_json::json!({ "shortcode": shortcode.as_str() }).to_string();

        tracing::debug!("POST {} (shortcode {})", url, shortcode);

        let response = self
            .client
            .post(&url)
            .headers(self.build_headers())
            .form(&[
                ("doc_id", self.doc_id.as_str()),
                ("variables", variables.as_str()),
            ])
            .send()
            .await
            .map_err(|e| Error::Api(format!("GraphQL request failed: {}", e)))?;

        let status = response.status();
        tracing::debug!("Response status: {}", status);

        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(Error::RateLimited(status.as_u16()));
        }

        let text = response.text().await?;

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            tracing::error!("Auth error response: {}", truncate(&text, 300));
            return Err(Error::Authentication(format!(
                "HTTP {}: {}",
                status,
                upstream_message(&text).unwrap_or_else(|| "login required".to_string())
            )));
        }

        if status == StatusCode::NOT_FOUND {
            return Err(Error::PostNotFound(shortcode.to_string()));
        }

        if !status.is_success() {
            return Err(Error::Api(format!(
                "GraphQL HTTP {}: {}",
                status,
                upstream_message(&text).unwrap_or_else(|| truncate(&text, 200).to_string())
            )));
        }

        let api_response: GraphQlResponse = serde_json::from_str(&text).map_err(|e| {
            Error::Api(format!(
                "Failed to parse post: {} - Response: {}",
                e,
                truncate(&text, 500)
            ))
        })?;

        if let Some(message) = api_response.message.as_deref() {
            if message.contains("login_required") || message.contains("checkpoint_required") {
                return Err(Error::Authentication(message.to_string()));
            }
        }

        match api_response.data.and_then(|data| data.into_media()) {
            Some(media) => Ok(media),
            None => match api_response.message {
                Some(message) if api_response.status.as_deref() == Some("fail") => {
                    Err(Error::Api(message))
                }
                _ => Err(Error::PostNotFound(shortcode.to_string())),
            },
        }
    }

    /// Open a media resource for streaming (used by downloads).
    pub async fn download_file(&self, url: &str) -> Result<Response> {
        let response = self
            .client
            .get(url)
            .header(header::USER_AGENT, &self.user_agent)
            .send()
            .await
            .map_err(|e| Error::Download(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Error::Download(format!(
                "Failed to download file: HTTP {}",
                response.status()
            )));
        }

        Ok(response)
    }

    /// Open a remote resource for relaying (used by the preview proxy).
    pub async fn open_relay(&self, url: &str) -> Result<Response> {
        let response = self
            .client
            .get(url)
            .header(header::USER_AGENT, &self.user_agent)
            .send()
            .await
            .map_err(|e| Error::Proxy(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Proxy(format!("HTTP {} for url: {}", status, url)));
        }

        Ok(response)
    }
}

/// Pull a human-readable message out of an upstream JSON error body.
fn upstream_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    value
        .get("message")
        .and_then(|m| m.as_str())
        .map(str::to_string)
}

/// Truncate a string to at most `max` bytes on a char boundary.
fn truncate(text: &str, max: usize) -> &str {
    if text.len() <= max {
        return text;
    }
    let mut end = max;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}
