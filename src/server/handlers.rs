//! Route handlers.

use std::path::Path;

use axum::body::Body;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::http::header::{CONTENT_DISPOSITION, CONTENT_LENGTH, CONTENT_TYPE};
use axum::http::{HeaderMap, HeaderValue};
use axum::response::{Html, IntoResponse, Response};
use axum::Json;
use futures::StreamExt;
use serde::{Deserialize, Serialize};
use tokio_util::io::ReaderStream;

use crate::download::{download_one, download_post, relay, zip_directory};
use crate::fs::{archive_filename, content_disposition, Workspace};
use crate::media::{self, resolve, MediaItem};
use crate::server::error::ApiError;
use crate::server::AppState;

/// Front-end bundled into the binary.
const BUNDLED_FRONTEND: &str = include_str!("../../static/index.html");

#[derive(Debug, Deserialize)]
pub struct ProxyParams {
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PostRequest {
    #[serde(default)]
    url: String,
}

#[derive(Debug, Deserialize)]
pub struct DownloadRequest {
    #[serde(default)]
    url: String,
    #[serde(default)]
    shortcode: String,
    #[serde(default)]
    index: usize,
}

#[derive(Debug, Serialize)]
pub struct ExtractResponse {
    success: bool,
    post_id: String,
    caption: String,
    hashtags: Vec<String>,
    media_count: usize,
    media: Vec<MediaItem>,
}

/// GET / - the front-end page.
pub async fn index(State(state): State<AppState>) -> Html<String> {
    if let Some(path) = &state.frontend {
        match tokio::fs::read_to_string(path).await {
            Ok(page) => return Html(page),
            Err(e) => tracing::debug!("Front-end {} unavailable: {}", path.display(), e),
        }
    }
    Html(BUNDLED_FRONTEND.to_string())
}

/// GET /api/health
pub async fn health(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "authenticated": state.api.auth().is_authenticated(),
    }))
}

/// GET /api/proxy?url= - relay remote media byte for byte.
pub async fn proxy(
    State(state): State<AppState>,
    params: Result<Query<ProxyParams>, QueryRejection>,
) -> Result<Response, ApiError> {
    let Query(params) = params?;
    let url = params
        .url
        .filter(|u| !u.is_empty())
        .ok_or_else(|| ApiError::bad_request("Missing url parameter").plain())?;

    let upstream = relay(&state.api, &url)
        .await
        .map_err(|e| ApiError::from(e).plain())?;

    let content_type = HeaderValue::from_str(&upstream.content_type)
        .unwrap_or_else(|_| HeaderValue::from_static("application/octet-stream"));

    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, content_type);
    if let Some(len) = upstream.content_length {
        headers.insert(CONTENT_LENGTH, HeaderValue::from(len));
    }

    Ok((headers, Body::from_stream(upstream.stream)).into_response())
}

/// POST /api/extract - list a post's media.
pub async fn extract(
    State(state): State<AppState>,
    payload: Result<Json<PostRequest>, JsonRejection>,
) -> Result<Json<ExtractResponse>, ApiError> {
    let Json(request) = payload?;
    let shortcode = resolve(&request.url)?;

    let post = media::extract(&state.api, &shortcode)
        .await
        .map_err(|e| ApiError::context("Extraction failed", e))?;

    Ok(Json(ExtractResponse {
        success: true,
        post_id: post.shortcode.to_string(),
        caption: post.caption,
        hashtags: post.hashtags,
        media_count: post.items.len(),
        media: post.items,
    }))
}

/// POST /api/download - one media item as an attachment.
pub async fn download(
    State(state): State<AppState>,
    payload: Result<Json<DownloadRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(request) = payload?;
    if request.url.is_empty() || request.shortcode.is_empty() {
        return Err(ApiError::bad_request("Missing media url or shortcode"));
    }

    let workspace = Workspace::create(&state.workspace_root)
        .await
        .map_err(|e| ApiError::context("Download failed", e))?;

    let path = download_one(
        &state.api,
        &workspace,
        &request.url,
        &request.shortcode,
        request.index,
    )
    .await
    .map_err(|e| ApiError::context("Download failed", e))?;

    let filename = path
        .file_name()
        .and_then(|n| n.to_str())
        .map(str::to_string)
        .ok_or_else(|| ApiError::internal("Download failed: unnamed file"))?;

    attachment(workspace, &path, &filename).await
}

/// POST /api/download_all - every item of a post as a ZIP attachment.
pub async fn download_all(
    State(state): State<AppState>,
    payload: Result<Json<PostRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(request) = payload?;
    let shortcode = resolve(&request.url)?;

    let workspace = Workspace::create(&state.workspace_root)
        .await
        .map_err(|e| ApiError::context("Download failed", e))?;

    let post = media::extract(&state.api, &shortcode)
        .await
        .map_err(|e| ApiError::context("Download failed", e))?;

    let content_dir = workspace.join("content");
    download_post(&state.api, &post, &content_dir)
        .await
        .map_err(|e| ApiError::context("Download failed", e))?;

    let zip_path = workspace.join(&format!("{}_all.zip", shortcode));
    let bytes = zip_directory(&content_dir, &zip_path)
        .await
        .map_err(|e| ApiError::context("Download failed", e))?;
    tracing::info!("Packed post {} ({} bytes)", shortcode, bytes);

    let filename = archive_filename(shortcode.as_str())?;
    attachment(workspace, &zip_path, &filename).await
}

/// Stream `path` as an attachment named `filename`.
///
/// The workspace moves into the body and is removed once the body is
/// finished or dropped.
async fn attachment(workspace: Workspace, path: &Path, filename: &str) -> Result<Response, ApiError> {
    let file = tokio::fs::File::open(path)
        .await
        .map_err(|e| ApiError::internal(format!("Failed to open {}: {}", filename, e)))?;
    let len = file
        .metadata()
        .await
        .map_err(|e| ApiError::internal(format!("Failed to stat {}: {}", filename, e)))?
        .len();

    let content_type = mime_guess::from_path(filename)
        .first_or_octet_stream()
        .to_string();

    let mut headers = HeaderMap::new();
    headers.insert(
        CONTENT_TYPE,
        HeaderValue::from_str(&content_type)
            .map_err(|_| ApiError::internal("Invalid content type"))?,
    );
    headers.insert(CONTENT_LENGTH, HeaderValue::from(len));
    headers.insert(
        CONTENT_DISPOSITION,
        HeaderValue::from_str(&content_disposition(filename))
            .map_err(|_| ApiError::internal("Invalid attachment name"))?,
    );

    let stream = ReaderStream::new(file).map(move |chunk| {
        let _ = &workspace;
        chunk
    });

    Ok((headers, Body::from_stream(stream)).into_response())
}
