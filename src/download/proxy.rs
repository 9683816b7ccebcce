//! Streaming relay of remote media for client-side previews.

use bytes::Bytes;
use futures::stream::BoxStream;
use futures::{StreamExt, TryStreamExt};
use reqwest::header::CONTENT_TYPE;

use crate::api::InstagramApi;
use crate::error::{Error, Result};

/// Content type used when upstream does not send one.
const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

/// An open upstream response, consumed chunk by chunk.
pub struct Relay {
    pub content_type: String,
    pub content_length: Option<u64>,
    pub stream: BoxStream<'static, Result<Bytes>>,
}

/// Open a relay to `raw_url` after one more round of percent-decoding.
///
/// The body is not read here; it is pulled lazily by whoever consumes
/// `stream`, so large videos never sit in memory.
pub async fn relay(api: &InstagramApi, raw_url: &str) -> Result<Relay> {
    let url = urlencoding::decode(raw_url)
        .map_err(|e| Error::Proxy(format!("invalid percent-encoding: {}", e)))?
        .into_owned();

    tracing::debug!("Relaying {}", url);

    let response = api.open_relay(&url).await?;

    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or(FALLBACK_CONTENT_TYPE)
        .to_string();
    let content_length = response.content_length();

    let stream = response
        .bytes_stream()
        .map_err(|e| Error::Proxy(format!("stream error: {}", e)))
        .boxed();

    Ok(Relay {
        content_type,
        content_length,
        stream,
    })
}
