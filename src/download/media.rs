//! Media file downloading.

use std::path::{Path, PathBuf};

use futures::StreamExt;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;

use crate::api::InstagramApi;
use crate::error::{Error, Result};
use crate::fs::{media_filename, Workspace};
use crate::media::extension_for_url;

/// Download one media item into the workspace.
///
/// The file is named `instagram_{shortcode}_{index + 1}.{jpg|mp4}`.
pub async fn download_one(
    api: &InstagramApi,
    workspace: &Workspace,
    media_url: &str,
    shortcode: &str,
    index: usize,
) -> Result<PathBuf> {
    let filename = media_filename(shortcode, index, extension_for_url(media_url))?;
    let output_path = workspace.join(&filename);

    let bytes = download_to_file(api, media_url, &output_path).await?;
    tracing::info!("Downloaded {} ({} bytes)", filename, bytes);

    Ok(output_path)
}

/// Stream a URL into a file, chunk by chunk. Returns the byte count.
pub async fn download_to_file(api: &InstagramApi, url: &str, output_path: &Path) -> Result<u64> {
    let response = api.download_file(url).await?;

    let mut file = File::create(output_path).await?;
    let mut stream = response.bytes_stream();
    let mut downloaded: u64 = 0;

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|e| Error::Download(format!("Stream error: {}", e)))?;
        file.write_all(&chunk).await?;
        downloaded += chunk.len() as u64;
    }

    file.flush().await?;

    Ok(downloaded)
}
