//! Whole-post download logic.

use std::path::{Path, PathBuf};

use chrono::Utc;

use crate::api::InstagramApi;
use crate::download::media::download_to_file;
use crate::error::Result;
use crate::fs::post_basename;
use crate::media::ExtractionResult;

/// Profile name used when the owner is not reported.
const UNKNOWN_PROFILE: &str = "instagram";

/// Download every media item of a post into `target_dir`.
///
/// Files are named `{profile}_{shortcode}_{date}` with a `_{n}` suffix (from 1)
/// for carousel items. Videos are saved as `.mp4` without a thumbnail, images
/// as `.jpg`. A non-empty caption goes to `{base}.txt`. Items are fetched one
/// after another.
pub async fn download_post(
    api: &InstagramApi,
    post: &ExtractionResult,
    target_dir: &Path,
) -> Result<Vec<PathBuf>> {
    tokio::fs::create_dir_all(target_dir).await?;

    let profile = post.owner.as_deref().unwrap_or(UNKNOWN_PROFILE);
    let taken_at = post.taken_at.unwrap_or_else(|| {
        tracing::debug!("Post {} has no timestamp, using current time", post.shortcode);
        Utc::now()
    });
    let base = post_basename(profile, post.shortcode.as_str(), taken_at)?;

    tracing::info!(
        "Downloading post {}: {} item(s) as {}",
        post.shortcode,
        post.items.len(),
        base
    );

    let multi = post.items.len() > 1;
    let mut saved = Vec::with_capacity(post.items.len() + 1);

    for item in &post.items {
        let stem = if multi {
            format!("{}_{}", base, item.index + 1)
        } else {
            base.clone()
        };
        let output_path = target_dir.join(format!("{}.{}", stem, item.media_type.extension()));

        download_to_file(api, item.source_url(), &output_path).await?;
        tracing::debug!("Saved {}", output_path.display());
        saved.push(output_path);
    }

    if !post.raw_caption.is_empty() {
        let caption_path = target_dir.join(format!("{}.txt", base));
        tokio::fs::write(&caption_path, &post.raw_caption).await?;
        saved.push(caption_path);
    }

    Ok(saved)
}
