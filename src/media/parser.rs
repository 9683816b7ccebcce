//! Media parsing utilities.

use std::sync::LazyLock;

use chrono::DateTime;
use regex::Regex;

use crate::api::types::ShortcodeMedia;
use crate::api::InstagramApi;
use crate::error::Result;
use crate::media::item::{ExtractionResult, MediaItem, MediaType};
use crate::media::resolver::Shortcode;

/// Fetch a post and build its extraction result.
pub async fn extract(api: &InstagramApi, shortcode: &Shortcode) -> Result<ExtractionResult> {
    let media = api.get_post(shortcode).await?;
    let result = build_extraction(shortcode.clone(), &media);

    tracing::info!(
        "Extracted {} media item(s) from post {}",
        result.items.len(),
        shortcode
    );

    Ok(result)
}

/// Build an extraction result from a post's metadata.
pub fn build_extraction(shortcode: Shortcode, media: &ShortcodeMedia) -> ExtractionResult {
    let nodes: Vec<&ShortcodeMedia> = match &media.edge_sidecar_to_children {
        Some(children) if media.is_sidecar() => {
            children.edges.iter().map(|edge| &edge.node).collect()
        }
        _ => vec![media],
    };

    let items = nodes
        .into_iter()
        .enumerate()
        .map(|(index, node)| parse_node(index, node))
        .collect();

    let raw_caption = media.caption().unwrap_or_default().to_string();
    let hashtags = extract_hashtags(&raw_caption);
    let caption = strip_hashtags(&raw_caption, &hashtags);

    ExtractionResult {
        shortcode,
        caption,
        raw_caption,
        hashtags,
        items,
        owner: media.owner.as_ref().and_then(|o| o.username.clone()),
        taken_at: media
            .taken_at_timestamp
            .and_then(|ts| DateTime::from_timestamp(ts, 0)),
    }
}

/// Turn one node into a media item.
fn parse_node(index: usize, node: &ShortcodeMedia) -> MediaItem {
    let item = MediaItem::image(index, node.display_url.clone());

    match (&node.video_url, node.is_video) {
        (Some(video_url), true) => item.into_video(video_url.clone()),
        (None, true) => {
            tracing::warn!("Video node {} has no video URL", index);
            MediaItem {
                media_type: MediaType::Video,
                ..item
            }
        }
        _ => item,
    }
}

/// Longest hashtag Instagram reports.
const MAX_HASHTAG_CHARS: usize = 150;

static HASHTAG_PATTERN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"#(\w+)").unwrap());

/// Collect hashtags from a caption, in order of appearance.
///
/// Matching runs on the lower-cased caption, so tags come back lower case
/// the way Instagram's own clients report them. Longer runs of word
/// characters keep only their first 150. Duplicates are kept.
pub fn extract_hashtags(caption: &str) -> Vec<String> {
    let lowered = caption.to_lowercase();

    HASHTAG_PATTERN
        .captures_iter(&lowered)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().chars().take(MAX_HASHTAG_CHARS).collect())
        .collect()
}

/// Remove every `#tag` from the caption, one hashtag at a time.
///
/// Each pass removes all occurrences of `#` + tag and trims the ends. Tags
/// sharing a prefix (`#cat` and `#category`) interfere with each other
/// depending on their order.
pub fn strip_hashtags(caption: &str, hashtags: &[String]) -> String {
    let mut stripped = caption.to_string();
    for tag in hashtags {
        stripped = stripped.replace(&format!("#{}", tag), "").trim().to_string();
    }
    stripped
}

/// File extension for a media URL: `mp4` if the path ends in `.mp4`.
pub fn extension_for_url(url: &str) -> &'static str {
    let path = url.split(['?', '#']).next().unwrap_or_default();
    if path.ends_with(".mp4") {
        MediaType::Video.extension()
    } else {
        MediaType::Image.extension()
    }
}
