//! Media item representation.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::media::resolver::Shortcode;

/// Type of media content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Image,
    Video,
}

impl MediaType {
    /// File extension used when saving this media type.
    pub fn extension(&self) -> &'static str {
        match self {
            MediaType::Image => "jpg",
            MediaType::Video => "mp4",
        }
    }
}

/// One media entry of a post, in the post's native order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MediaItem {
    /// Image or video.
    #[serde(rename = "type")]
    pub media_type: MediaType,

    /// Display image URL, used for previews.
    #[serde(rename = "url")]
    pub preview_url: String,

    /// Position within the post, starting at 0.
    pub index: usize,

    /// Video resource URL (videos only).
    #[serde(rename = "video_url", skip_serializing_if = "Option::is_none")]
    pub download_url: Option<String>,
}

impl MediaItem {
    /// Create an image item.
    pub fn image(index: usize, preview_url: String) -> Self {
        Self {
            media_type: MediaType::Image,
            preview_url,
            index,
            download_url: None,
        }
    }

    /// Turn this item into a video with the given resource URL.
    pub fn into_video(mut self, video_url: String) -> Self {
        self.media_type = MediaType::Video;
        self.download_url = Some(video_url);
        self
    }

    /// URL of the full-quality resource to save.
    pub fn source_url(&self) -> &str {
        self.download_url.as_deref().unwrap_or(&self.preview_url)
    }
}

/// Everything extracted from one post.
#[derive(Debug, Clone)]
pub struct ExtractionResult {
    pub shortcode: Shortcode,

    /// Caption with hashtags stripped.
    pub caption: String,

    /// Raw caption as posted.
    pub raw_caption: String,

    /// Hashtags in order of appearance.
    pub hashtags: Vec<String>,

    pub items: Vec<MediaItem>,

    /// Owner username, when reported.
    pub owner: Option<String>,

    /// Post time, when reported.
    pub taken_at: Option<DateTime<Utc>>,
}
