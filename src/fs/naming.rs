//! Filename generation and validation.

use chrono::{DateTime, Utc};

use crate::error::{Error, Result};

/// Date format used in whole-post file names.
const POST_DATE_FORMAT: &str = "%Y-%m-%d_%H-%M-%S";

/// Validate and sanitize a filename by removing or replacing invalid characters.
///
/// Returns an error if the filename contains path traversal patterns.
pub fn sanitize_filename(name: &str) -> Result<String> {
    // Reject path traversal attempts
    if name.contains("..") {
        return Err(Error::InvalidFilename(format!(
            "Path traversal detected: '{}'",
            name
        )));
    }

    if name.contains('/') || name.contains('\\') {
        return Err(Error::InvalidFilename(format!(
            "Path separators not allowed in filename: '{}'",
            name
        )));
    }

    if name.contains('\0') {
        return Err(Error::InvalidFilename(format!(
            "Null bytes not allowed in filename: '{}'",
            name
        )));
    }

    // Sanitize remaining problematic characters
    let sanitized: String = name
        .chars()
        .map(|c| match c {
            ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();

    if sanitized.trim().is_empty() {
        return Err(Error::InvalidFilename(
            "Filename cannot be empty or whitespace-only".to_string(),
        ));
    }

    Ok(sanitized)
}

/// Sanitize a path component with less strict validation.
///
/// Used for profile names, where separators are replaced rather than rejected.
pub fn sanitize_path_component(name: &str) -> Result<String> {
    if name.contains("..") {
        return Err(Error::InvalidFilename(format!(
            "Path traversal detected: '{}'",
            name
        )));
    }

    if name.contains('\0') {
        return Err(Error::InvalidFilename(format!(
            "Null bytes not allowed: '{}'",
            name
        )));
    }

    let sanitized: String = name
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();

    if sanitized.trim().is_empty() {
        return Err(Error::InvalidFilename(
            "Path component cannot be empty or whitespace-only".to_string(),
        ));
    }

    Ok(sanitized)
}

/// Attachment name for a single media item: `instagram_{shortcode}_{n}.{ext}`.
///
/// `index` is zero-based; the name is one-based.
pub fn media_filename(shortcode: &str, index: usize, extension: &str) -> Result<String> {
    let number = index
        .checked_add(1)
        .ok_or_else(|| Error::InvalidFilename(format!("Media index {} is out of range", index)))?;

    sanitize_filename(&format!(
        "instagram_{}_{}.{}",
        shortcode, number, extension
    ))
}

/// Attachment name for a whole-post archive.
pub fn archive_filename(shortcode: &str) -> Result<String> {
    sanitize_filename(&format!("instagram_{}.zip", shortcode))
}

/// Base name for whole-post files: `{profile}_{shortcode}_{date}`.
pub fn post_basename(profile: &str, shortcode: &str, taken_at: DateTime<Utc>) -> Result<String> {
    let profile = sanitize_path_component(profile)?;
    sanitize_filename(&format!(
        "{}_{}_{}",
        profile,
        shortcode,
        taken_at.format(POST_DATE_FORMAT)
    ))
}

/// `Content-Disposition` value for an attachment.
pub fn content_disposition(filename: &str) -> String {
    let ascii: String = filename
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();

    if ascii == filename {
        format!("attachment; filename=\"{}\"", filename)
    } else {
        format!(
            "attachment; filename=\"{}\"; filename*=UTF-8''{}",
            ascii,
            urlencoding::encode(filename)
        )
    }
}
