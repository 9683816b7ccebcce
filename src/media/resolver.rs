//! Post URL resolution.

use std::fmt;

use crate::error::{Error, Result};

/// Path segments that mark a post link.
const POST_MARKERS: [&str; 2] = ["/p/", "/reel/"];

/// Short identifier of a post, as embedded in its URL.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Shortcode(String);

impl Shortcode {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Shortcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Shortcode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Extract the shortcode from a post or reel URL.
///
/// Drops the query string and fragment, then takes the last non-empty path
/// segment after the post marker. Host, scheme and case are left alone.
pub fn resolve(url: &str) -> Result<Shortcode> {
    let path = url.split(['?', '#']).next().unwrap_or_default();

    let after_marker = POST_MARKERS
        .iter()
        .filter_map(|marker| path.rfind(marker).map(|pos| pos + marker.len()))
        .max()
        .ok_or_else(|| Error::InvalidUrl(url.to_string()))?;

    let shortcode = path[after_marker..]
        .split('/')
        .rfind(|segment| !segment.is_empty())
        .ok_or_else(|| Error::InvalidUrl(url.to_string()))?;

    Ok(Shortcode(shortcode.to_string()))
}
