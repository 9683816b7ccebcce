//! Media module for URL resolution, item representation and parsing.

pub mod item;
pub mod parser;
pub mod resolver;

pub use item::{ExtractionResult, MediaItem, MediaType};
pub use parser::{build_extraction, extension_for_url, extract, extract_hashtags, strip_hashtags};
pub use resolver::{resolve, Shortcode};
