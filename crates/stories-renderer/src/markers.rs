//! Literal markers shared between the story editor's stored markup and the renderer.
//!
//! The editor writes these substrings when a story is saved. Their spelling is
//! a compatibility contract: changing any of them breaks rendering of stories
//! that are already stored.

/// Marks the start of the placeholder region inside `<head>`.
pub const HEAD_START: &str = r#"<meta name="web-stories-replace-head-start"/>"#;

/// Marks the end of the placeholder region inside `<head>`.
pub const HEAD_END: &str = r#"<meta name="web-stories-replace-head-end"/>"#;

/// Stand-in URL for the publisher logo, replaced at render time.
pub const PUBLISHER_LOGO_PLACEHOLDER: &str =
    "https://example.com/fallback-wordpress-publisher-logo.png";

/// Attribute of `<amp-story>` in front of which extra poster attributes go.
pub const POSTER_PORTRAIT_ANCHOR: &str = "poster-portrait-src=";

/// Poster kind already present in stored markup.
pub const POSTER_PORTRAIT_KIND: &str = "poster-portrait";

/// Closing tag of the story container.
pub const STORY_END: &str = "</amp-story>";

/// Opening body tag.
pub const BODY_START: &str = "<body>";

/// Closing body tag.
pub const BODY_END: &str = "</body>";

/// Source of the `amp-analytics` extension script.
pub const ANALYTICS_SCRIPT_URL: &str = "https://cdn.ampproject.org/v0/amp-analytics-0.1.js";

/// `type` of the script element carrying the analytics configuration.
pub const ANALYTICS_JSON_TYPE: &str = "application/json";
