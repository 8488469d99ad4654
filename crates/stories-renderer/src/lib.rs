//! Server-side renderer for stored AMP stories.
//!
//! Stories are stored as complete HTML documents carrying a few literal
//! [`markers`]. At request time [`StoryRenderer`] turns that markup into the
//! page served to visitors: it adds language attributes to `<html>`, injects
//! analytics, generates the `<head>` region, adds poster images, fills in the
//! publisher logo, and splices in markup from registered [`Contributor`]s.
//!
//! # Architecture
//!
//! - [`Story`] and [`RenderContext`]: explicit per-request inputs
//! - [`Contributor`] and [`AnalyticsFilter`]: extension points registered on
//!   the renderer at construction
//! - [`StoryRenderer`]: the ordered substitution pipeline
//!
//! Matching is literal or regex based, never a full HTML parse, so output is
//! byte-for-byte predictable from the stored markup.
//!
//! # Example
//!
//! ```
//! use stories_renderer::{LanguageAttributes, RenderContext, StaticMarkup, Story, StoryRenderer};
//!
//! let renderer = StoryRenderer::new()
//!     .with_footer_contributor(StaticMarkup::new("<script>x</script>"));
//! let ctx = RenderContext {
//!     language: LanguageAttributes::new("en-US"),
//!     ..Default::default()
//! };
//! let story = Story::new(1, "Hello", "<html><body></body></html>");
//!
//! let html = renderer.render(&story, &ctx);
//! assert_eq!(html, r#"<html amp lang="en-US"><body><script>x</script></body></html>"#);
//! ```

mod analytics;
mod context;
mod contributor;
pub mod markers;
mod renderer;
mod util;

pub use analytics::{EXCLUDE_LOGGED_IN_USERS, analytics_script_tag};
pub use context::{AnalyticsSettings, LanguageAttributes, PosterImages, RenderContext, Story, Viewer};
pub use contributor::{AnalyticsFilter, Contributor, StaticMarkup};
pub use renderer::StoryRenderer;
pub use util::escape_attr;
