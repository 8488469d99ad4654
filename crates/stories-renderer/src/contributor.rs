//! Extension points for markup contributed by other components.
//!
//! A [`Contributor`] appends markup for one region of the document (head,
//! body start, footer, or the analytics slot before `</amp-story>`). An
//! [`AnalyticsFilter`] rewrites or removes the built-in analytics payload.

use serde_json::Value;

use crate::context::{RenderContext, Story};

/// Supplies markup to splice into a region of the rendered story.
///
/// Implemented for closures taking `(&Story, &RenderContext, &mut String)`.
///
/// # Example
///
/// ```
/// use stories_renderer::{RenderContext, Story, StoryRenderer};
///
/// let renderer = StoryRenderer::new().with_footer_contributor(
///     |story: &Story, _ctx: &RenderContext, out: &mut String| {
///         out.push_str(&format!("<!-- story {} -->", story.id));
///     },
/// );
/// let story = Story::new(7, "Title", "<body></body>");
/// let html = renderer.render(&story, &RenderContext::default());
/// assert_eq!(html, "<body><!-- story 7 --></body>");
/// ```
pub trait Contributor: Send + Sync {
    /// Append markup to `out`.
    fn contribute(&self, story: &Story, ctx: &RenderContext, out: &mut String);
}

impl<F> Contributor for F
where
    F: Fn(&Story, &RenderContext, &mut String) + Send + Sync,
{
    fn contribute(&self, story: &Story, ctx: &RenderContext, out: &mut String) {
        self(story, ctx, out);
    }
}

/// Contributor that always emits the same snippet.
#[derive(Clone, Debug)]
pub struct StaticMarkup {
    markup: String,
}

impl StaticMarkup {
    /// Create a contributor for a fixed snippet.
    #[must_use]
    pub fn new(markup: impl Into<String>) -> Self {
        Self {
            markup: markup.into(),
        }
    }
}

impl Contributor for StaticMarkup {
    fn contribute(&self, _story: &Story, _ctx: &RenderContext, out: &mut String) {
        out.push_str(&self.markup);
    }
}

/// Rewrites the analytics tag configuration before it is serialized.
///
/// Returning an empty value (`null`, `false`, `0`, `""`, `[]`, `{}`) removes
/// the tag. A non-empty array is kept as an object keyed by element index,
/// and other non-object results fall back to the unfiltered configuration.
/// Implemented for closures taking and returning a [`Value`].
pub trait AnalyticsFilter: Send + Sync {
    /// Return the configuration to serialize.
    fn filter(&self, gtag: Value) -> Value;
}

impl<F> AnalyticsFilter for F
where
    F: Fn(Value) -> Value + Send + Sync,
{
    fn filter(&self, gtag: Value) -> Value {
        self(gtag)
    }
}

/// Run a list of contributors into one string.
pub(crate) fn collect(
    contributors: &[Box<dyn Contributor>],
    story: &Story,
    ctx: &RenderContext,
) -> String {
    let mut out = String::new();
    for contributor in contributors {
        contributor.contribute(story, ctx, &mut out);
    }
    out
}
