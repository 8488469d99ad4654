//! Story renderer: finishes stored story markup for a single request.

use std::sync::LazyLock;

use regex::Regex;

use crate::analytics::{analytics_script_tag, gtag_markup};
use crate::context::{PosterImages, RenderContext, Story};
use crate::contributor::{AnalyticsFilter, Contributor, collect};
use crate::markers::{
    BODY_END, BODY_START, HEAD_END, HEAD_START, POSTER_PORTRAIT_ANCHOR, POSTER_PORTRAIT_KIND,
    PUBLISHER_LOGO_PLACEHOLDER, STORY_END,
};
use crate::util::{escape_attr, replace_all};

/// Opening `<html>` tag, optionally preceded by text, whitespace and comments.
///
/// The `regex` crate matches in linear time, so long runs of comments or
/// whitespace cannot cause catastrophic backtracking.
static HTML_START_TAG_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?P<prefix>[^<]*(?:\s*<!--[^>]*>\s*)*)<html(?:\s+[^>]*)?>").unwrap()
});

/// Renders stored stories into servable HTML.
///
/// Rendering is a fixed sequence of literal substitutions over one buffer:
///
/// 1. `<html>` start tag gets the `amp` attribute and language attributes
/// 2. Analytics markup goes before `</amp-story>`
/// 3. The head placeholder region is replaced with generated head markup
/// 4. Extra poster images are added next to `poster-portrait-src`
/// 5. The publisher logo placeholder is replaced
/// 6. Body-open contributions follow `<body>`
/// 7. Footer contributions precede `</body>`
///
/// A step whose marker is missing leaves the document unchanged, so render
/// never fails. Later steps rely on earlier ones: the analytics step decides
/// whether the head step emits the analytics script.
///
/// The renderer holds no per-request state and can be shared across threads.
#[derive(Default)]
pub struct StoryRenderer {
    analytics: Vec<Box<dyn Contributor>>,
    head: Vec<Box<dyn Contributor>>,
    body_open: Vec<Box<dyn Contributor>>,
    footer: Vec<Box<dyn Contributor>>,
    analytics_filter: Option<Box<dyn AnalyticsFilter>>,
}

impl StoryRenderer {
    /// Create a renderer without contributors.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a contributor for analytics markup placed before `</amp-story>`.
    #[must_use]
    pub fn with_analytics_contributor<C: Contributor + 'static>(mut self, contributor: C) -> Self {
        self.analytics.push(Box::new(contributor));
        self
    }

    /// Add a contributor for markup in the generated `<head>` region.
    #[must_use]
    pub fn with_head_contributor<C: Contributor + 'static>(mut self, contributor: C) -> Self {
        self.head.push(Box::new(contributor));
        self
    }

    /// Add a contributor for markup right after `<body>`.
    #[must_use]
    pub fn with_body_open_contributor<C: Contributor + 'static>(mut self, contributor: C) -> Self {
        self.body_open.push(Box::new(contributor));
        self
    }

    /// Add a contributor for markup right before `</body>`.
    #[must_use]
    pub fn with_footer_contributor<C: Contributor + 'static>(mut self, contributor: C) -> Self {
        self.footer.push(Box::new(contributor));
        self
    }

    /// Set the filter applied to the built-in analytics configuration.
    ///
    /// Replaces any previously set filter.
    #[must_use]
    pub fn with_analytics_filter<F: AnalyticsFilter + 'static>(mut self, filter: F) -> Self {
        self.analytics_filter = Some(Box::new(filter));
        self
    }

    /// Render a story.
    #[must_use]
    pub fn render(&self, story: &Story, ctx: &RenderContext) -> String {
        let mut html = story.content.clone();

        replace_html_start_tag(&mut html, ctx);
        let analytics_added = self.add_analytics(&mut html, story, ctx);
        self.replace_head(&mut html, story, ctx, analytics_added);
        add_poster_images(&mut html, &ctx.poster_images);
        add_publisher_logo(&mut html, &ctx.publisher_logo);
        self.replace_body_start_tag(&mut html, story, ctx);
        self.replace_body_end_tag(&mut html, story, ctx);

        tracing::debug!(
            story_id = story.id,
            input_len = story.content.len(),
            output_len = html.len(),
            "Story rendered"
        );
        html
    }

    /// Insert analytics markup before the story end tag.
    ///
    /// Returns whether any analytics markup was produced.
    fn add_analytics(&self, html: &mut String, story: &Story, ctx: &RenderContext) -> bool {
        let mut output = collect(&self.analytics, story, ctx);
        if let Some(tag) = gtag_markup(story, ctx, self.analytics_filter.as_deref()) {
            output.push_str(&tag);
        }

        if output.is_empty() {
            return false;
        }
        if !replace_all(html, STORY_END, &format!("{output}{STORY_END}")) {
            tracing::debug!(story_id = story.id, "Story end tag not found, analytics skipped");
        }
        true
    }

    /// Generated `<head>` markup: generator tag, contributions, analytics script.
    fn head_markup(&self, story: &Story, ctx: &RenderContext, analytics_added: bool) -> String {
        let mut markup = format!(
            r#"<meta name="generator" content="Web Stories {}" />"#,
            escape_attr(&ctx.version)
        );
        markup.push_str(&collect(&self.head, story, ctx));
        if analytics_added {
            markup.push_str(&analytics_script_tag());
        }
        markup
    }

    /// Replace the head placeholder region, markers included.
    fn replace_head(
        &self,
        html: &mut String,
        story: &Story,
        ctx: &RenderContext,
        analytics_added: bool,
    ) {
        let Some(start) = html.find(HEAD_START) else {
            tracing::debug!(story_id = story.id, "Head start marker not found");
            return;
        };
        let Some(end) = html[start..].find(HEAD_END) else {
            tracing::debug!(story_id = story.id, "Head end marker not found");
            return;
        };
        let end = start + end + HEAD_END.len();

        let markup = self.head_markup(story, ctx, analytics_added);
        html.replace_range(start..end, &markup);
    }

    fn replace_body_start_tag(&self, html: &mut String, story: &Story, ctx: &RenderContext) {
        let output = collect(&self.body_open, story, ctx);
        if output.is_empty() {
            return;
        }
        replace_all(html, BODY_START, &format!("{BODY_START}{output}"));
    }

    fn replace_body_end_tag(&self, html: &mut String, story: &Story, ctx: &RenderContext) {
        let output = collect(&self.footer, story, ctx);
        if output.is_empty() {
            return;
        }
        replace_all(html, BODY_END, &format!("{output}{BODY_END}"));
    }
}

/// Rewrite the `<html>` start tag with the AMP marker and language attributes.
///
/// Leading text and comments before the tag are kept.
fn replace_html_start_tag(html: &mut String, ctx: &RenderContext) {
    let Some(caps) = HTML_START_TAG_RE.captures(html) else {
        tracing::debug!("HTML start tag not found");
        return;
    };
    let Some(tag) = caps.get(0) else {
        return;
    };
    let prefix_len = caps.name("prefix").map_or(0, |m| m.len());
    let range = tag.start() + prefix_len..tag.end();

    let attributes = ctx.language.to_attributes();
    let replacement = if attributes.is_empty() {
        "<html amp>".to_owned()
    } else {
        format!("<html amp {attributes}>")
    };
    html.replace_range(range, &replacement);
}

/// Add non-portrait poster images in front of the portrait poster attribute.
///
/// Kinds whose attribute is already present are skipped, so re-rendering
/// output does not duplicate them.
fn add_poster_images(html: &mut String, images: &PosterImages) {
    if !html.contains(POSTER_PORTRAIT_ANCHOR) {
        if !images.is_empty() {
            tracing::debug!("Portrait poster attribute not found, poster images skipped");
        }
        return;
    }

    for (kind, url) in images.iter() {
        if kind == POSTER_PORTRAIT_KIND || has_attribute(html, kind) {
            continue;
        }
        let markup = format!(r#"{kind}-src="{}" {POSTER_PORTRAIT_ANCHOR}"#, escape_attr(url));
        replace_all(html, POSTER_PORTRAIT_ANCHOR, &markup);
    }
}

/// Whether `{kind}-src=` already appears as an attribute, after any whitespace.
fn has_attribute(html: &str, kind: &str) -> bool {
    let pattern = format!(r"(?:^|\s){}-src=", regex::escape(kind));
    match Regex::new(&pattern) {
        Ok(re) => re.is_match(html),
        Err(e) => {
            tracing::warn!(kind, error = %e, "Invalid poster kind");
            true
        }
    }
}

/// Replace the logo placeholder; the placeholder sits inside an attribute.
fn add_publisher_logo(html: &mut String, logo: &str) {
    replace_all(html, PUBLISHER_LOGO_PLACEHOLDER, &escape_attr(logo));
}
