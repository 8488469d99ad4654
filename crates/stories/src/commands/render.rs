//! `stories render` command implementation.

use std::io::Write;
use std::path::{Path, PathBuf};

use clap::Args;
use stories_config::{CliSettings, Config};
use stories_renderer::{
    AnalyticsSettings, LanguageAttributes, PosterImages, RenderContext, StaticMarkup, Story,
    StoryRenderer, Viewer, markers,
};

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the render command.
#[derive(Args)]
pub(crate) struct RenderArgs {
    /// Path to the stored story markup.
    input: PathBuf,

    /// Path to configuration file (default: auto-discover stories.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Write rendered HTML to this file instead of stdout.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Story title (default: input file name).
    #[arg(long)]
    title: Option<String>,

    /// Story post ID.
    #[arg(long, default_value_t = 0)]
    id: u64,

    /// Extra poster image, e.g. `poster-square=https://example.com/s.jpg` (repeatable).
    #[arg(long = "poster", value_name = "KIND=URL", value_parser = parse_poster)]
    posters: Vec<(String, String)>,

    /// Language tag for the `<html>` element (overrides config).
    #[arg(long)]
    lang: Option<String>,

    /// Render for a right-to-left locale (overrides config).
    #[arg(long)]
    rtl: bool,

    /// Render for a left-to-right locale (overrides config).
    #[arg(long, conflicts_with = "rtl")]
    no_rtl: bool,

    /// Publisher logo URL (overrides config).
    #[arg(long)]
    publisher_logo: Option<String>,

    /// Render as seen by a signed-in visitor.
    #[arg(long)]
    logged_in: bool,

    /// Enable verbose output.
    #[arg(short, long)]
    pub verbose: bool,
}

impl RenderArgs {
    /// Execute the render command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration fails or files cannot be read or written.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let cli_settings = CliSettings {
            rtl: self.resolve_rtl(),
            lang: self.lang,
            publisher_logo: self.publisher_logo,
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;

        let content = std::fs::read_to_string(&self.input)?;
        if config.site.publisher_logo.is_none()
            && content.contains(markers::PUBLISHER_LOGO_PLACEHOLDER)
        {
            output.warning("Warning: no publisher logo configured, placeholder will be cleared");
        }

        let title = self
            .title
            .unwrap_or_else(|| default_title(&self.input));
        let story = Story::new(self.id, title, content);
        let ctx = render_context(&config, self.posters, self.logged_in);
        let html = build_renderer(&config).render(&story, &ctx);

        tracing::info!(
            input = %self.input.display(),
            story_id = story.id,
            bytes = html.len(),
            "Rendered story"
        );

        match self.output {
            Some(path) => {
                std::fs::write(&path, html)?;
                output.success(&format!("Rendered story written to {}", path.display()));
            }
            None => {
                let mut stdout = std::io::stdout().lock();
                stdout.write_all(html.as_bytes())?;
                stdout.flush()?;
            }
        }

        Ok(())
    }

    /// Direction override from `--rtl` / `--no-rtl`, `None` keeps the config value.
    fn resolve_rtl(&self) -> Option<bool> {
        if self.no_rtl {
            Some(false)
        } else if self.rtl {
            Some(true)
        } else {
            None
        }
    }
}

/// Parse a `KIND=URL` poster argument.
fn parse_poster(value: &str) -> Result<(String, String), String> {
    let (kind, url) = value
        .split_once('=')
        .ok_or_else(|| format!("invalid poster `{value}`: expected KIND=URL"))?;
    if kind.is_empty() || url.is_empty() {
        return Err(format!("invalid poster `{value}`: expected KIND=URL"));
    }
    Ok((kind.to_owned(), url.to_owned()))
}

/// Title derived from the input file name.
fn default_title(input: &Path) -> String {
    input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Build the render context from configuration and per-invocation facts.
fn render_context(config: &Config, posters: Vec<(String, String)>, logged_in: bool) -> RenderContext {
    let analytics = config.analytics.as_ref().map(|a| AnalyticsSettings {
        property_id: a.property_id.clone(),
        tracking_id: a.tracking_id.clone(),
        use_snippet: a.use_snippet,
        tracking_disabled: a.tracking_disabled.clone(),
    });

    RenderContext {
        version: config.site.version.clone(),
        language: LanguageAttributes {
            lang: config.site.lang.clone(),
            rtl: config.site.rtl,
        },
        poster_images: posters.into_iter().collect::<PosterImages>(),
        publisher_logo: config.site.publisher_logo.clone().unwrap_or_default(),
        analytics,
        viewer: Viewer { logged_in },
    }
}

/// Build a renderer with the configured snippets registered as contributors.
fn build_renderer(config: &Config) -> StoryRenderer {
    let snippets = &config.snippets;
    let mut renderer = StoryRenderer::new();
    for markup in &snippets.analytics {
        renderer = renderer.with_analytics_contributor(StaticMarkup::new(markup.as_str()));
    }
    for markup in &snippets.head {
        renderer = renderer.with_head_contributor(StaticMarkup::new(markup.as_str()));
    }
    for markup in &snippets.body_open {
        renderer = renderer.with_body_open_contributor(StaticMarkup::new(markup.as_str()));
    }
    for markup in &snippets.footer {
        renderer = renderer.with_footer_contributor(StaticMarkup::new(markup.as_str()));
    }
    renderer
}
