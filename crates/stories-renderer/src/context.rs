//! Render inputs: the stored story and the facts needed to finish it.
//!
//! Everything the renderer needs is passed in explicitly. Nothing is read from
//! ambient state, so a [`RenderContext`] fully describes one render pass.

use crate::analytics::EXCLUDE_LOGGED_IN_USERS;
use crate::util::escape_attr;

/// A stored story post.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Story {
    /// Numeric post ID.
    pub id: u64,
    /// Post title, used as the analytics event category.
    pub title: String,
    /// Stored story markup.
    pub content: String,
}

impl Story {
    /// Create a story record.
    #[must_use]
    pub fn new(id: u64, title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            content: content.into(),
        }
    }
}

/// Language attributes placed on the `<html>` start tag.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LanguageAttributes {
    /// BCP 47 language tag (e.g., `en-US`).
    pub lang: Option<String>,
    /// Whether the locale is right-to-left.
    pub rtl: bool,
}

impl LanguageAttributes {
    /// Attributes for a left-to-right locale.
    #[must_use]
    pub fn new(lang: impl Into<String>) -> Self {
        Self {
            lang: Some(lang.into()),
            rtl: false,
        }
    }

    /// Mark the locale as right-to-left.
    #[must_use]
    pub fn with_rtl(mut self, rtl: bool) -> Self {
        self.rtl = rtl;
        self
    }

    /// Render as an attribute list, e.g. `dir="rtl" lang="ar"`.
    ///
    /// Returns an empty string when neither attribute applies.
    #[must_use]
    pub fn to_attributes(&self) -> String {
        let mut parts = Vec::with_capacity(2);
        if self.rtl {
            parts.push(r#"dir="rtl""#.to_owned());
        }
        if let Some(lang) = self.lang.as_deref().filter(|l| !l.is_empty()) {
            parts.push(format!(r#"lang="{}""#, escape_attr(lang)));
        }
        parts.join(" ")
    }
}

/// Poster image URLs keyed by kind (`poster-square`, `poster-landscape`, ...).
///
/// Iteration follows insertion order. Inserting an existing kind replaces its
/// URL without moving it.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PosterImages {
    items: Vec<(String, String)>,
}

impl PosterImages {
    /// Create an empty mapping.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the URL for a poster kind.
    pub fn insert(&mut self, kind: impl Into<String>, url: impl Into<String>) {
        let kind = kind.into();
        let url = url.into();
        match self.items.iter_mut().find(|(k, _)| *k == kind) {
            Some(entry) => entry.1 = url,
            None => self.items.push((kind, url)),
        }
    }

    /// Look up the URL for a poster kind.
    #[must_use]
    pub fn get(&self, kind: &str) -> Option<&str> {
        self.items
            .iter()
            .find(|(k, _)| k == kind)
            .map(|(_, url)| url.as_str())
    }

    /// Iterate over `(kind, url)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.items.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of poster kinds.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether no poster kinds are set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for PosterImages {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut images = Self::new();
        for (kind, url) in iter {
            images.insert(kind, url);
        }
        images
    }
}

/// Facts about the visitor the story is rendered for.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Viewer {
    /// Whether the visitor is signed in to the site.
    pub logged_in: bool,
}

/// Analytics integration settings.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AnalyticsSettings {
    /// Web property ID from the stored settings.
    pub property_id: Option<String>,
    /// Explicit tracking ID; takes precedence over `property_id` when non-empty.
    pub tracking_id: Option<String>,
    /// `Some(false)` disables the built-in tag.
    pub use_snippet: Option<bool>,
    /// Viewer classes excluded from tracking (e.g., `loggedinUsers`).
    pub tracking_disabled: Vec<String>,
}

impl AnalyticsSettings {
    /// Settings with just a property ID.
    #[must_use]
    pub fn with_property_id(property_id: impl Into<String>) -> Self {
        Self {
            property_id: Some(property_id.into()),
            ..Self::default()
        }
    }

    /// The tracking ID to use, if any.
    #[must_use]
    pub fn resolve_tracking_id(&self) -> Option<&str> {
        self.tracking_id
            .as_deref()
            .filter(|id| !id.is_empty())
            .or_else(|| self.property_id.as_deref().filter(|id| !id.is_empty()))
    }

    /// Whether tracking is switched off for this viewer.
    #[must_use]
    pub fn is_disabled_for(&self, viewer: Viewer) -> bool {
        viewer.logged_in
            && self
                .tracking_disabled
                .iter()
                .any(|class| class == EXCLUDE_LOGGED_IN_USERS)
    }
}

/// Render-time facts for one story render.
#[derive(Clone, Debug, Default)]
pub struct RenderContext {
    /// Version reported in the generator meta tag.
    pub version: String,
    /// Language attributes for the `<html>` start tag.
    pub language: LanguageAttributes,
    /// Poster images to add next to the portrait poster.
    pub poster_images: PosterImages,
    /// Resolved publisher logo URL.
    pub publisher_logo: String,
    /// Analytics settings; `None` when no analytics integration is active.
    pub analytics: Option<AnalyticsSettings>,
    /// The visitor being served.
    pub viewer: Viewer,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_language_attributes_ltr() {
        assert_eq!(LanguageAttributes::new("en-US").to_attributes(), r#"lang="en-US""#);
    }

    #[test]
    fn test_language_attributes_rtl() {
        assert_eq!(
            LanguageAttributes::new("he-IL").with_rtl(true).to_attributes(),
            r#"dir="rtl" lang="he-IL""#
        );
    }

    #[test]
    fn test_language_attributes_empty() {
        assert_eq!(LanguageAttributes::default().to_attributes(), "");
        assert_eq!(LanguageAttributes::new("").to_attributes(), "");
    }

    #[test]
    fn test_language_attributes_escaped() {
        assert_eq!(
            LanguageAttributes::new(r#"en" onload="x"#).to_attributes(),
            r#"lang="en&quot; onload=&quot;x""#
        );
    }

    #[test]
    fn test_poster_images_keep_insertion_order() {
        let images: PosterImages = [
            ("poster-square", "s.jpg"),
            ("poster-landscape", "l.jpg"),
        ]
        .into_iter()
        .collect();
        let kinds: Vec<_> = images.iter().map(|(k, _)| k).collect();
        assert_eq!(kinds, vec!["poster-square", "poster-landscape"]);
    }

    #[test]
    fn test_poster_images_insert_replaces_in_place() {
        let mut images = PosterImages::new();
        images.insert("poster-square", "a.jpg");
        images.insert("poster-landscape", "b.jpg");
        images.insert("poster-square", "c.jpg");
        assert_eq!(images.len(), 2);
        assert_eq!(images.get("poster-square"), Some("c.jpg"));
        assert_eq!(images.iter().next(), Some(("poster-square", "c.jpg")));
    }

    #[test]
    fn test_tracking_id_prefers_override() {
        let settings = AnalyticsSettings {
            property_id: Some("UA-1".to_owned()),
            tracking_id: Some("G-2".to_owned()),
            ..Default::default()
        };
        assert_eq!(settings.resolve_tracking_id(), Some("G-2"));
    }

    #[test]
    fn test_tracking_id_falls_back_to_property() {
        let settings = AnalyticsSettings {
            property_id: Some("UA-1".to_owned()),
            tracking_id: Some(String::new()),
            ..Default::default()
        };
        assert_eq!(settings.resolve_tracking_id(), Some("UA-1"));
    }

    #[test]
    fn test_tracking_id_missing() {
        let settings = AnalyticsSettings {
            property_id: Some(String::new()),
            ..Default::default()
        };
        assert_eq!(settings.resolve_tracking_id(), None);
    }

    #[test]
    fn test_disabled_for_logged_in_only() {
        let settings = AnalyticsSettings {
            tracking_disabled: vec!["loggedinUsers".to_owned()],
            ..AnalyticsSettings::with_property_id("UA-1")
        };
        assert!(settings.is_disabled_for(Viewer { logged_in: true }));
        assert!(!settings.is_disabled_for(Viewer { logged_in: false }));
    }
}
