//! Built-in `amp-analytics` gtag tag.
//!
//! The tag reports two events per story: progress on every page shown and
//! completion when the last page is reached. Its JSON configuration passes
//! through an optional [`AnalyticsFilter`] before serialization.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::context::{AnalyticsSettings, RenderContext, Story};
use crate::contributor::AnalyticsFilter;
use crate::markers::{ANALYTICS_JSON_TYPE, ANALYTICS_SCRIPT_URL};
use crate::util::escape_script_json;

/// Exclusion class that hides the tag from signed-in visitors.
pub const EXCLUDE_LOGGED_IN_USERS: &str = "loggedinUsers";

/// Script element loading the `amp-analytics` extension.
#[must_use]
pub fn analytics_script_tag() -> String {
    format!(
        r#"<script async="async" src="{ANALYTICS_SCRIPT_URL}" custom-element="amp-analytics"></script>"#
    )
}

#[derive(Serialize)]
struct Gtag<'a> {
    vars: GtagVars<'a>,
    triggers: Triggers<'a>,
}

#[derive(Serialize)]
struct GtagVars<'a> {
    gtag_id: &'a str,
    config: BTreeMap<&'a str, GroupConfig>,
}

#[derive(Serialize)]
struct GroupConfig {
    groups: &'static str,
}

#[derive(Serialize)]
struct Triggers<'a> {
    #[serde(rename = "storyProgress")]
    story_progress: Trigger<'a>,
    #[serde(rename = "storyEnd")]
    story_end: Trigger<'a>,
}

#[derive(Serialize)]
struct Trigger<'a> {
    on: &'static str,
    vars: TriggerVars<'a>,
}

#[derive(Serialize)]
struct TriggerVars<'a> {
    event_name: &'static str,
    event_action: &'static str,
    event_category: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    event_label: Option<String>,
    send_to: [&'a str; 1],
}

/// Build the default gtag configuration for a story.
fn gtag_config(tracking_id: &str, story: &Story) -> Option<Map<String, Value>> {
    let gtag = Gtag {
        vars: GtagVars {
            gtag_id: tracking_id,
            config: BTreeMap::from([(tracking_id, GroupConfig { groups: "default" })]),
        },
        triggers: Triggers {
            story_progress: Trigger {
                on: "story-page-visible",
                vars: TriggerVars {
                    event_name: "custom",
                    event_action: "story_progress",
                    event_category: &story.title,
                    event_label: Some(story.id.to_string()),
                    send_to: [tracking_id],
                },
            },
            story_end: Trigger {
                on: "story-last-page-visible",
                vars: TriggerVars {
                    event_name: "custom",
                    event_action: "story_complete",
                    event_category: &story.title,
                    event_label: None,
                    send_to: [tracking_id],
                },
            },
        },
    };

    match serde_json::to_value(gtag) {
        Ok(Value::Object(map)) => Some(map),
        Ok(_) => None,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to build analytics configuration");
            None
        }
    }
}

/// Whether a filtered configuration counts as removed.
fn is_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty() || s == "0",
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
    }
}

/// Reconcile a filtered configuration with the original one.
///
/// Returns `None` when the filter removed the tag. A non-empty array becomes
/// an object keyed by element index; scalar results fall back to the
/// original. A missing or malformed `vars` is restored, and `vars.gtag_id`
/// always carries the resolved tracking ID.
fn normalize(
    filtered: Value,
    original: Map<String, Value>,
    tracking_id: &str,
) -> Option<Map<String, Value>> {
    if is_empty(&filtered) {
        return None;
    }

    let mut gtag = match filtered {
        Value::Object(map) => map,
        Value::Array(items) => items
            .into_iter()
            .enumerate()
            .map(|(i, item)| (i.to_string(), item))
            .collect(),
        _ => original.clone(),
    };

    if !gtag.get("vars").is_some_and(Value::is_object) {
        let vars = original.get("vars").cloned().unwrap_or_default();
        gtag.insert("vars".to_owned(), vars);
    }
    if let Some(Value::Object(vars)) = gtag.get_mut("vars") {
        vars.insert("gtag_id".to_owned(), Value::String(tracking_id.to_owned()));
    }

    Some(gtag)
}

/// Render the built-in analytics tag, or `None` when it should be omitted.
pub(crate) fn gtag_markup(
    story: &Story,
    ctx: &RenderContext,
    filter: Option<&dyn AnalyticsFilter>,
) -> Option<String> {
    let settings: &AnalyticsSettings = ctx.analytics.as_ref()?;

    let Some(tracking_id) = settings.resolve_tracking_id() else {
        tracing::debug!(story_id = story.id, "No analytics tracking ID configured");
        return None;
    };
    if settings.use_snippet == Some(false) {
        tracing::debug!(story_id = story.id, "Analytics snippet disabled");
        return None;
    }
    if settings.is_disabled_for(ctx.viewer) {
        tracing::debug!(story_id = story.id, "Analytics disabled for signed-in viewer");
        return None;
    }

    let original = gtag_config(tracking_id, story)?;
    let gtag = match filter {
        Some(filter) => {
            let filtered = filter.filter(Value::Object(original.clone()));
            let Some(gtag) = normalize(filtered, original, tracking_id) else {
                tracing::debug!(story_id = story.id, "Analytics tag removed by filter");
                return None;
            };
            gtag
        }
        None => original,
    };

    let json = match serde_json::to_string(&gtag) {
        Ok(json) => escape_script_json(&json),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to serialize analytics configuration");
            return None;
        }
    };

    Some(format!(
        r#"<amp-analytics type="gtag" data-credentials="include"><script type="{ANALYTICS_JSON_TYPE}">{json}</script></amp-analytics>"#
    ))
}
