//! Shared string helpers.

/// Escape a value for use inside a double-quoted HTML attribute.
///
/// # Examples
///
/// ```
/// use stories_renderer::escape_attr;
///
/// assert_eq!(escape_attr(r#"a "b" & <c>"#), "a &quot;b&quot; &amp; &lt;c&gt;");
/// ```
#[must_use]
pub fn escape_attr(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Make serialized JSON safe to embed in a `<script>` element.
///
/// Only `</` can terminate the element early; `<\/` is an equivalent JSON
/// string escape.
#[must_use]
pub(crate) fn escape_script_json(json: &str) -> String {
    json.replace("</", "<\\/")
}

/// Replace every occurrence of `from` in place, skipping the allocation when absent.
///
/// Returns whether anything was replaced.
pub(crate) fn replace_all(html: &mut String, from: &str, to: &str) -> bool {
    if !html.contains(from) {
        return false;
    }
    *html = html.replace(from, to);
    true
}
