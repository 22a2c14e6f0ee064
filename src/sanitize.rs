//! HTML-to-plain-text conversion shared by every source.
//!
//! Titles and excerpts arrive with markup (WallStreetCN live posts are HTML
//! fragments) or with layout whitespace (GitHub trending titles span several
//! lines). Both paths end in the same rule: visible text nodes joined by a
//! single space, whitespace runs collapsed, ends trimmed.

use itertools::Itertools;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Node};

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("static regex"));

/// Elements whose text content is never rendered.
const INVISIBLE: &[&str] = &["script", "style", "noscript", "template"];

/// Strip markup from an HTML fragment and normalize whitespace.
///
/// Never fails: malformed markup is repaired by the HTML parser and whatever
/// text survives is returned. Empty input yields an empty string.
///
/// # Examples
///
/// ```
/// use trending_digest::sanitize::sanitize;
///
/// assert_eq!(sanitize("<p>Rates <b>held</b>\n steady</p>"), "Rates held steady");
/// assert_eq!(sanitize(""), "");
/// ```
pub fn sanitize(fragment: &str) -> String {
    if fragment.trim().is_empty() {
        return String::new();
    }
    if !fragment.contains(['<', '&']) {
        return collapse(fragment);
    }
    let parsed = Html::parse_fragment(fragment);
    element_text(parsed.root_element())
}

/// Visible text of an already-parsed element, normalized like [`sanitize`].
pub fn element_text(element: ElementRef<'_>) -> String {
    let joined = element
        .descendants()
        .filter_map(|node| match node.value() {
            Node::Text(text) => {
                let hidden = node
                    .ancestors()
                    .filter_map(|a| a.value().as_element())
                    .any(|el| INVISIBLE.contains(&el.name()));
                (!hidden).then_some(&**text)
            }
            _ => None,
        })
        .join(" ");
    collapse(&joined)
}

/// Collapse whitespace runs to one space and trim, leaving markup alone.
pub(crate) fn collapse(text: &str) -> String {
    WHITESPACE.replace_all(text, " ").trim().to_string()
}
