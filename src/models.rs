//! Data models for normalized trending items and the consumer-facing digest.
//!
//! This module defines the core data structures shared by every source:
//! - [`SourceMeta`]: The per-source constants stamped onto each item
//! - [`Item`]: One normalized trending entry
//! - [`Digest`]: The `{"total", "items"}` envelope handed to consumers

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// Identity of the source an item came from.
///
/// Built once per source from its configuration; every [`Item`] the source
/// produces copies these values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceMeta {
    /// Stable platform slug, e.g. `"zhihu"`.
    pub platform: String,
    /// Display hint for the platform (usually an emoji).
    pub icon: String,
    /// The category the configuration declares for this platform.
    pub category: String,
}

/// A single trending entry normalized from any source.
///
/// Sources build items through [`Item::new`], which refuses empty titles and
/// stamps `fetched_at`. The fields stay public and the type deserializes, so
/// an `Item` read back from elsewhere carries whatever that data held.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    /// Plain-text headline; non-empty for items built by a source.
    pub title: String,
    /// Permalink, or an empty string when the source has none.
    pub url: String,
    /// Slug of the originating platform.
    pub platform: String,
    /// Display hint of the originating platform.
    pub platform_icon: String,
    /// Category declared for the originating platform.
    pub raw_category: String,
    /// Summary or excerpt, possibly empty.
    pub content: String,
    /// When this item was extracted.
    pub fetched_at: DateTime<Local>,
}

impl Item {
    /// Build an item for `meta`, stamping the current time.
    ///
    /// Returns `None` when `title` is empty or whitespace-only; callers use
    /// that to drop records silently.
    pub fn new(title: String, url: String, content: String, meta: &SourceMeta) -> Option<Self> {
        let title = title.trim();
        if title.is_empty() {
            return None;
        }
        Some(Self {
            title: title.to_string(),
            url,
            platform: meta.platform.clone(),
            platform_icon: meta.icon.clone(),
            raw_category: meta.category.clone(),
            content,
            fetched_at: Local::now(),
        })
    }
}

/// One entry of the serialized digest.
///
/// `raw_category` and `fetched_at` are only emitted when the digest is built
/// with metadata enabled.
#[derive(Debug, Serialize)]
pub struct DigestEntry<'a> {
    pub title: &'a str,
    pub url: &'a str,
    pub platform: &'a str,
    pub platform_icon: &'a str,
    pub content: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_category: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fetched_at: Option<String>,
}

/// The output document written by the binary.
#[derive(Debug, Serialize)]
pub struct Digest<'a> {
    /// Number of entries in `items`.
    pub total: usize,
    /// Entries in aggregation order.
    pub items: Vec<DigestEntry<'a>>,
}

impl<'a> Digest<'a> {
    /// Build a digest view over `items`.
    ///
    /// # Arguments
    ///
    /// * `items` - The aggregated items, in output order
    /// * `include_meta` - Whether to emit `raw_category` and `fetched_at`
    pub fn new(items: &'a [Item], include_meta: bool) -> Self {
        let items = items
            .iter()
            .map(|item| DigestEntry {
                title: &item.title,
                url: &item.url,
                platform: &item.platform,
                platform_icon: &item.platform_icon,
                content: &item.content,
                raw_category: include_meta.then_some(item.raw_category.as_str()),
                fetched_at: include_meta.then(|| item.fetched_at.to_rfc3339()),
            })
            .collect::<Vec<_>>();
        Self {
            total: items.len(),
            items,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meta() -> SourceMeta {
        SourceMeta {
            platform: "hackernews".to_string(),
            icon: "🔶".to_string(),
            category: "tech".to_string(),
        }
    }

    #[test]
    fn test_item_copies_source_meta() {
        let item = Item::new(
            "Show HN: a thing".to_string(),
            "https://example.com".to_string(),
            String::new(),
            &meta(),
        )
        .unwrap();

        assert_eq!(item.title, "Show HN: a thing");
        assert_eq!(item.platform, "hackernews");
        assert_eq!(item.platform_icon, "🔶");
        assert_eq!(item.raw_category, "tech");
        assert_eq!(item.content, "");
    }

    #[test]
    fn test_item_rejects_blank_title() {
        assert!(Item::new(String::new(), String::new(), String::new(), &meta()).is_none());
        assert!(Item::new("  \n\t".to_string(), String::new(), String::new(), &meta()).is_none());
    }

    #[test]
    fn test_item_trims_title() {
        let item = Item::new("  padded  ".to_string(), String::new(), String::new(), &meta()).unwrap();
        assert_eq!(item.title, "padded");
    }

    #[test]
    fn test_items_are_stamped_independently() {
        let first = Item::new("a".to_string(), String::new(), String::new(), &meta()).unwrap();
        let second = Item::new("b".to_string(), String::new(), String::new(), &meta()).unwrap();
        assert!(second.fetched_at >= first.fetched_at);
    }

    #[test]
    fn test_digest_hides_meta_by_default() {
        let items = vec![
            Item::new("One".to_string(), "u1".to_string(), "c1".to_string(), &meta()).unwrap(),
            Item::new("Two".to_string(), String::new(), String::new(), &meta()).unwrap(),
        ];

        let json = serde_json::to_value(Digest::new(&items, false)).unwrap();
        assert_eq!(json["total"], 2);
        assert_eq!(json["items"][0]["title"], "One");
        assert_eq!(json["items"][0]["url"], "u1");
        assert_eq!(json["items"][0]["content"], "c1");
        assert_eq!(json["items"][1]["url"], "");
        assert!(json["items"][0].get("raw_category").is_none());
        assert!(json["items"][0].get("fetched_at").is_none());
    }

    #[test]
    fn test_digest_includes_meta_on_request() {
        let items = vec![Item::new("One".to_string(), String::new(), String::new(), &meta()).unwrap()];

        let json = serde_json::to_value(Digest::new(&items, true)).unwrap();
        assert_eq!(json["items"][0]["raw_category"], "tech");
        assert!(json["items"][0]["fetched_at"].is_string());
    }

    #[test]
    fn test_item_serialization_roundtrip() {
        let item = Item::new("Title".to_string(), String::new(), String::new(), &meta()).unwrap();
        let json = serde_json::to_string(&item).unwrap();
        let back: Item = serde_json::from_str(&json).unwrap();
        assert_eq!(back, item);
    }
}
