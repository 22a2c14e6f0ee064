//! Post extraction for HTML platforms.
//!
//! Each page is scanned for repeated post nodes; inside each node the title
//! node's visible text becomes the item title and the link node's `href`
//! (resolved against the platform origin) becomes its URL.

use super::registry::HtmlRules;
use crate::error::ConfigError;
use crate::models::{Item, SourceMeta};
use crate::sanitize::element_text;
use scraper::{Html, Selector};
use tracing::debug;
use url::Url;

/// A resolved HTML page with its selectors compiled.
#[derive(Debug, Clone)]
pub struct HtmlTarget {
    pub url: String,
    pub params: Vec<(String, String)>,
    item: Selector,
    title: Selector,
    link: Option<Selector>,
    origin: Url,
}

fn compile(platform: &str, selector: &str) -> Result<Selector, ConfigError> {
    Selector::parse(selector).map_err(|_| ConfigError::Selector {
        platform: platform.to_string(),
        selector: selector.to_string(),
    })
}

impl HtmlTarget {
    /// Compile `rules` for `platform`.
    ///
    /// `origin` overrides the origin baked into the rules.
    pub fn new(
        platform: &str,
        rules: &HtmlRules,
        url: String,
        params: Vec<(String, String)>,
        origin: Option<&str>,
    ) -> Result<Self, ConfigError> {
        let origin = origin.unwrap_or(rules.origin);
        let origin = Url::parse(origin).map_err(|source| ConfigError::Origin {
            platform: platform.to_string(),
            origin: origin.to_string(),
            source,
        })?;

        Ok(Self {
            url,
            params,
            item: compile(platform, rules.item)?,
            title: compile(platform, rules.title)?,
            link: rules.link.map(|link| compile(platform, link)).transpose()?,
            origin,
        })
    }

    pub fn origin(&self) -> &Url {
        &self.origin
    }

    /// Turn one page into items, in document order.
    pub fn extract(&self, page: &str, meta: &SourceMeta) -> Vec<Item> {
        let document = Html::parse_document(page);
        let mut nodes = 0usize;

        let items = document
            .select(&self.item)
            .inspect(|_| nodes += 1)
            .filter_map(|node| {
                let title_node = node.select(&self.title).next()?;
                let title = element_text(title_node);
                let href = match &self.link {
                    Some(link) => node
                        .select(link)
                        .next()
                        .and_then(|a| a.value().attr("href")),
                    None => title_node.value().attr("href"),
                };
                let url = href
                    .map(|href| absolutize(&self.origin, href))
                    .unwrap_or_default();
                Item::new(title, url, String::new(), meta)
            })
            .collect::<Vec<_>>();

        debug!(platform = %meta.platform, nodes, kept = items.len(), "Extracted HTML posts");
        items
    }
}

/// Resolve `href` against `origin`.
///
/// Absolute URLs are returned untouched; relative ones (`/a`, `item?id=1`,
/// `//host/path`) are joined onto the origin. An href that cannot be resolved
/// is returned as written.
pub fn absolutize(origin: &Url, href: &str) -> String {
    let href = href.trim();
    if href.is_empty() {
        return String::new();
    }
    match Url::parse(href) {
        Ok(_) => href.to_string(),
        Err(url::ParseError::RelativeUrlWithoutBase) => origin
            .join(href)
            .map(String::from)
            .unwrap_or_else(|_| href.to_string()),
        Err(_) => href.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sanitize::sanitize;
    use crate::sources::registry::{BUILTIN, Extractor};

    fn target(id: &str) -> HtmlTarget {
        let spec = BUILTIN.iter().find(|s| s.id == id).unwrap();
        match spec.extractor {
            Extractor::Html(rules) => {
                HtmlTarget::new(id, &rules, "https://example.com".to_string(), Vec::new(), None)
                    .unwrap()
            }
            Extractor::Api(_) => panic!("{id} is not an html platform"),
        }
    }

    fn meta(platform: &str) -> SourceMeta {
        SourceMeta {
            platform: platform.to_string(),
            icon: "*".to_string(),
            category: "test".to_string(),
        }
    }

    #[test]
    fn test_absolutize_relative_and_absolute() {
        let origin = Url::parse("https://bbs.hupu.com").unwrap();
        assert_eq!(absolutize(&origin, "/a"), "https://bbs.hupu.com/a");
        assert_eq!(absolutize(&origin, "item?id=7"), "https://bbs.hupu.com/item?id=7");
        assert_eq!(
            absolutize(&origin, "https://example.org/x?y=1"),
            "https://example.org/x?y=1"
        );
        assert_eq!(absolutize(&origin, "//cdn.hupu.com/p"), "https://cdn.hupu.com/p");
        assert_eq!(absolutize(&origin, "  "), "");
    }

    #[test]
    fn test_hupu_drops_empty_titles() {
        let page = r#"
            <ul>
              <li class="bbs-sl-web-post-body"><a class="p-title" href="/empty">   </a></li>
              <li class="bbs-sl-web-post-body"><a class="p-title" href="/a">Post A</a></li>
              <li class="bbs-sl-web-post-body"><span>no title link</span></li>
            </ul>"#;

        let items = target("hupu").extract(page, &meta("hupu"));
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].title, "Post A");
        assert_eq!(items[0].url, "https://bbs.hupu.com/a");
        assert_eq!(items[0].content, "");
    }

    #[test]
    fn test_hackernews_rows() {
        let page = r#"
            <table>
              <tr class="athing" id="1"><td class="title"><span class="titleline">
                <a href="https://example.com/post">Example post</a><span class="sitebit">(example.com)</span>
              </span></td></tr>
              <tr class="athing" id="2"><td class="title"><span class="titleline">
                <a href="item?id=2">Ask HN: Something?</a>
              </span></td></tr>
            </table>"#;

        let items = target("hackernews").extract(page, &meta("hackernews"));
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].title, "Example post");
        assert_eq!(items[0].url, "https://example.com/post");
        assert_eq!(items[1].url, "https://news.ycombinator.com/item?id=2");
    }

    #[test]
    fn test_producthunt_uses_separate_link_node() {
        let page = r#"
            <section data-test="post-item-1">
              <a href="/posts/widget"><img alt=""></a>
              <div data-test="post-name-1">Widget</div>
            </section>
            <section data-test="post-item-2">
              <div data-test="post-name-2">No link</div>
            </section>"#;

        let items = target("producthunt").extract(page, &meta("producthunt"));
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].title, "Widget");
        assert_eq!(items[0].url, "https://www.producthunt.com/posts/widget");
        assert_eq!(items[1].url, "");
    }

    #[test]
    fn test_github_titles_collapse_whitespace() {
        let page = r#"
            <main><div class="Box"><div data-hpc="">
              <article class="Box-row"><h2 class="h3"><a href="/rust-lang/rust">
                <span>rust-lang /</span>

                rust
              </a></h2></article>
            </div></div></main>"#;

        let items = target("github").extract(page, &meta("github"));
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].title, "rust-lang / rust");
        assert_eq!(items[0].url, "https://github.com/rust-lang/rust");
    }

    #[test]
    fn test_titles_are_sanitizer_fixed_points() {
        let page = r#"<li class="bbs-sl-web-post-body"><a class="p-title" href="/b">
            <em>Hot</em>  take &amp; more</a></li>"#;
        let items = target("hupu").extract(page, &meta("hupu"));
        assert_eq!(items[0].title, "Hot take & more");
        assert_eq!(sanitize(&items[0].title), items[0].title);
    }

    #[test]
    fn test_origin_override() {
        let rules = HtmlRules {
            item: "li",
            title: "a",
            link: None,
            origin: "https://bbs.hupu.com",
        };
        let target = HtmlTarget::new(
            "hupu",
            &rules,
            "http://127.0.0.1/page".to_string(),
            Vec::new(),
            Some("https://m.hupu.com"),
        )
        .unwrap();
        assert_eq!(target.origin().as_str(), "https://m.hupu.com/");
    }

    #[test]
    fn test_invalid_selector_is_config_error() {
        let rules = HtmlRules {
            item: "li[[",
            title: "a",
            link: None,
            origin: "https://bbs.hupu.com",
        };
        let err = HtmlTarget::new("hupu", &rules, String::new(), Vec::new(), None).unwrap_err();
        assert!(matches!(err, ConfigError::Selector { .. }));
    }

    #[test]
    fn test_invalid_origin_is_config_error() {
        let rules = HtmlRules {
            item: "li",
            title: "a",
            link: None,
            origin: "not a url",
        };
        let err = HtmlTarget::new("hupu", &rules, String::new(), Vec::new(), None).unwrap_err();
        assert!(matches!(err, ConfigError::Origin { .. }));
    }
}
