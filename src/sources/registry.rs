//! Per-platform extraction tables.
//!
//! Everything that distinguishes one platform from another lives here as
//! data: where the records sit in a JSON body, which fields hold the title,
//! link and excerpt, which selectors find posts on a page, and which origin
//! relative links belong to. Adding a platform means adding a
//! [`PlatformSpec`], not writing a new fetch path.

use crate::config::SourceKind;

/// How an API record's permalink is obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkRule {
    /// The platform has no permalink; items get an empty URL.
    None,
    /// The record carries the URL at this path.
    Field(&'static [&'static str]),
    /// The URL is `prefix` followed by the id found at `id`.
    Permalink {
        id: &'static [&'static str],
        prefix: &'static str,
    },
}

/// Extraction rules for one JSON endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ApiRules {
    /// Endpoint name in the config's `endpoints` map; `None` for the single `url`.
    pub endpoint: Option<&'static str>,
    /// Path from the body root to the record array.
    pub records: &'static [&'static str],
    /// Path from a record to its title.
    pub title: &'static [&'static str],
    pub link: LinkRule,
    /// Path from a record to its excerpt, if the platform has one.
    pub content: Option<&'static [&'static str]>,
    /// Query parameter that must carry the current Unix time.
    pub timestamp_param: Option<&'static str>,
    /// Title and content are HTML fragments rather than plain text.
    pub markup: bool,
}

/// Selector rules for one HTML page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HtmlRules {
    /// Matches each repeated post node.
    pub item: &'static str,
    /// Matches the title node inside a post.
    pub title: &'static str,
    /// Matches the link node inside a post; `None` when the title node is the link.
    pub link: Option<&'static str>,
    /// Base that relative hrefs are resolved against.
    pub origin: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Extractor {
    /// One or more JSON endpoints, fetched in slice order.
    Api(&'static [ApiRules]),
    Html(HtmlRules),
}

/// A registered platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlatformSpec {
    pub id: &'static str,
    pub extractor: Extractor,
}

impl PlatformSpec {
    pub fn kind(&self) -> SourceKind {
        match self.extractor {
            Extractor::Api(_) => SourceKind::Api,
            Extractor::Html(_) => SourceKind::Html,
        }
    }
}

const WALLSTREETCN_ARTICLE_TITLE: &[&str] = &["article", "title"];
const WALLSTREETCN_ARTICLE_URI: &[&str] = &["article", "uri"];

/// The platforms shipped with the crate.
pub static BUILTIN: &[PlatformSpec] = &[
    PlatformSpec {
        id: "zhihu",
        extractor: Extractor::Api(&[ApiRules {
            endpoint: None,
            records: &["data"],
            title: &["target", "title_area", "text"],
            link: LinkRule::Field(&["target", "url"]),
            content: Some(&["target", "excerpt_area", "text"]),
            timestamp_param: None,
            markup: false,
        }]),
    },
    PlatformSpec {
        id: "wallstreetcn",
        extractor: Extractor::Api(&[
            ApiRules {
                endpoint: Some("live"),
                records: &["data", "items"],
                title: &["content"],
                link: LinkRule::None,
                content: None,
                timestamp_param: None,
                markup: true,
            },
            ApiRules {
                endpoint: Some("news"),
                records: &["data", "items"],
                title: WALLSTREETCN_ARTICLE_TITLE,
                link: LinkRule::Field(WALLSTREETCN_ARTICLE_URI),
                content: None,
                timestamp_param: None,
                markup: false,
            },
            ApiRules {
                endpoint: Some("hot"),
                records: &["data", "items"],
                title: WALLSTREETCN_ARTICLE_TITLE,
                link: LinkRule::Field(WALLSTREETCN_ARTICLE_URI),
                content: None,
                timestamp_param: None,
                markup: false,
            },
        ]),
    },
    PlatformSpec {
        id: "hupu",
        extractor: Extractor::Html(HtmlRules {
            item: "li.bbs-sl-web-post-body",
            title: "a.p-title",
            link: None,
            origin: "https://bbs.hupu.com",
        }),
    },
    PlatformSpec {
        id: "thepaper",
        extractor: Extractor::Api(&[ApiRules {
            endpoint: None,
            records: &["data", "hotNews"],
            title: &["name"],
            link: LinkRule::Permalink {
                id: &["contId"],
                prefix: "https://www.thepaper.cn/newsDetail_forward_",
            },
            content: None,
            timestamp_param: None,
            markup: false,
        }]),
    },
    PlatformSpec {
        id: "hackernews",
        extractor: Extractor::Html(HtmlRules {
            item: "tr.athing",
            title: "td.title span.titleline a",
            link: None,
            origin: "https://news.ycombinator.com",
        }),
    },
    PlatformSpec {
        id: "producthunt",
        extractor: Extractor::Html(HtmlRules {
            item: "[data-test^='post-item']",
            title: "[data-test^='post-name']",
            link: Some("a[href^='/posts/']"),
            origin: "https://www.producthunt.com",
        }),
    },
    PlatformSpec {
        id: "github",
        extractor: Extractor::Html(HtmlRules {
            item: "main .Box div[data-hpc] > article",
            title: "h2 a",
            link: None,
            origin: "https://github.com",
        }),
    },
    PlatformSpec {
        id: "sspai",
        extractor: Extractor::Api(&[ApiRules {
            endpoint: None,
            records: &["data"],
            title: &["title"],
            // The API only returns the numeric post id.
            link: LinkRule::Permalink {
                id: &["id"],
                prefix: "https://sspai.com/post/",
            },
            content: Some(&["summary"]),
            timestamp_param: Some("created_at"),
            markup: false,
        }]),
    },
];

/// Maps platform ids to their specs.
#[derive(Debug, Clone)]
pub struct Registry {
    specs: Vec<PlatformSpec>,
}

impl Default for Registry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl Registry {
    /// A registry holding the [`BUILTIN`] platforms.
    pub fn builtin() -> Self {
        Self {
            specs: BUILTIN.to_vec(),
        }
    }

    pub fn empty() -> Self {
        Self { specs: Vec::new() }
    }

    /// Add a platform, replacing any spec already registered under its id.
    pub fn register(&mut self, spec: PlatformSpec) {
        match self.specs.iter_mut().find(|s| s.id == spec.id) {
            Some(existing) => *existing = spec,
            None => self.specs.push(spec),
        }
    }

    pub fn get(&self, id: &str) -> Option<&PlatformSpec> {
        self.specs.iter().find(|s| s.id == id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.specs.iter().map(|s| s.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::Selector;

    #[test]
    fn test_builtin_has_eight_platforms() {
        let registry = Registry::builtin();
        let ids: Vec<_> = registry.ids().collect();
        assert_eq!(
            ids,
            vec![
                "zhihu",
                "wallstreetcn",
                "hupu",
                "thepaper",
                "hackernews",
                "producthunt",
                "github",
                "sspai"
            ]
        );
    }

    #[test]
    fn test_kinds() {
        let registry = Registry::builtin();
        assert_eq!(registry.get("zhihu").unwrap().kind(), SourceKind::Api);
        assert_eq!(registry.get("github").unwrap().kind(), SourceKind::Html);
        assert!(registry.get("myspace").is_none());
    }

    #[test]
    fn test_builtin_selectors_and_origins_parse() {
        for spec in BUILTIN {
            if let Extractor::Html(rules) = spec.extractor {
                assert!(Selector::parse(rules.item).is_ok(), "{}", spec.id);
                assert!(Selector::parse(rules.title).is_ok(), "{}", spec.id);
                if let Some(link) = rules.link {
                    assert!(Selector::parse(link).is_ok(), "{}", spec.id);
                }
                assert!(url::Url::parse(rules.origin).is_ok(), "{}", spec.id);
            }
        }
    }

    #[test]
    fn test_multi_endpoint_rules_are_all_named() {
        for spec in BUILTIN {
            if let Extractor::Api(rules) = spec.extractor {
                if rules.len() > 1 {
                    assert!(rules.iter().all(|r| r.endpoint.is_some()), "{}", spec.id);
                } else {
                    assert!(rules[0].endpoint.is_none(), "{}", spec.id);
                }
            }
        }
    }

    #[test]
    fn test_register_replaces_existing_id() {
        let mut registry = Registry::builtin();
        registry.register(PlatformSpec {
            id: "hupu",
            extractor: Extractor::Html(HtmlRules {
                item: "li",
                title: "a",
                link: None,
                origin: "https://m.hupu.com",
            }),
        });
        assert_eq!(registry.ids().count(), 8);
        match registry.get("hupu").unwrap().extractor {
            Extractor::Html(rules) => assert_eq!(rules.origin, "https://m.hupu.com"),
            Extractor::Api(_) => panic!("hupu should stay html"),
        }
    }
}
