//! Trending sources: one bound instance per configured platform.
//!
//! A [`Source`] is built from a platform's [`SourceConfig`] and its registered
//! [`PlatformSpec`], then fetched once through any [`Fetch`] implementation.
//!
//! # Supported Platforms
//!
//! | Platform | Kind | Notes |
//! |----------|------|-------|
//! | `zhihu` | JSON API | Hot list; excerpt used as content |
//! | `wallstreetcn` | JSON API | Three endpoints: `live`, `news`, `hot` |
//! | `hupu` | HTML | BBS hot posts |
//! | `thepaper` | JSON API | Permalink built from `contId` |
//! | `hackernews` | HTML | Front page |
//! | `producthunt` | HTML | Link taken from a separate `/posts/` anchor |
//! | `github` | HTML | Trending repositories |
//! | `sspai` | JSON API | Permalink built from `id`; `created_at` stamped per request |
//!
//! # Failure Isolation
//!
//! - A malformed record is skipped (see [`api`] and [`html`]).
//! - A failed endpoint of a multi-endpoint platform is logged and the other
//!   endpoints still run; the source only fails if every endpoint fails.
//! - A failed single-endpoint source returns its error to the aggregator.

pub mod api;
pub mod html;
pub mod registry;

use crate::config::{SourceConfig, query_pairs};
use crate::error::{ConfigError, SourceError};
use crate::models::{Item, SourceMeta};
use crate::transport::{Fetch, Payload};
use crate::utils::truncate_for_log;
use api::Endpoint;
use html::HtmlTarget;
use registry::{ApiRules, Extractor, PlatformSpec};
use tracing::{debug, info, instrument, warn};

pub use registry::Registry;

/// What a source requests and how it reads the responses.
#[derive(Debug, Clone)]
pub enum Target {
    /// JSON endpoints in fetch order. More than one means per-endpoint isolation.
    Api(Vec<Endpoint>),
    Html(HtmlTarget),
}

/// A platform bound to its configuration.
#[derive(Debug, Clone)]
pub struct Source {
    name: String,
    meta: SourceMeta,
    enabled: bool,
    target: Target,
}

impl Source {
    /// Bind `spec` to `config` under the platform id `id`.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::KindMismatch`] if `config` declares a different kind than `spec`
    /// - [`ConfigError::MissingField`] if the `url` (or, for multi-endpoint
    ///   platforms, every `endpoints` entry) is missing
    /// - [`ConfigError::Selector`] / [`ConfigError::Origin`] for unusable HTML rules
    pub fn from_config(id: &str, spec: &PlatformSpec, config: &SourceConfig) -> Result<Self, ConfigError> {
        if config.kind != spec.kind() {
            return Err(ConfigError::KindMismatch {
                platform: id.to_string(),
                declared: config.kind.as_str(),
                registered: spec.kind().as_str(),
            });
        }

        let target = match spec.extractor {
            Extractor::Api(rules) => Target::Api(resolve_endpoints(id, rules, config)?),
            Extractor::Html(rules) => {
                let url = config.url.clone().ok_or_else(|| ConfigError::MissingField {
                    platform: id.to_string(),
                    field: "url",
                })?;
                Target::Html(HtmlTarget::new(
                    id,
                    &rules,
                    url,
                    query_pairs(&config.params),
                    config.origin.as_deref(),
                )?)
            }
        };

        Ok(Self {
            name: config.name.clone(),
            meta: SourceMeta {
                platform: id.to_string(),
                icon: config.icon.clone(),
                category: config.category.clone(),
            },
            enabled: config.enabled,
            target,
        })
    }

    pub fn platform(&self) -> &str {
        &self.meta.platform
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn meta(&self) -> &SourceMeta {
        &self.meta
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn target(&self) -> &Target {
        &self.target
    }

    /// Fetch and normalize this platform's current items.
    ///
    /// Returns an empty list without touching the network when the source is
    /// disabled.
    #[instrument(level = "info", skip_all, fields(platform = %self.meta.platform))]
    pub async fn fetch<F: Fetch>(&self, fetcher: &F) -> Result<Vec<Item>, SourceError> {
        if !self.enabled {
            return Ok(Vec::new());
        }

        let items = match &self.target {
            Target::Html(target) => self.fetch_page(fetcher, target).await?,
            Target::Api(endpoints) if endpoints.len() == 1 => {
                self.fetch_endpoint(fetcher, &endpoints[0]).await?
            }
            Target::Api(endpoints) => self.fetch_endpoints(fetcher, endpoints).await?,
        };

        info!(count = items.len(), "Fetched items");
        Ok(items)
    }

    async fn fetch_endpoints<F: Fetch>(
        &self,
        fetcher: &F,
        endpoints: &[Endpoint],
    ) -> Result<Vec<Item>, SourceError> {
        let mut items = Vec::new();
        let mut first_error = None;
        let mut succeeded = 0usize;

        for endpoint in endpoints {
            match self.fetch_endpoint(fetcher, endpoint).await {
                Ok(batch) => {
                    succeeded += 1;
                    items.extend(batch);
                }
                Err(e) => {
                    warn!(endpoint = endpoint.name(), error = %e, "Endpoint failed; continuing");
                    if first_error.is_none() {
                        first_error = Some(e);
                    }
                }
            }
        }

        match first_error {
            Some(e) if succeeded == 0 => Err(e),
            _ => Ok(items),
        }
    }

    async fn fetch_endpoint<F: Fetch>(&self, fetcher: &F, endpoint: &Endpoint) -> Result<Vec<Item>, SourceError> {
        match fetcher.get(&endpoint.url, &endpoint.request_params()).await? {
            Payload::Json(body) => Ok(api::extract(&body, endpoint.rules, &self.meta)),
            Payload::Text(body) => {
                debug!(preview = %truncate_for_log(&body, 200), "Non-JSON body");
                Err(SourceError::UnexpectedPayload {
                    platform: self.meta.platform.clone(),
                    url: endpoint.url.clone(),
                    expected: "JSON",
                })
            }
        }
    }

    async fn fetch_page<F: Fetch>(&self, fetcher: &F, target: &HtmlTarget) -> Result<Vec<Item>, SourceError> {
        match fetcher.get(&target.url, &target.params).await? {
            Payload::Text(page) => Ok(target.extract(&page, &self.meta)),
            Payload::Json(_) => Err(SourceError::UnexpectedPayload {
                platform: self.meta.platform.clone(),
                url: target.url.clone(),
                expected: "HTML",
            }),
        }
    }
}

/// Pair each endpoint rule with its configured URL and parameters.
fn resolve_endpoints(
    id: &str,
    rules: &'static [ApiRules],
    config: &SourceConfig,
) -> Result<Vec<Endpoint>, ConfigError> {
    let mut endpoints = Vec::with_capacity(rules.len());

    for rule in rules {
        match rule.endpoint {
            None => {
                let url = config.url.clone().ok_or_else(|| ConfigError::MissingField {
                    platform: id.to_string(),
                    field: "url",
                })?;
                endpoints.push(Endpoint {
                    url,
                    params: query_pairs(&config.params),
                    rules: rule,
                });
            }
            Some(name) => match config.endpoints.get(name) {
                Some(endpoint) => endpoints.push(Endpoint {
                    url: endpoint.url.clone(),
                    params: query_pairs(&endpoint.params),
                    rules: rule,
                }),
                None => warn!(platform = id, endpoint = name, "Endpoint not configured; skipping"),
            },
        }
    }

    for name in config.endpoints.keys() {
        if !rules.iter().any(|r| r.endpoint == Some(name.as_str())) {
            warn!(platform = id, endpoint = %name, "Unknown endpoint in config; ignoring");
        }
    }

    if endpoints.is_empty() {
        return Err(ConfigError::MissingField {
            platform: id.to_string(),
            field: "endpoints",
        });
    }
    Ok(endpoints)
}
