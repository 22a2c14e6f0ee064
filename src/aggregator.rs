//! Runs every configured source once and merges the results.
//!
//! The aggregator never fails: an unknown platform, a broken entry, or a
//! source whose requests all failed is logged, recorded in the [`Report`],
//! and skipped. The worst outcome is an empty item list.

use crate::config::{PlatformEntry, SourcesConfig};
use crate::models::Item;
use crate::sources::{Registry, Source};
use crate::transport::Fetch;
use futures::stream::{self, StreamExt};
use std::fmt;
use tracing::{debug, error, info, instrument, warn};

/// What happened to one configured platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceStatus {
    /// Fetched successfully, yielding this many items.
    Fetched(usize),
    /// `enabled` is false.
    Disabled,
    /// The entry could not be turned into a source.
    Skipped(String),
    /// The source was built but fetching it failed.
    Failed(String),
}

impl fmt::Display for SourceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceStatus::Fetched(n) => write!(f, "fetched {n} items"),
            SourceStatus::Disabled => write!(f, "disabled"),
            SourceStatus::Skipped(reason) => write!(f, "skipped: {reason}"),
            SourceStatus::Failed(reason) => write!(f, "failed: {reason}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceOutcome {
    pub platform: String,
    pub status: SourceStatus,
}

/// Result of one aggregation pass.
#[derive(Debug, Default)]
pub struct Report {
    /// Items from every source, in configuration order.
    pub items: Vec<Item>,
    /// One entry per configured platform, in configuration order.
    pub outcomes: Vec<SourceOutcome>,
}

impl Report {
    /// Number of platforms that produced a result (possibly zero items).
    pub fn succeeded(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o.status, SourceStatus::Fetched(_)))
            .count()
    }

    /// Number of platforms that were skipped or failed.
    pub fn problems(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o.status, SourceStatus::Skipped(_) | SourceStatus::Failed(_)))
            .count()
    }
}

/// Fetches all enabled platforms through one transport.
#[derive(Debug)]
pub struct Aggregator<F> {
    fetcher: F,
    registry: Registry,
    concurrency: usize,
}

impl<F: Fetch> Aggregator<F> {
    /// An aggregator over the built-in platforms, fetching one source at a time.
    pub fn new(fetcher: F) -> Self {
        Self {
            fetcher,
            registry: Registry::builtin(),
            concurrency: 1,
        }
    }

    pub fn with_registry(mut self, registry: Registry) -> Self {
        self.registry = registry;
        self
    }

    /// Allow up to `concurrency` sources in flight at once.
    ///
    /// Items are still returned in configuration order.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// Fetch every enabled platform and return the merged items.
    pub async fn fetch_all(&self, config: &SourcesConfig) -> Vec<Item> {
        self.run(config).await.items
    }

    /// Fetch every enabled platform, returning items and per-platform outcomes.
    #[instrument(level = "info", skip_all, fields(platforms = config.len(), concurrency = self.concurrency))]
    pub async fn run(&self, config: &SourcesConfig) -> Report {
        let results: Vec<(SourceOutcome, Vec<Item>)> = stream::iter(config.entries())
            .map(|entry| self.run_entry(entry))
            .buffered(self.concurrency)
            .collect()
            .await;

        let mut report = Report::default();
        for (outcome, items) in results {
            report.items.extend(items);
            report.outcomes.push(outcome);
        }

        info!(
            items = report.items.len(),
            succeeded = report.succeeded(),
            problems = report.problems(),
            "Aggregation complete"
        );
        report
    }

    async fn run_entry(&self, entry: PlatformEntry<'_>) -> (SourceOutcome, Vec<Item>) {
        let platform = entry.id.to_string();
        let outcome = |status: SourceStatus| SourceOutcome {
            platform: platform.clone(),
            status,
        };

        if !entry.enabled {
            debug!(%platform, "Platform disabled; skipping");
            return (outcome(SourceStatus::Disabled), Vec::new());
        }

        let Some(spec) = self.registry.get(entry.id) else {
            warn!(%platform, "Unknown platform; skipping");
            return (outcome(SourceStatus::Skipped("unknown platform".to_string())), Vec::new());
        };

        let source = match entry.config.and_then(|config| Source::from_config(entry.id, spec, &config)) {
            Ok(source) => source,
            Err(e) => {
                warn!(%platform, error = %e, "Invalid platform configuration; skipping");
                return (outcome(SourceStatus::Skipped(e.to_string())), Vec::new());
            }
        };

        match source.fetch(&self.fetcher).await {
            Ok(items) => {
                info!(%platform, name = source.name(), count = items.len(), "Source fetched");
                (outcome(SourceStatus::Fetched(items.len())), items)
            }
            Err(e) => {
                error!(%platform, name = source.name(), error = %e, "Source failed; continuing");
                (outcome(SourceStatus::Failed(e.to_string())), Vec::new())
            }
        }
    }
}
