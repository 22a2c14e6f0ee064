//! Source configuration documents.
//!
//! The document lists platforms by id, in the order they should be aggregated:
//!
//! ```json
//! {
//!   "platforms": {
//!     "zhihu": {
//!       "name": "知乎", "icon": "📘", "type": "api", "category": "social",
//!       "url": "https://www.zhihu.com/api/v3/feed/topstory/hot-lists/total"
//!     }
//!   }
//! }
//! ```
//!
//! Platform entries are kept as raw JSON values and parsed one at a time by
//! [`SourcesConfig::entries`], so a broken entry costs only that platform.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::path::Path;
use tokio::fs;
use tracing::{info, instrument};

/// Extraction strategy declared by a platform entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// Structured JSON API.
    Api,
    /// Raw HTML page.
    Html,
}

impl SourceKind {
    pub fn as_str(self) -> &'static str {
        match self {
            SourceKind::Api => "api",
            SourceKind::Html => "html",
        }
    }
}

/// One named endpoint of a multi-endpoint platform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EndpointConfig {
    pub url: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub params: BTreeMap<String, Value>,
}

/// Declarative description of one platform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Human-readable platform name, used in logs.
    pub name: String,
    /// Display hint copied onto every item.
    pub icon: String,
    /// Declared extraction strategy; must match the registered one.
    #[serde(rename = "type")]
    pub kind: SourceKind,
    /// Category copied onto every item.
    pub category: String,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Endpoint URL for single-endpoint platforms.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Query parameters for `url`.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub params: BTreeMap<String, Value>,
    /// Named endpoints for multi-endpoint platforms.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub endpoints: BTreeMap<String, EndpointConfig>,
    /// Overrides the origin relative links are resolved against.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin: Option<String>,
}

fn default_enabled() -> bool {
    true
}

/// Render configured query parameters as string pairs.
///
/// Strings are passed through as-is; numbers and booleans use their JSON
/// spelling.
pub fn query_pairs(params: &BTreeMap<String, Value>) -> Vec<(String, String)> {
    params
        .iter()
        .map(|(key, value)| {
            let value = match value {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            (key.clone(), value)
        })
        .collect()
}

/// The whole configuration document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SourcesConfig {
    /// Platform id → raw entry, in document order.
    pub platforms: Map<String, Value>,
}

/// A platform entry as seen by the aggregator.
#[derive(Debug)]
pub struct PlatformEntry<'a> {
    pub id: &'a str,
    /// `false` only when the entry explicitly says `"enabled": false`.
    pub enabled: bool,
    pub config: Result<SourceConfig, ConfigError>,
}

impl SourcesConfig {
    /// Parse a JSON document.
    pub fn from_json_str(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// Parse a YAML document.
    pub fn from_yaml_str(text: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(text)
    }

    /// Build a document from typed entries, keeping their order.
    pub fn from_sources<I>(sources: I) -> Self
    where
        I: IntoIterator<Item = (String, SourceConfig)>,
    {
        let platforms = sources
            .into_iter()
            .filter_map(|(id, config)| serde_json::to_value(config).ok().map(|v| (id, v)))
            .collect();
        Self { platforms }
    }

    /// Number of platform entries, enabled or not.
    pub fn len(&self) -> usize {
        self.platforms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.platforms.is_empty()
    }

    /// Iterate platform entries in document order, parsing each one.
    pub fn entries(&self) -> impl Iterator<Item = PlatformEntry<'_>> {
        self.platforms.iter().map(|(id, raw)| {
            let enabled = raw.get("enabled").and_then(Value::as_bool).unwrap_or(true);
            let config = SourceConfig::deserialize(raw).map_err(|source| ConfigError::InvalidEntry {
                platform: id.clone(),
                source,
            });
            PlatformEntry {
                id: id.as_str(),
                enabled,
                config,
            }
        })
    }
}

/// Load a configuration document from disk.
///
/// Files ending in `.yaml` or `.yml` are parsed as YAML; everything else as JSON.
///
/// # Errors
///
/// Returns [`ConfigError::Read`] if the file cannot be read and
/// [`ConfigError::Parse`] if it is not a valid document.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn load_config(path: &Path) -> Result<SourcesConfig, ConfigError> {
    let text = fs::read_to_string(path)
        .await
        .map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

    let is_yaml = matches!(
        path.extension().and_then(|ext| ext.to_str()),
        Some("yaml") | Some("yml")
    );
    let parsed = if is_yaml {
        SourcesConfig::from_yaml_str(&text).map_err(|e| e.to_string())
    } else {
        SourcesConfig::from_json_str(&text).map_err(|e| e.to_string())
    };
    let config = parsed.map_err(|message| ConfigError::Parse {
        path: path.to_path_buf(),
        message,
    })?;

    info!(platforms = config.len(), "Loaded source configuration");
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE: &str = r#"{
        "platforms": {
            "zhihu": {
                "name": "知乎",
                "icon": "📘",
                "type": "api",
                "category": "social",
                "url": "https://www.zhihu.com/api/v3/feed/topstory/hot-lists/total",
                "params": { "limit": 50 }
            },
            "hupu": {
                "name": "虎扑",
                "icon": "🏀",
                "type": "html",
                "category": "sports",
                "enabled": false,
                "url": "https://bbs.hupu.com/all-gambia"
            },
            "broken": { "name": "missing everything else" }
        }
    }"#;

    #[test]
    fn test_entries_keep_document_order() {
        let config = SourcesConfig::from_json_str(SAMPLE).unwrap();
        let ids: Vec<_> = config.entries().map(|e| e.id.to_string()).collect();
        assert_eq!(ids, vec!["zhihu", "hupu", "broken"]);
    }

    #[test]
    fn test_entry_parsing_is_isolated() {
        let config = SourcesConfig::from_json_str(SAMPLE).unwrap();
        let entries: Vec<_> = config.entries().collect();

        let zhihu = entries[0].config.as_ref().unwrap();
        assert_eq!(zhihu.kind, SourceKind::Api);
        assert!(zhihu.enabled);
        assert_eq!(query_pairs(&zhihu.params), vec![("limit".to_string(), "50".to_string())]);

        assert!(!entries[1].enabled);
        assert!(matches!(entries[2].config, Err(ConfigError::InvalidEntry { .. })));
        assert!(entries[2].enabled);
    }

    #[test]
    fn test_query_pairs_passes_strings_through() {
        let mut params = BTreeMap::new();
        params.insert("tag".to_string(), Value::String("热门文章".to_string()));
        params.insert("released".to_string(), Value::Bool(false));
        assert_eq!(
            query_pairs(&params),
            vec![
                ("released".to_string(), "false".to_string()),
                ("tag".to_string(), "热门文章".to_string()),
            ]
        );
    }

    #[test]
    fn test_yaml_document() {
        let yaml = r#"
platforms:
  github:
    name: GitHub
    icon: "🐙"
    type: html
    category: tech
    url: https://github.com/trending
  wallstreetcn:
    name: 华尔街见闻
    icon: "💹"
    type: api
    category: finance
    endpoints:
      live:
        url: https://api-one.wallstcn.com/apiv1/content/lives
        params:
          channel: global-channel
          limit: 30
"#;
        let config = SourcesConfig::from_yaml_str(yaml).unwrap();
        let entries: Vec<_> = config.entries().collect();
        assert_eq!(entries[0].id, "github");
        let wscn = entries[1].config.as_ref().unwrap();
        assert_eq!(wscn.endpoints["live"].params["limit"], Value::from(30));
    }

    #[test]
    fn test_from_sources_roundtrips_typed_entries() {
        let source = SourceConfig {
            name: "Hacker News".to_string(),
            icon: "🔶".to_string(),
            kind: SourceKind::Html,
            category: "tech".to_string(),
            enabled: true,
            url: Some("https://news.ycombinator.com".to_string()),
            params: BTreeMap::new(),
            endpoints: BTreeMap::new(),
            origin: None,
        };
        let config = SourcesConfig::from_sources(vec![("hackernews".to_string(), source.clone())]);
        let entry = config.entries().next().unwrap();
        assert_eq!(entry.config.unwrap(), source);
    }

    #[tokio::test]
    async fn test_load_config_from_json_file() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();

        let config = load_config(file.path()).await.unwrap();
        assert_eq!(config.len(), 3);
    }

    #[tokio::test]
    async fn test_load_config_reports_parse_errors() {
        let mut file = tempfile::Builder::new().suffix(".yml").tempfile().unwrap();
        file.write_all(b"platforms: [not, a, map").unwrap();

        let err = load_config(file.path()).await.unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[tokio::test]
    async fn test_load_config_reports_missing_file() {
        let err = load_config(Path::new("/nonexistent/sources.json"))
            .await
            .unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
