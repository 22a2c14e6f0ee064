//! Record extraction for JSON API platforms.

use super::registry::{ApiRules, LinkRule};
use crate::models::{Item, SourceMeta};
use crate::sanitize::{collapse, sanitize};
use chrono::Utc;
use serde_json::Value;
use tracing::{debug, warn};

/// A resolved JSON endpoint: where to send the request and how to read it.
#[derive(Debug, Clone)]
pub struct Endpoint {
    pub url: String,
    pub params: Vec<(String, String)>,
    pub rules: &'static ApiRules,
}

impl Endpoint {
    /// Display name used in logs.
    pub fn name(&self) -> &'static str {
        self.rules.endpoint.unwrap_or("default")
    }

    /// Query parameters for one request, with the timestamp parameter (if
    /// any) set to the current Unix time.
    pub fn request_params(&self) -> Vec<(String, String)> {
        let mut params = self.params.clone();
        if let Some(key) = self.rules.timestamp_param {
            params.retain(|(k, _)| k != key);
            params.push((key.to_string(), Utc::now().timestamp().to_string()));
        }
        params
    }
}

/// Follow `path` through nested objects.
pub fn lookup<'a>(value: &'a Value, path: &[&str]) -> Option<&'a Value> {
    path.iter().try_fold(value, |node, key| node.get(*key))
}

/// The string (or number) at `path`, or `""` when absent or of another type.
fn text_at(record: &Value, path: &[&str]) -> String {
    match lookup(record, path) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    }
}

fn link_for(record: &Value, rule: LinkRule) -> String {
    match rule {
        LinkRule::None => String::new(),
        LinkRule::Field(path) => text_at(record, path).trim().to_string(),
        LinkRule::Permalink { id, prefix } => {
            let id = text_at(record, id);
            let id = id.trim();
            if id.is_empty() {
                String::new()
            } else {
                format!("{prefix}{id}")
            }
        }
    }
}

/// Turn one JSON body into items.
///
/// A body without the record path yields nothing; a record without a usable
/// title is skipped. Fields are stripped of markup only when `rules.markup`
/// is set; otherwise their text is kept verbatim apart from whitespace.
pub fn extract(body: &Value, rules: &ApiRules, meta: &SourceMeta) -> Vec<Item> {
    let Some(records) = lookup(body, rules.records) else {
        debug!(platform = %meta.platform, path = ?rules.records, "Record path absent");
        return Vec::new();
    };
    let Some(records) = records.as_array() else {
        warn!(platform = %meta.platform, path = ?rules.records, "Record path is not an array");
        return Vec::new();
    };

    let clean: fn(&str) -> String = if rules.markup { sanitize } else { collapse };

    let items = records
        .iter()
        .filter_map(|record| {
            let title = clean(&text_at(record, rules.title));
            let url = link_for(record, rules.link);
            let content = rules
                .content
                .map(|path| clean(&text_at(record, path)))
                .unwrap_or_default();
            Item::new(title, url, content, meta)
        })
        .collect::<Vec<_>>();

    debug!(
        platform = %meta.platform,
        records = records.len(),
        kept = items.len(),
        "Extracted API records"
    );
    items
}
