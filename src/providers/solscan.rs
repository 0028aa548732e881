//! Entity-metadata provider adapter.
//!
//! Two call paths return overlapping metadata for one address: a
//! search-style lookup and a direct account-info lookup. Both are reduced
//! to an [`EntityLookup`] here; the merge policy lives in the models
//! layer.

use async_trait::async_trait;
use serde_json::Value;

use crate::cache::Cache;
use crate::config::Config;
use crate::errors::{AnalyzerError, AnalyzerResult};
use crate::models::entity::EntityLookup;

use super::EntityProvider;

/// HTTP client for the entity-metadata API.
pub struct SolscanClient {
    client: reqwest::Client,
    base_url: String,
    cookie: String,
    use_cache: bool,
}

impl SolscanClient {
    /// Create a new client from the configuration.
    pub fn new(config: &Config) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: config.solscan_base_url.clone(),
            cookie: config.solscan_cookie.clone(),
            use_cache: config.use_cache,
        }
    }

    async fn get_json(&self, url: &str, params: &[(&str, &str)]) -> AnalyzerResult<Value> {
        let response = self
            .client
            .get(url)
            .query(params)
            .header("accept", "application/json, text/plain, */*")
            .header("origin", "https://solscan.io")
            .header("referer", "https://solscan.io/")
            .header("cookie", self.cookie.as_str())
            .header(
                "user-agent",
                "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/140.0.0.0 Safari/537.36",
            )
            .send()
            .await
            .map_err(|e| AnalyzerError::Lookup(e.to_string()))?
            .error_for_status()
            .map_err(|e| AnalyzerError::Lookup(e.to_string()))?;

        response
            .json::<Value>()
            .await
            .map_err(|e| AnalyzerError::Lookup(e.to_string()))
    }

    fn cached(&self, kind: &str, address: &str) -> Option<EntityLookup> {
        if !self.use_cache {
            return None;
        }
        Cache::get(kind, address).ok().flatten()
    }

    fn store(&self, kind: &str, address: &str, lookup: &EntityLookup) {
        if !self.use_cache {
            return;
        }
        if let Err(e) = Cache::save(kind, address, lookup) {
            log::debug!("Failed to cache {} lookup for {}: {}", kind, address, e);
        }
    }
}

#[async_trait]
impl EntityProvider for SolscanClient {
    async fn search(&self, address: &str) -> AnalyzerResult<EntityLookup> {
        if let Some(hit) = self.cached("search", address) {
            return Ok(hit);
        }

        let url = format!("{}/search", self.base_url);
        let body = self.get_json(&url, &[("keyword", address)]).await?;
        let lookup = lookup_from_search(address, &body);
        self.store("search", address, &lookup);
        Ok(lookup)
    }

    async fn account_info(&self, address: &str) -> AnalyzerResult<EntityLookup> {
        if let Some(hit) = self.cached("account", address) {
            return Ok(hit);
        }

        let url = format!("{}/account", self.base_url);
        let body = self
            .get_json(&url, &[("address", address), ("view_as", "account")])
            .await?;
        let lookup = lookup_from_account(&body);
        self.store("account", address, &lookup);
        Ok(lookup)
    }
}

/// Reduce a search response to the fields the pipeline reads. The search
/// payload nests per-address account metadata under `metadata.accounts`.
pub fn lookup_from_search(address: &str, body: &Value) -> EntityLookup {
    let data = body
        .get("data")
        .map(|d| if d.is_array() { d.get(0).unwrap_or(d) } else { d })
        .cloned()
        .unwrap_or(Value::Null);

    let account_entry = body
        .pointer("/metadata/accounts")
        .and_then(|accounts| accounts.get(address))
        .cloned()
        .unwrap_or(Value::Null);

    EntityLookup {
        is_on_curve: data.get("isOnCurve").and_then(Value::as_bool),
        entity_type: string_field(&data, "type").or_else(|| string_field(&account_entry, "type")),
        account_type: string_field(&account_entry, "account_type"),
        account_label: string_field(&account_entry, "account_label")
            .or_else(|| string_field(&data, "name"))
            .or_else(|| string_field(&data, "tag")),
        account_tags: tag_list(&account_entry, "account_tags"),
        owner_program: string_field(&data, "ownerProgram"),
    }
}

/// Reduce an account-info response to the fields the pipeline reads. The
/// payload may nest under `data` or sit at the top level.
pub fn lookup_from_account(body: &Value) -> EntityLookup {
    let data = body.get("data").filter(|d| d.is_object()).unwrap_or(body);

    EntityLookup {
        is_on_curve: data.get("isOnCurve").and_then(Value::as_bool),
        entity_type: string_field(data, "type"),
        account_type: string_field(data, "account_type"),
        account_label: string_field(data, "account_label"),
        account_tags: tag_list(data, "account_tags"),
        owner_program: string_field(data, "ownerProgram"),
    }
}

fn string_field(value: &Value, key: &str) -> Option<String> {
    value.get(key).and_then(Value::as_str).map(str::to_string)
}

fn tag_list(value: &Value, key: &str) -> Vec<String> {
    value
        .get(key)
        .and_then(Value::as_array)
        .map(|tags| {
            tags.iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}
