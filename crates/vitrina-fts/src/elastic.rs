//! Elasticsearch-compatible REST backend.
//!
//! Catalog documents are indexed flat (record fields plus `sale_rate`),
//! so every hit's source deserializes straight into a `Product`. Search
//! uses a `match` query over item names; completion uses
//! `match_phrase_prefix` so partially typed names still rank.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use vitrina_catalog::Product;
use vitrina_core::{Error, Result};

use crate::backend::TextBackend;
use crate::types::TextConfig;

/// Field the catalog's display names are indexed under.
const SEARCH_FIELD: &str = "item_name";

/// REST client for an Elasticsearch-compatible text backend.
#[derive(Debug, Clone)]
pub struct ElasticBackend {
    base_url: String,
    index: String,
    client: reqwest::Client,
}

impl ElasticBackend {
    /// Creates a backend for `index` on the service at `base_url`.
    ///
    /// The timeout is the hard ceiling per query; a slower response
    /// surfaces as a timeout error, not a partial result.
    pub fn new(
        base_url: impl Into<String>,
        index: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::config(format!("building HTTP client: {e}")))?;
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            index: index.into(),
            client,
        })
    }

    /// Creates a backend from the text search configuration.
    pub fn from_config(config: &TextConfig) -> Result<Self> {
        Self::new(
            &config.url,
            &config.index,
            Duration::from_secs(config.timeout_secs),
        )
    }

    /// Base URL this backend talks to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Index queried by this backend.
    pub fn index(&self) -> &str {
        &self.index
    }

    /// Liveness check against the cluster health endpoint.
    pub async fn health(&self) -> Result<()> {
        let url = format!("{}/_cluster/health", self.base_url);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| send_error("checking cluster health", e))?;
        check_status("checking cluster health", response).await?;
        Ok(())
    }

    async fn run_query(&self, op: &str, body: serde_json::Value) -> Result<Vec<Product>> {
        let url = format!("{}/{}/_search", self.base_url, self.index);
        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| send_error(op, e))?;
        let response = check_status(op, response).await?;

        let parsed: SearchResponse = response
            .json()
            .await
            .map_err(|e| Error::serialization(format!("parsing {op} response: {e}")))?;
        Ok(parsed.hits.hits.into_iter().map(|h| h.source).collect())
    }
}

#[async_trait]
impl TextBackend for ElasticBackend {
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<Product>> {
        let hits = self
            .run_query("text search", match_body(query, limit))
            .await?;
        log::debug!("text search for {query:?} returned {} hits", hits.len());
        Ok(hits)
    }

    async fn complete(&self, prefix: &str, limit: usize) -> Result<Vec<Product>> {
        let hits = self
            .run_query("autocomplete", prefix_body(prefix, limit))
            .await?;
        log::debug!("autocomplete for {prefix:?} returned {} hits", hits.len());
        Ok(hits)
    }

    fn name(&self) -> &str {
        "elasticsearch"
    }
}

/// Request body for a full-text match query.
fn match_body(query: &str, limit: usize) -> serde_json::Value {
    serde_json::json!({
        "size": limit,
        "query": { "match": { SEARCH_FIELD: query } }
    })
}

/// Request body for a prefix completion query.
fn prefix_body(prefix: &str, limit: usize) -> serde_json::Value {
    serde_json::json!({
        "size": limit,
        "query": { "match_phrase_prefix": { SEARCH_FIELD: prefix } }
    })
}

fn send_error(op: &str, err: reqwest::Error) -> Error {
    if err.is_timeout() {
        Error::timeout(format!("{op}: request exceeded client timeout"))
    } else if err.is_connect() {
        Error::backend_transient(format!("{op}: {err}"))
    } else {
        Error::backend(format!("{op}: {err}"))
    }
}

async fn check_status(op: &str, response: reqwest::Response) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "unable to read error body".to_string());
    let message = format!("{op}: HTTP {status}: {body}");
    if status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
        Err(Error::backend_transient(message))
    } else {
        Err(Error::backend(message))
    }
}

// ============================================================================
// Wire types
// ============================================================================

#[derive(Debug, Deserialize)]
struct SearchResponse {
    hits: HitsWrapper,
}

#[derive(Debug, Deserialize)]
struct HitsWrapper {
    hits: Vec<HitWire>,
}

#[derive(Debug, Deserialize)]
struct HitWire {
    #[serde(rename = "_source")]
    source: Product,
}

#[cfg(test)]
mod tests {
    use super::*;

    // ------------------------------------------------------------------------
    // Construction
    // ------------------------------------------------------------------------

    #[test]
    fn test_backend_construction_trims_trailing_slash() {
        let backend =
            ElasticBackend::new("http://localhost:9200/", "idx", Duration::from_secs(5)).unwrap();
        assert_eq!(backend.base_url(), "http://localhost:9200");
        assert_eq!(backend.index(), "idx");
    }

    #[test]
    fn test_backend_from_config() {
        let backend = ElasticBackend::from_config(&TextConfig::default()).unwrap();
        assert_eq!(backend.base_url(), "http://localhost:9200");
        assert_eq!(backend.index(), "text_search_index");
        assert_eq!(backend.name(), "elasticsearch");
    }

    // ------------------------------------------------------------------------
    // Query bodies
    // ------------------------------------------------------------------------

    #[test]
    fn test_match_body_shape() {
        let body = match_body("red sneaker", 3);
        assert_eq!(body["size"], 3);
        assert_eq!(body["query"]["match"]["item_name"], "red sneaker");
    }

    #[test]
    fn test_prefix_body_shape() {
        let body = prefix_body("red sn", 5);
        assert_eq!(body["size"], 5);
        assert_eq!(body["query"]["match_phrase_prefix"]["item_name"], "red sn");
    }

    // ------------------------------------------------------------------------
    // Wire parsing
    // ------------------------------------------------------------------------

    #[test]
    fn test_parse_search_response() {
        let json = r#"{
            "took": 4,
            "timed_out": false,
            "hits": {
                "total": { "value": 1, "relation": "eq" },
                "max_score": 1.92,
                "hits": [
                    {
                        "_index": "text_search_index",
                        "_id": "17",
                        "_score": 1.92,
                        "_source": {
                            "item_path": "/items/17",
                            "item_image": "https://img/17.jpg",
                            "item_name": "red sneaker",
                            "fixed_item_price": 100,
                            "sale_item_price": 75,
                            "sale_rate": 0.25,
                            "sales_number": 8,
                            "shop_path": "/shops/2",
                            "shop_name": "Shoe Palace"
                        }
                    }
                ]
            }
        }"#;
        let parsed: SearchResponse = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.hits.hits.len(), 1);
        let product = &parsed.hits.hits[0].source;
        assert_eq!(product.item_name, "red sneaker");
        assert_eq!(product.sale_rate, 0.25);
        assert_eq!(product.shop_name, "Shoe Palace");
    }

    #[test]
    fn test_parse_empty_hits() {
        let json = r#"{ "hits": { "hits": [] } }"#;
        let parsed: SearchResponse = serde_json::from_str(json).unwrap();
        assert!(parsed.hits.hits.is_empty());
    }

    // ------------------------------------------------------------------------
    // Integration (requires a live backend, run manually)
    // ------------------------------------------------------------------------

    #[tokio::test]
    #[ignore = "requires a running Elasticsearch at VITRINA_ELASTIC_URL"]
    async fn test_elastic_health_integration() {
        let url = std::env::var("VITRINA_ELASTIC_URL")
            .unwrap_or_else(|_| "http://localhost:9200".to_string());
        let backend =
            ElasticBackend::new(url, "text_search_index", Duration::from_secs(10)).unwrap();
        backend.health().await.unwrap();
    }
}
