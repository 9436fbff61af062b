//! Search store client
//!
//! Calls the store's `match_documents` remote procedure and hands back the
//! matching documents untouched. Documents are opaque JSON; only their count
//! is ever looked at.

use crate::config::SearchStoreConfig;
use crate::errors::{AppError, Result};
use crate::metrics;
use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use std::time::Instant;

/// Maximum number of documents requested per query
pub const MATCH_COUNT: u32 = 5;

/// Path of the remote procedure, relative to the store base URL
pub const MATCH_DOCUMENTS_PATH: &str = "/rest/v1/rpc/match_documents";

/// Documents returned by the search store
pub type Documents = Vec<Value>;

/// Trait for document retrieval
#[async_trait]
pub trait DocumentSearch: Send + Sync {
    /// Find documents matching the query text
    async fn search(&self, query: &str) -> Result<Documents>;
}

#[derive(Serialize)]
struct MatchDocumentsRequest<'a> {
    query_text: &'a str,
    match_count: u32,
}

/// HTTP client for the search store's RPC endpoint
pub struct SearchStoreClient {
    client: reqwest::Client,
    endpoint: String,
    service_key: String,
}

impl SearchStoreClient {
    /// Create a new search store client
    pub fn new(config: &SearchStoreConfig) -> Result<Self> {
        // No request timeout: a slow store blocks the request until it answers
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| AppError::Internal {
                message: format!("Failed to create HTTP client: {}", e),
            })?;

        Ok(Self {
            client,
            endpoint: format!("{}{}", config.url.trim_end_matches('/'), MATCH_DOCUMENTS_PATH),
            service_key: config.service_key.clone(),
        })
    }

    async fn make_request(&self, query: &str) -> Result<Documents> {
        let request = MatchDocumentsRequest {
            query_text: query,
            match_count: MATCH_COUNT,
        };

        let response = self.client
            .post(&self.endpoint)
            .header("apikey", &self.service_key)
            .header("Authorization", format!("Bearer {}", self.service_key))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| AppError::SearchStore {
                message: format!("Request failed: {}", e),
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::SearchStore {
                message: format!("API error {}: {}", status, body),
            });
        }

        let body: Value = response.json().await.map_err(|e| AppError::SearchStore {
            message: format!("Failed to parse response: {}", e),
        })?;

        match body {
            Value::Array(documents) => Ok(documents),
            other => Err(AppError::SearchStore {
                message: format!("Expected a JSON array of documents, got {}", json_kind(&other)),
            }),
        }
    }
}

#[async_trait]
impl DocumentSearch for SearchStoreClient {
    async fn search(&self, query: &str) -> Result<Documents> {
        let start = Instant::now();
        let result = self.make_request(query).await;
        metrics::record_upstream("search_store", start.elapsed().as_secs_f64(), result.is_ok());

        if let Ok(documents) = &result {
            tracing::debug!(documents = documents.len(), "Search store responded");
        }
        result
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
