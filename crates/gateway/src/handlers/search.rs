//! Search handler
//!
//! `POST /search` runs one query through the search store and the
//! summarizer, then reports the outcome to the telemetry sink. The three
//! upstream calls happen strictly in that order; nothing is retried.

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde::Serialize;
use serde_json::Value;

use crate::AppState;
use docrelay_common::{
    errors::{AppError, Result},
    metrics::{self, RequestMetrics},
    Documents, TelemetryEvent,
};

/// Search response
#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub answer: String,
    pub raw_results: Documents,
}

/// Search, summarize, and relay the answer
pub async fn search(
    State(state): State<AppState>,
    payload: std::result::Result<Json<Value>, JsonRejection>,
) -> Result<Json<SearchResponse>> {
    let request_metrics = RequestMetrics::start("/search");

    let result = relay(&state, payload).await;

    let outcome = match &result {
        Ok(_) => "success",
        Err(e) => e.code().as_label(),
    };
    request_metrics.finish(outcome);

    result.map(Json)
}

async fn relay(
    state: &AppState,
    payload: std::result::Result<Json<Value>, JsonRejection>,
) -> Result<SearchResponse> {
    let Json(payload) = payload.map_err(|rejection| AppError::InvalidFormat {
        message: rejection.body_text(),
    })?;

    let query = extract_query(&payload)?;

    match search_and_summarize(state, &query).await {
        Ok((answer, documents)) => {
            state
                .telemetry
                .log(&TelemetryEvent::Answered {
                    query: query.clone(),
                    results: documents.len(),
                })
                .await;

            tracing::info!(
                query = %query,
                results = documents.len(),
                answer_chars = answer.chars().count(),
                "Search completed"
            );

            Ok(SearchResponse {
                answer,
                raw_results: documents,
            })
        }
        Err(e) => {
            state
                .telemetry
                .log(&TelemetryEvent::Failed {
                    error: e.to_string(),
                    query,
                })
                .await;

            Err(e)
        }
    }
}

async fn search_and_summarize(state: &AppState, query: &str) -> Result<(String, Documents)> {
    let documents = state.search.search(query).await?;
    metrics::record_documents(documents.len());

    let answer = state.summarizer.summarize(query, &documents).await?;
    Ok((answer, documents))
}

/// Pull a usable query out of the request body
///
/// Absent, non-string, empty, and whitespace-only values are all missing.
fn extract_query(payload: &Value) -> Result<String> {
    payload
        .get("query")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|query| !query.is_empty())
        .map(str::to_string)
        .ok_or(AppError::MissingQuery)
}
