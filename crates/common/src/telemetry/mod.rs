//! Best-effort telemetry sink
//!
//! Posts small JSON events to a webhook. Nothing here can fail from the
//! caller's point of view: every error ends in a debug log line and a counter.

use crate::config::TelemetryConfig;
use crate::metrics;
use serde::Serialize;

/// Event sent to the telemetry sink
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum TelemetryEvent {
    /// A query was answered
    Answered { query: String, results: usize },

    /// A query failed upstream
    Failed { error: String, query: String },
}

/// Telemetry logger
pub struct TelemetryLogger {
    client: Option<reqwest::Client>,
    url: String,
}

impl TelemetryLogger {
    /// Create a new telemetry logger
    pub fn new(config: &TelemetryConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| {
                tracing::warn!(error = %e, "Failed to create telemetry HTTP client, telemetry disabled");
            })
            .ok();

        Self {
            client,
            url: config.url.clone(),
        }
    }

    /// Post an event; failures are swallowed
    pub async fn log(&self, event: &TelemetryEvent) {
        if let Err(message) = self.try_log(event).await {
            metrics::record_telemetry_failure();
            tracing::debug!(error = %message, "Telemetry event dropped");
        }
    }

    async fn try_log(&self, event: &TelemetryEvent) -> std::result::Result<(), String> {
        let client = self.client.as_ref().ok_or("no HTTP client")?;

        let response = client
            .post(&self.url)
            .json(event)
            .send()
            .await
            .map_err(|e| e.to_string())?;

        if !response.status().is_success() {
            return Err(format!("sink returned {}", response.status()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};
    use serde_json::json;

    fn logger_for(url: String) -> TelemetryLogger {
        TelemetryLogger::new(&TelemetryConfig {
            url,
            timeout_ms: 500,
        })
    }

    #[test]
    fn test_event_serialization() {
        let answered = TelemetryEvent::Answered { query: "refund policy".into(), results: 3 };
        let failed = TelemetryEvent::Failed { error: "boom".into(), query: "refund policy".into() };

        assert_eq!(
            serde_json::to_value(&answered).unwrap(),
            json!({"query": "refund policy", "results": 3})
        );
        assert_eq!(
            serde_json::to_value(&failed).unwrap(),
            json!({"error": "boom", "query": "refund policy"})
        );
    }

    #[tokio::test]
    async fn test_log_posts_event() {
        let mut server = Server::new_async().await;
        let mock = server.mock("POST", "/hook")
            .match_body(Matcher::Json(json!({"query": "q", "results": 0})))
            .with_status(200)
            .expect(1)
            .create_async()
            .await;

        logger_for(format!("{}/hook", server.url()))
            .log(&TelemetryEvent::Answered { query: "q".into(), results: 0 })
            .await;

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_log_swallows_sink_errors() {
        let mut server = Server::new_async().await;
        let mock = server.mock("POST", "/hook")
            .match_body(Matcher::Json(json!({"error": "e", "query": "q"})))
            .with_status(500)
            .expect(1)
            .create_async()
            .await;

        logger_for(format!("{}/hook", server.url()))
            .log(&TelemetryEvent::Failed { error: "e".into(), query: "q".into() })
            .await;

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_log_swallows_unreachable_and_empty_urls() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        logger_for(format!("http://{}/hook", addr))
            .log(&TelemetryEvent::Answered { query: "q".into(), results: 1 })
            .await;

        logger_for(String::new())
            .log(&TelemetryEvent::Answered { query: "q".into(), results: 1 })
            .await;
    }
}
