//! Summarizer - condenses search results into a short answer
//!
//! Sends a single chat-completion request per query. The retrieved documents
//! are embedded verbatim in the prompt with no size cap.

use crate::config::SummarizerConfig;
use crate::errors::{AppError, Result};
use crate::metrics;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Instant;

/// Trait for answer generation
#[async_trait]
pub trait Summarizer: Send + Sync {
    /// Summarize the documents retrieved for a query
    async fn summarize(&self, query: &str, documents: &[Value]) -> Result<String>;
}

/// Build the summarization prompt
pub fn build_prompt(query: &str, documents: &[Value]) -> Result<String> {
    let documents = serde_json::to_string(documents)?;
    Ok(format!(
        "Summarize the following search results into 3–4 sentences.\n\
        User query: {}\n\
        Documents: {}\n",
        query, documents
    ))
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessageResponse,
}

#[derive(Deserialize)]
struct ChatMessageResponse {
    content: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

/// Chat-completion backed summarizer
pub struct ChatSummarizer {
    config: SummarizerConfig,
    endpoint: String,
    client: reqwest::Client,
}

impl ChatSummarizer {
    /// Create a new summarizer
    pub fn new(config: SummarizerConfig) -> Result<Self> {
        // No request timeout, same as the search store
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| AppError::Internal {
                message: format!("Failed to create HTTP client: {}", e),
            })?;

        let endpoint = format!("{}/chat/completions", config.api_base.trim_end_matches('/'));

        Ok(Self { config, endpoint, client })
    }

    /// Call the chat-completion API
    async fn call_llm(&self, prompt: &str) -> Result<String> {
        let request = ChatRequest {
            model: &self.config.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
        };

        let response = self.client
            .post(&self.endpoint)
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| AppError::Summarizer {
                message: format!("LLM API request failed: {}", e),
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Summarizer {
                message: format!("LLM API error {}: {}", status, body),
            });
        }

        let chat_response: ChatResponse = response.json().await
            .map_err(|e| AppError::Summarizer {
                message: format!("Failed to parse LLM response: {}", e),
            })?;

        chat_response.choices.into_iter().next()
            .map(|c| c.message.content)
            .ok_or_else(|| AppError::Summarizer {
                message: "Empty response from LLM".to_string(),
            })
    }
}

#[async_trait]
impl Summarizer for ChatSummarizer {
    async fn summarize(&self, query: &str, documents: &[Value]) -> Result<String> {
        let prompt = build_prompt(query, documents)?;
        tracing::debug!(prompt_bytes = prompt.len(), model = %self.config.model, "Calling summarizer");

        let start = Instant::now();
        let result = self.call_llm(&prompt).await;
        metrics::record_upstream("summarizer", start.elapsed().as_secs_f64(), result.is_ok());
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};
    use serde_json::json;

    fn summarizer_for(server: &Server) -> ChatSummarizer {
        ChatSummarizer::new(SummarizerConfig {
            api_key: "sk-test".to_string(),
            api_base: server.url(),
            ..SummarizerConfig::default()
        })
        .unwrap()
    }

    #[test]
    fn test_prompt_embeds_query_and_documents() {
        let documents = vec![json!({"id": 1, "content": "Refunds within 30 days"})];
        let prompt = build_prompt("refund policy", &documents).unwrap();

        assert!(prompt.starts_with("Summarize the following search results into 3–4 sentences."));
        assert!(prompt.contains("User query: refund policy\n"));
        assert!(prompt.contains(r#"Documents: [{"content":"Refunds within 30 days","id":1}]"#));
    }

    #[test]
    fn test_prompt_with_no_documents() {
        let prompt = build_prompt("anything", &[]).unwrap();
        assert!(prompt.contains("Documents: []"));
    }

    #[tokio::test]
    async fn test_summarize_request_shape() {
        let mut server = Server::new_async().await;
        let mock = server.mock("POST", "/chat/completions")
            .match_header("authorization", "Bearer sk-test")
            .match_body(Matcher::AllOf(vec![
                Matcher::PartialJson(json!({
                    "model": "gpt-4.1-mini",
                    "max_tokens": 250,
                    "temperature": 0.2
                })),
                Matcher::Regex(r#""role":"user""#.to_string()),
                Matcher::Regex("User query: refund policy".to_string()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{
                "choices": [{
                    "message": {
                        "role": "assistant",
                        "content": "We offer refunds within 30 days."
                    }
                }]
            }"#)
            .expect(1)
            .create_async()
            .await;

        let documents = vec![json!({"id": 1})];
        let answer = summarizer_for(&server)
            .summarize("refund policy", &documents)
            .await
            .unwrap();

        assert_eq!(answer, "We offer refunds within 30 days.");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_summarize_non_success_status() {
        let mut server = Server::new_async().await;
        let _mock = server.mock("POST", "/chat/completions")
            .with_status(429)
            .with_body("rate limited")
            .create_async()
            .await;

        let err = summarizer_for(&server).summarize("q", &[]).await.unwrap_err();
        assert!(matches!(err, AppError::Summarizer { .. }));
        assert!(err.to_string().contains("429"));
    }

    #[tokio::test]
    async fn test_summarize_empty_choices() {
        let mut server = Server::new_async().await;
        let _mock = server.mock("POST", "/chat/completions")
            .with_status(200)
            .with_body(r#"{"choices": []}"#)
            .create_async()
            .await;

        let err = summarizer_for(&server).summarize("q", &[]).await.unwrap_err();
        assert!(err.to_string().contains("Empty response from LLM"));
    }

    #[tokio::test]
    async fn test_summarize_missing_message_content() {
        let mut server = Server::new_async().await;
        let _mock = server.mock("POST", "/chat/completions")
            .with_status(200)
            .with_body(r#"{"choices": [{"message": {"role": "assistant"}}]}"#)
            .create_async()
            .await;

        let err = summarizer_for(&server).summarize("q", &[]).await.unwrap_err();
        assert!(err.to_string().contains("Failed to parse LLM response"));
    }
}
