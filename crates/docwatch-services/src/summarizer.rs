//! Summarizer backend over an Ollama-compatible LLM endpoint.
//!
//! Runs after persistence, outside the pipeline's transactional boundary:
//! the summary rewrites `content` and the thematic label becomes the
//! document class before a secondary store.

use crate::error::{ServiceError, ServiceResult};
use crate::types::{GenerateRequest, GenerateResponse};
use async_trait::async_trait;
use docwatch_config::SummarizerConfig;
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Summary and topic label for a document's content.
#[derive(Debug, Clone)]
pub struct Summary {
    pub summary: String,
    pub thematic: String,
}

#[async_trait]
pub trait Summarizer: Send + Sync {
    async fn summarize(&self, content: &str) -> ServiceResult<Summary>;
}

/// Build the summarizer when enabled by configuration.
pub fn summarizer_from_config(
    config: &SummarizerConfig,
) -> ServiceResult<Option<Arc<dyn Summarizer>>> {
    if !config.enabled {
        return Ok(None);
    }
    Ok(Some(Arc::new(OllamaSummarizer::from_config(config)?)))
}

/// LLM summarizer using Ollama's generate endpoint.
pub struct OllamaSummarizer {
    client: Client,
    host: String,
    model: String,
    timeout_seconds: u64,
}

impl OllamaSummarizer {
    pub fn from_config(config: &SummarizerConfig) -> ServiceResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(ServiceError::Http)?;

        Ok(Self {
            client,
            host: config.host.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            timeout_seconds: config.timeout_seconds,
        })
    }
}

#[async_trait]
impl Summarizer for OllamaSummarizer {
    async fn summarize(&self, content: &str) -> ServiceResult<Summary> {
        let url = format!("{}/api/generate", self.host);

        // Truncate content, leaving room for the prompt
        let truncated: String = content.chars().take(4000).collect();

        let prompt = format!(
            "Summarize the following document in 2-3 concise sentences, then on a \
             final line write 'Topic:' followed by a short topic label. Do not \
             include any preamble.\n\nDocument:\n{}",
            truncated
        );

        let request = GenerateRequest {
            model: self.model.clone(),
            prompt,
            stream: false,
        };

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| ServiceError::from_transport(e, &self.host, self.timeout_seconds))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ServiceError::ApiError {
                status: status.as_u16(),
                message,
            });
        }

        let body: GenerateResponse = response.json().await?;
        let parsed = parse_summary(&body.response);
        debug!(
            "Summarized {} chars into {} chars (topic: {})",
            content.len(),
            parsed.summary.len(),
            parsed.thematic
        );

        Ok(parsed)
    }
}

/// Split the model output into summary text and the trailing topic label.
fn parse_summary(response: &str) -> Summary {
    let mut summary_lines = Vec::new();
    let mut thematic = String::new();

    for line in response.trim().lines() {
        let trimmed = line.trim();
        if let Some(topic) = trimmed
            .strip_prefix("Topic:")
            .or_else(|| trimmed.strip_prefix("topic:"))
        {
            thematic = topic.trim().to_string();
        } else if !trimmed.is_empty() {
            summary_lines.push(trimmed);
        }
    }

    Summary {
        summary: summary_lines.join(" "),
        thematic,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_summary_with_topic() {
        let parsed = parse_summary("A report about quarterly sales.\nTopic: finance");
        assert_eq!(parsed.summary, "A report about quarterly sales.");
        assert_eq!(parsed.thematic, "finance");
    }

    #[test]
    fn test_parse_summary_without_topic() {
        let parsed = parse_summary("Just a summary.");
        assert_eq!(parsed.summary, "Just a summary.");
        assert!(parsed.thematic.is_empty());
    }

    #[test]
    fn test_disabled_summarizer_is_none() {
        let config = SummarizerConfig::default();
        assert!(summarizer_from_config(&config).unwrap().is_none());
    }
}
