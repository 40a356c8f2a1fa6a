//! Tokenizer/embedding backends.

use crate::chunker::{ChunkConfig, Chunker};
use crate::error::{ServiceError, ServiceResult};
use crate::types::{EmbeddingRequest, EmbeddingResponse, TokenizeRequest, TokenizeResponse};
use async_trait::async_trait;
use docwatch_config::{ProcessingConfig, TokenizerConfig};
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// Chunked text with positionally aligned vectors.
///
/// `chunked_text[i]` corresponds to `vectors[i]`; `chunks` is what the
/// backend reported and is not guaranteed to equal either length.
#[derive(Debug, Clone, Default)]
pub struct Tokenized {
    pub chunks: usize,
    pub chunked_text: Vec<String>,
    pub vectors: Vec<Vec<f32>>,
}

/// Chunking and embedding of recognized text.
#[async_trait]
pub trait Tokenizer: Send + Sync {
    async fn tokenize(&self, text: &str) -> ServiceResult<Tokenized>;
}

/// Build the tokenizer selected by configuration.
pub fn tokenizer_from_config(
    config: &TokenizerConfig,
    processing: &ProcessingConfig,
) -> ServiceResult<Arc<dyn Tokenizer>> {
    match config.backend.as_str() {
        "http" => Ok(Arc::new(HttpTokenizer::from_config(config)?)),
        "ollama" => Ok(Arc::new(OllamaTokenizer::from_config(config, processing)?)),
        other => Err(ServiceError::InvalidConfig(format!(
            "unknown tokenizer backend: {}",
            other
        ))),
    }
}

/// Client for a remote tokenizer service that chunks and embeds in one call.
#[derive(Clone)]
pub struct HttpTokenizer {
    client: Client,
    host: String,
    timeout_seconds: u64,
}

impl HttpTokenizer {
    pub fn from_config(config: &TokenizerConfig) -> ServiceResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(ServiceError::Http)?;

        Ok(Self {
            client,
            host: config.host.trim_end_matches('/').to_string(),
            timeout_seconds: config.timeout_seconds,
        })
    }
}

#[async_trait]
impl Tokenizer for HttpTokenizer {
    async fn tokenize(&self, text: &str) -> ServiceResult<Tokenized> {
        let url = format!("{}/tokenize", self.host);
        debug!("Tokenizing {} chars via {}", text.len(), url);

        let request = TokenizeRequest {
            text: text.to_string(),
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

        let body: TokenizeResponse = response.json().await?;
        info!(
            "Tokenizer returned {} chunks, {} vectors",
            body.chunked_text.len(),
            body.vectors.len()
        );

        Ok(Tokenized {
            chunks: body.chunks,
            chunked_text: body.chunked_text,
            vectors: body.vectors,
        })
    }
}

/// Local chunking plus per-chunk embeddings from an Ollama server.
pub struct OllamaTokenizer {
    client: Client,
    host: String,
    model: String,
    chunker: Chunker,
    timeout_seconds: u64,
}

impl OllamaTokenizer {
    pub fn from_config(
        config: &TokenizerConfig,
        processing: &ProcessingConfig,
    ) -> ServiceResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(ServiceError::Http)?;

        Ok(Self {
            client,
            host: config.host.trim_end_matches('/').to_string(),
            model: config.embedding_model.clone(),
            chunker: Chunker::new(ChunkConfig::from_processing_config(processing)),
            timeout_seconds: config.timeout_seconds,
        })
    }

    async fn embed(&self, text: &str) -> ServiceResult<Vec<f32>> {
        let url = format!("{}/api/embeddings", self.host);

        let request = EmbeddingRequest {
            model: self.model.clone(),
            prompt: text.to_string(),
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

        let body: EmbeddingResponse = response.json().await?;
        Ok(body.embedding)
    }
}

#[async_trait]
impl Tokenizer for OllamaTokenizer {
    async fn tokenize(&self, text: &str) -> ServiceResult<Tokenized> {
        let chunked_text = self.chunker.chunk_text(text);
        debug!("Chunked text into {} pieces", chunked_text.len());

        let mut vectors = Vec::with_capacity(chunked_text.len());
        for chunk in &chunked_text {
            vectors.push(self.embed(chunk).await?);
        }

        Ok(Tokenized {
            chunks: chunked_text.len(),
            chunked_text,
            vectors,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_selection() {
        let processing = ProcessingConfig::default();
        let mut config = TokenizerConfig::default();
        assert!(tokenizer_from_config(&config, &processing).is_ok());

        config.backend = "ollama".to_string();
        assert!(tokenizer_from_config(&config, &processing).is_ok());

        config.backend = "abacus".to_string();
        assert!(matches!(
            tokenizer_from_config(&config, &processing),
            Err(ServiceError::InvalidConfig(_))
        ));
    }
}
