//! Wire types for service API requests and responses.

use serde::{Deserialize, Serialize};

/// Response from the OCR service's recognize endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecognizeResponse {
    #[serde(default)]
    pub extracted_text: String,
}

/// Request body for the tokenizer service.
#[derive(Debug, Clone, Serialize)]
pub struct TokenizeRequest {
    pub text: String,
}

/// Response from the tokenizer service.
///
/// `chunked_text` and `vectors` are positionally aligned; `chunks` is
/// advisory and must not be trusted to equal either length.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenizeResponse {
    #[serde(default)]
    pub chunks: usize,
    #[serde(default)]
    pub chunked_text: Vec<String>,
    #[serde(default)]
    pub vectors: Vec<Vec<f32>>,
}

/// Request body for Ollama's /api/embeddings endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct EmbeddingRequest {
    pub model: String,
    pub prompt: String,
}

/// Response from Ollama's /api/embeddings endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct EmbeddingResponse {
    pub embedding: Vec<f32>,
}

/// Request body for Ollama's /api/generate endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct GenerateRequest {
    pub model: String,
    pub prompt: String,
    pub stream: bool,
}

/// Response from Ollama's /api/generate endpoint (non-streaming).
#[derive(Debug, Clone, Deserialize)]
pub struct GenerateResponse {
    #[serde(default)]
    pub response: String,
    #[serde(default)]
    pub done: bool,
}
