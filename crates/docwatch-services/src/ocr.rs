//! OCR backends.
//!
//! Text extraction is delegated either to a remote OCR service or to a
//! locally installed `tesseract` binary. Empty extracted text is a failure
//! in both backends: the pipeline must never persist an unrecognized
//! document as recognized.

use crate::error::{ServiceError, ServiceResult};
use crate::types::RecognizeResponse;
use async_trait::async_trait;
use docwatch_config::OcrConfig;
use reqwest::Client;
use std::path::Path;
use std::process::Command;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Text recognition over a document's bytes.
#[async_trait]
pub trait Recognizer: Send + Sync {
    /// Extract text from the file at `path`. Returns an error when the
    /// backend is unreachable or produced no text.
    async fn recognize(&self, path: &Path, file_name: &str) -> ServiceResult<String>;
}

/// Build the recognizer selected by configuration.
pub fn recognizer_from_config(config: &OcrConfig) -> ServiceResult<Arc<dyn Recognizer>> {
    match config.backend.as_str() {
        "http" => Ok(Arc::new(HttpOcr::from_config(config)?)),
        "tesseract" => Ok(Arc::new(TesseractOcr::new())),
        other => Err(ServiceError::InvalidConfig(format!(
            "unknown ocr backend: {}",
            other
        ))),
    }
}

/// Client for a remote OCR service.
#[derive(Clone)]
pub struct HttpOcr {
    client: Client,
    host: String,
    timeout_seconds: u64,
}

impl HttpOcr {
    pub fn from_config(config: &OcrConfig) -> ServiceResult<Self> {
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
impl Recognizer for HttpOcr {
    async fn recognize(&self, path: &Path, file_name: &str) -> ServiceResult<String> {
        let url = format!("{}/recognize", self.host);
        debug!("Recognizing {} via {}", file_name, url);

        let bytes = tokio::fs::read(path).await?;
        let part = reqwest::multipart::Part::bytes(bytes).file_name(file_name.to_string());
        let form = reqwest::multipart::Form::new().part("file", part);

        let response = self
            .client
            .post(&url)
            .multipart(form)
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

        let recognized: RecognizeResponse = response.json().await?;
        let text = recognized.extracted_text.trim().to_string();
        if text.is_empty() {
            return Err(ServiceError::EmptyRecognition {
                file_name: file_name.to_string(),
            });
        }

        debug!("Recognized {} chars from {}", text.len(), file_name);
        Ok(text)
    }
}

/// Local OCR via the `tesseract` binary.
pub struct TesseractOcr;

impl TesseractOcr {
    pub fn new() -> Self {
        Self
    }
}

impl Default for TesseractOcr {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Recognizer for TesseractOcr {
    async fn recognize(&self, path: &Path, file_name: &str) -> ServiceResult<String> {
        if which::which("tesseract").is_err() {
            return Err(ServiceError::ToolNotFound {
                tool: "tesseract".to_string(),
            });
        }

        let path = path.to_path_buf();
        let name = file_name.to_string();
        debug!("Running tesseract on {:?}", path);

        let output = tokio::task::spawn_blocking(move || {
            Command::new("tesseract")
                .arg(&path)
                .arg("stdout")
                .args(["--oem", "3"])
                .args(["--psm", "1"])
                .output()
        })
        .await
        .map_err(|e| ServiceError::Io(std::io::Error::new(std::io::ErrorKind::Other, e)))??;

        if !output.status.success() && output.stdout.is_empty() {
            let stderr = String::from_utf8_lossy(&output.stderr).to_string();
            return Err(ServiceError::ApiError {
                status: 0,
                message: stderr,
            });
        }

        let text = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if text.is_empty() {
            return Err(ServiceError::EmptyRecognition { file_name: name });
        }

        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_ocr_creation() {
        let config = OcrConfig::default();
        assert!(HttpOcr::from_config(&config).is_ok());
    }

    #[test]
    fn test_backend_selection() {
        let mut config = OcrConfig::default();
        assert!(recognizer_from_config(&config).is_ok());

        config.backend = "tesseract".to_string();
        assert!(recognizer_from_config(&config).is_ok());

        config.backend = "carrier-pigeon".to_string();
        assert!(matches!(
            recognizer_from_config(&config),
            Err(ServiceError::InvalidConfig(_))
        ));
    }
}
