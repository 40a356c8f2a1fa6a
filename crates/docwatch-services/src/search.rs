//! Search/index service client.

use crate::error::{ServiceError, ServiceResult};
use async_trait::async_trait;
use docwatch_config::SearchConfig;
use docwatch_core::Document;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

/// Terminal sink for enriched documents.
///
/// `store` is idempotent on the document id: repeated stores of the same id
/// overwrite the previous version at the destination.
#[async_trait]
pub trait SearchSink: Send + Sync {
    async fn store(&self, destination: &str, document: &Document) -> ServiceResult<()>;
}

/// Build the search sink from configuration.
pub fn search_from_config(config: &SearchConfig) -> ServiceResult<HttpSearch> {
    HttpSearch::from_config(config)
}

/// Client for an HTTP search/index service.
#[derive(Clone)]
pub struct HttpSearch {
    client: Client,
    host: String,
    timeout_seconds: u64,
}

impl HttpSearch {
    pub fn from_config(config: &SearchConfig) -> ServiceResult<Self> {
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
impl SearchSink for HttpSearch {
    async fn store(&self, destination: &str, document: &Document) -> ServiceResult<()> {
        let url = format!(
            "{}/indexes/{}/documents/{}",
            self.host, destination, document.document_id
        );
        debug!("Storing {} to {}", document.document_name, url);

        let response = self
            .client
            .put(&url)
            .json(document)
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

        Ok(())
    }
}
