//! Elasticsearch document store over the REST API.

use std::time::Duration;

use reqwest::{Client, Response, StatusCode};

use super::DocumentStore;
use crate::error::StorageError;
use crate::ingest::CodeLine;
use crate::Result;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Client for a single Elasticsearch cluster.
#[derive(Debug, Clone)]
pub struct ElasticStore {
    client: Client,
    base_url: String,
}

impl ElasticStore {
    /// Build a client for `base_url` without contacting the cluster.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(format!("codesearch/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| StorageError::Connection(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Build a client and verify the cluster answers.
    ///
    /// # Errors
    ///
    /// Returns an error if the cluster is unreachable or unhealthy.
    pub async fn connect(base_url: impl Into<String>) -> Result<Self> {
        let store = Self::new(base_url)?;
        store.ping().await?;
        Ok(store)
    }

    /// Check that the cluster root endpoint responds with success.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the status is not 2xx.
    pub async fn ping(&self) -> Result<()> {
        let response = self
            .client
            .get(&self.base_url)
            .send()
            .await
            .map_err(|e| StorageError::Connection(format!("{}: {e}", self.base_url)))?;

        check_status("ping", response).await?;
        tracing::debug!(url = %self.base_url, "Elasticsearch reachable");
        Ok(())
    }

    /// Base URL requests are sent to.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn index_url(&self, index: &str) -> String {
        format!("{}/{index}", self.base_url)
    }
}

impl DocumentStore for ElasticStore {
    async fn index_exists(&self, index: &str) -> Result<bool> {
        let response = self
            .client
            .head(self.index_url(index))
            .send()
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;

        match response.status() {
            StatusCode::OK => Ok(true),
            StatusCode::NOT_FOUND => Ok(false),
            status => Err(StorageError::request("index exists", status.as_u16(), "").into()),
        }
    }

    async fn delete_index(&self, index: &str) -> Result<()> {
        let response = self
            .client
            .delete(self.index_url(index))
            .send()
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;

        check_status("delete index", response).await
    }

    async fn index_document(&self, index: &str, doc: &CodeLine) -> Result<()> {
        let response = self
            .client
            .post(format!("{}/_doc", self.index_url(index)))
            .json(doc)
            .send()
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;

        check_status("index document", response).await
    }
}

async fn check_status(operation: &'static str, response: Response) -> Result<()> {
    let status = response.status();
    if status.is_success() {
        return Ok(());
    }
    let body = response.text().await.unwrap_or_default();
    Err(StorageError::request(operation, status.as_u16(), body).into())
}
