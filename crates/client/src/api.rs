//! Catalog API access.
//!
//! The pipeline talks to the catalog through the [`CatalogApi`] trait so
//! tests can substitute an in-process fake for the HTTP client.

use async_trait::async_trait;

use geodepot_catalog::{Metadata, Page, Product};
use geodepot_core::MetadataRef;

/// The three read operations the browsing pipeline needs.
#[async_trait]
pub trait CatalogApi: Send + Sync + 'static {
    /// One page of the unfiltered catalog, `limit` items from `offset`.
    async fn products(&self, offset: usize, limit: usize) -> Result<Page<Product>, FetchError>;

    /// Full-text product search.
    async fn search(&self, query: &str) -> Result<Page<Product>, FetchError>;

    /// Metadata sheet lookup; `Ok(None)` when the ref is unknown.
    async fn metadata(&self, id_name: &MetadataRef) -> Result<Option<Metadata>, FetchError>;
}

/// HTTP implementation of [`CatalogApi`] against a geodepot API server.
#[derive(Debug, Clone)]
pub struct HttpCatalogClient {
    api_url: String,
    client: reqwest::Client,
}

impl HttpCatalogClient {
    pub fn new(api_url: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into().trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    async fn decode_page(resp: reqwest::Response) -> Result<Page<Product>, FetchError> {
        if !resp.status().is_success() {
            return Err(FetchError::Api(
                resp.status().as_u16(),
                resp.text().await.unwrap_or_default(),
            ));
        }
        resp.json()
            .await
            .map_err(|e| FetchError::Decode(e.to_string()))
    }
}

#[async_trait]
impl CatalogApi for HttpCatalogClient {
    async fn products(&self, offset: usize, limit: usize) -> Result<Page<Product>, FetchError> {
        let resp = self
            .client
            .get(format!("{}/products", self.api_url))
            .query(&[("offset", offset), ("limit", limit)])
            .send()
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?;
        Self::decode_page(resp).await
    }

    async fn search(&self, query: &str) -> Result<Page<Product>, FetchError> {
        let resp = self
            .client
            .get(format!("{}/search", self.api_url))
            .query(&[("q", query), ("type", "product")])
            .send()
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?;
        Self::decode_page(resp).await
    }

    async fn metadata(&self, id_name: &MetadataRef) -> Result<Option<Metadata>, FetchError> {
        let resp = self
            .client
            .get(format!("{}/metadata/{}", self.api_url, id_name))
            .send()
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?;

        if resp.status() == reqwest::StatusCode::NO_CONTENT {
            return Ok(None);
        }
        if !resp.status().is_success() {
            return Err(FetchError::Api(
                resp.status().as_u16(),
                resp.text().await.unwrap_or_default(),
            ));
        }
        resp.json()
            .await
            .map(Some)
            .map_err(|e| FetchError::Decode(e.to_string()))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("network error: {0}")]
    Network(String),
    #[error("API error ({0}): {1}")]
    Api(u16, String),
    #[error("decode error: {0}")]
    Decode(String),
}
