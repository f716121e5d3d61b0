//! In-process fake of the catalog API for unit tests.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use geodepot_catalog::{Metadata, Page, Product};
use geodepot_core::{MetadataRef, ProductLabel};

use crate::api::{CatalogApi, FetchError};

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Call {
    Products { offset: usize, limit: usize },
    Search(String),
    Metadata(MetadataRef),
}

/// Serves `product-000 .. product-NNN` and records every call.
pub(crate) struct FakeCatalog {
    products: Vec<Product>,
    metadata: HashMap<MetadataRef, Metadata>,
    products_delay: Option<Duration>,
    search_delay: Option<Duration>,
    failing: AtomicBool,
    calls: Mutex<Vec<Call>>,
}

impl FakeCatalog {
    pub(crate) fn with_products(n: usize) -> Self {
        let meta = MetadataRef::new("sheet").unwrap();
        let products = (0..n)
            .map(|i| {
                Product::new(
                    ProductLabel::new(format!("product-{i:03}")).unwrap(),
                    format!("Product {i}"),
                    meta.clone(),
                )
                .unwrap()
                .with_rank(i as u32)
            })
            .collect();
        Self {
            products,
            metadata: HashMap::new(),
            products_delay: None,
            search_delay: None,
            failing: AtomicBool::new(false),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn with_metadata(mut self, sheet: Metadata) -> Self {
        self.metadata.insert(sheet.id_name().clone(), sheet);
        self
    }

    pub(crate) fn with_products_delay(mut self, delay: Duration) -> Self {
        self.products_delay = Some(delay);
        self
    }

    #[allow(dead_code)]
    pub(crate) fn with_search_delay(mut self, delay: Duration) -> Self {
        self.search_delay = Some(delay);
        self
    }

    pub(crate) fn failing(self) -> Self {
        self.failing.store(true, Ordering::SeqCst);
        self
    }

    pub(crate) fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub(crate) fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn products_calls(&self) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|c| matches!(c, Call::Products { .. }))
            .collect()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl CatalogApi for FakeCatalog {
    async fn products(&self, offset: usize, limit: usize) -> Result<Page<Product>, FetchError> {
        self.record(Call::Products { offset, limit });
        if let Some(delay) = self.products_delay {
            tokio::time::sleep(delay).await;
        }
        if self.failing.load(Ordering::SeqCst) {
            return Err(FetchError::Api(500, "boom".to_string()));
        }
        let results = self
            .products
            .iter()
            .skip(offset)
            .take(limit)
            .cloned()
            .collect();
        Ok(Page::new(self.products.len(), results))
    }

    async fn search(&self, query: &str) -> Result<Page<Product>, FetchError> {
        self.record(Call::Search(query.to_string()));
        if let Some(delay) = self.search_delay {
            tokio::time::sleep(delay).await;
        }
        if self.failing.load(Ordering::SeqCst) {
            return Err(FetchError::Api(500, "boom".to_string()));
        }
        let results: Vec<Product> = self
            .products
            .iter()
            .filter(|p| p.matches_terms(query))
            .cloned()
            .collect();
        Ok(Page::new(results.len(), results))
    }

    async fn metadata(&self, id_name: &MetadataRef) -> Result<Option<Metadata>, FetchError> {
        self.record(Call::Metadata(id_name.clone()));
        if self.failing.load(Ordering::SeqCst) {
            return Err(FetchError::Network("connection refused".to_string()));
        }
        Ok(self.metadata.get(id_name).cloned())
    }
}
