//! Batch loading and accumulation.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use indexmap::IndexMap;

use geodepot_catalog::Product;
use geodepot_core::ProductLabel;

use crate::api::{CatalogApi, FetchError};

/// Fetches fixed-size product pages keyed by offset and tracks the total
/// available count in a counter shared with the pagination-termination
/// check.
#[derive(Debug)]
pub struct BatchLoader<A> {
    api: Arc<A>,
    total: Arc<AtomicUsize>,
}

impl<A> Clone for BatchLoader<A> {
    fn clone(&self) -> Self {
        Self {
            api: self.api.clone(),
            total: self.total.clone(),
        }
    }
}

impl<A: CatalogApi> BatchLoader<A> {
    pub fn new(api: Arc<A>) -> Self {
        Self {
            api,
            total: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// The shared total-count cell, also written by the search branch.
    pub fn shared_total(&self) -> Arc<AtomicUsize> {
        self.total.clone()
    }

    /// Last total count reported by the catalog (0 until the first fetch).
    pub fn known_total(&self) -> usize {
        self.total.load(Ordering::SeqCst)
    }

    /// Fetch `batch_size` products starting at `offset` and key them by
    /// label, preserving fetch order. Updates the shared total count.
    ///
    /// API failures propagate to the caller; there is no local retry.
    pub async fn load_batch(
        &self,
        offset: usize,
        batch_size: usize,
    ) -> Result<IndexMap<ProductLabel, Product>, BrowseError> {
        if batch_size == 0 {
            return Err(BrowseError::Validation(
                "batch size must be positive".to_string(),
            ));
        }

        let page = self.api.products(offset, batch_size).await?;
        self.total.store(page.count, Ordering::SeqCst);

        let mut batch = IndexMap::with_capacity(page.results.len());
        for product in page.results {
            batch.insert(product.label().clone(), product);
        }
        Ok(batch)
    }
}

/// Accumulated batches: label-keyed, ordered by first appearance, so the
/// display list always reflects the full set fetched so far.
#[derive(Debug, Clone, Default)]
pub struct ProductSet {
    by_label: IndexMap<ProductLabel, Product>,
}

impl ProductSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge one batch; labels seen before keep their original position.
    pub fn merge(&mut self, batch: IndexMap<ProductLabel, Product>) {
        for (label, product) in batch {
            self.by_label.insert(label, product);
        }
    }

    pub fn len(&self) -> usize {
        self.by_label.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_label.is_empty()
    }

    pub fn contains(&self, label: &ProductLabel) -> bool {
        self.by_label.contains_key(label)
    }

    /// The full accumulated list in display order.
    pub fn products(&self) -> Vec<Product> {
        self.by_label.values().cloned().collect()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum BrowseError {
    #[error("validation failed: {0}")]
    Validation(String),
    #[error(transparent)]
    Fetch(#[from] FetchError),
}
