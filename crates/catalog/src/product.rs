use serde::{Deserialize, Serialize};

use geodepot_core::{DomainError, DomainResult, MetadataRef, ProductLabel};

/// Publication status of a catalog product.
///
/// Only `Published` products appear in unfiltered listings and in search
/// results. `PublishedOnlyInGroup` products are reachable through their
/// group but never listed on their own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductStatus {
    Draft,
    Published,
    PublishedOnlyInGroup,
    Deprecated,
}

/// How a product is priced. Enough to render a price tag; quote
/// computation is out of scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum Pricing {
    Free,
    /// Flat price in centimes.
    Fixed { amount_centimes: u64 },
    /// Price scales with the requested area; unit price per km² in centimes.
    ByArea { unit_price_centimes: u64 },
    /// Price is established manually by an operator.
    Manual,
}

impl Pricing {
    pub fn is_free(&self) -> bool {
        matches!(self, Pricing::Free)
    }
}

/// A geodata product as served by the catalog.
///
/// Immutable once fetched by a client; lazily-loaded metadata lives in a
/// client-side cache keyed by [`MetadataRef`], never on the product itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    label: ProductLabel,
    name: String,
    metadata: MetadataRef,
    description: String,
    provider: String,
    pricing: Pricing,
    status: ProductStatus,
    /// Products can belong to a named group; ordering the group orders its
    /// members.
    group: Option<ProductLabel>,
    /// Display rank in catalog listings (ascending).
    rank: u32,
}

impl Product {
    /// Create a published product with default pricing and rank.
    pub fn new(
        label: ProductLabel,
        name: impl Into<String>,
        metadata: MetadataRef,
    ) -> DomainResult<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(DomainError::validation("name cannot be empty"));
        }
        Ok(Self {
            label,
            name,
            metadata,
            description: String::new(),
            provider: String::new(),
            pricing: Pricing::Free,
            status: ProductStatus::Published,
            group: None,
            rank: 0,
        })
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_provider(mut self, provider: impl Into<String>) -> Self {
        self.provider = provider.into();
        self
    }

    pub fn with_pricing(mut self, pricing: Pricing) -> Self {
        self.pricing = pricing;
        self
    }

    pub fn with_status(mut self, status: ProductStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_group(mut self, group: ProductLabel) -> Self {
        self.group = Some(group);
        self
    }

    pub fn with_rank(mut self, rank: u32) -> Self {
        self.rank = rank;
        self
    }

    pub fn label(&self) -> &ProductLabel {
        &self.label
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn metadata_ref(&self) -> &MetadataRef {
        &self.metadata
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn provider(&self) -> &str {
        &self.provider
    }

    pub fn pricing(&self) -> &Pricing {
        &self.pricing
    }

    pub fn status(&self) -> ProductStatus {
        self.status
    }

    pub fn group(&self) -> Option<&ProductLabel> {
        self.group.as_ref()
    }

    pub fn rank(&self) -> u32 {
        self.rank
    }

    /// Whether the product appears in unfiltered listings and search.
    pub fn is_listed(&self) -> bool {
        self.status == ProductStatus::Published
    }

    /// Case-insensitive all-terms match over label, name and description.
    ///
    /// An empty query matches nothing; whitespace splits terms.
    pub fn matches_terms(&self, query: &str) -> bool {
        let haystack = format!(
            "{} {} {}",
            self.label.as_str(),
            self.name,
            self.description
        )
        .to_lowercase();

        let mut terms = query.split_whitespace().peekable();
        if terms.peek().is_none() {
            return false;
        }
        terms.all(|t| haystack.contains(&t.to_lowercase()))
    }
}
