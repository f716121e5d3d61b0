use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use geodepot_core::{DomainError, DomainResult, MetadataRef};

/// A metadata sheet describing the provenance of one or more products.
///
/// Addressed by a stable slug ([`MetadataRef`]); a product's ref may dangle
/// when the sheet has not been written yet, in which case lookups come back
/// empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    id_name: MetadataRef,
    title: String,
    summary: String,
    contact: String,
    geoportal_link: Option<String>,
    revised_at: Option<DateTime<Utc>>,
}

impl Metadata {
    pub fn new(
        id_name: MetadataRef,
        title: impl Into<String>,
    ) -> DomainResult<Self> {
        let title = title.into();
        if title.trim().is_empty() {
            return Err(DomainError::validation("title cannot be empty"));
        }
        Ok(Self {
            id_name,
            title,
            summary: String::new(),
            contact: String::new(),
            geoportal_link: None,
            revised_at: None,
        })
    }

    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = summary.into();
        self
    }

    pub fn with_contact(mut self, contact: impl Into<String>) -> Self {
        self.contact = contact.into();
        self
    }

    pub fn with_geoportal_link(mut self, link: impl Into<String>) -> Self {
        self.geoportal_link = Some(link.into());
        self
    }

    pub fn with_revised_at(mut self, at: DateTime<Utc>) -> Self {
        self.revised_at = Some(at);
        self
    }

    pub fn id_name(&self) -> &MetadataRef {
        &self.id_name
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn summary(&self) -> &str {
        &self.summary
    }

    pub fn contact(&self) -> &str {
        &self.contact
    }

    pub fn geoportal_link(&self) -> Option<&str> {
        self.geoportal_link.as_deref()
    }

    pub fn revised_at(&self) -> Option<DateTime<Utc>> {
        self.revised_at
    }
}
