//! `geodepot-client` — the catalog browsing pipeline.
//!
//! Consumes the catalog API and exposes the pieces a catalog view needs:
//! batch loading with label-keyed accumulation, an infinite-scroll
//! controller, a debounced search pipeline merging into one display
//! stream, the cart store and lazy metadata lookup.

pub mod api;
pub mod cart;
pub mod config;
pub mod loader;
pub mod metadata;
pub mod pipeline;
pub mod scroll;

#[cfg(test)]
pub(crate) mod test_support;

pub use api::{CatalogApi, FetchError, HttpCatalogClient};
pub use cart::CartStore;
pub use config::BrowseConfig;
pub use loader::{BatchLoader, BrowseError, ProductSet};
pub use metadata::{MetadataDialog, MetadataOutcome, MetadataService, Notification};
pub use pipeline::{BrowsePipeline, BrowseState, UiEvent};
pub use scroll::ScrollController;
