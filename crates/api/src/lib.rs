//! `geodepot-api` — the catalog HTTP API.
//!
//! Serves paginated product listings, full-text product search and metadata
//! sheets from an in-memory [`app::store::CatalogStore`].

pub mod app;
