//! In-memory catalog store backing the API.

use std::collections::HashMap;

use chrono::{TimeZone, Utc};

use geodepot_catalog::{Metadata, Page, Pricing, Product, ProductStatus};
use geodepot_core::{MetadataRef, ProductLabel};

/// Read-only catalog of products and metadata sheets.
///
/// Products are held in display-rank order (rank, then label) so paging is
/// a plain window over the listed subset.
#[derive(Debug)]
pub struct CatalogStore {
    products: Vec<Product>,
    metadata: HashMap<MetadataRef, Metadata>,
}

impl CatalogStore {
    pub fn new(mut products: Vec<Product>, metadata_sheets: Vec<Metadata>) -> Self {
        products.sort_by(|a, b| {
            a.rank()
                .cmp(&b.rank())
                .then_with(|| a.label().cmp(b.label()))
        });
        let metadata = metadata_sheets
            .into_iter()
            .map(|m| (m.id_name().clone(), m))
            .collect();
        Self { products, metadata }
    }

    /// One page of the published catalog. `count` is always the full number
    /// of listed products; an `offset` past the end yields empty `results`.
    pub fn page(&self, offset: usize, limit: usize) -> Page<Product> {
        let listed: Vec<&Product> = self.products.iter().filter(|p| p.is_listed()).collect();
        let results = listed
            .iter()
            .skip(offset)
            .take(limit)
            .map(|p| (*p).clone())
            .collect();
        Page::new(listed.len(), results)
    }

    /// Full-text search over the published catalog; `count` equals the
    /// number of hits (search is not paginated).
    pub fn search(&self, query: &str) -> Page<Product> {
        let results: Vec<Product> = self
            .products
            .iter()
            .filter(|p| p.is_listed() && p.matches_terms(query))
            .cloned()
            .collect();
        Page::new(results.len(), results)
    }

    pub fn metadata(&self, id_name: &MetadataRef) -> Option<Metadata> {
        self.metadata.get(id_name).cloned()
    }

    /// A small deterministic demo catalog, used by the binary and reusable
    /// from tests.
    pub fn with_fixtures() -> Self {
        let meta = |slug: &str| MetadataRef::new(slug).unwrap();
        let label = |s: &str| ProductLabel::new(s).unwrap();

        let sheets = vec![
            Metadata::new(meta("water-network"), "Drinking water network")
                .unwrap()
                .with_summary("All pipes, valves and reservoirs of the municipal network")
                .with_contact("GIS office")
                .with_geoportal_link("https://map.example.org/water")
                .with_revised_at(Utc.with_ymd_and_hms(2024, 5, 14, 0, 0, 0).unwrap()),
            Metadata::new(meta("cadastre"), "Cadastral survey")
                .unwrap()
                .with_summary("Official parcel boundaries")
                .with_contact("Land registry"),
            Metadata::new(meta("orthophoto"), "Orthophoto 2024")
                .unwrap()
                .with_summary("Aerial imagery, 10cm resolution")
                .with_contact("Survey office"),
        ];

        let products = vec![
            Product::new(label("Réseau d'eau"), "Water network", meta("water-network"))
                .unwrap()
                .with_description("Drinking water distribution network")
                .with_provider("City of Ankh")
                .with_rank(1),
            Product::new(label("Cadastre"), "Cadastral parcels", meta("cadastre"))
                .unwrap()
                .with_description("Parcel boundaries and numbers")
                .with_provider("Land registry")
                .with_pricing(Pricing::ByArea {
                    unit_price_centimes: 2500,
                })
                .with_rank(2),
            Product::new(label("Orthophoto 2024"), "Orthophoto 2024", meta("orthophoto"))
                .unwrap()
                .with_description("Aerial imagery of the whole canton")
                .with_provider("Survey office")
                .with_pricing(Pricing::Fixed {
                    amount_centimes: 9900,
                })
                .with_rank(3),
            // Group member: reachable through its group, not listed alone.
            Product::new(
                label("Réseau d'eau — Morpork"),
                "Water network, Morpork section",
                meta("water-network"),
            )
            .unwrap()
            .with_group(label("Réseau d'eau"))
            .with_status(ProductStatus::PublishedOnlyInGroup)
            .with_rank(4),
            // Not published yet: absent from listings and search.
            Product::new(label("Zones à bâtir"), "Zoning plan", meta("cadastre"))
                .unwrap()
                .with_status(ProductStatus::Draft)
                .with_rank(5),
        ];

        Self::new(products, sheets)
    }
}
