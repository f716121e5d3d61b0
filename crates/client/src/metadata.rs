//! Lazy metadata lookup with a ref-keyed cache.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use geodepot_catalog::{Metadata, Product};
use geodepot_core::MetadataRef;

use crate::api::CatalogApi;

/// Fixed dialog dimensions used when displaying a metadata sheet.
pub const DIALOG_WIDTH_PCT: u8 = 60;
pub const DIALOG_HEIGHT_PCT: u8 = 90;

/// How long the "metadata unavailable" notification stays on screen.
pub const NOTICE_DURATION: Duration = Duration::from_millis(3000);

/// What the UI should do after a metadata request.
#[derive(Debug, Clone, PartialEq)]
pub enum MetadataOutcome {
    /// Open a presentation dialog with the sheet.
    Dialog(MetadataDialog),
    /// Show a transient dismissible notification instead.
    Notice(Notification),
}

#[derive(Debug, Clone, PartialEq)]
pub struct MetadataDialog {
    pub metadata: Metadata,
    pub width_pct: u8,
    pub height_pct: u8,
}

impl MetadataDialog {
    fn new(metadata: Metadata) -> Self {
        Self {
            metadata,
            width_pct: DIALOG_WIDTH_PCT,
            height_pct: DIALOG_HEIGHT_PCT,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub message: String,
    pub duration: Duration,
}

/// Resolves product metadata on demand, caching sheets by ref so opening
/// the same product twice fetches once.
pub struct MetadataService<A> {
    api: Arc<A>,
    cache: Mutex<HashMap<MetadataRef, Metadata>>,
}

impl<A: CatalogApi> MetadataService<A> {
    pub fn new(api: Arc<A>) -> Self {
        Self {
            api,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Resolve and present the metadata of `product`.
    ///
    /// Fetch failures and dangling refs both degrade to a notification;
    /// the dialog only opens on a hit.
    pub async fn open_metadata(&self, product: &Product) -> MetadataOutcome {
        let id_name = product.metadata_ref();

        let cached = self.cache.lock().unwrap().get(id_name).cloned();
        if let Some(metadata) = cached {
            return MetadataOutcome::Dialog(MetadataDialog::new(metadata));
        }

        match self.api.metadata(id_name).await {
            Ok(Some(metadata)) => {
                self.cache
                    .lock()
                    .unwrap()
                    .insert(id_name.clone(), metadata.clone());
                MetadataOutcome::Dialog(MetadataDialog::new(metadata))
            }
            Ok(None) => {
                tracing::warn!(product = %product.label(), "product has no metadata sheet");
                Self::unavailable()
            }
            Err(err) => {
                tracing::warn!(error = %err, "metadata fetch failed");
                Self::unavailable()
            }
        }
    }

    fn unavailable() -> MetadataOutcome {
        MetadataOutcome::Notice(Notification {
            message: "metadata unavailable".to_string(),
            duration: NOTICE_DURATION,
        })
    }
}
