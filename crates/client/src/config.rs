use std::time::Duration;

/// Tunables of the browsing pipeline.
///
/// Defaults mirror the production UI: 500ms search debounce, 500ms between
/// offset emissions, 3-character search threshold, 20-item batches.
#[derive(Debug, Clone)]
pub struct BrowseConfig {
    /// Items fetched per batch.
    pub batch_size: usize,
    /// Queries shorter than this reset to the unfiltered first page.
    pub min_query_len: usize,
    /// Quiet interval before a search input change takes effect.
    pub search_debounce: Duration,
    /// Minimum interval between offset emissions.
    pub scroll_throttle: Duration,
}

impl Default for BrowseConfig {
    fn default() -> Self {
        Self {
            batch_size: 20,
            min_query_len: 3,
            search_debounce: Duration::from_millis(500),
            scroll_throttle: Duration::from_millis(500),
        }
    }
}
