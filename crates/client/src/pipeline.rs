//! The browsing pipeline: one event-loop task merging batch accumulation
//! and debounced text search into a single display stream.
//!
//! Fetches are spawned as tasks whose completions are fed back into the
//! loop's channel, so the display reflects whichever request *completed*
//! most recently, not which was issued first. In-flight requests are never
//! cancelled by newer ones; a stale completion can overwrite a fresher one
//! and that behavior is pinned by tests.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use indexmap::IndexMap;
use tokio::sync::{mpsc, watch};
use tokio::time::{Instant, sleep_until};
use tokio_stream::wrappers::WatchStream;

use geodepot_catalog::{Page, Product};
use geodepot_core::ProductLabel;

use crate::api::{CatalogApi, FetchError};
use crate::config::BrowseConfig;
use crate::loader::{BatchLoader, BrowseError, ProductSet};
use crate::scroll::ScrollController;

/// Input events reported by the embedding view.
#[derive(Debug, Clone)]
pub enum UiEvent {
    /// The virtual viewport now renders rows up to `range_end` (exclusive).
    Scrolled { range_end: usize },
    /// The search input changed.
    QueryChanged(String),
}

/// Output state observed by the view through the watch subscription.
#[derive(Debug, Clone, Default)]
pub struct BrowseState {
    /// Current display list, in order.
    pub products: Vec<Product>,
    /// Shared total count as last reported by the catalog or a search.
    pub total: usize,
    pub is_loading: bool,
    /// Message of the most recent failed fetch, if the latest request
    /// failed. Fatal to that request only; the pipeline keeps running.
    pub last_error: Option<String>,
}

enum Completion {
    Batch(Result<IndexMap<ProductLabel, Product>, BrowseError>),
    FirstPage(Result<IndexMap<ProductLabel, Product>, BrowseError>),
    Search(Result<Page<Product>, FetchError>),
}

/// Handle to a running pipeline task.
///
/// Dropping the handle aborts the task.
pub struct BrowsePipeline {
    events_tx: mpsc::UnboundedSender<UiEvent>,
    state_rx: watch::Receiver<BrowseState>,
    handle: tokio::task::JoinHandle<()>,
}

impl BrowsePipeline {
    pub fn spawn<A: CatalogApi>(api: Arc<A>, config: BrowseConfig) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let (completions_tx, completions_rx) = mpsc::unbounded_channel();
        let (state_tx, state_rx) = watch::channel(BrowseState::default());

        let loader = BatchLoader::new(api.clone());
        let task = PipelineTask {
            api,
            total: loader.shared_total(),
            loader,
            controller: ScrollController::new(config.scroll_throttle),
            set: ProductSet::new(),
            config,
            state_tx,
            completions_tx,
        };
        let handle = tokio::spawn(task.run(events_rx, completions_rx));

        Self {
            events_tx,
            state_rx,
            handle,
        }
    }

    /// Report a new rendered viewport range end.
    pub fn scrolled(&self, range_end: usize) {
        let _ = self.events_tx.send(UiEvent::Scrolled { range_end });
    }

    /// Report a search input change.
    pub fn query_changed(&self, text: impl Into<String>) {
        let _ = self.events_tx.send(UiEvent::QueryChanged(text.into()));
    }

    /// Subscribe to display-state updates.
    pub fn subscribe(&self) -> watch::Receiver<BrowseState> {
        self.state_rx.clone()
    }

    /// The display states as an async `Stream`, for view layers that
    /// consume streams rather than watch receivers.
    pub fn state_stream(&self) -> WatchStream<BrowseState> {
        WatchStream::new(self.state_rx.clone())
    }
}

impl Drop for BrowsePipeline {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

struct PipelineTask<A: CatalogApi> {
    api: Arc<A>,
    loader: BatchLoader<A>,
    /// Shared with the loader; the search branch writes it too.
    total: Arc<AtomicUsize>,
    controller: ScrollController,
    set: ProductSet,
    config: BrowseConfig,
    state_tx: watch::Sender<BrowseState>,
    completions_tx: mpsc::UnboundedSender<Completion>,
}

impl<A: CatalogApi> PipelineTask<A> {
    async fn run(
        mut self,
        mut events_rx: mpsc::UnboundedReceiver<UiEvent>,
        mut completions_rx: mpsc::UnboundedReceiver<Completion>,
    ) {
        let mut pending_query: Option<String> = None;
        let mut debounce_deadline: Option<Instant> = None;

        loop {
            // Copy the deadline so the select arms below stay free to
            // reset it while this future is pending.
            let deadline = debounce_deadline;
            let debounce = async move {
                match deadline {
                    Some(deadline) => sleep_until(deadline).await,
                    None => std::future::pending::<()>().await,
                }
            };

            tokio::select! {
                event = events_rx.recv() => match event {
                    Some(UiEvent::Scrolled { range_end }) => self.on_scrolled(range_end),
                    Some(UiEvent::QueryChanged(text)) => {
                        pending_query = Some(text);
                        debounce_deadline =
                            Some(Instant::now() + self.config.search_debounce);
                    }
                    // All senders gone: the UI went away.
                    None => break,
                },
                Some(done) = completions_rx.recv() => self.on_completion(done),
                _ = debounce => {
                    debounce_deadline = None;
                    if let Some(text) = pending_query.take() {
                        self.on_debounced_query(&text);
                    }
                }
            }
        }
    }

    fn on_scrolled(&mut self, range_end: usize) {
        let total = self.loader.known_total();
        let Some(offset) =
            self.controller
                .on_scroll(range_end, self.set.len(), total, Instant::now())
        else {
            return;
        };

        tracing::debug!(offset, "requesting catalog batch");
        self.set_loading();

        let loader = self.loader.clone();
        let batch_size = self.config.batch_size;
        let tx = self.completions_tx.clone();
        tokio::spawn(async move {
            let result = loader.load_batch(offset, batch_size).await;
            let _ = tx.send(Completion::Batch(result));
        });
    }

    fn on_debounced_query(&mut self, text: &str) {
        let query = text.trim().to_string();

        if query.chars().count() < self.config.min_query_len {
            // Short or empty input: back to the unfiltered first page.
            tracing::debug!("query below threshold, resetting to first page");
            self.set_loading();

            let loader = self.loader.clone();
            let batch_size = self.config.batch_size;
            let tx = self.completions_tx.clone();
            tokio::spawn(async move {
                let result = loader.load_batch(0, batch_size).await;
                let _ = tx.send(Completion::FirstPage(result));
            });
            return;
        }

        tracing::debug!(query = %query, "issuing product search");
        self.set_loading();

        let api = self.api.clone();
        let tx = self.completions_tx.clone();
        tokio::spawn(async move {
            let result = api.search(&query).await;
            let _ = tx.send(Completion::Search(result));
        });
    }

    fn on_completion(&mut self, done: Completion) {
        match done {
            Completion::Batch(Ok(batch)) => {
                self.controller.complete();
                self.set.merge(batch);
                let products = self.set.products();
                self.push(products);
            }
            Completion::Batch(Err(err)) => {
                self.controller.complete();
                tracing::error!(error = %err, "catalog batch fetch failed");
                self.fail(err.to_string());
            }
            Completion::FirstPage(Ok(batch)) => {
                // Replaces the display (leaving accumulation untouched);
                // the loader already refreshed the shared total.
                let products = batch.into_values().collect();
                self.push(products);
            }
            Completion::FirstPage(Err(err)) => {
                tracing::error!(error = %err, "first-page fetch failed");
                self.fail(err.to_string());
            }
            Completion::Search(Ok(page)) => {
                self.total.store(page.count, Ordering::SeqCst);
                self.push(page.results);
            }
            Completion::Search(Err(err)) => {
                tracing::error!(error = %err, "product search failed");
                self.fail(err.to_string());
            }
        }
    }

    fn set_loading(&self) {
        self.state_tx.send_modify(|s| s.is_loading = true);
    }

    fn push(&self, products: Vec<Product>) {
        let total = self.total.load(Ordering::SeqCst);
        self.state_tx.send_replace(BrowseState {
            products,
            total,
            is_loading: false,
            last_error: None,
        });
    }

    fn fail(&self, message: String) {
        self.state_tx.send_modify(|s| {
            s.is_loading = false;
            s.last_error = Some(message);
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use crate::test_support::{Call, FakeCatalog};

    fn test_config() -> BrowseConfig {
        BrowseConfig {
            batch_size: 20,
            min_query_len: 3,
            search_debounce: Duration::from_millis(500),
            scroll_throttle: Duration::ZERO,
        }
    }

    async fn wait_for(
        rx: &mut watch::Receiver<BrowseState>,
        pred: impl Fn(&BrowseState) -> bool,
    ) -> BrowseState {
        tokio::time::timeout(Duration::from_secs(5), async {
            loop {
                {
                    let state = rx.borrow();
                    if pred(&state) {
                        return state.clone();
                    }
                }
                rx.changed().await.unwrap();
            }
        })
        .await
        .expect("pipeline did not reach the expected state")
    }

    #[tokio::test(start_paused = true)]
    async fn scrolling_accumulates_batches_until_the_total_is_reached() {
        let api = Arc::new(FakeCatalog::with_products(50));
        let pipeline = BrowsePipeline::spawn(api.clone(), test_config());
        let mut rx = pipeline.subscribe();

        pipeline.scrolled(0);
        let state = wait_for(&mut rx, |s| s.products.len() == 20).await;
        assert_eq!(state.total, 50);
        assert!(!state.is_loading);

        pipeline.scrolled(20);
        wait_for(&mut rx, |s| s.products.len() == 40).await;

        pipeline.scrolled(40);
        let state = wait_for(&mut rx, |s| s.products.len() == 50).await;
        assert_eq!(state.total, 50);

        // All 50 loaded: scrolling to the end emits nothing further.
        pipeline.scrolled(50);
        tokio::time::sleep(Duration::from_secs(1)).await;
        let offsets: Vec<usize> = api
            .products_calls()
            .iter()
            .map(|c| match c {
                Call::Products { offset, .. } => *offset,
                other => panic!("unexpected call {other:?}"),
            })
            .collect();
        assert_eq!(offsets, vec![0, 20, 40]);
    }

    #[tokio::test(start_paused = true)]
    async fn short_queries_reset_to_the_unfiltered_first_page() {
        let api = Arc::new(FakeCatalog::with_products(50));
        let pipeline = BrowsePipeline::spawn(api.clone(), test_config());
        let mut rx = pipeline.subscribe();

        pipeline.query_changed("ab");
        let state = wait_for(&mut rx, |s| !s.products.is_empty()).await;

        assert_eq!(state.products.len(), 20);
        assert_eq!(state.total, 50);
        let calls = api.calls();
        assert!(calls.contains(&Call::Products {
            offset: 0,
            limit: 20
        }));
        assert!(!calls.iter().any(|c| matches!(c, Call::Search(_))));
    }

    #[tokio::test(start_paused = true)]
    async fn long_queries_replace_the_display_with_search_results() {
        let api = Arc::new(FakeCatalog::with_products(50));
        let pipeline = BrowsePipeline::spawn(api.clone(), test_config());
        let mut rx = pipeline.subscribe();

        pipeline.query_changed("product-01");
        let state = wait_for(&mut rx, |s| !s.products.is_empty()).await;

        // product-010 .. product-019
        assert_eq!(state.products.len(), 10);
        assert_eq!(state.total, 10);
        assert_eq!(api.calls(), vec![Call::Search("product-01".to_string())]);
    }

    #[tokio::test(start_paused = true)]
    async fn rapid_typing_is_debounced_to_a_single_search() {
        let api = Arc::new(FakeCatalog::with_products(50));
        let pipeline = BrowsePipeline::spawn(api.clone(), test_config());
        let mut rx = pipeline.subscribe();

        pipeline.query_changed("pro");
        pipeline.query_changed("produ");
        pipeline.query_changed("product-01");

        wait_for(&mut rx, |s| !s.products.is_empty()).await;
        assert_eq!(api.calls(), vec![Call::Search("product-01".to_string())]);
    }

    #[tokio::test(start_paused = true)]
    async fn the_later_completion_wins_regardless_of_issue_order() {
        // Search resolves fast; the batch fetch is slow. The batch was
        // requested first but completes last, so it overwrites the search
        // results in the display. Pinned behavior, not a bug.
        let api = Arc::new(
            FakeCatalog::with_products(50).with_products_delay(Duration::from_millis(800)),
        );
        let pipeline = BrowsePipeline::spawn(api.clone(), test_config());
        let mut rx = pipeline.subscribe();

        pipeline.scrolled(0);
        pipeline.query_changed("product-01");

        // Search lands first (debounce 500ms + no delay).
        let state = wait_for(&mut rx, |s| s.products.len() == 10).await;
        assert_eq!(state.total, 10);

        // The slow batch lands afterwards and overwrites the display.
        let state = wait_for(&mut rx, |s| s.products.len() == 20).await;
        assert_eq!(state.total, 50);
    }

    #[tokio::test(start_paused = true)]
    async fn a_failed_fetch_is_fatal_to_that_request_only() {
        let api = Arc::new(FakeCatalog::with_products(50).failing());
        let pipeline = BrowsePipeline::spawn(api.clone(), test_config());
        let mut rx = pipeline.subscribe();

        pipeline.scrolled(0);
        let state = wait_for(&mut rx, |s| s.last_error.is_some()).await;
        assert!(!state.is_loading);
        assert!(state.products.is_empty());

        // The loop is still alive and serves the next request.
        api.set_failing(false);
        tokio::time::advance(Duration::from_millis(600)).await;
        pipeline.query_changed("product-01");
        let state = wait_for(&mut rx, |s| !s.products.is_empty()).await;
        assert_eq!(state.products.len(), 10);
        assert!(state.last_error.is_none());
    }
}
