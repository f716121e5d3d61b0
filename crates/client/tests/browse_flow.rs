//! End-to-end flow: the browsing pipeline against a real catalog server.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;

use geodepot_api::app::{build_app, store::CatalogStore};
use geodepot_catalog::{Metadata, Product};
use geodepot_client::{
    BrowseConfig, BrowsePipeline, BrowseState, CartStore, HttpCatalogClient, MetadataOutcome,
    MetadataService,
};
use geodepot_core::{MetadataRef, ProductLabel};

struct TestServer {
    base_url: String,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn(store: CatalogStore) -> Self {
        let app = build_app(Arc::new(store));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { base_url, handle }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn numbered_store(n: usize) -> CatalogStore {
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
    let sheets = vec![
        Metadata::new(MetadataRef::new("sheet").unwrap(), "Shared sheet").unwrap(),
    ];
    CatalogStore::new(products, sheets)
}

/// Short intervals so the flow runs in real time without long sleeps.
fn fast_config() -> BrowseConfig {
    BrowseConfig {
        batch_size: 20,
        min_query_len: 3,
        search_debounce: Duration::from_millis(50),
        scroll_throttle: Duration::from_millis(10),
    }
}

async fn wait_for(
    rx: &mut watch::Receiver<BrowseState>,
    pred: impl Fn(&BrowseState) -> bool,
) -> BrowseState {
    tokio::time::timeout(Duration::from_secs(10), async {
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

#[tokio::test]
async fn scroll_search_and_reset_against_a_live_server() {
    let srv = TestServer::spawn(numbered_store(50)).await;
    let api = Arc::new(HttpCatalogClient::new(&srv.base_url));
    let pipeline = BrowsePipeline::spawn(api, fast_config());
    let mut rx = pipeline.subscribe();

    // Walk the whole catalog in three batches.
    pipeline.scrolled(0);
    wait_for(&mut rx, |s| s.products.len() == 20).await;

    tokio::time::sleep(Duration::from_millis(20)).await;
    pipeline.scrolled(20);
    wait_for(&mut rx, |s| s.products.len() == 40).await;

    tokio::time::sleep(Duration::from_millis(20)).await;
    pipeline.scrolled(40);
    let state = wait_for(&mut rx, |s| s.products.len() == 50).await;
    assert_eq!(state.total, 50);

    // A real query narrows the display to the matching products.
    pipeline.query_changed("product-01");
    let state = wait_for(&mut rx, |s| s.products.len() == 10).await;
    assert_eq!(state.total, 10);
    assert!(state
        .products
        .iter()
        .all(|p| p.label().as_str().starts_with("product-01")));

    // Clearing the input goes back to the unfiltered first page.
    pipeline.query_changed("");
    let state = wait_for(&mut rx, |s| s.products.len() == 20 && s.total == 50).await;
    assert!(state.last_error.is_none());
}

#[tokio::test]
async fn metadata_and_cart_flow_against_a_live_server() {
    let srv = TestServer::spawn(CatalogStore::with_fixtures()).await;
    let api = Arc::new(HttpCatalogClient::new(&srv.base_url));
    let pipeline = BrowsePipeline::spawn(api.clone(), fast_config());
    let mut rx = pipeline.subscribe();

    pipeline.scrolled(0);
    let state = wait_for(&mut rx, |s| !s.products.is_empty()).await;

    // Opening metadata on a product with a sheet yields the dialog.
    let service = MetadataService::new(api);
    let with_sheet = state
        .products
        .iter()
        .find(|p| p.label().as_str() == "Réseau d'eau")
        .expect("fixture product missing");
    match service.open_metadata(with_sheet).await {
        MetadataOutcome::Dialog(dialog) => {
            assert_eq!(dialog.metadata.title(), "Drinking water network");
            assert_eq!(dialog.width_pct, 60);
            assert_eq!(dialog.height_pct, 90);
        }
        other => panic!("expected a dialog, got {other:?}"),
    }

    // Adding to the cart grows a copy of the order, never the snapshot.
    let cart = CartStore::default();
    let before = cart.current();
    cart.add_to_cart(with_sheet);
    assert_eq!(before.items().len(), 0);
    assert_eq!(cart.current().items().len(), 1);
}
