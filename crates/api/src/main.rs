use std::sync::Arc;

use geodepot_api::app::store::CatalogStore;

#[tokio::main]
async fn main() {
    geodepot_observability::init();

    let addr = std::env::var("GEODEPOT_ADDR").unwrap_or_else(|_| {
        tracing::warn!("GEODEPOT_ADDR not set; using default bind address");
        "0.0.0.0:8080".to_string()
    });

    let store = Arc::new(CatalogStore::with_fixtures());
    let app = geodepot_api::app::build_app(store);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .unwrap_or_else(|e| panic!("failed to bind {addr}: {e}"));

    tracing::info!("listening on {}", listener.local_addr().unwrap());

    axum::serve(listener, app).await.unwrap();
}
