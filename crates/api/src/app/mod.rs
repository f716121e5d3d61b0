use std::sync::Arc;

use axum::{extract::Extension, http::StatusCode, routing::get, Router};
use tower::ServiceBuilder;

pub mod errors;
pub mod routes;
pub mod store;

use store::CatalogStore;

/// Build the catalog API router over the given store.
pub fn build_app(store: Arc<CatalogStore>) -> Router {
    Router::new()
        .route("/health", get(health))
        .nest("/products", routes::products::router())
        .route("/search", get(routes::products::search))
        .nest("/metadata", routes::metadata::router())
        .layer(ServiceBuilder::new().layer(Extension(store)))
}

async fn health() -> StatusCode {
    StatusCode::OK
}
