use std::sync::Arc;

use axum::{
    extract::{Extension, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::Deserialize;

use crate::app::errors;
use crate::app::store::CatalogStore;

/// Default page size when the client does not say.
pub const DEFAULT_PAGE_SIZE: usize = 20;
/// Hard cap on a single page, whatever the client asks for.
pub const MAX_PAGE_SIZE: usize = 100;

pub fn router() -> Router {
    Router::new().route("/", get(list_products))
}

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    offset: Option<usize>,
    limit: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    q: Option<String>,
    #[serde(rename = "type")]
    kind: Option<String>,
}

pub async fn list_products(
    Extension(store): Extension<Arc<CatalogStore>>,
    Query(query): Query<PageQuery>,
) -> axum::response::Response {
    let offset = query.offset.unwrap_or(0);
    let limit = query.limit.unwrap_or(DEFAULT_PAGE_SIZE);
    if limit == 0 {
        return errors::json_error(StatusCode::BAD_REQUEST, "invalid_limit", "limit must be positive");
    }
    let limit = limit.min(MAX_PAGE_SIZE);

    tracing::debug!(offset, limit, "listing products");
    (StatusCode::OK, Json(store.page(offset, limit))).into_response()
}

pub async fn search(
    Extension(store): Extension<Arc<CatalogStore>>,
    Query(query): Query<SearchQuery>,
) -> axum::response::Response {
    if let Some(kind) = query.kind.as_deref() {
        if kind != "product" {
            return errors::json_error(
                StatusCode::BAD_REQUEST,
                "invalid_type",
                "only type=product is searchable",
            );
        }
    }

    let q = query.q.unwrap_or_default();
    tracing::debug!(q = %q, "searching products");
    (StatusCode::OK, Json(store.search(&q))).into_response()
}
