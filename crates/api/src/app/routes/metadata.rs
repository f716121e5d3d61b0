use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};

use geodepot_core::MetadataRef;

use crate::app::errors;
use crate::app::store::CatalogStore;

pub fn router() -> Router {
    Router::new().route("/:id_name", get(get_metadata))
}

pub async fn get_metadata(
    Extension(store): Extension<Arc<CatalogStore>>,
    Path(id_name): Path<String>,
) -> axum::response::Response {
    let id_name: MetadataRef = match id_name.parse() {
        Ok(v) => v,
        Err(e) => return errors::domain_error_to_response(e),
    };

    // An unknown ref is an empty result, not an error: the catalog may
    // reference sheets that have not been written yet.
    match store.metadata(&id_name) {
        Some(m) => (StatusCode::OK, Json(m)).into_response(),
        None => StatusCode::NO_CONTENT.into_response(),
    }
}
