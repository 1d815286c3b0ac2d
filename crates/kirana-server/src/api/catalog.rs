use axum::{
    extract::{Path, State},
    Extension, Json,
};
use kirana_core::{product_categories, NewProduct, Product};
use serde::Serialize;

use super::{map_db_error, ApiError, ApiResponse, AppState, ResponseMeta};
use crate::middleware::RequestId;

#[derive(Debug, Serialize)]
pub struct CatalogData {
    pub products: Vec<Product>,
    pub categories: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct RemovedData {
    pub id: String,
}

/// `GET /api/v1/products` — the storefront catalog plus its category strip.
pub async fn list_catalog(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<ApiResponse<CatalogData>>, ApiError> {
    let products = state
        .catalog
        .list()
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;
    let categories = product_categories(&products);

    Ok(Json(ApiResponse {
        data: CatalogData {
            products,
            categories,
        },
        meta: ResponseMeta::new(req_id.0),
    }))
}

/// `PUT /api/v1/products` — create or overwrite a product.
///
/// The product id is derived from the name, so saving under an existing
/// name replaces that product rather than duplicating it.
pub async fn upsert_product(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(draft): Json<NewProduct>,
) -> Result<Json<ApiResponse<Product>>, ApiError> {
    let product = state
        .catalog
        .upsert(&draft)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    tracing::info!(product_id = %product.id, "product saved");
    Ok(Json(ApiResponse {
        data: product,
        meta: ResponseMeta::new(req_id.0),
    }))
}

/// `DELETE /api/v1/products/{id}` — remove a product. Idempotent: deleting
/// an id that does not exist succeeds without touching anything.
pub async fn delete_product(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<RemovedData>>, ApiError> {
    state
        .catalog
        .remove(&id)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    tracing::info!(product_id = %id, "product removed");
    Ok(Json(ApiResponse {
        data: RemovedData { id },
        meta: ResponseMeta::new(req_id.0),
    }))
}
