use axum::{
    extract::{Query, State},
    Extension, Json,
};
use kirana_core::{summarize_sales, SalesSummary};

use super::orders::{range_filter, OrdersQuery};
use super::{map_db_error, ApiError, ApiResponse, AppState, ResponseMeta};
use crate::middleware::RequestId;

/// `GET /api/v1/reports/sales` — revenue and profit over a history window,
/// using the same window parameters as the order list. Cancelled orders are
/// excluded from every figure.
pub async fn sales_report(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<OrdersQuery>,
) -> Result<Json<ApiResponse<SalesSummary>>, ApiError> {
    let filter = range_filter(&req_id.0, &query)?;
    let orders = state
        .orders
        .query_range(filter)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data: summarize_sales(&orders),
        meta: ResponseMeta::new(req_id.0),
    }))
}
