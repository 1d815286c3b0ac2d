use std::convert::Infallible;

use axum::{
    extract::{Path, Query, State},
    response::sse::{Event, KeepAlive, Sse},
    Extension, Json,
};
use chrono::{DateTime, Utc};
use futures::stream::Stream;
use kirana_core::{Order, OrderStatus};
use kirana_db::RangeFilter;
use serde::{Deserialize, Serialize};

use super::{map_db_error, ApiError, ApiResponse, AppState, ResponseMeta};
use crate::middleware::RequestId;

const DEFAULT_WINDOW_DAYS: i64 = 7;

#[derive(Debug, Default, Deserialize)]
pub struct OrdersQuery {
    /// Orders from the last `days` days. Ignored when `all` or an explicit
    /// window is given.
    pub days: Option<i64>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    /// Everything on record, bounded by the configured row cap.
    #[serde(default)]
    pub all: bool,
}

/// Resolves the shared history-window query parameters into a store filter.
/// Also used by the sales report, which accepts the same parameters.
pub(super) fn range_filter(request_id: &str, query: &OrdersQuery) -> Result<RangeFilter, ApiError> {
    if query.all {
        return Ok(RangeFilter::AllTime);
    }
    match (query.from, query.to) {
        (Some(start), Some(end)) => Ok(RangeFilter::Between { start, end }),
        (None, None) => Ok(RangeFilter::LastDays(
            query.days.unwrap_or(DEFAULT_WINDOW_DAYS),
        )),
        _ => Err(ApiError::new(
            request_id,
            "bad_request",
            "from and to must be provided together",
        )),
    }
}

/// `GET /api/v1/orders` — historical order pull, newest first.
pub async fn list_orders(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<OrdersQuery>,
) -> Result<Json<ApiResponse<Vec<Order>>>, ApiError> {
    let filter = range_filter(&req_id.0, &query)?;
    let orders = state
        .orders
        .query_range(filter)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data: orders,
        meta: ResponseMeta::new(req_id.0),
    }))
}

#[derive(Debug, Serialize)]
pub struct AdvanceData {
    pub order: Order,
    /// `false` when the order was already in a terminal state and nothing
    /// was written.
    pub advanced: bool,
}

/// Applies the forward-only progression to a loaded order: the order as it
/// should be reported back, plus the status write to issue. `None` means the
/// order is already terminal and nothing may touch the store.
fn plan_advance(mut order: Order) -> (Order, Option<OrderStatus>) {
    match order.status.next() {
        Some(next) => {
            order.status = next;
            (order, Some(next))
        }
        None => (order, None),
    }
}

/// `POST /api/v1/orders/{id}/advance` — moves the order one step along
/// `Received → Out for Delivery → Delivered`. Advancing a terminal order is
/// a no-op, not an error.
pub async fn advance_order(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<AdvanceData>>, ApiError> {
    let order = state
        .orders
        .get(id)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    let (order, write) = plan_advance(order);
    let advanced = match write {
        Some(next) => {
            state
                .orders
                .set_status(id, next)
                .await
                .map_err(|e| map_db_error(req_id.0.clone(), &e))?;
            tracing::info!(order_id = id, status = %next, "order advanced");
            true
        }
        None => false,
    };

    Ok(Json(ApiResponse {
        data: AdvanceData { order, advanced },
        meta: ResponseMeta::new(req_id.0),
    }))
}

/// `GET /api/v1/customers/{mobile}/last-order` — returning-customer prefill.
/// `data` is `null` for a first-time mobile number.
pub async fn last_order_by_mobile(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(mobile): Path<String>,
) -> Result<Json<ApiResponse<Option<Order>>>, ApiError> {
    let order = state
        .orders
        .find_by_mobile(&mobile)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data: order,
        meta: ResponseMeta::new(req_id.0),
    }))
}

/// `GET /api/v1/orders/live` — server-sent events stream of the most recent
/// orders: the current set immediately, then the full updated set after
/// every order write. The subscription ends when the client disconnects.
pub async fn stream_orders(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let feed = state.orders.subscribe_recent(state.live_orders_limit);

    let stream = futures::stream::unfold(feed, |mut feed| async move {
        let snapshot = feed.recv().await?;
        let event = Event::default().event("orders").json_data(&snapshot).ok()?;
        Some((Ok::<_, Infallible>(event), feed))
    });

    Sse::new(stream).keep_alive(KeepAlive::default())
}
