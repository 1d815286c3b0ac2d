use axum::{extract::State, Extension, Json};
use kirana_alerts::OrderAlert;
use kirana_core::{build_order, Cart, CartLine, CheckoutForm, GeoPoint};
use kirana_payments::PaymentOutcome;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{map_db_error, ApiError, ApiResponse, AppState, ResponseMeta};
use crate::middleware::RequestId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PaymentChoice {
    Cod,
    Prepaid,
}

#[derive(Debug, Deserialize)]
pub struct CheckoutRequest {
    #[serde(flatten)]
    pub form: CheckoutForm,
    pub location: Option<GeoPoint>,
    pub payment: PaymentChoice,
    pub lines: Vec<CartLine>,
}

/// Checkout outcomes. Cancelling a prepaid payment is a normal outcome of a
/// 200 response, not an error: no order exists and the shopper keeps their
/// cart.
#[derive(Debug, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum CheckoutData {
    Placed { order_id: i64, total: Decimal },
    PaymentCancelled { message: String },
}

/// `POST /api/v1/checkout` — validates the submission, optionally collects
/// an online payment, persists the order, and fires the operator alert.
///
/// Validation happens before any side effect; a refusal leaves nothing
/// behind. For prepaid orders the payment is collected before the order is
/// written, so a captured payment always has an order and a cancelled one
/// never does.
pub async fn checkout(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(request): Json<CheckoutRequest>,
) -> Result<Json<ApiResponse<CheckoutData>>, ApiError> {
    let cart = Cart::from_lines(request.lines);
    let mut draft = build_order(&request.form, request.location, "COD", &cart)
        .map_err(|e| ApiError::new(req_id.0.clone(), "validation_error", e.to_string()))?;

    if request.payment == PaymentChoice::Prepaid {
        let Some(payments) = state.payments.as_ref() else {
            return Err(ApiError::new(
                req_id.0,
                "payment_unavailable",
                "online payment is not configured; pay on delivery instead",
            ));
        };

        let amount_minor = (draft.total * Decimal::new(100, 0))
            .trunc()
            .to_i64()
            .ok_or_else(|| {
                ApiError::new(
                    req_id.0.clone(),
                    "bad_request",
                    "order total is out of range",
                )
            })?;
        let receipt = format!("order-{}-{}", draft.mobile, req_id.0);

        match payments.collect(amount_minor, &receipt).await {
            Ok(PaymentOutcome::Captured { reference }) => {
                draft.payment_method = format!("Prepaid ({reference})");
            }
            Ok(PaymentOutcome::Cancelled) => {
                return Ok(Json(ApiResponse {
                    data: CheckoutData::PaymentCancelled {
                        message: "payment was cancelled; your cart is unchanged".to_string(),
                    },
                    meta: ResponseMeta::new(req_id.0),
                }));
            }
            Err(error) => {
                tracing::error!(%error, "payment collection failed");
                return Err(ApiError::new(
                    req_id.0,
                    "payment_failed",
                    "payment could not be completed; no order was placed",
                ));
            }
        }
    }

    let total = draft.total;
    let order_id = state
        .orders
        .create(&draft)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    tracing::info!(order_id, %total, "order placed");

    if let Some(alerts) = state.alerts.as_ref() {
        match state.orders.get(order_id).await {
            Ok(order) => alerts.send_detached(OrderAlert::from_order(&order)),
            // Alerting is best-effort; the order itself already succeeded.
            Err(error) => {
                tracing::warn!(%error, order_id, "could not load order for alert");
            }
        }
    }

    Ok(Json(ApiResponse {
        data: CheckoutData::Placed { order_id, total },
        meta: ResponseMeta::new(req_id.0),
    }))
}
