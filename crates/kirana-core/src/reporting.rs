//! Revenue and profit aggregation over a loaded order set.
//!
//! Pure functions of their input snapshot; no persistence of their own.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::order::{Order, OrderStatus};

/// One ledger row per non-cancelled order.
#[derive(Debug, Clone, Serialize)]
pub struct LedgerRow {
    pub order_id: i64,
    pub customer: String,
    pub placed_at: DateTime<Utc>,
    pub payment_method: String,
    pub total: Decimal,
    pub profit: Decimal,
}

/// Aggregated totals and the per-order ledger.
#[derive(Debug, Clone, Serialize)]
pub struct SalesSummary {
    /// Non-cancelled orders counted.
    pub orders: usize,
    /// Σ total over non-cancelled orders.
    pub revenue: Decimal,
    /// Σ (total − Σ line cost × qty), with a per-line fallback cost of 80%
    /// of the selling price when cost price is absent.
    pub profit: Decimal,
    pub rows: Vec<LedgerRow>,
}

fn order_profit(order: &Order) -> Decimal {
    let cost: Decimal = order
        .items
        .iter()
        .map(|item| item.effective_cost() * Decimal::from(item.qty))
        .sum();
    order.total - cost
}

/// Builds the sales summary for an order set. Cancelled orders are excluded
/// from every figure.
#[must_use]
pub fn summarize_sales(orders: &[Order]) -> SalesSummary {
    let mut revenue = Decimal::ZERO;
    let mut profit = Decimal::ZERO;
    let mut rows = Vec::new();

    for order in orders {
        if order.status == OrderStatus::Cancelled {
            continue;
        }
        let order_profit = order_profit(order);
        revenue += order.total;
        profit += order_profit;
        rows.push(LedgerRow {
            order_id: order.id,
            customer: order.customer_name.clone(),
            placed_at: order.created_at,
            payment_method: order.payment_method.clone(),
            total: order.total,
            profit: order_profit,
        });
    }

    SalesSummary {
        orders: rows.len(),
        revenue,
        profit,
        rows,
    }
}
