use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::product::Unit;

/// A resolved delivery location. Acquisition (device GPS or a manual map
/// pin) happens outside this crate; checkout only consumes the pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

/// One purchased line, snapshotted at order time. Later catalog edits do
/// not touch it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    pub name: String,
    pub qty: u32,
    /// Unit selling price at purchase time.
    pub price: Decimal,
    /// Unit cost at purchase time; `None` falls back to 80% of price in
    /// profit calculations.
    pub cost_price: Option<Decimal>,
    pub pack_size: Option<String>,
    #[serde(default)]
    pub unit: Unit,
    pub image_url: String,
}

impl LineItem {
    #[must_use]
    pub fn subtotal(&self) -> Decimal {
        self.price * Decimal::from(self.qty)
    }

    /// Unit cost, falling back to 80% of the selling price when unset.
    #[must_use]
    pub fn effective_cost(&self) -> Decimal {
        self.cost_price
            .unwrap_or_else(|| self.price * Decimal::new(8, 1))
    }
}

/// Error for status strings that are not part of the order lifecycle.
#[derive(Debug, Error)]
#[error("unknown order status \"{0}\"")]
pub struct InvalidStatus(pub String);

/// Order lifecycle. `Received → Out for Delivery → Delivered` is the only
/// forward path; `Cancelled` is a terminal side-state excluded from
/// reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderStatus {
    Received,
    #[serde(rename = "Out for Delivery")]
    OutForDelivery,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    /// The next stage of the progression, or `None` when the order is in a
    /// terminal state. Callers must not issue a store write for `None`.
    #[must_use]
    pub fn next(self) -> Option<OrderStatus> {
        match self {
            OrderStatus::Received => Some(OrderStatus::OutForDelivery),
            OrderStatus::OutForDelivery => Some(OrderStatus::Delivered),
            OrderStatus::Delivered | OrderStatus::Cancelled => None,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            OrderStatus::Received => "Received",
            OrderStatus::OutForDelivery => "Out for Delivery",
            OrderStatus::Delivered => "Delivered",
            OrderStatus::Cancelled => "Cancelled",
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = InvalidStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Received" => Ok(OrderStatus::Received),
            "Out for Delivery" => Ok(OrderStatus::OutForDelivery),
            "Delivered" => Ok(OrderStatus::Delivered),
            "Cancelled" => Ok(OrderStatus::Cancelled),
            other => Err(InvalidStatus(other.to_string())),
        }
    }
}

/// An order ready to be persisted. The store assigns the id, the creation
/// timestamp, and the initial `Received` status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewOrder {
    pub customer_name: String,
    /// 10-digit mobile string; used as a returning-customer lookup key,
    /// not strictly validated.
    pub mobile: String,
    pub address: String,
    pub location: GeoPoint,
    pub items: Vec<LineItem>,
    /// Sum of line subtotals at creation time.
    pub total: Decimal,
    /// Free-text label, e.g. `"COD"` or `"Prepaid (pay_123)"`.
    pub payment_method: String,
}

/// A persisted order as read back from the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: i64,
    pub customer_name: String,
    pub mobile: String,
    pub address: String,
    pub location: GeoPoint,
    pub items: Vec<LineItem>,
    pub total: Decimal,
    pub payment_method: String,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_advances_forward_only() {
        assert_eq!(OrderStatus::Received.next(), Some(OrderStatus::OutForDelivery));
        assert_eq!(OrderStatus::OutForDelivery.next(), Some(OrderStatus::Delivered));
        assert_eq!(OrderStatus::Delivered.next(), None);
        assert_eq!(OrderStatus::Cancelled.next(), None);
    }

    #[test]
    fn status_round_trips_through_strings() {
        for status in [
            OrderStatus::Received,
            OrderStatus::OutForDelivery,
            OrderStatus::Delivered,
            OrderStatus::Cancelled,
        ] {
            assert_eq!(status.as_str().parse::<OrderStatus>().unwrap(), status);
        }
        assert!("Shipped".parse::<OrderStatus>().is_err());
    }

    #[test]
    fn status_serde_uses_display_labels() {
        let json = serde_json::to_string(&OrderStatus::OutForDelivery).unwrap();
        assert_eq!(json, "\"Out for Delivery\"");
    }

    #[test]
    fn line_item_cost_fallback() {
        let mut item = LineItem {
            name: "Salt".to_string(),
            qty: 2,
            price: Decimal::new(20, 0),
            cost_price: None,
            pack_size: None,
            unit: Unit::Pkt,
            image_url: String::new(),
        };
        assert_eq!(item.subtotal(), Decimal::new(40, 0));
        assert_eq!(item.effective_cost(), Decimal::new(16, 0));
        item.cost_price = Some(Decimal::new(15, 0));
        assert_eq!(item.effective_cost(), Decimal::new(15, 0));
    }
}
