use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::Client;
use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;

use kirana_core::Order;

/// Line-item cap for the alert message body; longer orders are truncated
/// with a trailing "+N more" marker.
pub const MAX_ALERT_ITEMS: usize = 10;

#[derive(Debug, Error)]
pub enum AlertError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("webhook returned status {status}")]
    UnexpectedStatus { status: u16 },
}

/// One itemized line of the alert message.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlertItem {
    pub name: String,
    pub qty: u32,
    pub price: Decimal,
}

/// The structured message POSTed to the chat webhook when an order lands.
#[derive(Debug, Clone, Serialize)]
pub struct OrderAlert {
    pub order_id: i64,
    pub customer: String,
    pub mobile: String,
    pub address: String,
    pub items: Vec<AlertItem>,
    /// `"+N more"` when the item list was truncated.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub truncated: Option<String>,
    pub total: Decimal,
    pub payment_method: String,
    pub placed_at: DateTime<Utc>,
    /// Human-readable rendering for chat clients that show plain text.
    pub text: String,
}

impl OrderAlert {
    #[must_use]
    pub fn from_order(order: &Order) -> Self {
        let items: Vec<AlertItem> = order
            .items
            .iter()
            .take(MAX_ALERT_ITEMS)
            .map(|item| AlertItem {
                name: item.name.clone(),
                qty: item.qty,
                price: item.price,
            })
            .collect();
        let truncated = (order.items.len() > MAX_ALERT_ITEMS)
            .then(|| format!("+{} more", order.items.len() - MAX_ALERT_ITEMS));

        let mut text = format!(
            "New order #{} from {} ({})\n{}\n",
            order.id, order.customer_name, order.mobile, order.address
        );
        for item in &items {
            text.push_str(&format!("{} x {}\n", item.qty, item.name));
        }
        if let Some(more) = &truncated {
            text.push_str(more);
            text.push('\n');
        }
        text.push_str(&format!("Total {} ({})", order.total, order.payment_method));

        Self {
            order_id: order.id,
            customer: order.customer_name.clone(),
            mobile: order.mobile.clone(),
            address: order.address.clone(),
            items,
            truncated,
            total: order.total,
            payment_method: order.payment_method.clone(),
            placed_at: order.created_at,
            text,
        }
    }
}

/// HTTP client for the outbound order-alert webhook.
///
/// Delivery is best-effort by contract: callers that must not block on the
/// alert use [`AlertClient::send_detached`], which spawns the request and
/// discards the result after logging.
#[derive(Debug, Clone)]
pub struct AlertClient {
    client: Client,
    webhook_url: String,
}

impl AlertClient {
    /// Creates a client for `webhook_url` with the given request timeout.
    ///
    /// # Errors
    ///
    /// Returns [`AlertError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(webhook_url: &str, timeout_secs: u64) -> Result<Self, AlertError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("kirana/0.1 (order-alerts)")
            .build()?;
        Ok(Self {
            client,
            webhook_url: webhook_url.to_string(),
        })
    }

    /// POSTs the alert and reports the outcome. Used directly by tests and
    /// by [`AlertClient::send_detached`].
    ///
    /// # Errors
    ///
    /// Returns [`AlertError::Http`] on network failure or
    /// [`AlertError::UnexpectedStatus`] on a non-2xx response.
    pub async fn send(&self, alert: &OrderAlert) -> Result<(), AlertError> {
        let response = self
            .client
            .post(&self.webhook_url)
            .json(alert)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(AlertError::UnexpectedStatus {
                status: status.as_u16(),
            });
        }
        Ok(())
    }

    /// Fire-and-forget delivery: spawns the POST and deliberately discards
    /// its result. A failed alert is logged at warn and never retried; it
    /// must not affect the order that triggered it.
    pub fn send_detached(&self, alert: OrderAlert) {
        let client = self.clone();
        tokio::spawn(async move {
            if let Err(error) = client.send(&alert).await {
                tracing::warn!(%error, order_id = alert.order_id, "order alert delivery failed");
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kirana_core::{GeoPoint, LineItem, OrderStatus, Unit};

    fn order_with_items(count: usize) -> Order {
        let items = (0..count)
            .map(|i| LineItem {
                name: format!("Item {i}"),
                qty: 1,
                price: Decimal::new(10, 0),
                cost_price: None,
                pack_size: None,
                unit: Unit::Pcs,
                image_url: String::new(),
            })
            .collect();
        Order {
            id: 42,
            customer_name: "Asha".to_string(),
            mobile: "9876543210".to_string(),
            address: "12B, Gandhi Nagar".to_string(),
            location: GeoPoint {
                latitude: 10.0,
                longitude: 20.0,
            },
            items,
            total: Decimal::new(10 * i64::try_from(count).unwrap(), 0),
            payment_method: "COD".to_string(),
            status: OrderStatus::Received,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn alert_carries_order_fields() {
        let alert = OrderAlert::from_order(&order_with_items(2));
        assert_eq!(alert.order_id, 42);
        assert_eq!(alert.customer, "Asha");
        assert_eq!(alert.items.len(), 2);
        assert!(alert.truncated.is_none());
        assert!(alert.text.contains("New order #42"));
        assert!(alert.text.contains("COD"));
    }

    #[test]
    fn long_orders_are_truncated_with_a_marker() {
        let alert = OrderAlert::from_order(&order_with_items(13));
        assert_eq!(alert.items.len(), MAX_ALERT_ITEMS);
        assert_eq!(alert.truncated.as_deref(), Some("+3 more"));
        assert!(alert.text.contains("+3 more"));
    }
}
