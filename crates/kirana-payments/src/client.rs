use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::error::PaymentError;

/// Result of an interactive payment attempt. Cancellation is a normal
/// outcome, not an error: the checkout flow aborts cleanly without creating
/// an order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentOutcome {
    /// Payment captured; `reference` is the gateway's payment id, recorded
    /// on the order's payment-method label.
    Captured { reference: String },
    /// The payer dismissed the payment flow.
    Cancelled,
}

#[derive(Debug, Serialize)]
struct CollectRequest<'a> {
    /// Minor currency units (paise).
    amount: i64,
    currency: &'static str,
    receipt: &'a str,
}

#[derive(Debug, Deserialize)]
struct CollectResponse {
    status: String,
    reference: Option<String>,
    error: Option<String>,
}

/// Client for the payment gateway's collect endpoint.
///
/// Use [`PaymentClient::new`] for production or point `base_url` at a mock
/// server in tests.
#[derive(Debug, Clone)]
pub struct PaymentClient {
    client: Client,
    base_url: String,
    key_id: String,
    key_secret: String,
}

impl PaymentClient {
    /// Creates a client with configured timeout and credentials.
    ///
    /// # Errors
    ///
    /// Returns [`PaymentError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(
        base_url: &str,
        key_id: &str,
        key_secret: &str,
        timeout_secs: u64,
    ) -> Result<Self, PaymentError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("kirana/0.1 (payments)")
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            key_id: key_id.to_string(),
            key_secret: key_secret.to_string(),
        })
    }

    /// Runs one payment collection for `amount_minor` (minor currency
    /// units) under `receipt`, resolving to either a captured reference or
    /// a cancellation.
    ///
    /// # Errors
    ///
    /// - [`PaymentError::Http`] on network failure.
    /// - [`PaymentError::UnexpectedStatus`] on a non-2xx response.
    /// - [`PaymentError::ApiError`] when the gateway reports a failure or
    ///   an unrecognized outcome.
    /// - [`PaymentError::Deserialize`] if the response does not match the
    ///   expected shape.
    pub async fn collect(
        &self,
        amount_minor: i64,
        receipt: &str,
    ) -> Result<PaymentOutcome, PaymentError> {
        let url = format!("{}/v1/payments", self.base_url);
        tracing::debug!(amount_minor, receipt, "collecting payment");
        let response = self
            .client
            .post(&url)
            .basic_auth(&self.key_id, Some(&self.key_secret))
            .json(&CollectRequest {
                amount: amount_minor,
                currency: "INR",
                receipt,
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(PaymentError::UnexpectedStatus {
                status: status.as_u16(),
            });
        }

        let raw = response.text().await?;
        let body: CollectResponse =
            serde_json::from_str(&raw).map_err(|e| PaymentError::Deserialize {
                context: format!("collect(receipt={receipt})"),
                source: e,
            })?;

        match body.status.as_str() {
            "captured" => {
                let reference = body.reference.ok_or_else(|| {
                    PaymentError::ApiError("captured response without a reference".to_string())
                })?;
                Ok(PaymentOutcome::Captured { reference })
            }
            "cancelled" => Ok(PaymentOutcome::Cancelled),
            other => Err(PaymentError::ApiError(
                body.error
                    .unwrap_or_else(|| format!("unrecognized outcome \"{other}\"")),
            )),
        }
    }
}
