//! HTTP client for the payment gateway.
//!
//! The gateway is treated as an opaque capability: given an amount in minor
//! currency units and a receipt label, it either captures a payment and
//! hands back a reference, or reports that the payer cancelled. No gateway
//! protocol details leak past this crate.

mod client;
mod error;

pub use client::{PaymentClient, PaymentOutcome};
pub use error::PaymentError;
