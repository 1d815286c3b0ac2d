//! Outbound notifications: the fire-and-forget order alert webhook and the
//! operator notification seam used by the order console.

mod notifier;
mod webhook;

pub use notifier::{LogNotifier, OperatorNotifier};
pub use webhook::{AlertClient, AlertError, AlertItem, OrderAlert, MAX_ALERT_ITEMS};
