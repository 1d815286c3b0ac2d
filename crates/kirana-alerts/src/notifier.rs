use kirana_core::Order;

/// Operator-facing new-order notification capability.
///
/// The order console receives this as an injected dependency rather than
/// probing platform notification support itself; when no push capability is
/// configured the console degrades to the log-only implementation instead
/// of failing.
pub trait OperatorNotifier: Send + Sync {
    /// Called exactly once per newly arrived order.
    fn new_order(&self, order: &Order);
}

/// Log-only notifier: the graceful degradation when push notifications are
/// unavailable or not permitted.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl OperatorNotifier for LogNotifier {
    fn new_order(&self, order: &Order) {
        tracing::info!(
            order_id = order.id,
            customer = %order.customer_name,
            total = %order.total,
            "new order received"
        );
    }
}
