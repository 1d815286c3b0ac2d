use std::collections::HashSet;
use std::sync::Arc;

use kirana_alerts::OperatorNotifier;
use kirana_core::Order;
use kirana_db::OrderStore;

/// Tracks which order ids have been seen across successive snapshots of the
/// recent-orders feed, so each newly placed order is surfaced exactly once.
///
/// The first snapshot is the baseline: orders that already existed when the
/// console started are never announced. The tracked set is replaced by the
/// current window's ids after every diff, so it stays bounded by the window
/// size in a long-lived process. The store is append-only and the window
/// only moves forward, so a pruned id cannot re-enter it.
#[derive(Debug, Default)]
pub struct NewOrderDetector {
    seen: Option<HashSet<i64>>,
}

impl NewOrderDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the orders in `snapshot` that were not in the previous
    /// snapshot. The baseline call returns nothing.
    pub fn diff<'a>(&mut self, snapshot: &'a [Order]) -> Vec<&'a Order> {
        let current: HashSet<i64> = snapshot.iter().map(|o| o.id).collect();
        let fresh = match self.seen.as_ref() {
            None => Vec::new(),
            Some(seen) => snapshot.iter().filter(|o| !seen.contains(&o.id)).collect(),
        };
        self.seen = Some(current);
        fresh
    }
}

/// Spawns the operator console loop: subscribes to the recent-orders feed
/// and announces each newly placed order through `notifier`.
///
/// The task ends when the store's change bus is dropped.
pub fn spawn_order_console(
    orders: OrderStore,
    notifier: Arc<dyn OperatorNotifier>,
    limit: i64,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut feed = orders.subscribe_recent(limit);
        let mut detector = NewOrderDetector::new();

        while let Some(snapshot) = feed.recv().await {
            for order in detector.diff(&snapshot) {
                notifier.new_order(order);
            }
        }

        tracing::debug!("order console feed closed");
    })
}
