//! In-process change notification and live query feeds.
//!
//! Every successful write through a store handle notifies the [`ChangeBus`];
//! each subscriber owns a background task that re-runs its query on every
//! relevant change and pushes the full result set. Dropping the returned
//! [`LiveFeed`] aborts the task, so teardown is tied to handle lifetime
//! rather than a polling loop.

use std::future::Future;

use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;

use crate::DbError;

/// Which collection a change touched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collection {
    Products,
    Orders,
}

const BUS_CAPACITY: usize = 64;
const FEED_BUFFER: usize = 8;

/// Broadcast channel fanning out write notifications to all live feeds.
/// Cloning shares the same bus; independent feeds never block each other.
#[derive(Debug, Clone)]
pub struct ChangeBus {
    tx: broadcast::Sender<Collection>,
}

impl Default for ChangeBus {
    fn default() -> Self {
        Self::new()
    }
}

impl ChangeBus {
    #[must_use]
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(BUS_CAPACITY);
        Self { tx }
    }

    /// Notifies subscribers that `collection` changed. A send error only
    /// means nobody is listening right now.
    pub(crate) fn notify(&self, collection: Collection) {
        let _ = self.tx.send(collection);
    }

    pub(crate) fn watch(&self) -> broadcast::Receiver<Collection> {
        self.tx.subscribe()
    }
}

/// A live, push-based view of one query. The first delivery is the current
/// snapshot; every relevant change afterwards delivers the full updated set.
#[derive(Debug)]
pub struct LiveFeed<T> {
    rx: mpsc::Receiver<Vec<T>>,
    task: JoinHandle<()>,
}

impl<T> LiveFeed<T> {
    /// Waits for the next full snapshot. `None` means the feed has ended:
    /// the bus was dropped, the initial query failed, or the feed was
    /// cancelled.
    pub async fn recv(&mut self) -> Option<Vec<T>> {
        self.rx.recv().await
    }

    /// Explicitly releases the subscription. Equivalent to dropping the
    /// handle.
    pub fn cancel(self) {}
}

impl<T> Drop for LiveFeed<T> {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Spawns the re-query task behind a [`LiveFeed`]. `query` runs once for the
/// initial snapshot and then after every notification matching `collection`.
pub(crate) fn spawn_feed<T, Q, Fut>(
    mut changes: broadcast::Receiver<Collection>,
    collection: Collection,
    query: Q,
) -> LiveFeed<T>
where
    T: Send + 'static,
    Q: Fn() -> Fut + Send + 'static,
    Fut: Future<Output = Result<Vec<T>, DbError>> + Send,
{
    let (tx, rx) = mpsc::channel(FEED_BUFFER);
    let task = tokio::spawn(async move {
        match query().await {
            Ok(snapshot) => {
                if tx.send(snapshot).await.is_err() {
                    return;
                }
            }
            Err(error) => {
                tracing::warn!(%error, ?collection, "live feed initial query failed");
                return;
            }
        }

        loop {
            match changes.recv().await {
                Ok(changed) if changed == collection => {}
                Ok(_) => continue,
                // Missed notifications are harmless: the next query returns
                // the full current set anyway.
                Err(broadcast::error::RecvError::Lagged(_)) => {}
                Err(broadcast::error::RecvError::Closed) => break,
            }
            match query().await {
                Ok(snapshot) => {
                    if tx.send(snapshot).await.is_err() {
                        break;
                    }
                }
                Err(error) => {
                    tracing::warn!(%error, ?collection, "live feed re-query failed");
                }
            }
        }
    });

    LiveFeed { rx, task }
}
