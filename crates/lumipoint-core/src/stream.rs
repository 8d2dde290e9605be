// ── Reactive dashboard stream ──
//
// Subscription type for consuming controller snapshots.

use std::pin::Pin;
use std::task::{Context, Poll};

use futures_core::Stream;
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;

use crate::controller::DashboardSnapshot;

/// A subscription to the dashboard snapshot.
///
/// Provides both point-in-time access and change notification via
/// `changed()` or by converting to a `Stream`.
pub struct DashboardStream {
    current: DashboardSnapshot,
    receiver: watch::Receiver<DashboardSnapshot>,
}

impl DashboardStream {
    pub(crate) fn new(receiver: watch::Receiver<DashboardSnapshot>) -> Self {
        let current = receiver.borrow().clone();
        Self { current, receiver }
    }

    /// Snapshot captured at creation time (or at the last `changed()`).
    pub fn current(&self) -> &DashboardSnapshot {
        &self.current
    }

    /// Latest snapshot (may have changed since creation).
    pub fn latest(&self) -> DashboardSnapshot {
        self.receiver.borrow().clone()
    }

    /// Wait for the next change, returning the new snapshot.
    /// Returns `None` once the controller has been dropped.
    pub async fn changed(&mut self) -> Option<DashboardSnapshot> {
        self.receiver.changed().await.ok()?;
        let snap = self.receiver.borrow_and_update().clone();
        self.current = snap.clone();
        Some(snap)
    }

    /// Convert into a `Stream` for use with `StreamExt` combinators.
    pub fn into_stream(self) -> DashboardWatchStream {
        DashboardWatchStream {
            inner: WatchStream::new(self.receiver),
        }
    }
}

/// `Stream` adapter yielding every new snapshot, starting with the current one.
pub struct DashboardWatchStream {
    inner: WatchStream<DashboardSnapshot>,
}

impl Stream for DashboardWatchStream {
    type Item = DashboardSnapshot;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.inner).poll_next(cx)
    }
}
