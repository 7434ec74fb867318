// ── Reactive lot stream ──
//
// Subscription type for consuming catalog changes from the ParkingStore.

use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures_core::Stream;
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;

use crate::model::ParkingLot;

type Snapshot = Arc<Vec<Arc<ParkingLot>>>;

/// A subscription to the parking-lot catalog.
///
/// Provides both point-in-time snapshot access and reactive change
/// notification via [`changed`](Self::changed) or by converting to a
/// `Stream`.
pub struct LotStream {
    current: Snapshot,
    receiver: watch::Receiver<Snapshot>,
}

impl LotStream {
    pub(crate) fn new(receiver: watch::Receiver<Snapshot>) -> Self {
        let current = receiver.borrow().clone();
        Self { current, receiver }
    }

    /// The snapshot captured at subscription time.
    pub fn current(&self) -> &Snapshot {
        &self.current
    }

    /// The latest snapshot (may have changed since subscription).
    pub fn latest(&self) -> Snapshot {
        self.receiver.borrow().clone()
    }

    /// Wait for the next change, returning the new snapshot.
    /// Returns `None` if the store has been dropped.
    pub async fn changed(&mut self) -> Option<Snapshot> {
        self.receiver.changed().await.ok()?;
        let snap = self.receiver.borrow_and_update().clone();
        self.current = snap.clone();
        Some(snap)
    }

    /// Convert into a `Stream` for use with `StreamExt` combinators.
    pub fn into_stream(self) -> LotWatchStream {
        LotWatchStream { inner: WatchStream::new(self.receiver) }
    }
}

/// `Stream` adapter backed by a `watch::Receiver`.
///
/// Yields a new snapshot each time the catalog is mutated.
pub struct LotWatchStream {
    inner: WatchStream<Snapshot>,
}

impl Stream for LotWatchStream {
    type Item = Snapshot;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        // WatchStream is Unpin because the snapshot Arc is Unpin.
        Pin::new(&mut self.inner).poll_next(cx)
    }
}
