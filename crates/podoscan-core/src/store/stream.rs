// ── Reactive store views ──
//
// Subscription handle for consuming `StoreView` changes.

use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures_util::Stream;
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;

use super::StoreView;

/// A subscription to one store.
///
/// Provides both point-in-time snapshot access and change notification via
/// [`changed()`](Self::changed) or by converting into a `Stream`.
pub struct StoreStream<T: Send + Sync + 'static> {
    current: Arc<StoreView<T>>,
    receiver: watch::Receiver<Arc<StoreView<T>>>,
}

impl<T: Send + Sync + 'static> StoreStream<T> {
    pub(crate) fn new(receiver: watch::Receiver<Arc<StoreView<T>>>) -> Self {
        let current = receiver.borrow().clone();
        Self { current, receiver }
    }

    /// The snapshot captured at creation (or at the last `changed()`).
    pub fn current(&self) -> &Arc<StoreView<T>> {
        &self.current
    }

    /// The latest snapshot.
    pub fn latest(&self) -> Arc<StoreView<T>> {
        self.receiver.borrow().clone()
    }

    /// Wait for the next mutation. Returns `None` once the store is dropped.
    pub async fn changed(&mut self) -> Option<Arc<StoreView<T>>> {
        self.receiver.changed().await.ok()?;
        let snap = self.receiver.borrow_and_update().clone();
        self.current = snap.clone();
        Some(snap)
    }

    pub fn into_stream(self) -> StoreWatchStream<T> {
        StoreWatchStream {
            inner: WatchStream::new(self.receiver),
        }
    }
}

/// `Stream` adapter yielding a snapshot per store mutation.
pub struct StoreWatchStream<T: Send + Sync + 'static> {
    inner: WatchStream<Arc<StoreView<T>>>,
}

impl<T: Send + Sync + 'static> Stream for StoreWatchStream<T> {
    type Item = Arc<StoreView<T>>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.inner).poll_next(cx)
    }
}
