//! Subscriber side of a [`Broadcaster`](crate::Broadcaster)
//!
//! A [`Subscription`] owns the receiving end of one bounded mailbox:
//! `recv()` blocks, `try_recv()` never blocks, `recv_timeout()` waits a
//! bounded time.
//!
//! A [`CancelHandle`] is a detachable cancellation signal for the same
//! subscriber. Transport code typically keeps the subscription in the task
//! that writes to a client and hands the cancel handle to the task that
//! notices the client went away.

use std::sync::mpsc::{self, TryRecvError};
use std::sync::Weak;
use std::time::Duration;

use crate::broadcast::{SubscriberId, Unsubscribe};
use crate::iter::{TimeoutIter, TryIter};

/// Cancellation signal for one subscriber
///
/// Cancelling removes the subscriber from its broadcaster and closes the
/// mailbox. Safe to call any number of times, from any thread, even after
/// the broadcaster is gone.
#[derive(Clone)]
pub struct CancelHandle {
    id: SubscriberId,
    registry: Weak<dyn Unsubscribe + Send + Sync>,
}

impl CancelHandle {
    pub(crate) fn new(id: SubscriberId, registry: Weak<dyn Unsubscribe + Send + Sync>) -> Self {
        Self { id, registry }
    }

    /// Subscriber this handle cancels
    pub fn id(&self) -> SubscriberId {
        self.id
    }

    /// Remove the subscriber
    ///
    /// Returns `true` if this call removed it, `false` if it was already gone.
    pub fn cancel(&self) -> bool {
        self.registry
            .upgrade()
            .map(|registry| registry.unsubscribe(self.id))
            .unwrap_or(false)
    }
}

impl std::fmt::Debug for CancelHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CancelHandle").field("id", &self.id).finish()
    }
}

/// Live sequence of events for one subscriber
///
/// Ends (`recv()` returns `None`) once the mailbox is drained after the
/// subscriber was cancelled or the broadcaster shut down. Dropping the
/// subscription unsubscribes it.
///
/// # Example
///
/// ```rust
/// use state_store::Broadcaster;
///
/// let broadcaster = Broadcaster::new(5);
/// let subscription = broadcaster.subscribe();
///
/// broadcaster.publish(1);
/// broadcaster.publish(2);
/// broadcaster.shutdown();
///
/// // Blocking iteration ends when the mailbox is closed and drained
/// let events: Vec<i32> = subscription.collect();
/// assert_eq!(events, vec![1, 2]);
/// ```
pub struct Subscription<E> {
    id: SubscriberId,
    rx: mpsc::Receiver<E>,
    cancel: CancelHandle,
}

impl<E> Subscription<E> {
    pub(crate) fn new(id: SubscriberId, rx: mpsc::Receiver<E>, cancel: CancelHandle) -> Self {
        Self { id, rx, cancel }
    }

    /// Identifier of this subscriber
    pub fn id(&self) -> SubscriberId {
        self.id
    }

    /// Detachable cancellation signal for this subscriber
    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    /// Unsubscribe explicitly
    ///
    /// Equivalent to dropping the subscription.
    pub fn unsubscribe(self) {
        drop(self);
    }

    /// Block until the next event is available
    ///
    /// Returns `None` once the mailbox is closed and empty.
    pub fn recv(&self) -> Option<E> {
        self.rx.recv().ok()
    }

    /// Block until the next event or timeout expires
    ///
    /// Returns `None` if the timeout expires or the mailbox is closed and
    /// empty.
    pub fn recv_timeout(&self, timeout: Duration) -> Option<E> {
        self.rx.recv_timeout(timeout).ok()
    }

    /// Try to receive an event without blocking
    ///
    /// `Err(TryRecvError::Empty)` means nothing is queued yet;
    /// `Err(TryRecvError::Disconnected)` means the subscription has ended.
    pub fn try_recv(&self) -> Result<E, TryRecvError> {
        self.rx.try_recv()
    }

    /// Non-blocking iterator over currently queued events
    pub fn try_iter(&self) -> TryIter<'_, E> {
        TryIter::new(self)
    }

    /// Iterator that waits up to `timeout` for each event
    ///
    /// Stops at the first timeout or when the subscription ends.
    pub fn timeout_iter(&self, timeout: Duration) -> TimeoutIter<'_, E> {
        TimeoutIter::new(self, timeout)
    }
}

impl<E> Iterator for Subscription<E> {
    type Item = E;

    /// Block until the next event
    ///
    /// Returns `None` when the subscription has ended.
    fn next(&mut self) -> Option<Self::Item> {
        self.recv()
    }
}

impl<E> Drop for Subscription<E> {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

impl<E> std::fmt::Debug for Subscription<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}
