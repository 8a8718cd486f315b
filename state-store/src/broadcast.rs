//! Non-blocking fan-out of events to bounded subscriber mailboxes
//!
//! A [`Broadcaster`] keeps a registry of subscribers, each owning a bounded
//! FIFO mailbox. [`Broadcaster::publish`] offers the event to every mailbox
//! with a non-blocking send: a full mailbox loses that one event, every other
//! subscriber still receives it, and the publisher never waits.
//!
//! # Mailbox-full policy
//!
//! The incoming event is dropped. Events already queued in a full mailbox
//! are kept, so a stalled subscriber resumes with the oldest undelivered
//! events rather than the newest.
//!
//! # Concurrency
//!
//! Registration, removal and the fan-out loop all run under one registry
//! lock. The lock is only held for in-memory bookkeeping and `try_send`
//! calls, never for I/O. A subscriber removed by [`Broadcaster::unsubscribe`]
//! can therefore never be sent to afterwards.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{self, SyncSender, TrySendError};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use crate::subscription::{CancelHandle, Subscription};

/// Identifier of one subscriber within a [`Broadcaster`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriberId(u64);

impl SubscriberId {
    /// Numeric value of the identifier
    pub fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for SubscriberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sub-{}", self.0)
    }
}

/// Outcome of a single [`Broadcaster::publish`] call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PublishReport {
    /// Mailboxes that accepted the event
    pub delivered: usize,
    /// Mailboxes that were full and lost the event
    pub dropped: usize,
    /// Subscribers whose receiving side was gone; they were removed
    pub pruned: usize,
}

/// Removal of a subscriber, as seen by a [`CancelHandle`]
///
/// Erases the event type so cancellation handles are not generic.
pub(crate) trait Unsubscribe: Send + Sync {
    fn unsubscribe(&self, id: SubscriberId) -> bool;
}

struct Registry<E> {
    mailboxes: HashMap<SubscriberId, SyncSender<E>>,
    shut_down: bool,
}

struct Shared<E> {
    capacity: usize,
    next_id: AtomicU64,
    registry: Mutex<Registry<E>>,
}

impl<E> Shared<E> {
    fn lock(&self) -> MutexGuard<'_, Registry<E>> {
        // Registry bookkeeping cannot be left half-done by a panic, so a
        // poisoned lock is still usable.
        self.registry.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<E: Send> Unsubscribe for Shared<E> {
    fn unsubscribe(&self, id: SubscriberId) -> bool {
        let removed = self.lock().mailboxes.remove(&id).is_some();
        if removed {
            tracing::debug!(subscriber = %id, "subscriber removed");
        }
        removed
    }
}

/// Registry of subscribers with bounded mailboxes
///
/// Cloning a `Broadcaster` yields another handle to the same registry.
///
/// # Example
///
/// ```rust
/// use state_store::Broadcaster;
///
/// let broadcaster = Broadcaster::new(2);
/// let fast = broadcaster.subscribe();
/// let slow = broadcaster.subscribe();
///
/// broadcaster.publish("a");
/// broadcaster.publish("b");
///
/// // `slow` is full now; publishing drops "c" for it only
/// assert_eq!(fast.try_recv(), Ok("a"));
/// let report = broadcaster.publish("c");
/// assert_eq!(report.delivered, 1);
/// assert_eq!(report.dropped, 1);
///
/// assert_eq!(slow.try_iter().collect::<Vec<_>>(), vec!["a", "b"]);
/// assert_eq!(fast.try_iter().collect::<Vec<_>>(), vec!["b", "c"]);
/// ```
pub struct Broadcaster<E> {
    shared: Arc<Shared<E>>,
}

impl<E> Broadcaster<E>
where
    E: Clone + Send + 'static,
{
    /// Create an empty broadcaster whose mailboxes hold `capacity` events
    ///
    /// A capacity of zero is raised to one: a zero-sized mailbox could never
    /// accept a non-blocking send.
    pub fn new(capacity: usize) -> Self {
        Self {
            shared: Arc::new(Shared {
                capacity: capacity.max(1),
                next_id: AtomicU64::new(1),
                registry: Mutex::new(Registry {
                    mailboxes: HashMap::new(),
                    shut_down: false,
                }),
            }),
        }
    }

    /// Register a new subscriber
    ///
    /// The mailbox only carries events published after this call. After
    /// [`shutdown`](Self::shutdown) the returned subscription is already
    /// closed.
    pub fn subscribe(&self) -> Subscription<E> {
        let id = SubscriberId(self.shared.next_id.fetch_add(1, Ordering::Relaxed));
        let (tx, rx) = mpsc::sync_channel(self.shared.capacity);

        {
            let mut registry = self.shared.lock();
            if registry.shut_down {
                tracing::debug!(subscriber = %id, "subscribe after shutdown, mailbox closed");
                drop(tx);
            } else {
                registry.mailboxes.insert(id, tx);
                tracing::debug!(
                    subscriber = %id,
                    subscribers = registry.mailboxes.len(),
                    "subscriber registered"
                );
            }
        }

        let registry: Weak<dyn Unsubscribe + Send + Sync> = {
            let weak: Weak<Shared<E>> = Arc::downgrade(&self.shared);
            weak
        };
        Subscription::new(id, rx, CancelHandle::new(id, registry))
    }

    /// Offer `event` to every registered mailbox without blocking
    ///
    /// Never waits and never retries. A full mailbox loses this event; a
    /// mailbox whose receiver is gone is removed from the registry.
    pub fn publish(&self, event: E) -> PublishReport {
        let mut report = PublishReport::default();
        {
            let mut registry = self.shared.lock();
            if registry.shut_down {
                return report;
            }

            let mut dead = Vec::new();
            for (id, mailbox) in registry.mailboxes.iter() {
                match mailbox.try_send(event.clone()) {
                    Ok(()) => report.delivered += 1,
                    Err(TrySendError::Full(_)) => report.dropped += 1,
                    Err(TrySendError::Disconnected(_)) => dead.push(*id),
                }
            }

            for id in &dead {
                registry.mailboxes.remove(id);
            }
            report.pruned = dead.len();
        }

        // Drops are expected under a stalled consumer; keep them quiet
        if report.dropped > 0 || report.pruned > 0 {
            tracing::trace!(
                delivered = report.delivered,
                dropped = report.dropped,
                pruned = report.pruned,
                "event published with losses"
            );
        }

        report
    }

    /// Remove a subscriber and close its mailbox
    ///
    /// Returns `false` if the subscriber was not registered, so calling it
    /// twice is harmless.
    pub fn unsubscribe(&self, id: SubscriberId) -> bool {
        self.shared.unsubscribe(id)
    }

    /// Close every mailbox and clear the registry
    ///
    /// Consumers drain whatever is still queued and then observe the end of
    /// their subscription. Later calls to `publish` do nothing and later
    /// subscriptions start closed. Calling it again is a no-op.
    pub fn shutdown(&self) {
        let closed = {
            let mut registry = self.shared.lock();
            registry.shut_down = true;
            let closed = registry.mailboxes.len();
            registry.mailboxes.clear();
            closed
        };
        tracing::debug!(closed, "broadcaster shut down");
    }

    /// Number of registered subscribers
    pub fn subscriber_count(&self) -> usize {
        self.shared.lock().mailboxes.len()
    }

    /// Mailbox capacity used for new subscribers
    pub fn capacity(&self) -> usize {
        self.shared.capacity
    }

    /// Whether [`shutdown`](Self::shutdown) has been called
    pub fn is_shut_down(&self) -> bool {
        self.shared.lock().shut_down
    }
}

impl<E> Clone for Broadcaster<E> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<E> fmt::Debug for Broadcaster<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let registry = self.shared.lock();
        f.debug_struct("Broadcaster")
            .field("capacity", &self.shared.capacity)
            .field("subscribers", &registry.mailboxes.len())
            .field("shut_down", &registry.shut_down)
            .finish()
    }
}
