//! Borrowing iterators over a subscription's mailbox
//!
//! Complements the blocking `Iterator` impl on
//! [`Subscription`](crate::Subscription):
//! - Non-blocking: [`TryIter`], drains what is queued right now
//! - Timeout: [`TimeoutIter`], waits a bounded time for each event

use std::time::Duration;

use crate::subscription::Subscription;

/// Non-blocking iterator over currently queued events
pub struct TryIter<'a, E> {
    inner: &'a Subscription<E>,
}

impl<'a, E> TryIter<'a, E> {
    pub(crate) fn new(inner: &'a Subscription<E>) -> Self {
        Self { inner }
    }
}

impl<'a, E> Iterator for TryIter<'a, E> {
    type Item = E;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.try_recv().ok()
    }
}

/// Blocking iterator with timeout
pub struct TimeoutIter<'a, E> {
    inner: &'a Subscription<E>,
    timeout: Duration,
}

impl<'a, E> TimeoutIter<'a, E> {
    pub(crate) fn new(inner: &'a Subscription<E>, timeout: Duration) -> Self {
        Self { inner, timeout }
    }
}

impl<'a, E> Iterator for TimeoutIter<'a, E> {
    type Item = E;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.recv_timeout(self.timeout)
    }
}

#[cfg(test)]
mod tests {
    use crate::Broadcaster;
    use std::thread;
    use std::time::{Duration, Instant};

    #[test]
    fn test_try_iter_empty() {
        let broadcaster = Broadcaster::<u8>::new(5);
        let sub = broadcaster.subscribe();

        assert_eq!(sub.try_iter().count(), 0);
    }

    #[test]
    fn test_try_iter_drains_in_order() {
        let broadcaster = Broadcaster::new(5);
        let sub = broadcaster.subscribe();

        for i in 0..3 {
            broadcaster.publish(i);
        }

        let events: Vec<_> = sub.try_iter().collect();
        assert_eq!(events, vec![0, 1, 2]);

        // Should be empty now
        assert!(sub.try_recv().is_err());
    }

    #[test]
    fn test_timeout_iter_stops_on_silence() {
        let broadcaster = Broadcaster::new(5);
        let sub = broadcaster.subscribe();
        let publisher = broadcaster.clone();

        thread::spawn(move || {
            publisher.publish(1);
            thread::sleep(Duration::from_millis(5));
            publisher.publish(2);
        });

        let start = Instant::now();
        let events: Vec<_> = sub.timeout_iter(Duration::from_millis(100)).collect();
        assert_eq!(events, vec![1, 2]);
        assert!(start.elapsed() >= Duration::from_millis(95));
    }

    #[test]
    fn test_timeout_iter_ends_when_closed() {
        let broadcaster = Broadcaster::new(5);
        let sub = broadcaster.subscribe();
        broadcaster.publish(9);
        broadcaster.shutdown();

        let start = Instant::now();
        let events: Vec<_> = sub.timeout_iter(Duration::from_secs(10)).collect();
        assert_eq!(events, vec![9]);
        assert!(start.elapsed() < Duration::from_secs(5));
    }
}
