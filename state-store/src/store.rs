//! Single-writer, multi-reader value cell
//!
//! This module provides the storage primitive for the "current value":
//! - `StateStore<T>`: the one writer, owned by whoever produces new values
//! - `StateReader<T>`: cheap, cloneable read handles for everyone else
//!
//! Values are immutable once stored. Replacing a value swaps an `Arc`
//! under a short write lock, so a reader always sees either the old or the
//! new value and never a partially written one.

use std::sync::{Arc, PoisonError, RwLock};

/// Shared slot holding the current value
type Slot<T> = Arc<RwLock<Arc<T>>>;

// ============================================================================
// StateStore<T> - the single writer
// ============================================================================

/// Owner of the current value, with change detection
///
/// There is exactly one `StateStore` per value: it is deliberately not
/// `Clone`, so whoever holds it is the only code able to replace the value.
/// Read access is handed out through [`StateReader`].
///
/// # Example
///
/// ```rust
/// use state_store::StateStore;
///
/// let mut store = StateStore::new(0u32);
/// let reader = store.reader();
///
/// // Unchanged values are not written
/// assert!(store.replace_if_changed(0).is_none());
///
/// // Changed values are swapped in, and the old value is returned
/// let old = store.replace_if_changed(7).unwrap();
/// assert_eq!(*old, 0);
/// assert_eq!(*reader.get(), 7);
/// ```
pub struct StateStore<T> {
    slot: Slot<T>,
}

impl<T> StateStore<T>
where
    T: Send + Sync + 'static,
{
    /// Create a store holding `initial`
    pub fn new(initial: T) -> Self {
        Self {
            slot: Arc::new(RwLock::new(Arc::new(initial))),
        }
    }

    /// Get the current value
    pub fn get(&self) -> Arc<T> {
        read_slot(&self.slot)
    }

    /// Replace the current value, returning the previous one
    ///
    /// The replacement is a pointer swap; the old value is never mutated.
    pub fn swap(&mut self, value: T) -> Arc<T> {
        let value = Arc::new(value);
        let mut guard = self.slot.write().unwrap_or_else(PoisonError::into_inner);
        std::mem::replace(&mut *guard, value)
    }

    /// Create a read-only handle to this store
    pub fn reader(&self) -> StateReader<T> {
        StateReader {
            slot: Arc::clone(&self.slot),
        }
    }
}

impl<T> StateStore<T>
where
    T: PartialEq + Send + Sync + 'static,
{
    /// Replace the current value only if it differs from `value`
    ///
    /// Uses `PartialEq` to detect actual changes. Returns the previous value
    /// when a replacement happened, `None` when the value was unchanged (in
    /// which case the store is left untouched).
    pub fn replace_if_changed(&mut self, value: T) -> Option<Arc<T>> {
        if *self.get() == value {
            return None;
        }
        Some(self.swap(value))
    }
}

impl<T> Default for StateStore<T>
where
    T: Default + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T> std::fmt::Debug for StateStore<T>
where
    T: std::fmt::Debug + Send + Sync + 'static,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StateStore")
            .field("current", &self.get())
            .finish()
    }
}

// ============================================================================
// StateReader<T> - read handle
// ============================================================================

/// Read-only handle to a [`StateStore`]
///
/// Cloning a reader is cheap; every clone observes the same value.
pub struct StateReader<T> {
    slot: Slot<T>,
}

impl<T> StateReader<T>
where
    T: Send + Sync + 'static,
{
    /// Get the current value
    ///
    /// Takes the read lock only long enough to clone an `Arc`.
    pub fn get(&self) -> Arc<T> {
        read_slot(&self.slot)
    }
}

impl<T> Clone for StateReader<T> {
    fn clone(&self) -> Self {
        Self {
            slot: Arc::clone(&self.slot),
        }
    }
}

impl<T> std::fmt::Debug for StateReader<T>
where
    T: std::fmt::Debug + Send + Sync + 'static,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StateReader")
            .field("current", &self.get())
            .finish()
    }
}

fn read_slot<T>(slot: &Slot<T>) -> Arc<T> {
    // A poisoned lock still holds a complete value: writers only swap pointers.
    let guard = slot.read().unwrap_or_else(PoisonError::into_inner);
    Arc::clone(&guard)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[derive(Debug, Clone, PartialEq)]
    enum Reading {
        Nothing,
        Value(String),
    }

    #[test]
    fn test_new_store_holds_initial_value() {
        let store = StateStore::new(Reading::Nothing);
        assert_eq!(*store.get(), Reading::Nothing);
        assert_eq!(*store.reader().get(), Reading::Nothing);
    }

    #[test]
    fn test_swap_returns_previous_value() {
        let mut store = StateStore::new(Reading::Nothing);

        let old = store.swap(Reading::Value("a".to_string()));
        assert_eq!(*old, Reading::Nothing);

        let old = store.swap(Reading::Value("b".to_string()));
        assert_eq!(*old, Reading::Value("a".to_string()));
        assert_eq!(*store.get(), Reading::Value("b".to_string()));
    }

    #[test]
    fn test_replace_if_changed_skips_equal_values() {
        let mut store = StateStore::new(Reading::Value("a".to_string()));
        let before = store.get();

        assert!(store
            .replace_if_changed(Reading::Value("a".to_string()))
            .is_none());

        // Same allocation: the store was not written
        assert!(Arc::ptr_eq(&before, &store.get()));
    }

    #[test]
    fn test_replace_if_changed_swaps_different_values() {
        let mut store = StateStore::new(Reading::Value("a".to_string()));

        let old = store.replace_if_changed(Reading::Nothing);
        assert_eq!(old.as_deref(), Some(&Reading::Value("a".to_string())));
        assert_eq!(*store.get(), Reading::Nothing);
    }

    #[test]
    fn test_readers_share_the_slot() {
        let mut store = StateStore::new(1u64);
        let reader1 = store.reader();
        let reader2 = reader1.clone();

        store.swap(2);

        assert_eq!(*reader1.get(), 2);
        assert_eq!(*reader2.get(), 2);
    }

    #[test]
    fn test_readers_never_observe_torn_values() {
        // Each value is internally consistent: both halves are equal.
        let mut store = StateStore::new((0u64, 0u64));
        let reader = store.reader();

        let handle = thread::spawn(move || {
            for _ in 0..10_000 {
                let value = reader.get();
                assert_eq!(value.0, value.1);
            }
        });

        for i in 1..10_000u64 {
            store.swap((i, i));
        }

        handle.join().unwrap();
    }

    #[test]
    fn test_reader_outlives_store() {
        let mut store = StateStore::new(5u8);
        let reader = store.reader();
        store.swap(6);
        drop(store);

        assert_eq!(*reader.get(), 6);
    }
}
