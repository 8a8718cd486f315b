//! Generic State Synchronization Primitives
//!
//! Building blocks for publishing one slowly-changing value to many
//! concurrent observers.
//!
//! # Features
//!
//! - **Single-writer store**: one owner replaces the value, any number of
//!   readers see complete values only
//! - **Change detection**: `replace_if_changed` only writes when `PartialEq`
//!   says the value differs
//! - **Non-blocking fan-out**: publishing never waits on a slow subscriber
//! - **Bounded mailboxes**: memory stays bounded, a full mailbox drops the
//!   incoming event for that subscriber only
//! - **Blocking iteration**: consume events with `recv()`, `for event in sub`,
//!   `try_iter()` or `timeout_iter()`
//!
//! # Quick Start
//!
//! ```rust
//! use state_store::{Broadcaster, StateStore};
//!
//! #[derive(Debug, Clone, PartialEq)]
//! enum Light {
//!     Off,
//!     On(u8),
//! }
//!
//! let mut store = StateStore::new(Light::Off);
//! let broadcaster = Broadcaster::new(5);
//!
//! // Readers and subscribers are handed out freely
//! let reader = store.reader();
//! let subscription = broadcaster.subscribe();
//!
//! // The writer publishes only real changes
//! if store.replace_if_changed(Light::On(80)).is_some() {
//!     broadcaster.publish(Light::On(80));
//! }
//!
//! assert_eq!(*reader.get(), Light::On(80));
//! assert_eq!(subscription.try_recv(), Ok(Light::On(80)));
//! ```
//!
//! # Architecture
//!
//! ```text
//! StateStore<T> ──reader()──► StateReader<T> (get)
//!     │
//!     └── slot: RwLock<Arc<T>>   (pointer swap, never mutated in place)
//!
//! Broadcaster<E>
//!     │
//!     └── registry: Mutex<HashMap<SubscriberId, SyncSender<E>>>
//!             │
//!             └── Subscription<E> (bounded mailbox, CancelHandle)
//! ```

// Modules
pub mod broadcast;
pub mod iter;
pub mod store;
pub mod subscription;

// Re-exports - Public API
pub use broadcast::{Broadcaster, PublishReport, SubscriberId};
pub use iter::{TimeoutIter, TryIter};
pub use std::sync::mpsc::TryRecvError;
pub use store::{StateReader, StateStore};
pub use subscription::{CancelHandle, Subscription};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::broadcast::{Broadcaster, PublishReport, SubscriberId};
    pub use crate::store::{StateReader, StateStore};
    pub use crate::subscription::{CancelHandle, Subscription};
}
