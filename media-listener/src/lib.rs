//! # Media Listener
//!
//! Watches what the local machine is playing and distributes changes to any
//! number of concurrent observers.
//!
//! ## Features
//!
//! - **Single writer**: one sampler thread owns the current state; everyone
//!   else reads complete, immutable values
//! - **Change detection**: identical samples publish nothing; a transition to
//!   nothing playing publishes exactly one [`ChangeEvent::Stopped`]
//! - **Non-blocking fan-out**: a stalled subscriber loses events from its own
//!   bounded mailbox and never slows the sampler or other subscribers
//! - **Failure absorption**: provider errors and panics read as "nothing
//!   playing" and never stop the loop
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use media_listener::{ListenerConfig, MediaListener};
//! use media_provider::{default_provider, ControlCommand};
//! use std::time::Duration;
//!
//! let listener = MediaListener::start(default_provider(), ListenerConfig::default())?;
//! let subscription = listener.subscribe();
//!
//! for event in subscription.timeout_iter(Duration::from_secs(30)) {
//!     println!("{:?}", event);
//! }
//!
//! if let Err(e) = listener.control(ControlCommand::Next) {
//!     eprintln!("cannot skip: {e}");
//! }
//!
//! listener.stop();
//! # Ok::<(), media_listener::ListenerError>(())
//! ```
//!
//! ## Architecture
//!
//! ```text
//! MediaListener::start()
//!     │
//!     ├── media-sampler thread ── Sampler::tick()
//!     │       │   Provider::sample()
//!     │       │   StateStore::replace_if_changed()
//!     │       └── Broadcaster::publish(ChangeEvent)
//!     │
//!     ├── current()   ── StateReader::get()
//!     ├── subscribe() ── Broadcaster::subscribe() ── Subscription<ChangeEvent>
//!     └── control()   ── Provider::control()
//! ```

pub mod config;
pub mod error;
pub mod event;
pub mod listener;
pub mod logging;
pub mod sampler;

pub use config::{ListenerConfig, DEFAULT_MAILBOX_CAPACITY, DEFAULT_POLL_INTERVAL};
pub use error::{ListenerError, Result};
pub use event::ChangeEvent;
pub use listener::MediaListener;
pub use sampler::Sampler;

// Types callers need alongside the listener
pub use media_provider::{ControlCommand, ControlError, MediaState, Provider, Snapshot};
pub use state_store::{CancelHandle, StateReader, SubscriberId, Subscription};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{ChangeEvent, ListenerConfig, MediaListener};
    pub use media_provider::{ControlCommand, ControlError, MediaState, Snapshot};
    pub use state_store::Subscription;
}
