//! # Media Provider
//!
//! Data model and platform backends for observing what the local machine is
//! playing.
//!
//! The listener core only depends on the [`Provider`] trait: sample the
//! current [`MediaState`], execute a [`ControlCommand`]. This crate supplies
//! the implementations:
//!
//! - [`HelperProvider`]: runs an external helper and parses its pipe-delimited
//!   output (Windows, custom integrations)
//! - [`apple_script`]: Spotify and Apple Music through `osascript` (macOS)
//! - `mpris_backend`: any MPRIS player over D-Bus (Linux, `mpris` feature)
//! - [`CompositeProvider`]: priority-ordered fallback over several backends
//! - [`IdleProvider`]: never plays anything
//!
//! [`default_provider`] picks the right one for the current platform.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use media_provider::{default_provider, ControlCommand, MediaState};
//!
//! let provider = default_provider();
//!
//! match provider.sample() {
//!     MediaState::Playing(snapshot) => {
//!         println!("{:?} by {:?}", snapshot.title(), snapshot.artist());
//!         provider.control(ControlCommand::Next)?;
//!     }
//!     MediaState::Absent => println!("nothing playing"),
//! }
//! # Ok::<(), media_provider::ControlError>(())
//! ```

pub mod apple_script;
pub mod command;
pub mod composite;
pub mod error;
pub mod helper;
pub mod model;
#[cfg(all(target_os = "linux", feature = "mpris"))]
pub mod mpris_backend;
pub mod platform;
pub mod protocol;
pub mod provider;

#[cfg(feature = "test-support")]
pub mod testing;

pub use command::{ControlCommand, ParseCommandError};
pub use composite::CompositeProvider;
pub use error::ControlError;
pub use helper::{HelperCommand, HelperError, HelperProvider, DEFAULT_HELPER_TIMEOUT};
pub use model::{MediaState, Snapshot};
pub use platform::{default_provider, platform_name};
pub use protocol::{format_line, parse_line, parse_output, FieldLayout};
pub use provider::{IdleProvider, Provider};
