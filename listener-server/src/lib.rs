//! HTTP and WebSocket surface for media-listener
//!
//! This crate is the transport collaborator of the listener core: it maps
//! `current()` onto `GET /now-playing`, subscriptions onto WebSocket
//! streams, and `control()` onto `POST /control/{command}`. It holds no
//! state of its own beyond open connections.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use listener_server::ListenerServer;
//! use media_listener::{ListenerConfig, MediaListener};
//! use media_provider::default_provider;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let listener = Arc::new(MediaListener::start(
//!         default_provider(),
//!         ListenerConfig::default(),
//!     )?);
//!
//!     let server = ListenerServer::start("127.0.0.1:14565".parse()?, Arc::clone(&listener)).await?;
//!     println!("listening on {}", server.local_addr());
//!
//!     // Runs until a client POSTs /exit
//!     server.wait_for_exit().await;
//!
//!     listener.stop();
//!     server.shutdown().await?;
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod error;
pub mod routes;
pub mod server;
pub mod wire;
mod ws;

pub use cli::Args;
pub use error::ServerError;
pub use routes::{routes, RouteContext};
pub use server::{ListenerServer, ShutdownSignal, DEFAULT_BIND};
pub use wire::{WireEvent, WireMessage};
