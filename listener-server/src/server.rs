//! HTTP server lifecycle

use std::net::SocketAddr;
use std::sync::Arc;

use media_listener::MediaListener;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::info;

use crate::error::ServerError;
use crate::routes::{routes, RouteContext};

/// Address the daemon has always listened on
pub const DEFAULT_BIND: &str = "127.0.0.1:14565";

/// One-shot, cloneable shutdown request
///
/// Triggered by `POST /exit` or by the host; observed by the HTTP server and
/// every open WebSocket.
#[derive(Debug, Clone)]
pub struct ShutdownSignal {
    tx: Arc<watch::Sender<bool>>,
}

impl ShutdownSignal {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    /// Request shutdown; later calls do nothing
    pub fn trigger(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_triggered(&self) -> bool {
        *self.tx.borrow()
    }

    /// Resolve once shutdown was requested
    pub async fn wait(&self) {
        let mut rx = self.tx.subscribe();
        // The sender lives in self, so the channel cannot close while we wait
        let _ = rx.wait_for(|triggered| *triggered).await;
    }
}

impl Default for ShutdownSignal {
    fn default() -> Self {
        Self::new()
    }
}

/// HTTP + WebSocket server in front of a [`MediaListener`]
///
/// The server does not own the listener's lifecycle: the host stops the
/// listener (which closes every subscription) and then shuts the server down.
pub struct ListenerServer {
    addr: SocketAddr,
    shutdown: ShutdownSignal,
    handle: Option<JoinHandle<()>>,
}

impl ListenerServer {
    /// Bind `addr` and start serving on the current tokio runtime
    ///
    /// Port 0 picks a free port; see [`local_addr`](Self::local_addr).
    pub async fn start(addr: SocketAddr, listener: Arc<MediaListener>) -> Result<Self, ServerError> {
        let shutdown = ShutdownSignal::new();
        let routes = routes(RouteContext::new(listener, shutdown.clone()));

        let signal = shutdown.clone();
        let (bound, server) = warp::serve(routes)
            .try_bind_with_graceful_shutdown(addr, async move { signal.wait().await })
            .map_err(|e| ServerError::Bind {
                addr,
                reason: e.to_string(),
            })?;

        let handle = tokio::spawn(server);
        info!(addr = %bound, "media listener server listening");

        Ok(Self {
            addr: bound,
            shutdown,
            handle: Some(handle),
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn shutdown_signal(&self) -> ShutdownSignal {
        self.shutdown.clone()
    }

    /// Resolve once `POST /exit` was received or shutdown was triggered
    pub async fn wait_for_exit(&self) {
        self.shutdown.wait().await
    }

    /// Stop accepting requests and wait for in-flight ones to finish
    pub async fn shutdown(mut self) -> Result<(), ServerError> {
        self.shutdown.trigger();
        if let Some(handle) = self.handle.take() {
            handle.await.map_err(|e| ServerError::Join(e.to_string()))?;
        }
        info!("media listener server stopped");
        Ok(())
    }
}

impl Drop for ListenerServer {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

impl std::fmt::Debug for ListenerServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListenerServer")
            .field("addr", &self.addr)
            .field("shutdown", &self.shutdown.is_triggered())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_shutdown_signal_wakes_waiters() {
        let signal = ShutdownSignal::new();
        let waiter = {
            let signal = signal.clone();
            tokio::spawn(async move { signal.wait().await })
        };

        assert!(!signal.is_triggered());
        signal.trigger();
        tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .unwrap()
            .unwrap();
        assert!(signal.is_triggered());
    }

    #[tokio::test]
    async fn test_wait_after_trigger_returns_immediately() {
        let signal = ShutdownSignal::new();
        signal.trigger();
        signal.trigger();
        tokio::time::timeout(Duration::from_millis(100), signal.wait())
            .await
            .unwrap();
    }

    #[test]
    fn test_default_bind_parses() {
        let addr: SocketAddr = DEFAULT_BIND.parse().unwrap();
        assert!(addr.ip().is_loopback());
        assert_eq!(addr.port(), 14565);
    }
}
