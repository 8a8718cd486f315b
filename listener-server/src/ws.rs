//! WebSocket bridge from a [`Subscription`](media_listener::Subscription)
//! to one client
//!
//! The mailbox is a blocking receiver, so a dedicated forwarder thread
//! drains it into a one-slot async channel. The thread lives outside the
//! runtime's blocking pool, so connected clients never starve
//! `spawn_blocking` work such as control commands. A slow client therefore backs up
//! into its own bounded mailbox, where the broadcaster drops events for it
//! alone. When the client goes away the subscription is cancelled at once,
//! which also ends the forwarder.

use std::sync::Arc;
use std::thread;

use futures_util::{Sink, SinkExt, StreamExt};
use media_listener::MediaListener;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};
use warp::ws::{Message, WebSocket};

use crate::server::ShutdownSignal;
use crate::wire::WireMessage;

pub(crate) async fn serve_client(
    socket: WebSocket,
    listener: Arc<MediaListener>,
    shutdown: ShutdownSignal,
) {
    let (current, subscription) = listener.subscribe_with_current();
    let subscriber = subscription.id();
    let cancel = subscription.cancel_handle();
    info!(%subscriber, "websocket client connected");

    let (mut sink, mut incoming) = socket.split();

    let (tx, mut events) = mpsc::channel(1);
    let (done_tx, forwarder) = oneshot::channel::<()>();
    let spawned = thread::Builder::new()
        .name(format!("ws-forwarder-{}", subscriber.as_u64()))
        .spawn(move || {
            for event in subscription {
                if tx.blocking_send(event).is_err() {
                    break;
                }
            }
            let _ = done_tx.send(());
        });

    if let Err(e) = spawned {
        warn!(%subscriber, error = %e, "failed to start websocket forwarder");
        cancel.cancel();
        let _ = sink.close().await;
        return;
    }

    let initial_sent = match current.snapshot() {
        Some(snapshot) => send(&mut sink, &WireMessage::from(snapshot.clone())).await,
        None => true,
    };

    let stopping = shutdown.wait();
    tokio::pin!(stopping);

    if initial_sent {
        loop {
            tokio::select! {
                event = events.recv() => match event {
                    Some(event) => {
                        if !send(&mut sink, &WireMessage::from(event)).await {
                            break;
                        }
                    }
                    // Subscription closed: listener stopped
                    None => break,
                },
                message = incoming.next() => match message {
                    Some(Ok(message)) if message.is_close() => break,
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        debug!(%subscriber, error = %e, "websocket read failed");
                        break;
                    }
                    None => break,
                },
                _ = &mut stopping => break,
            }
        }
    }

    // Closing both ends unblocks the forwarder wherever it waits
    cancel.cancel();
    drop(events);
    let _ = sink.close().await;
    let _ = forwarder.await;
    info!(%subscriber, "websocket client disconnected");
}

/// Send one message, returning `false` if the client is gone
async fn send<S>(sink: &mut S, message: &WireMessage) -> bool
where
    S: Sink<Message, Error = warp::Error> + Unpin,
{
    let text = match message.to_json() {
        Ok(text) => text,
        Err(e) => {
            warn!(error = %e, "failed to serialise message");
            return true;
        }
    };

    match sink.send(Message::text(text)).await {
        Ok(()) => true,
        Err(e) => {
            debug!(error = %e, "websocket write failed");
            false
        }
    }
}
