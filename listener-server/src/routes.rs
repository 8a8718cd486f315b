//! HTTP routes
//!
//! | Method | Path                     | Response                                  |
//! |--------|--------------------------|-------------------------------------------|
//! | GET    | `/ready`                 | 200                                       |
//! | GET    | `/now-playing`           | 200 + snapshot JSON, 204 if nothing plays |
//! | GET    | `/now-playing/subscribe` | WebSocket stream of changes               |
//! | POST   | `/control/{command}`     | 200, or 500 with the error text           |
//! | POST   | `/exit`                  | 200, then graceful shutdown               |

use std::convert::Infallible;
use std::sync::Arc;

use media_listener::MediaListener;
use media_provider::ControlCommand;
use tracing::{debug, error};
use warp::http::StatusCode;
use warp::reply::Response;
use warp::{Filter, Rejection, Reply};

use crate::server::ShutdownSignal;
use crate::ws::serve_client;

/// Everything a request handler can reach
#[derive(Clone)]
pub struct RouteContext {
    listener: Arc<MediaListener>,
    shutdown: ShutdownSignal,
}

impl RouteContext {
    pub fn new(listener: Arc<MediaListener>, shutdown: ShutdownSignal) -> Self {
        Self { listener, shutdown }
    }
}

/// Build the complete route tree
pub fn routes(
    context: RouteContext,
) -> impl Filter<Extract = impl Reply, Error = Infallible> + Clone {
    let ready = warp::path!("ready")
        .and(warp::get())
        .map(|| StatusCode::OK);

    let now_playing = warp::path!("now-playing")
        .and(warp::get())
        .and(with_listener(&context))
        .map(now_playing_reply);

    let subscribe = warp::path!("now-playing" / "subscribe")
        .and(warp::ws())
        .and(with_listener(&context))
        .and(with_shutdown(&context))
        .map(
            |ws: warp::ws::Ws, listener: Arc<MediaListener>, shutdown: ShutdownSignal| {
                ws.on_upgrade(move |socket| serve_client(socket, listener, shutdown))
            },
        );

    let control = warp::path!("control" / String)
        .and(warp::post())
        .and(with_listener(&context))
        .and_then(control_handler);

    let exit = warp::path!("exit")
        .and(warp::post())
        .and(with_shutdown(&context))
        .map(|shutdown: ShutdownSignal| {
            debug!("exit requested over HTTP");
            shutdown.trigger();
            StatusCode::OK
        });

    ready
        .or(now_playing)
        .or(subscribe)
        .or(control)
        .or(exit)
        .recover(handle_rejection)
        .with(warp::trace::request())
}

fn with_listener(
    context: &RouteContext,
) -> impl Filter<Extract = (Arc<MediaListener>,), Error = Infallible> + Clone {
    let listener = Arc::clone(&context.listener);
    warp::any().map(move || Arc::clone(&listener))
}

fn with_shutdown(
    context: &RouteContext,
) -> impl Filter<Extract = (ShutdownSignal,), Error = Infallible> + Clone {
    let shutdown = context.shutdown.clone();
    warp::any().map(move || shutdown.clone())
}

fn now_playing_reply(listener: Arc<MediaListener>) -> Response {
    match listener.current().snapshot() {
        Some(snapshot) => warp::reply::json(snapshot).into_response(),
        None => StatusCode::NO_CONTENT.into_response(),
    }
}

async fn control_handler(
    name: String,
    listener: Arc<MediaListener>,
) -> Result<Response, Rejection> {
    let command: ControlCommand = name.parse().map_err(|_| warp::reject::not_found())?;

    // Providers block on processes or D-Bus
    let outcome = tokio::task::spawn_blocking(move || listener.control(command)).await;

    let reply = match outcome {
        Ok(Ok(())) => StatusCode::OK.into_response(),
        Ok(Err(e)) => {
            warp::reply::with_status(e.to_string(), StatusCode::INTERNAL_SERVER_ERROR)
                .into_response()
        }
        Err(e) => {
            error!(%command, error = %e, "control task failed");
            warp::reply::with_status(
                "control task failed".to_string(),
                StatusCode::INTERNAL_SERVER_ERROR,
            )
            .into_response()
        }
    };
    Ok(reply)
}

/// Handle rejections and convert them to HTTP responses.
async fn handle_rejection(err: Rejection) -> Result<impl Reply, Infallible> {
    let (code, message) = if err.is_not_found() {
        (StatusCode::NOT_FOUND, "Not found")
    } else if err.find::<warp::reject::MethodNotAllowed>().is_some() {
        (StatusCode::METHOD_NOT_ALLOWED, "Method not allowed")
    } else if err.find::<warp::reject::MissingHeader>().is_some()
        || err.find::<warp::reject::InvalidHeader>().is_some()
    {
        (StatusCode::BAD_REQUEST, "Bad request")
    } else {
        error!(rejection = ?err, "unhandled rejection");
        (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
    };

    Ok(warp::reply::with_status(message, code))
}
