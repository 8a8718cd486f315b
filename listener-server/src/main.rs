use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use listener_server::{Args, ListenerServer};
use media_listener::logging::init_logging;
use media_listener::MediaListener;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.log_mode).context("failed to initialise logging")?;

    let listener = Arc::new(
        MediaListener::start(args.provider(), args.listener_config())
            .context("failed to start media listener")?,
    );

    let server = ListenerServer::start(args.bind, Arc::clone(&listener)).await?;
    info!(
        addr = %server.local_addr(),
        provider = listener.provider_name(),
        "media daemon ready"
    );

    tokio::select! {
        result = tokio::signal::ctrl_c() => {
            result.context("failed to listen for Ctrl-C")?;
            info!("received Ctrl-C, shutting down");
        }
        _ = server.wait_for_exit() => {
            info!("exit requested, shutting down");
        }
    }

    // Joining the sampler thread blocks
    let stopping = Arc::clone(&listener);
    tokio::task::spawn_blocking(move || stopping.stop())
        .await
        .context("failed to stop media listener")?;

    server.shutdown().await?;
    Ok(())
}
