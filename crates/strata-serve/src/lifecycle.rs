//! Server lifecycle: Stopped -> Listening -> ShuttingDown -> Stopped.
//!
//! The listener runs on its own task so the main path can block on the
//! interrupt signal. Shutdown is coordinated through a watch channel: the
//! signal waiter flips it once, the serve task stops accepting and drains
//! in-flight requests, and a fixed grace period bounds the drain. Errors
//! past the bind are logged and never change the process exit code.

use std::io::Write;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{Context, Result};
use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use strata_core::SharedConfig;

use crate::bridge::{router, BridgeState};

/// How long in-flight requests get to finish after the interrupt.
pub const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

/// Bind the listener and serve until an interrupt arrives.
///
/// Returns `Err` only for failures before the server is up (binding the
/// port, installing the signal handler); everything after that is logged
/// and swallowed so a clean shutdown exits 0.
pub async fn run(config: Arc<SharedConfig>, port: u16) -> Result<()> {
    let mirror = config.mirror_console.then(|| {
        Arc::new(Mutex::new(Box::new(std::io::stdout()) as Box<dyn Write + Send>))
    });
    let state = Arc::new(BridgeState { config, mirror });
    let app = router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(%addr, "command bridge listening");

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let server = tokio::spawn(serve(listener, app, shutdown_rx));

    // Exactly one interrupt is awaited. A second SIGINT during the grace
    // period is swallowed by the installed handler; the deadline in
    // `drain` is the only hard stop.
    tokio::signal::ctrl_c()
        .await
        .context("failed to install interrupt handler")?;
    info!("interrupt received, shutting down");
    let _ = shutdown_tx.send(true);

    drain(server, SHUTDOWN_GRACE).await;
    Ok(())
}

/// Serve connections until the shutdown flag flips, then drain.
pub async fn serve(
    listener: TcpListener,
    app: Router,
    mut shutdown: watch::Receiver<bool>,
) -> std::io::Result<()> {
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let _ = shutdown.wait_for(|&stop| stop).await;
        })
        .await
}

/// Give the serve task up to `grace` to finish, then abort it, cutting off
/// whatever requests are still running.
async fn drain(mut server: JoinHandle<std::io::Result<()>>, grace: Duration) {
    match tokio::time::timeout(grace, &mut server).await {
        Ok(Ok(Ok(()))) => info!("shutdown complete"),
        Ok(Ok(Err(e))) => warn!(error = %e, "server error during shutdown"),
        Ok(Err(e)) => warn!(error = %e, "server task failed"),
        Err(_) => {
            server.abort();
            warn!(
                grace_secs = grace.as_secs(),
                "grace period elapsed, terminating in-flight requests"
            );
        }
    }
}
