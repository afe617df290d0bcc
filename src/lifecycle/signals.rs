//! OS signal handling.
//!
//! # Responsibilities
//! - Translate SIGINT/SIGTERM into a shutdown
//! - Translate SIGHUP into a route rebuild
//!
//! # Design Decisions
//! - Uses Tokio's signal handling (async-safe)
//! - SIGHUP triggers a rebuild, not a shutdown

use tokio::sync::mpsc;

use crate::lifecycle::shutdown::Shutdown;

/// Why the routes are being rebuilt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReloadReason {
    /// SIGHUP received.
    Hangup,
    /// The module watcher saw a change under the module root.
    ModulesChanged,
}

/// Resolves on Ctrl+C, or SIGTERM on unix.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("Shutdown signal received");
}

/// Forwards every SIGHUP as [`ReloadReason::Hangup`] until shutdown.
#[cfg(unix)]
pub fn spawn_hangup_listener(tx: mpsc::UnboundedSender<ReloadReason>, shutdown: &Shutdown) {
    use tokio::signal::unix::{signal, SignalKind};

    let mut hangup = match signal(SignalKind::hangup()) {
        Ok(stream) => stream,
        Err(err) => {
            tracing::warn!(error = %err, "SIGHUP reload unavailable");
            return;
        }
    };
    let stop = shutdown.listen();

    tokio::spawn(async move {
        tokio::pin!(stop);
        loop {
            tokio::select! {
                _ = &mut stop => break,
                received = hangup.recv() => {
                    if received.is_none() || tx.send(ReloadReason::Hangup).is_err() {
                        break;
                    }
                    tracing::info!("SIGHUP received, rebuilding routes");
                }
            }
        }
    });
}

#[cfg(not(unix))]
pub fn spawn_hangup_listener(_tx: mpsc::UnboundedSender<ReloadReason>, _shutdown: &Shutdown) {}
