//! Module router server.
//!
//! ```text
//!   module root ──▶ modules::registry ──▶ routing::registrar ──▶ RouteTable
//!        ▲                                                          │
//!        │ notify / SIGHUP                                          ▼
//!   config::watcher ──▶ lifecycle::startup (rebuild) ──▶ http::dispatch ◀── requests
//! ```
//!
//! Every synthesized route is answered by the preview handler, which echoes
//! the matched controller, method and parameters as JSON.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tokio::sync::mpsc;

use module_router::config::{load_or_default, ModuleWatcher};
use module_router::http::{HandlerTable, HttpServer};
use module_router::lifecycle::{signals, RouteService, Shutdown};
use module_router::observability::logging;

#[derive(Parser)]
#[command(name = "module-router")]
#[command(about = "Serve routes synthesized from module descriptors", long_about = None)]
struct Args {
    /// Path to the TOML configuration file.
    #[arg(short, long, env = "MODULE_ROUTER_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let config = load_or_default(args.config.as_deref())?;
    logging::init(&config.observability)?;

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        module_root = %config.registry.module_root.display(),
        bind_address = %config.server.bind_address,
        "module-router starting"
    );

    let service = Arc::new(RouteService::from_config(&config, HandlerTable::preview())?);
    let server = HttpServer::new(config.server.clone(), service.dispatcher()?);
    let listener = server.bind().await?;

    let shutdown = Shutdown::new();
    let (reload_tx, reload_rx) = mpsc::unbounded_channel();

    signals::spawn_hangup_listener(reload_tx.clone(), &shutdown);

    // Dropping the watcher stops it, so it lives until main returns.
    let _watcher = if config.watch.enabled {
        let watcher = ModuleWatcher::new(
            service.registry().clone(),
            Duration::from_secs(config.watch.poll_interval_secs),
            reload_tx,
        );
        match watcher.run() {
            Ok(watcher) => Some(watcher),
            Err(e) => {
                tracing::warn!(error = %e, "Module watcher failed to start, hot reload disabled");
                None
            }
        }
    } else {
        drop(reload_tx);
        None
    };

    tokio::spawn(
        service
            .clone()
            .reload_loop(server.dispatcher(), reload_rx, shutdown.clone()),
    );

    let trigger = shutdown.clone();
    tokio::spawn(async move {
        signals::shutdown_signal().await;
        trigger.trigger();
    });

    server.run(listener, &shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
