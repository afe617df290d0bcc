//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum app with a single dispatching fallback
//! - Wire up middleware (tracing, timeout, request ID)
//! - Bind to a listener and serve until shutdown
//! - Hand out the dispatcher slot used for hot reload

use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwap;
use axum::{
    body::Body,
    extract::State,
    http::Request,
    response::Response,
    Router,
};
use thiserror::Error;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::schema::ServerConfig;
use crate::http::dispatch::Dispatcher;
use crate::http::request::{request_id_header, MakeRequestUuid, RequestIdExt};
use crate::lifecycle::shutdown::Shutdown;

/// Shared, swappable dispatcher.
pub type DispatcherSlot = Arc<ArcSwap<Dispatcher>>;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("failed to bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },

    #[error("server error: {0}")]
    Serve(#[from] std::io::Error),
}

/// Application state injected into the handler.
#[derive(Clone)]
struct AppState {
    dispatcher: DispatcherSlot,
}

/// HTTP host serving synthesized routes.
pub struct HttpServer {
    config: ServerConfig,
    dispatcher: DispatcherSlot,
}

impl HttpServer {
    pub fn new(config: ServerConfig, dispatcher: Dispatcher) -> Self {
        Self {
            config,
            dispatcher: Arc::new(ArcSwap::from_pointee(dispatcher)),
        }
    }

    /// The dispatcher slot; storing a new dispatcher takes effect on the next request.
    pub fn dispatcher(&self) -> DispatcherSlot {
        self.dispatcher.clone()
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    pub fn router(&self) -> Router {
        let state = AppState {
            dispatcher: self.dispatcher.clone(),
        };

        // Outermost first: the request ID exists before the trace span opens.
        let layers = ServiceBuilder::new()
            .layer(SetRequestIdLayer::new(request_id_header(), MakeRequestUuid))
            .layer(
                TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                    tracing::info_span!(
                        "request",
                        method = %request.method(),
                        path = %request.uri().path(),
                        request_id = %request.request_id(),
                    )
                }),
            )
            .layer(PropagateRequestIdLayer::new(request_id_header()))
            .layer(TimeoutLayer::new(Duration::from_secs(
                self.config.request_timeout_secs,
            )));

        Router::new()
            .fallback(dispatch_handler)
            .with_state(state)
            .layer(layers)
    }

    /// Bind `config.bind_address`.
    pub async fn bind(&self) -> Result<TcpListener, ServerError> {
        TcpListener::bind(&self.config.bind_address)
            .await
            .map_err(|source| ServerError::Bind {
                address: self.config.bind_address.clone(),
                source,
            })
    }

    /// Serve on `listener` until `shutdown` fires.
    pub async fn run(self, listener: TcpListener, shutdown: &Shutdown) -> Result<(), ServerError> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, routes = self.dispatcher.load().len(), "HTTP server starting");

        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown.listen())
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

async fn dispatch_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let dispatcher = state.dispatcher.load_full();
    dispatcher.dispatch(request).await
}
