//! Startup orchestration.
//!
//! # Responsibilities
//! - Load the controller table and build the registry and registrar
//! - Register primary modules at the root and variant modules under the API prefix
//! - Compile the dispatcher, and recompile it on reload
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - A failed reload keeps the dispatcher that is already serving

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::sync::mpsc;

use crate::config::loader::ConfigError;
use crate::config::schema::{AppConfig, RoutingConfig};
use crate::http::dispatch::{DispatchError, Dispatcher};
use crate::http::handler::HandlerTable;
use crate::http::middleware::{MiddlewareRegistry, RouteMiddleware};
use crate::http::server::DispatcherSlot;
use crate::lifecycle::shutdown::Shutdown;
use crate::lifecycle::signals::ReloadReason;
use crate::modules::descriptor::Origin;
use crate::modules::registry::{Discovery, ModuleRegistry};
use crate::routing::controller::{ControllerTable, ManifestError};
use crate::routing::registrar::{
    RegistrationError, RegistrationOptions, RegistrationReport, Registrar,
};
use crate::routing::router::{GroupOptions, RouteTable, Router};

/// Bursts of filesystem events within this window cause one rebuild.
const RELOAD_DEBOUNCE: Duration = Duration::from_millis(250);

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("controllers: {0}")]
    Manifest(#[from] ManifestError),

    #[error("registration: {0}")]
    Registration(#[from] RegistrationError),

    #[error("dispatch: {0}")]
    Dispatch(#[from] DispatchError),
}

/// Loads the configured controller manifest, or an empty table if none is set.
pub fn load_controllers(config: &RoutingConfig) -> Result<ControllerTable, ManifestError> {
    match &config.controllers_manifest {
        Some(path) => ControllerTable::from_manifest(path),
        None => {
            tracing::warn!("No controller manifest configured, no routes will be registered");
            Ok(ControllerTable::new())
        }
    }
}

/// Registers every discovered module.
///
/// Primary modules are registered at the root; variant modules inside an
/// outer group with prefix `api_prefix`.
pub fn register_modules<R: Router>(
    router: &mut R,
    discovery: &Discovery,
    registrar: &Registrar,
    options: &RegistrationOptions,
    api_prefix: &str,
) -> Result<Vec<RegistrationReport>, RegistrationError> {
    let of = |origin: Origin| discovery.merged.iter().filter(move |d| d.origin == origin);

    let mut reports = registrar.register_all(router, of(Origin::Primary), options)?;

    if of(Origin::Variant).next().is_some() {
        let mut variant = Ok(Vec::new());
        router.group(GroupOptions::prefix(api_prefix), |router| {
            variant = registrar.register_all(router, of(Origin::Variant), options);
        });
        reports.extend(variant?);
    }

    Ok(reports)
}

/// Everything needed to (re)build the dispatcher from disk.
pub struct RouteService {
    registry: Arc<ModuleRegistry>,
    registrar: Registrar,
    options: RegistrationOptions,
    api_prefix: String,
    handlers: Arc<HandlerTable>,
    middleware: MiddlewareRegistry,
}

impl RouteService {
    pub fn new(
        config: &AppConfig,
        registry: Arc<ModuleRegistry>,
        controllers: ControllerTable,
        handlers: HandlerTable,
    ) -> Self {
        Self {
            registry,
            registrar: Registrar::new(Arc::new(controllers), &config.routing),
            options: RegistrationOptions {
                patterns: config.routing.patterns.clone(),
                ..Default::default()
            },
            api_prefix: config.routing.api_prefix.clone(),
            handlers: Arc::new(handlers),
            middleware: MiddlewareRegistry::with_defaults(&config.routing.restricted_middleware),
        }
    }

    /// Builds the service from configuration, loading the controller manifest.
    pub fn from_config(config: &AppConfig, handlers: HandlerTable) -> Result<Self, StartupError> {
        let registry = Arc::new(ModuleRegistry::new(config.registry.clone()));
        let controllers = load_controllers(&config.routing)?;
        Ok(Self::new(config, registry, controllers, handlers))
    }

    /// Registers an additional named route middleware.
    pub fn with_middleware(mut self, name: &str, middleware: Arc<dyn RouteMiddleware>) -> Self {
        self.middleware.insert(name, middleware);
        self
    }

    pub fn with_options(mut self, options: RegistrationOptions) -> Self {
        self.options = options;
        self
    }

    pub fn registry(&self) -> &Arc<ModuleRegistry> {
        &self.registry
    }

    /// Discovers modules and records their routes.
    pub fn route_table(&self) -> Result<(RouteTable, Vec<RegistrationReport>), RegistrationError> {
        let discovery = self.registry.discover();
        let mut table = RouteTable::new();
        let reports = register_modules(
            &mut table,
            &discovery,
            &self.registrar,
            &self.options,
            &self.api_prefix,
        )?;
        Ok((table, reports))
    }

    /// Discovers, registers and compiles.
    pub fn dispatcher(&self) -> Result<Dispatcher, StartupError> {
        let (table, reports) = self.route_table()?;
        let skipped = reports.iter().filter(|r| r.route_count() == 0).count();
        tracing::info!(
            modules = reports.len(),
            skipped,
            routes = table.len(),
            "Routes synthesized"
        );
        Ok(Dispatcher::build(
            &table,
            self.handlers.clone(),
            &self.middleware,
            Some(&self.api_prefix),
        )?)
    }

    /// Rescans and swaps a fresh dispatcher into `slot`. Returns the route count.
    pub fn reload(&self, slot: &DispatcherSlot) -> Result<usize, StartupError> {
        self.registry.invalidate();
        let dispatcher = self.dispatcher()?;
        let routes = dispatcher.len();
        slot.store(Arc::new(dispatcher));
        Ok(routes)
    }

    /// Rebuilds on every reload request until shutdown.
    pub async fn reload_loop(
        self: Arc<Self>,
        slot: DispatcherSlot,
        mut rx: mpsc::UnboundedReceiver<ReloadReason>,
        shutdown: Shutdown,
    ) {
        let stop = shutdown.listen();
        tokio::pin!(stop);

        loop {
            let reason = tokio::select! {
                _ = &mut stop => break,
                reason = rx.recv() => match reason {
                    Some(reason) => reason,
                    None => break,
                },
            };

            tokio::time::sleep(RELOAD_DEBOUNCE).await;
            while rx.try_recv().is_ok() {}

            match self.reload(&slot) {
                Ok(routes) => tracing::info!(?reason, routes, "Routes rebuilt"),
                Err(e) => {
                    tracing::error!(?reason, error = %e, "Route rebuild failed, keeping current routes")
                }
            }
        }
        tracing::debug!("Reload loop stopped");
    }
}
