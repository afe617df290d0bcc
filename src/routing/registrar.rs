//! Route registration.
//!
//! # Responsibilities
//! - Resolve a module's controller from the [`ControllerTable`]
//! - Decode and map every eligible method
//! - Register one route per method inside a per-module group
//!
//! # Data Flow
//! ```text
//! ModuleDescriptor
//!     → gate (enabled, kind controller, `modules-init` matching its origin)
//!     → controller lookup (Modules/<Dir>/Http/Controllers/<Name>)
//!     → method filter (public, own, no `__`, only/except)
//!     → decoder + mapper per method
//!     → Router::group → add_route(..).constraints(..).name(..).middleware(..)
//! ```
//!
//! # Design Decisions
//! - Every method is planned before the first route is added, so a mapping
//!   error leaves the router untouched for that module
//! - A missing controller is a skip, not an error

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::schema::RoutingConfig;
use crate::modules::descriptor::{ModuleDescriptor, Origin};
use crate::observability::metrics;
use crate::routing::controller::{controller_key, ControllerTable, HandlerRef, MethodDescriptor};
use crate::routing::decoder::MethodNameDecoder;
use crate::routing::mapper::{self, DefaultClassifier, MappingError, TypeClassifier};
use crate::routing::pattern::{ConstraintMap, PatternOverrides};
use crate::routing::router::{join_path, GroupOptions, PendingRoute, Router};
use crate::routing::verb::VerbSet;

/// Per-call registration options.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RegistrationOptions {
    /// If non-empty, only these method names are registered.
    pub only: Vec<String>,
    /// Method names never registered.
    pub except: Vec<String>,
    /// Pattern overrides keyed by parameter name or `:<type>`.
    pub patterns: PatternOverrides,
}

impl RegistrationOptions {
    fn admits(&self, method: &str) -> bool {
        (self.only.is_empty() || self.only.iter().any(|m| m == method))
            && !self.except.iter().any(|m| m == method)
    }
}

/// Why a module produced no routes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    Disabled,
    NotController,
    /// `modules-init` does not name the root the module was found under.
    InitMismatch,
    ControllerNotFound,
}

/// Outcome of registering one module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RegistrationReport {
    Registered { module: String, routes: usize },
    Skipped { module: String, reason: SkipReason },
}

impl RegistrationReport {
    pub fn route_count(&self) -> usize {
        match self {
            Self::Registered { routes, .. } => *routes,
            Self::Skipped { .. } => 0,
        }
    }
}

#[derive(Debug, Error)]
pub enum RegistrationError {
    #[error("module `{module}`, method `{method}`: {source}")]
    Mapping {
        module: String,
        method: String,
        #[source]
        source: MappingError,
    },
}

/// A route fully computed but not yet handed to the router.
#[derive(Debug)]
struct PlannedRoute {
    verbs: VerbSet,
    path: String,
    name: String,
    middleware: Option<String>,
    constraints: ConstraintMap,
    handler: HandlerRef,
}

/// Synthesizes routes for module descriptors.
pub struct Registrar {
    controllers: Arc<ControllerTable>,
    decoder: MethodNameDecoder,
    classifier: Arc<dyn TypeClassifier>,
    primary_init_tag: String,
    variant_init_tag: String,
}

impl Registrar {
    pub fn new(controllers: Arc<ControllerTable>, config: &RoutingConfig) -> Self {
        let classifier = Arc::new(DefaultClassifier::new(controllers.types().clone()));
        Self {
            controllers,
            decoder: MethodNameDecoder::from_config(config),
            classifier,
            primary_init_tag: config.primary_init_tag.clone(),
            variant_init_tag: config.variant_init_tag.clone(),
        }
    }

    /// Replaces the default type classifier.
    pub fn with_classifier(mut self, classifier: Arc<dyn TypeClassifier>) -> Self {
        self.classifier = classifier;
        self
    }

    pub fn controllers(&self) -> &ControllerTable {
        &self.controllers
    }

    /// Registers the routes of one module.
    pub fn register<R: Router>(
        &self,
        router: &mut R,
        descriptor: &ModuleDescriptor,
        options: &RegistrationOptions,
    ) -> Result<RegistrationReport, RegistrationError> {
        let module = descriptor.name.clone();

        if !descriptor.enabled {
            return Ok(skipped(module, SkipReason::Disabled));
        }
        if !descriptor.is_routable() {
            return Ok(skipped(module, SkipReason::NotController));
        }
        if !self.init_matches(descriptor) {
            tracing::debug!(
                module = %module,
                origin = %descriptor.origin,
                init = ?descriptor.init_tag,
                "Init tag does not match origin, module skipped"
            );
            return Ok(skipped(module, SkipReason::InitMismatch));
        }

        let key = controller_key(descriptor);
        let Some(controller) = self.controllers.get(&key) else {
            tracing::debug!(module = %module, controller = %key, "Controller not found, module skipped");
            return Ok(skipped(module, SkipReason::ControllerNotFound));
        };

        let planned = controller
            .methods
            .iter()
            .filter(|method| method.is_route_candidate() && options.admits(&method.name))
            .map(|method| self.plan(&key, method, options))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|(method, source)| RegistrationError::Mapping {
                module: module.clone(),
                method,
                source,
            })?;

        let count = planned.len();
        router.group(group_options(descriptor), |router| {
            for route in planned {
                router
                    .add_route(route.verbs, &route.path, route.handler)
                    .constraints(&route.constraints)
                    .name(&route.name)
                    .middleware(route.middleware.as_deref());
            }
        });

        metrics::record_routes_registered(&module, count);
        tracing::info!(
            module = %module,
            origin = %descriptor.origin,
            routes = count,
            "Module routes registered"
        );

        Ok(RegistrationReport::Registered {
            module,
            routes: count,
        })
    }

    /// Registers several modules, stopping at the first mapping error.
    pub fn register_all<'d, R: Router>(
        &self,
        router: &mut R,
        descriptors: impl IntoIterator<Item = &'d ModuleDescriptor>,
        options: &RegistrationOptions,
    ) -> Result<Vec<RegistrationReport>, RegistrationError> {
        descriptors
            .into_iter()
            .map(|descriptor| self.register(router, descriptor, options))
            .collect()
    }

    fn init_matches(&self, descriptor: &ModuleDescriptor) -> bool {
        let expected = match descriptor.origin {
            Origin::Primary => &self.primary_init_tag,
            Origin::Variant => &self.variant_init_tag,
        };
        expected.is_empty() || descriptor.init_tag.as_deref() == Some(expected.as_str())
    }

    fn plan(
        &self,
        controller_key: &str,
        method: &MethodDescriptor,
        options: &RegistrationOptions,
    ) -> Result<PlannedRoute, (String, MappingError)> {
        let decoded = self.decoder.decode(&method.name);
        let mapped = mapper::map(&method.params, &options.patterns, self.classifier.as_ref())
            .map_err(|err| (method.name.clone(), err))?;

        let segments: Vec<String> = mapped.segments.iter().map(ToString::to_string).collect();
        let path = join_path(
            std::iter::once(decoded.fragment.as_str()).chain(segments.iter().map(String::as_str)),
        );

        Ok(PlannedRoute {
            verbs: decoded.verbs,
            path,
            name: method.name.clone(),
            middleware: decoded.middleware,
            constraints: mapped.constraints,
            handler: HandlerRef {
                controller: controller_key.to_string(),
                method: method.name.clone(),
            },
        })
    }
}

fn skipped(module: String, reason: SkipReason) -> RegistrationReport {
    RegistrationReport::Skipped { module, reason }
}

/// Group options for one module: prefix, name prefix, tag and middleware.
pub fn group_options(descriptor: &ModuleDescriptor) -> GroupOptions {
    let prefix = descriptor.effective_prefix();
    let as_base = prefix.trim_matches('/').trim_matches('.');
    GroupOptions {
        prefix: prefix.to_string(),
        as_name: (!as_base.is_empty()).then(|| format!("{as_base}.")),
        tag: Some(format!("{0}.{0}", descriptor.name)),
        middleware: descriptor.middleware.clone(),
    }
}
