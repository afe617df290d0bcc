//! Route middleware.
//!
//! Routes carry middleware by name. Names are resolved against a
//! [`MiddlewareRegistry`] once, when the dispatcher is built; names with no
//! registered implementation are logged and ignored.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use axum::body::Body;
use axum::http::Request;
use axum::response::Response;

pub mod restricted;

pub use restricted::RestrictedMiddleware;

/// A check run before a route handler. `Err` short-circuits with its response.
pub trait RouteMiddleware: Send + Sync {
    fn check(&self, request: &Request<Body>) -> Result<(), Response>;
}

/// Named middleware implementations.
#[derive(Clone, Default)]
pub struct MiddlewareRegistry {
    entries: HashMap<String, Arc<dyn RouteMiddleware>>,
}

impl MiddlewareRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the restricted middleware under `restricted_name`.
    pub fn with_defaults(restricted_name: &str) -> Self {
        let mut registry = Self::new();
        registry.insert(restricted_name, Arc::new(RestrictedMiddleware));
        registry
    }

    pub fn insert(&mut self, name: impl Into<String>, middleware: Arc<dyn RouteMiddleware>) {
        self.entries.insert(name.into(), middleware);
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn RouteMiddleware>> {
        self.entries.get(name).cloned()
    }

    /// Resolves `names` in order, skipping unknown ones with a warning.
    pub fn resolve(&self, names: &[String], route: &str) -> Vec<Arc<dyn RouteMiddleware>> {
        names
            .iter()
            .filter_map(|name| {
                let found = self.get(name);
                if found.is_none() {
                    tracing::warn!(middleware = %name, route = %route, "Unknown middleware ignored");
                }
                found
            })
            .collect()
    }
}

impl fmt::Debug for MiddlewareRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&String> = self.entries.keys().collect();
        names.sort();
        f.debug_struct("MiddlewareRegistry")
            .field("names", &names)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_skips_unknown() {
        let registry = MiddlewareRegistry::with_defaults("xhr");
        let resolved = registry.resolve(&["guest".into(), "xhr".into()], "/post");
        assert_eq!(resolved.len(), 1);
        assert!(registry.get("guest").is_none());
    }
}
