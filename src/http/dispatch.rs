//! Request dispatch over a compiled route table.
//!
//! # Responsibilities
//! - Compile every recorded route (path matcher, middleware chain) once
//! - Find the first route whose path and verb match a request
//! - Run the route's middleware, then its handler
//!
//! # Design Decisions
//! - First match wins, in registration order
//! - HEAD is answered by any route that answers GET
//! - A path match with no verb match is 405, otherwise 404
//! - Under the API prefix a 404 is JSON

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request};
use axum::response::Response;
use thiserror::Error;

use crate::http::handler::{HandlerTable, RouteContext};
use crate::http::middleware::{MiddlewareRegistry, RouteMiddleware};
use crate::http::request::RequestIdExt;
use crate::http::response;
use crate::observability::metrics;
use crate::routing::matcher::{PathMatcher, PathParams};
use crate::routing::router::{RouteEntry, RouteTable};
use crate::routing::verb::HttpVerb;

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("route `{path}` has an invalid constraint: {source}")]
    InvalidConstraint {
        path: String,
        #[source]
        source: regex::Error,
    },
}

/// One route ready for dispatch.
struct CompiledRoute {
    entry: RouteEntry,
    matcher: PathMatcher,
    middleware: Vec<Arc<dyn RouteMiddleware>>,
}

impl CompiledRoute {
    fn answers(&self, verb: Option<HttpVerb>) -> bool {
        match verb {
            Some(HttpVerb::Head) => {
                self.entry.verbs.contains(HttpVerb::Head) || self.entry.verbs.contains(HttpVerb::Get)
            }
            Some(verb) => self.entry.verbs.contains(verb),
            None => false,
        }
    }
}

/// Outcome of looking a request up.
#[derive(Debug)]
pub enum Resolution<'a> {
    Found {
        route: &'a RouteEntry,
        params: PathParams,
    },
    MethodNotAllowed(Vec<HttpVerb>),
    NotFound,
}

/// Immutable, compiled routing state. Swapped as a whole on reload.
pub struct Dispatcher {
    routes: Vec<CompiledRoute>,
    handlers: Arc<HandlerTable>,
    api_prefix: Option<String>,
}

impl Dispatcher {
    /// Compile a route table.
    pub fn build(
        table: &RouteTable,
        handlers: Arc<HandlerTable>,
        middleware: &MiddlewareRegistry,
        api_prefix: Option<&str>,
    ) -> Result<Self, DispatchError> {
        let routes = table
            .routes()
            .iter()
            .map(|entry| {
                let matcher = PathMatcher::compile(&entry.path, &entry.constraints).map_err(
                    |source| DispatchError::InvalidConstraint {
                        path: entry.uri(),
                        source,
                    },
                )?;
                Ok(CompiledRoute {
                    middleware: middleware.resolve(&entry.middleware, &entry.uri()),
                    matcher,
                    entry: entry.clone(),
                })
            })
            .collect::<Result<Vec<_>, DispatchError>>()?;

        tracing::info!(routes = routes.len(), "Dispatcher compiled");
        Ok(Self {
            routes,
            handlers,
            api_prefix: normalize_prefix(api_prefix),
        })
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Looks up the route for `method` and `path`.
    pub fn resolve(&self, method: &Method, path: &str) -> Resolution<'_> {
        self.find(method, path)
            .map(|(route, params)| Resolution::Found {
                route: &route.entry,
                params,
            })
            .unwrap_or_else(|allowed| {
                if allowed.is_empty() {
                    Resolution::NotFound
                } else {
                    Resolution::MethodNotAllowed(allowed)
                }
            })
    }

    /// First route matching both path and verb, or the verbs allowed on the path.
    fn find(&self, method: &Method, path: &str) -> Result<(&CompiledRoute, PathParams), Vec<HttpVerb>> {
        let verb = method.as_str().parse::<HttpVerb>().ok();
        let mut allowed = Vec::new();

        for route in &self.routes {
            let Some(params) = route.matcher.matches(path) else {
                continue;
            };
            if route.answers(verb) {
                return Ok((route, params));
            }
            for candidate in route.entry.verbs.verbs() {
                if !allowed.contains(&candidate) {
                    allowed.push(candidate);
                }
            }
        }

        allowed.sort();
        Err(allowed)
    }

    fn is_api_path(&self, path: &str) -> bool {
        let Some(prefix) = &self.api_prefix else {
            return false;
        };
        let path = path.trim_start_matches('/');
        path.strip_prefix(prefix.as_str())
            .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
    }

    /// Serves one request.
    pub async fn dispatch(&self, request: Request<Body>) -> Response {
        let method = request.method().clone();
        let path = request.uri().path().to_string();

        let response = match self.find(&method, &path) {
            Ok((route, params)) => {
                let gate = route.middleware.iter().try_for_each(|m| m.check(&request));
                match gate {
                    Err(rejection) => rejection,
                    Ok(()) => {
                        tracing::debug!(
                            request_id = %request.request_id(),
                            handler = %route.entry.handler,
                            "Route matched"
                        );
                        let handler = self.handlers.resolve(&route.entry.handler);
                        handler
                            .call(RouteContext {
                                handler: route.entry.handler.clone(),
                                route_name: route.entry.full_name.clone(),
                                path: path.clone(),
                                params,
                                request,
                            })
                            .await
                    }
                }
            }
            Err(allowed) if !allowed.is_empty() => response::method_not_allowed(&allowed),
            Err(_) if self.is_api_path(&path) => response::json_not_found(),
            Err(_) => {
                tracing::debug!(path = %path, "No route matched");
                response::not_found()
            }
        };

        metrics::record_dispatch(method.as_str(), response.status().as_u16());
        response
    }
}

fn normalize_prefix(prefix: Option<&str>) -> Option<String> {
    prefix
        .map(|prefix| prefix.trim_matches('/').to_string())
        .filter(|prefix| !prefix.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::controller::HandlerRef;
    use crate::routing::pattern::ConstraintMap;
    use crate::routing::router::{PendingRoute, Router};
    use crate::routing::verb::VerbSet;

    fn table() -> RouteTable {
        let mut table = RouteTable::new();
        let mut constraints = ConstraintMap::new();
        constraints.insert("id", r"(\d+)");
        table
            .add_route(
                VerbSet::single(HttpVerb::Get),
                "post/show/{id}",
                HandlerRef {
                    controller: "Post".into(),
                    method: "getShow".into(),
                },
            )
            .constraints(&constraints)
            .name("getShow");
        table
            .add_route(
                VerbSet::single(HttpVerb::Delete),
                "post/show/{id}",
                HandlerRef {
                    controller: "Post".into(),
                    method: "deleteShow".into(),
                },
            )
            .constraints(&constraints);
        table
    }

    fn dispatcher() -> Dispatcher {
        Dispatcher::build(
            &table(),
            Arc::new(HandlerTable::preview()),
            &MiddlewareRegistry::new(),
            Some("api"),
        )
        .unwrap()
    }

    #[test]
    fn test_resolve_found() {
        let dispatcher = dispatcher();
        match dispatcher.resolve(&Method::GET, "/post/show/7") {
            Resolution::Found { route, params } => {
                assert_eq!(route.name.as_deref(), Some("getShow"));
                assert_eq!(params, vec![("id".to_string(), "7".to_string())]);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_head_served_by_get() {
        let dispatcher = dispatcher();
        assert!(matches!(
            dispatcher.resolve(&Method::HEAD, "/post/show/7"),
            Resolution::Found { .. }
        ));
    }

    #[test]
    fn test_method_not_allowed_lists_verbs() {
        let dispatcher = dispatcher();
        match dispatcher.resolve(&Method::POST, "/post/show/7") {
            Resolution::MethodNotAllowed(allowed) => {
                assert_eq!(allowed, vec![HttpVerb::Get, HttpVerb::Delete]);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_constraint_mismatch_is_not_found() {
        let dispatcher = dispatcher();
        assert!(matches!(
            dispatcher.resolve(&Method::GET, "/post/show/abc"),
            Resolution::NotFound
        ));
    }

    #[test]
    fn test_api_path_detection() {
        let dispatcher = dispatcher();
        assert!(dispatcher.is_api_path("/api"));
        assert!(dispatcher.is_api_path("/api/shop"));
        assert!(!dispatcher.is_api_path("/apis"));
        assert!(!dispatcher.is_api_path("/post"));
    }

    #[test]
    fn test_invalid_constraint_fails_build() {
        let mut table = RouteTable::new();
        let mut constraints = ConstraintMap::new();
        constraints.insert("id", "([");
        table
            .add_route(
                VerbSet::Any,
                "{id}",
                HandlerRef {
                    controller: "X".into(),
                    method: "y".into(),
                },
            )
            .constraints(&constraints);

        let result = Dispatcher::build(
            &table,
            Arc::new(HandlerTable::preview()),
            &MiddlewareRegistry::new(),
            None,
        );
        assert!(matches!(result, Err(DispatchError::InvalidConstraint { .. })));
    }
}
