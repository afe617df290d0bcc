//! Route handlers.
//!
//! Synthesized routes point at a [`HandlerRef`] (controller key + method).
//! The [`HandlerTable`] maps those references to async handlers; references
//! with no entry fall through to the table's default handler.

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use axum::body::Body;
use axum::http::Request;
use axum::response::{IntoResponse, Response};
use axum::Json;
use futures_util::future::BoxFuture;
use futures_util::FutureExt;
use serde::Serialize;

use crate::http::request::RequestIdExt;
use crate::routing::controller::HandlerRef;
use crate::routing::matcher::PathParams;

/// Everything a handler receives for one matched request.
#[derive(Debug)]
pub struct RouteContext {
    pub handler: HandlerRef,
    pub route_name: Option<String>,
    pub path: String,
    pub params: PathParams,
    pub request: Request<Body>,
}

impl RouteContext {
    /// Value of a captured path parameter.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}

pub trait RouteHandler: Send + Sync {
    fn call(&self, ctx: RouteContext) -> BoxFuture<'static, Response>;
}

impl<F, Fut> RouteHandler for F
where
    F: Fn(RouteContext) -> Fut + Send + Sync,
    Fut: Future<Output = Response> + Send + 'static,
{
    fn call(&self, ctx: RouteContext) -> BoxFuture<'static, Response> {
        (self)(ctx).boxed()
    }
}

/// Handler lookup with a default.
#[derive(Clone)]
pub struct HandlerTable {
    handlers: HashMap<HandlerRef, Arc<dyn RouteHandler>>,
    fallback: Arc<dyn RouteHandler>,
}

impl HandlerTable {
    pub fn new(fallback: Arc<dyn RouteHandler>) -> Self {
        Self {
            handlers: HashMap::new(),
            fallback,
        }
    }

    /// Table answering every route with [`PreviewHandler`].
    pub fn preview() -> Self {
        Self::new(Arc::new(PreviewHandler))
    }

    pub fn insert(&mut self, handler: HandlerRef, implementation: Arc<dyn RouteHandler>) {
        self.handlers.insert(handler, implementation);
    }

    pub fn resolve(&self, handler: &HandlerRef) -> Arc<dyn RouteHandler> {
        self.handlers
            .get(handler)
            .cloned()
            .unwrap_or_else(|| self.fallback.clone())
    }
}

impl fmt::Debug for HandlerTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerTable")
            .field("handlers", &self.handlers.len())
            .finish()
    }
}

#[derive(Debug, Serialize)]
struct Preview {
    controller: String,
    method: String,
    route: Option<String>,
    path: String,
    params: HashMap<String, String>,
    request_id: String,
}

/// Answers with a JSON description of the matched route.
#[derive(Debug, Clone, Copy, Default)]
pub struct PreviewHandler;

impl RouteHandler for PreviewHandler {
    fn call(&self, ctx: RouteContext) -> BoxFuture<'static, Response> {
        let preview = Preview {
            request_id: ctx.request.request_id().to_string(),
            controller: ctx.handler.controller,
            method: ctx.handler.method,
            route: ctx.route_name,
            path: ctx.path,
            params: ctx.params.into_iter().collect(),
        };
        async move { Json(preview).into_response() }.boxed()
    }
}
