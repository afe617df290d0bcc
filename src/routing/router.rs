//! Router abstraction and the recording route table.
//!
//! # Responsibilities
//! - Define the narrow [`Router`] capability the registrar talks to
//! - Provide [`RouteTable`], a router that records every registration
//!
//! # Design Decisions
//! - Groups nest: prefixes and name prefixes concatenate, middleware
//!   accumulates outer-first, the innermost tag wins
//! - The table is plain data; the HTTP dispatcher and the CLI both read it
//! - Duplicate paths are recorded as-is, first registration wins at dispatch

use serde::Serialize;

use crate::routing::controller::HandlerRef;
use crate::routing::pattern::ConstraintMap;
use crate::routing::verb::VerbSet;

/// Options applied to every route registered inside a group.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupOptions {
    pub prefix: String,
    /// Route name prefix, usually ending in `.`.
    pub as_name: Option<String>,
    pub tag: Option<String>,
    pub middleware: Vec<String>,
}

impl GroupOptions {
    pub fn prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            ..Default::default()
        }
    }
}

/// A route that has been added but can still be refined.
pub trait PendingRoute: Sized {
    fn constraints(self, constraints: &ConstraintMap) -> Self;
    fn name(self, name: &str) -> Self;
    fn middleware(self, middleware: Option<&str>) -> Self;
}

/// What the registrar needs from a router.
pub trait Router {
    type Route<'a>: PendingRoute
    where
        Self: 'a;

    /// Runs `build` with `options` applied to every route it adds.
    fn group<F>(&mut self, options: GroupOptions, build: F)
    where
        F: FnOnce(&mut Self);

    fn add_route(&mut self, verbs: VerbSet, path: &str, handler: HandlerRef) -> Self::Route<'_>;
}

/// One recorded route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteEntry {
    pub verbs: VerbSet,
    /// Full path without a leading slash; empty for the root.
    pub path: String,
    /// Name given to the route itself.
    pub name: Option<String>,
    /// Name with every enclosing group's name prefix applied.
    pub full_name: Option<String>,
    pub tag: Option<String>,
    pub handler: HandlerRef,
    pub constraints: ConstraintMap,
    /// Group middleware outer-first, then the route's own.
    pub middleware: Vec<String>,
}

impl RouteEntry {
    /// Path as served, with a leading slash.
    pub fn uri(&self) -> String {
        format!("/{}", self.path)
    }
}

#[derive(Debug, Clone)]
struct Frame {
    prefix: String,
    as_name: String,
    tag: Option<String>,
    middleware: Vec<String>,
}

/// A [`Router`] that records registrations in order.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    routes: Vec<RouteEntry>,
    stack: Vec<Frame>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn routes(&self) -> &[RouteEntry] {
        &self.routes
    }

    pub fn into_routes(self) -> Vec<RouteEntry> {
        self.routes
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Looks a route up by the name it was registered with.
    pub fn find_by_name(&self, name: &str) -> Option<&RouteEntry> {
        self.routes.iter().find(|r| r.name.as_deref() == Some(name))
    }

    fn current(&self) -> Option<&Frame> {
        self.stack.last()
    }
}

/// Joins path parts with `/`, dropping empty parts and stray slashes.
pub fn join_path<'a>(parts: impl IntoIterator<Item = &'a str>) -> String {
    parts
        .into_iter()
        .map(|part| part.trim_matches('/'))
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("/")
}

impl Router for RouteTable {
    type Route<'a> = RecordedRoute<'a>;

    fn group<F>(&mut self, options: GroupOptions, build: F)
    where
        F: FnOnce(&mut Self),
    {
        let parent = self.current().cloned();
        let frame = match parent {
            Some(parent) => {
                let mut middleware = parent.middleware;
                middleware.extend(options.middleware);
                Frame {
                    prefix: join_path([parent.prefix.as_str(), options.prefix.as_str()]),
                    as_name: parent.as_name + options.as_name.as_deref().unwrap_or(""),
                    tag: options.tag.or(parent.tag),
                    middleware,
                }
            }
            None => Frame {
                prefix: join_path([options.prefix.as_str()]),
                as_name: options.as_name.unwrap_or_default(),
                tag: options.tag,
                middleware: options.middleware,
            },
        };

        self.stack.push(frame);
        build(self);
        self.stack.pop();
    }

    fn add_route(&mut self, verbs: VerbSet, path: &str, handler: HandlerRef) -> RecordedRoute<'_> {
        let (prefix, tag, middleware) = match self.current() {
            Some(frame) => (
                frame.prefix.clone(),
                frame.tag.clone(),
                frame.middleware.clone(),
            ),
            None => (String::new(), None, Vec::new()),
        };

        self.routes.push(RouteEntry {
            verbs,
            path: join_path([prefix.as_str(), path]),
            name: None,
            full_name: None,
            tag,
            handler,
            constraints: ConstraintMap::new(),
            middleware,
        });

        let as_name = self
            .stack
            .last()
            .map(|frame| frame.as_name.clone())
            .unwrap_or_default();
        let index = self.routes.len() - 1;
        RecordedRoute {
            entry: &mut self.routes[index],
            as_name,
        }
    }
}

/// Handle returned by [`RouteTable::add_route`].
#[derive(Debug)]
pub struct RecordedRoute<'a> {
    entry: &'a mut RouteEntry,
    as_name: String,
}

impl PendingRoute for RecordedRoute<'_> {
    fn constraints(self, constraints: &ConstraintMap) -> Self {
        for (name, pattern) in constraints.iter() {
            self.entry.constraints.insert(name, pattern);
        }
        self
    }

    fn name(self, name: &str) -> Self {
        self.entry.name = Some(name.to_string());
        self.entry.full_name = Some(format!("{}{}", self.as_name, name));
        self
    }

    fn middleware(self, middleware: Option<&str>) -> Self {
        if let Some(middleware) = middleware {
            self.entry.middleware.push(middleware.to_string());
        }
        self
    }
}
