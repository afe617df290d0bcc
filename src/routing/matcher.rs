//! Route path matching.
//!
//! # Responsibilities
//! - Compile a recorded route path (`post/show/{id}`) into segment matchers
//! - Match request paths, capturing parameter values
//!
//! # Design Decisions
//! - Static segments match case-sensitively
//! - Parameters match one whole segment against their anchored constraint
//! - Optional parameters may be absent only at the end of the path
//! - Regexes are compiled once, when the dispatcher is built

use regex::Regex;

use crate::routing::pattern::{self, ConstraintMap};

/// Captured `(name, value)` pairs in path order.
pub type PathParams = Vec<(String, String)>;

#[derive(Debug, Clone)]
enum Segment {
    Static(String),
    Param {
        name: String,
        optional: bool,
        regex: Regex,
    },
}

/// A compiled route path.
#[derive(Debug, Clone)]
pub struct PathMatcher {
    segments: Vec<Segment>,
}

impl PathMatcher {
    /// Compiles `path` using `constraints` for its placeholders.
    ///
    /// Placeholders without a constraint match any single segment.
    pub fn compile(path: &str, constraints: &ConstraintMap) -> Result<Self, regex::Error> {
        let mut segments = Vec::new();
        for raw in split(path) {
            let segment = match placeholder(raw) {
                Some((name, optional)) => {
                    let source = constraints
                        .get(name)
                        .or_else(|| pattern::builtin(pattern::ANY))
                        .unwrap_or(r"([^/]+)");
                    Segment::Param {
                        name: name.to_string(),
                        optional,
                        regex: pattern::compile_anchored(source)?,
                    }
                }
                None => Segment::Static(raw.to_string()),
            };
            segments.push(segment);
        }
        Ok(Self { segments })
    }

    /// Matches a request path, returning captured parameters on success.
    pub fn matches(&self, path: &str) -> Option<PathParams> {
        let parts: Vec<&str> = split(path).collect();
        if parts.len() > self.segments.len() {
            return None;
        }

        let mut params = PathParams::new();
        for (index, segment) in self.segments.iter().enumerate() {
            let part = parts.get(index);
            match (segment, part) {
                (Segment::Static(expected), Some(part)) if expected == part => {}
                (Segment::Param { name, regex, .. }, Some(part)) if regex.is_match(part) => {
                    params.push((name.clone(), (*part).to_string()));
                }
                (Segment::Param { optional: true, .. }, None) => {}
                _ => return None,
            }
        }
        Some(params)
    }
}

fn split(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|part| !part.is_empty())
}

/// Parses `{name}` or `{name?}`.
fn placeholder(segment: &str) -> Option<(&str, bool)> {
    let inner = segment.strip_prefix('{')?.strip_suffix('}')?;
    match inner.strip_suffix('?') {
        Some(name) => Some((name, true)),
        None => Some((inner, false)),
    }
}
