//! Parameter-to-path mapping.
//!
//! # Responsibilities
//! - Decide which method parameters bind to path segments
//! - Emit `{name}` / `{name?}` placeholders in declaration order
//! - Pick a constraint pattern for every emitted placeholder
//!
//! # Design Decisions
//! - Constraint precedence is: override by name, built-in by name, override
//!   by type, built-in by type, catch-all
//! - Optional placeholders may only trail; anything else is a caller error
//!   rather than a route that can never match

use std::collections::HashSet;
use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::routing::controller::{KnownTypes, ParamDescriptor};
use crate::routing::pattern::{self, ConstraintMap, PatternOverrides};

const SCALAR_TYPES: [&str; 5] = ["int", "float", "string", "bool", "mixed"];

/// Decides whether a declared parameter type binds to a path segment.
pub trait TypeClassifier: Send + Sync {
    fn is_bindable(&self, declared_type: Option<&str>) -> bool;
}

/// Binds untyped parameters, scalars, and the configured enums and entities.
#[derive(Debug, Clone, Default)]
pub struct DefaultClassifier {
    known: KnownTypes,
}

impl DefaultClassifier {
    pub fn new(known: KnownTypes) -> Self {
        Self { known }
    }
}

impl TypeClassifier for DefaultClassifier {
    fn is_bindable(&self, declared_type: Option<&str>) -> bool {
        let Some(declared) = declared_type else {
            return true;
        };
        let declared = declared.trim().trim_start_matches('?');
        if declared.is_empty() {
            return true;
        }

        SCALAR_TYPES
            .iter()
            .any(|scalar| scalar.eq_ignore_ascii_case(declared))
            || self.known.enums.contains(declared)
            || self.known.entities.contains(declared)
    }
}

/// One path placeholder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PathSegment {
    pub param_name: String,
    pub optional: bool,
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.optional {
            write!(f, "{{{}?}}", self.param_name)
        } else {
            write!(f, "{{{}}}", self.param_name)
        }
    }
}

/// Placeholders and constraints for one method.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MappedPath {
    pub segments: Vec<PathSegment>,
    pub constraints: ConstraintMap,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MappingError {
    #[error("required parameter `{param}` follows optional parameter `{after}`")]
    RequiredAfterOptional { param: String, after: String },

    #[error("parameter `{0}` is declared more than once")]
    DuplicateParameter(String),

    #[error("pattern `{pattern}` for parameter `{param}` does not compile: {reason}")]
    InvalidPattern {
        param: String,
        pattern: String,
        reason: String,
    },
}

/// Maps declared parameters to path segments and constraints.
pub fn map(
    params: &[ParamDescriptor],
    overrides: &PatternOverrides,
    classifier: &dyn TypeClassifier,
) -> Result<MappedPath, MappingError> {
    let mut mapped = MappedPath::default();
    let mut seen = HashSet::new();
    let mut first_optional: Option<&str> = None;

    for param in params {
        if !classifier.is_bindable(param.declared_type.as_deref()) {
            tracing::trace!(param = %param.name, "Parameter is not bindable, skipped");
            continue;
        }

        if !seen.insert(param.name.as_str()) {
            return Err(MappingError::DuplicateParameter(param.name.clone()));
        }

        match (param.optional, first_optional) {
            (true, None) => first_optional = Some(&param.name),
            (false, Some(after)) => {
                return Err(MappingError::RequiredAfterOptional {
                    param: param.name.clone(),
                    after: after.to_string(),
                });
            }
            _ => {}
        }

        let constraint = resolve_constraint(param, overrides)?;
        mapped.constraints.insert(param.name.clone(), constraint);
        mapped.segments.push(PathSegment {
            param_name: param.name.clone(),
            optional: param.optional,
        });
    }

    Ok(mapped)
}

fn resolve_constraint(
    param: &ParamDescriptor,
    overrides: &PatternOverrides,
) -> Result<String, MappingError> {
    if let Some(value) = overrides.get(&param.name) {
        return checked(param, pattern::resolve_value(value));
    }
    if let Some(builtin) = pattern::builtin(&param.name) {
        return Ok(builtin.to_string());
    }

    if let Some(declared) = param.declared_type.as_deref() {
        let key = pattern::type_key(declared.trim_start_matches('?'));
        if let Some(value) = overrides.get(&key) {
            return checked(param, pattern::resolve_value(value));
        }
        if let Some(builtin) = pattern::builtin(&key) {
            return Ok(builtin.to_string());
        }
    }

    if let Some(value) = overrides.get(pattern::ANY) {
        return checked(param, pattern::resolve_value(value));
    }
    Ok(pattern::builtin(pattern::ANY)
        .unwrap_or(r"([^/]+)")
        .to_string())
}

fn checked(param: &ParamDescriptor, source: &str) -> Result<String, MappingError> {
    pattern::compile_anchored(source)
        .map(|_| source.to_string())
        .map_err(|err| MappingError::InvalidPattern {
            param: param.name.clone(),
            pattern: source.to_string(),
            reason: err.to_string(),
        })
}
