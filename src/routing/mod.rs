//! Route synthesis subsystem.
//!
//! # Data Flow
//! ```text
//! ModuleDescriptor (from modules::registry)
//!     → controller.rs (ControllerTable lookup)
//!     → decoder.rs (method name → verbs, fragment, middleware)
//!     → mapper.rs (parameters → segments, constraints)
//!     → registrar.rs (one group per module)
//!     → router.rs (Router trait, RouteTable recording)
//!
//! Dispatch (at startup and on reload):
//!     RouteTable
//!     → matcher.rs (compile paths and constraints)
//!     → http::dispatch
//! ```
//!
//! # Design Decisions
//! - The registrar only knows the `Router` trait, never the HTTP host
//! - Deterministic: same modules and controllers always yield the same table
//! - First match wins at dispatch, in registration order

pub mod controller;
pub mod decoder;
pub mod mapper;
pub mod matcher;
pub mod pattern;
pub mod registrar;
pub mod router;
pub mod verb;

pub use controller::{
    ControllerDescriptor, ControllerTable, HandlerRef, KnownTypes, ManifestError,
    MethodDescriptor, ParamDescriptor, Visibility,
};
pub use decoder::{DecodedName, MethodNameDecoder};
pub use mapper::{DefaultClassifier, MappedPath, MappingError, PathSegment, TypeClassifier};
pub use pattern::{ConstraintMap, PatternOverrides};
pub use registrar::{
    RegistrationError, RegistrationOptions, RegistrationReport, Registrar, SkipReason,
};
pub use router::{GroupOptions, PendingRoute, RouteEntry, RouteTable, Router};
pub use verb::{HttpVerb, VerbSet};
