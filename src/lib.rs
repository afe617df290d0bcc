//! Convention-based route synthesis.
//!
//! Discovers module directories, reads each module's descriptor, and
//! synthesizes HTTP routes from the methods of the module's controller: the
//! method name prefix encodes the verb, the parameters encode path segments
//! and their constraints.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod modules;
pub mod observability;
pub mod routing;

pub use config::schema::AppConfig;
pub use http::HttpServer;
pub use lifecycle::{RouteService, Shutdown};
pub use modules::ModuleRegistry;
pub use routing::{ControllerTable, Registrar, RouteTable, Router};
