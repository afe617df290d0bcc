//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse, deserialize, environment overrides)
//!     → validation.rs (semantic checks)
//!     → AppConfig (validated, immutable)
//!
//! While serving:
//!     watcher.rs detects a change under the module root
//!     → registry invalidated
//!     → routes rebuilt, dispatcher swapped
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; only module discovery is reloaded
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;
pub mod watcher;

pub use loader::{load_config, load_or_default, ConfigError};
pub use schema::{
    AppConfig, ObservabilityConfig, RegistryConfig, RoutingConfig, ServerConfig, WatchConfig,
};
pub use watcher::ModuleWatcher;
