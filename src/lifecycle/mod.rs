//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Load config → Load controllers → Discover → Register → Compile → Serve
//!
//! Reload (startup.rs, signals.rs, config::watcher):
//!     SIGHUP / module root change → Invalidate registry → Rebuild → Swap dispatcher
//!
//! Shutdown (shutdown.rs, signals.rs):
//!     SIGTERM/SIGINT → Trigger → Server drains, reload loop and watcher stop
//! ```
//!
//! # Design Decisions
//! - Ordered startup: config first, then routes, then listeners
//! - Routes are rebuilt off the request path and swapped atomically

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::Shutdown;
pub use signals::ReloadReason;
pub use startup::{register_modules, RouteService, StartupError};
