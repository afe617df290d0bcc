//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured tracing events)
//!     → metrics.rs (discovery gauges, dispatch counters)
//!
//! Request correlation:
//!     → http::request (x-request-id on every request span)
//! ```

pub mod logging;
pub mod metrics;
