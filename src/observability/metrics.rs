//! Metrics collection.
//!
//! # Metrics
//! - `modules_discovered` (gauge): modules found per origin
//! - `routes_registered` (gauge): routes registered per module
//! - `route_dispatch_total` (counter): dispatched requests by method, status
//!
//! # Design Decisions
//! - Recorded through the `metrics` facade; without an installed recorder
//!   every call is a no-op
//! - Gauges for discovery and registration, since a reload replaces them

use crate::modules::descriptor::Origin;

pub fn record_discovery(origin: Origin, count: usize) {
    metrics::gauge!("modules_discovered", "origin" => origin.as_str()).set(count as f64);
}

pub fn record_routes_registered(module: &str, count: usize) {
    metrics::gauge!("routes_registered", "module" => module.to_string()).set(count as f64);
}

pub fn record_dispatch(method: &str, status: u16) {
    metrics::counter!(
        "route_dispatch_total",
        "method" => method.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
}
