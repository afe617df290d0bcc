//! Structured logging.
//!
//! # Responsibilities
//! - Install the global `tracing` subscriber
//! - Resolve the log filter from `RUST_LOG` or the configured level
//!
//! # Design Decisions
//! - `RUST_LOG` wins over the config file so a single run can be turned up
//!   without editing configuration
//! - Installing twice is reported, not a panic

use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::schema::ObservabilityConfig;

/// Builds the filter: `RUST_LOG` if set and valid, otherwise the configured level
/// for this crate and `tower_http`.
pub fn filter(config: &ObservabilityConfig) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "module_router={level},tower_http={level}",
            level = config.log_level
        ))
    })
}

/// Initialize the global subscriber.
pub fn init(config: &ObservabilityConfig) -> Result<(), TryInitError> {
    tracing_subscriber::registry()
        .with(filter(config))
        .with(tracing_subscriber::fmt::layer())
        .try_init()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_init_is_reported() {
        let config = ObservabilityConfig::default();
        let _ = init(&config);
        assert!(init(&config).is_err());
    }
}
