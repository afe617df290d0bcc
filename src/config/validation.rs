//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, names non-empty)
//! - Reject path separators where a bare name is expected
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: AppConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use thiserror::Error;

use crate::config::schema::AppConfig;
use crate::routing::pattern;

/// A single semantic problem found in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("`{field}` must not be empty")]
    Empty { field: &'static str },

    #[error("`{field}` must be a bare name, got `{value}`")]
    NotABareName { field: &'static str, value: String },

    #[error("`{field}` must be greater than zero")]
    Zero { field: &'static str },

    #[error("`server.bind_address` is not a socket address: `{0}`")]
    BindAddress(String),

    #[error("`routing.patterns.{key}` does not compile: {reason}")]
    Pattern { key: String, reason: String },
}

/// Validate a loaded configuration.
pub fn validate_config(config: &AppConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    check_bare_name(&mut errors, "registry.variant_dir", &config.registry.variant_dir);
    check_bare_name(
        &mut errors,
        "registry.descriptor_filename",
        &config.registry.descriptor_filename,
    );
    check_bare_name(&mut errors, "routing.index_marker", &config.routing.index_marker);

    if config.routing.restricted_middleware.trim().is_empty() {
        errors.push(ValidationError::Empty {
            field: "routing.restricted_middleware",
        });
    }

    for (key, value) in &config.routing.patterns {
        if let Err(err) = pattern::compile_anchored(pattern::resolve_value(value)) {
            errors.push(ValidationError::Pattern {
                key: key.clone(),
                reason: err.to_string(),
            });
        }
    }

    if config.server.request_timeout_secs == 0 {
        errors.push(ValidationError::Zero {
            field: "server.request_timeout_secs",
        });
    }

    if config.watch.enabled && config.watch.poll_interval_secs == 0 {
        errors.push(ValidationError::Zero {
            field: "watch.poll_interval_secs",
        });
    }

    if config
        .server
        .bind_address
        .parse::<std::net::SocketAddr>()
        .is_err()
    {
        errors.push(ValidationError::BindAddress(config.server.bind_address.clone()));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_bare_name(errors: &mut Vec<ValidationError>, field: &'static str, value: &str) {
    if value.trim().is_empty() {
        errors.push(ValidationError::Empty { field });
    } else if value.contains(['/', '\\']) {
        errors.push(ValidationError::NotABareName {
            field,
            value: value.to_string(),
        });
    }
}
