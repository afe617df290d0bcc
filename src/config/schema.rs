//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the module router.
//! All types derive Serde traits for deserialization from config files.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Module discovery settings.
    pub registry: RegistryConfig,

    /// Route synthesis settings.
    pub routing: RoutingConfig,

    /// HTTP host settings.
    pub server: ServerConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Module root watching (hot reload).
    pub watch: WatchConfig,
}

/// Module discovery configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Directory holding one subdirectory per module.
    pub module_root: PathBuf,

    /// Name of the secondary ("variant") root below `module_root`.
    pub variant_dir: String,

    /// Token prefixed to the canonical registry document name.
    /// Overridden by the `MODULE_HIDDEN_TOKEN` environment variable.
    pub hidden_token: String,

    /// Descriptor filename used when the registry document does not name one.
    pub descriptor_filename: String,
}

impl RegistryConfig {
    /// Canonical name of the registry document inside `module_root`.
    pub fn canonical_document_name(&self) -> String {
        format!("{}_modules.toml", self.hidden_token)
    }

    /// Path of the variant root.
    pub fn variant_root(&self) -> PathBuf {
        self.module_root.join(&self.variant_dir)
    }
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            module_root: PathBuf::from("resources/views/modules"),
            variant_dir: "Api".to_string(),
            hidden_token: String::new(),
            descriptor_filename: "_modules.toml".to_string(),
        }
    }
}

/// Route synthesis configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RoutingConfig {
    /// Residual method name that maps to the root of its group.
    pub index_marker: String,

    /// Middleware attached to `x`-prefixed methods.
    pub restricted_middleware: String,

    /// Prefix wrapping every variant (API) module.
    pub api_prefix: String,

    /// TOML manifest describing controllers, used by the binaries.
    pub controllers_manifest: Option<PathBuf>,

    /// Parameter pattern overrides, keyed by parameter name or `:<type>`.
    pub patterns: BTreeMap<String, String>,

    /// `modules-init` a primary module must declare to be routed.
    /// Empty disables the check.
    pub primary_init_tag: String,

    /// `modules-init` a variant (API) module must declare to be routed.
    /// Empty disables the check.
    pub variant_init_tag: String,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            index_marker: "index".to_string(),
            restricted_middleware: "xhr".to_string(),
            api_prefix: "api".to_string(),
            controllers_manifest: None,
            patterns: BTreeMap::new(),
            primary_init_tag: "inlite".to_string(),
            variant_init_tag: "inlite/api".to_string(),
        }
    }
}

/// HTTP host configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address (e.g., "127.0.0.1:8080").
    pub bind_address: String,

    /// Request timeout in seconds.
    pub request_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:8080".to_string(),
            request_timeout_secs: 30,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

/// Module root watcher configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct WatchConfig {
    /// Rebuild routes when the module root changes.
    pub enabled: bool,

    /// Poll interval for the watcher backend in seconds.
    pub poll_interval_secs: u64,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            poll_interval_secs: 2,
        }
    }
}
