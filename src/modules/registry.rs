//! Cached module registry.
//!
//! # Responsibilities
//! - Resolve the registry document once per cache lifetime
//! - Scan both roots and load every descriptor
//! - Build the per-origin lists and the merged, namespaced list
//!
//! # Design Decisions
//! - Results are memoized until [`ModuleRegistry::invalidate`] is called
//! - The memo is an `ArcSwapOption`, so readers never block and callers get
//!   the same `Arc` back on every hit
//! - Duplicate names within one origin keep the first occurrence

use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;

use arc_swap::ArcSwapOption;
use serde::Serialize;

use crate::config::schema::RegistryConfig;
use crate::modules::descriptor::{ModuleDescriptor, Origin};
use crate::modules::fs::{ModuleFs, StdFs};
use crate::modules::global::{self, RegistryDocument};
use crate::modules::loader;
use crate::modules::scanner::{self, ScanFilter};
use crate::observability::metrics;

/// Result of one discovery pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Discovery {
    /// Modules found under the primary root.
    pub primary: Vec<ModuleDescriptor>,
    /// Modules found under the variant root.
    pub variant: Vec<ModuleDescriptor>,
    /// Both lists, primary first, each entry carrying its namespace path.
    pub merged: Vec<ModuleDescriptor>,
}

impl Discovery {
    /// Descriptors discovered under `origin`.
    pub fn by_origin(&self, origin: Origin) -> &[ModuleDescriptor] {
        match origin {
            Origin::Primary => &self.primary,
            Origin::Variant => &self.variant,
        }
    }

    /// Looks a module up in the merged view.
    pub fn find(&self, origin: Origin, name: &str) -> Option<&ModuleDescriptor> {
        self.merged
            .iter()
            .find(|d| d.origin == origin && d.name == name)
    }
}

/// Explicit registry object with an `init`/`invalidate` lifecycle.
#[derive(Debug)]
pub struct ModuleRegistry {
    config: RegistryConfig,
    fs: Arc<dyn ModuleFs>,
    document: ArcSwapOption<RegistryDocument>,
    discovery: ArcSwapOption<Discovery>,
}

impl ModuleRegistry {
    /// Create a registry over the real filesystem.
    pub fn new(config: RegistryConfig) -> Self {
        Self::with_fs(config, Arc::new(StdFs))
    }

    /// Create a registry over a custom filesystem.
    pub fn with_fs(config: RegistryConfig, fs: Arc<dyn ModuleFs>) -> Self {
        Self {
            config,
            fs,
            document: ArcSwapOption::empty(),
            discovery: ArcSwapOption::empty(),
        }
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// Warm the cache.
    pub fn init(&self) -> Arc<Discovery> {
        self.discover()
    }

    /// Drop every memoized result; the next call rescans.
    pub fn invalidate(&self) {
        self.document.store(None);
        self.discovery.store(None);
        tracing::debug!(root = %self.config.module_root.display(), "Module registry invalidated");
    }

    /// True if a discovery result is currently memoized.
    pub fn is_cached(&self) -> bool {
        self.discovery.load().is_some()
    }

    /// The registry document, resolved once per cache lifetime.
    pub fn document(&self) -> Arc<RegistryDocument> {
        if let Some(document) = self.document.load_full() {
            return document;
        }

        let document = Arc::new(global::resolve(self.fs.as_ref(), &self.config));
        self.document.store(Some(document.clone()));
        document
    }

    /// Discover every module, memoized.
    pub fn discover(&self) -> Arc<Discovery> {
        if let Some(discovery) = self.discovery.load_full() {
            return discovery;
        }

        let discovery = Arc::new(self.scan_all());
        self.discovery.store(Some(discovery.clone()));
        discovery
    }

    fn scan_all(&self) -> Discovery {
        let root = self.config.module_root.as_path();
        if !self.fs.exists(root) {
            tracing::info!(root = %root.display(), "Module root does not exist, no modules discovered");
            return Discovery::default();
        }

        let document = self.document();
        let descriptor_filename = document
            .descriptor_filename_or(&self.config.descriptor_filename)
            .to_string();

        let filter = ScanFilter {
            excluded: document.hide_package.iter().cloned().collect(),
            hidden_token: self.config.canonical_document_name(),
            hidden_modules: document.module_hidden.iter().cloned().collect(),
            reserved: HashSet::new(),
        };

        let primary = self.load_origin(
            root,
            &filter.reserving(self.config.variant_dir.clone()),
            &descriptor_filename,
            Origin::Primary,
        );

        let variant_root = self.config.variant_root();
        let variant = if self.fs.exists(&variant_root) {
            self.load_origin(&variant_root, &filter, &descriptor_filename, Origin::Variant)
        } else {
            Vec::new()
        };

        let merged = primary
            .iter()
            .chain(variant.iter())
            .map(ModuleDescriptor::with_namespace)
            .collect();

        metrics::record_discovery(Origin::Primary, primary.len());
        metrics::record_discovery(Origin::Variant, variant.len());
        tracing::info!(
            primary = primary.len(),
            variant = variant.len(),
            "Module discovery complete"
        );

        Discovery {
            primary,
            variant,
            merged,
        }
    }

    fn load_origin(
        &self,
        root: &Path,
        filter: &ScanFilter,
        descriptor_filename: &str,
        origin: Origin,
    ) -> Vec<ModuleDescriptor> {
        let mut seen = HashSet::new();
        scanner::scan(self.fs.as_ref(), root, filter)
            .into_iter()
            .filter_map(|dir| {
                loader::load(self.fs.as_ref(), &root.join(&dir), descriptor_filename, origin)
            })
            .filter(|descriptor| {
                let fresh = seen.insert(descriptor.name.clone());
                if !fresh {
                    tracing::warn!(
                        module = %descriptor.name,
                        origin = %origin,
                        "Duplicate module name, keeping the first"
                    );
                }
                fresh
            })
            .collect()
    }
}
