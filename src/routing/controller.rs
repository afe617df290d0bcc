//! Controller descriptions.
//!
//! Controllers are described up front instead of being introspected: a
//! [`ControllerTable`] maps controller keys to their method lists. Tables are
//! built in code or loaded from a TOML manifest:
//!
//! ```toml
//! [types]
//! enums = ["Status"]
//! entities = ["User"]
//!
//! [[controller]]
//! key = "Modules/Post/Http/Controllers/Post"
//!
//! [[controller.method]]
//! name = "getShow"
//! params = [{ name = "id", type = "int" }]
//! ```

use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::modules::descriptor::ModuleDescriptor;

/// Method visibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    #[default]
    Public,
    Protected,
    Private,
}

/// One declared method parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParamDescriptor {
    pub name: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub declared_type: Option<String>,
    #[serde(default)]
    pub optional: bool,
}

impl ParamDescriptor {
    /// A required parameter.
    pub fn new(name: impl Into<String>, declared_type: Option<&str>) -> Self {
        Self {
            name: name.into(),
            declared_type: declared_type.map(str::to_string),
            optional: false,
        }
    }

    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }
}

/// One controller method.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodDescriptor {
    pub name: String,
    #[serde(default)]
    pub visibility: Visibility,
    /// Declared on a parent type rather than the controller itself.
    #[serde(default)]
    pub inherited: bool,
    #[serde(default)]
    pub params: Vec<ParamDescriptor>,
}

impl MethodDescriptor {
    /// A public, non-inherited method with no parameters.
    pub fn public(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            visibility: Visibility::Public,
            inherited: false,
            params: Vec::new(),
        }
    }

    pub fn param(mut self, param: ParamDescriptor) -> Self {
        self.params.push(param);
        self
    }

    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    pub fn inherited(mut self) -> Self {
        self.inherited = true;
        self
    }

    /// True for public methods declared on the controller itself, excluding
    /// `__`-prefixed magic methods.
    pub fn is_route_candidate(&self) -> bool {
        self.visibility == Visibility::Public && !self.inherited && !self.name.starts_with("__")
    }
}

/// A controller and its methods in declaration order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControllerDescriptor {
    pub key: String,
    #[serde(rename = "method", default)]
    pub methods: Vec<MethodDescriptor>,
}

impl ControllerDescriptor {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            methods: Vec::new(),
        }
    }

    pub fn method(mut self, method: MethodDescriptor) -> Self {
        self.methods.push(method);
        self
    }
}

/// Enum and entity type names that bind to a path segment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnownTypes {
    #[serde(default)]
    pub enums: BTreeSet<String>,
    #[serde(default)]
    pub entities: BTreeSet<String>,
}

/// Identifies the code that serves a route.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct HandlerRef {
    pub controller: String,
    pub method: String,
}

impl fmt::Display for HandlerRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.controller, self.method)
    }
}

/// Error type for manifest loading.
#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("failed to read controller manifest {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid controller manifest: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("controller `{0}` is declared more than once")]
    Duplicate(String),
}

#[derive(Debug, Deserialize)]
struct Manifest {
    #[serde(default)]
    types: KnownTypes,
    #[serde(default)]
    controller: Vec<ControllerDescriptor>,
}

/// Controller lookup keyed by `<namespace>/Http/Controllers/<Name>`.
#[derive(Debug, Clone, Default)]
pub struct ControllerTable {
    controllers: HashMap<String, ControllerDescriptor>,
    types: KnownTypes,
}

impl ControllerTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a controller.
    pub fn insert(&mut self, controller: ControllerDescriptor) {
        self.controllers.insert(controller.key.clone(), controller);
    }

    pub fn with_types(mut self, types: KnownTypes) -> Self {
        self.types = types;
        self
    }

    pub fn get(&self, key: &str) -> Option<&ControllerDescriptor> {
        self.controllers.get(key)
    }

    /// Resolves the controller for a module by naming convention.
    pub fn resolve(&self, descriptor: &ModuleDescriptor) -> Option<&ControllerDescriptor> {
        self.get(&controller_key(descriptor))
    }

    pub fn types(&self) -> &KnownTypes {
        &self.types
    }

    pub fn len(&self) -> usize {
        self.controllers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.controllers.is_empty()
    }

    /// Parses a TOML manifest.
    pub fn from_toml_str(source: &str) -> Result<Self, ManifestError> {
        let manifest: Manifest = toml::from_str(source)?;
        let mut table = Self::new().with_types(manifest.types);
        for controller in manifest.controller {
            if table.controllers.contains_key(&controller.key) {
                return Err(ManifestError::Duplicate(controller.key));
            }
            table.insert(controller);
        }
        Ok(table)
    }

    /// Loads a TOML manifest from disk.
    pub fn from_manifest(path: &Path) -> Result<Self, ManifestError> {
        let source = std::fs::read_to_string(path).map_err(|source| ManifestError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let table = Self::from_toml_str(&source)?;
        tracing::info!(
            path = %path.display(),
            controllers = table.len(),
            "Controller manifest loaded"
        );
        Ok(table)
    }
}

/// Convention key for a module's controller.
pub fn controller_key(descriptor: &ModuleDescriptor) -> String {
    format!(
        "{}/Http/Controllers/{}",
        descriptor.namespace(),
        descriptor.type_name()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::descriptor::{ModuleKind, Origin};

    fn module(name: &str, dir: &str, origin: Origin) -> ModuleDescriptor {
        ModuleDescriptor {
            enabled: true,
            name: name.to_string(),
            route_prefix: String::new(),
            middleware: Vec::new(),
            map_slot: String::new(),
            kind: ModuleKind::Controller,
            origin,
            dir: dir.to_string(),
            init_tag: None,
            controllers: Vec::new(),
            namespace_path: None,
        }
    }

    #[test]
    fn test_controller_key() {
        assert_eq!(
            controller_key(&module("post", "Post", Origin::Primary)),
            "Modules/Post/Http/Controllers/Post"
        );
        assert_eq!(
            controller_key(&module("shop", "Shop", Origin::Variant)),
            "Modules/Api/Shop/Http/Controllers/Shop"
        );
        assert_eq!(
            controller_key(&module("blogposts", "BlogPosts", Origin::Primary)),
            "Modules/BlogPosts/Http/Controllers/Blogposts"
        );
    }

    #[test]
    fn test_route_candidates() {
        assert!(MethodDescriptor::public("getShow").is_route_candidate());
        assert!(!MethodDescriptor::public("__construct").is_route_candidate());
        assert!(!MethodDescriptor::public("getBase").inherited().is_route_candidate());
        assert!(!MethodDescriptor::public("helper")
            .with_visibility(Visibility::Protected)
            .is_route_candidate());
    }

    #[test]
    fn test_manifest_parsing() {
        let table = ControllerTable::from_toml_str(
            r#"
            [types]
            enums = ["Status"]

            [[controller]]
            key = "Modules/Post/Http/Controllers/Post"

            [[controller.method]]
            name = "getShow"
            params = [{ name = "id", type = "int" }]

            [[controller.method]]
            name = "helper"
            visibility = "private"
            "#,
        )
        .unwrap();

        assert_eq!(table.len(), 1);
        assert!(table.types().enums.contains("Status"));

        let controller = table.resolve(&module("post", "Post", Origin::Primary)).unwrap();
        assert_eq!(controller.methods.len(), 2);
        assert_eq!(
            controller.methods[0].params[0],
            ParamDescriptor::new("id", Some("int"))
        );
        assert_eq!(controller.methods[1].visibility, Visibility::Private);
    }

    #[test]
    fn test_manifest_duplicate_controller() {
        let result = ControllerTable::from_toml_str(
            r#"
            [[controller]]
            key = "A"

            [[controller]]
            key = "A"
            "#,
        );
        assert!(matches!(result, Err(ManifestError::Duplicate(key)) if key == "A"));
    }

    #[test]
    fn test_manifest_missing_file() {
        let result = ControllerTable::from_manifest(Path::new("/nonexistent/controllers.toml"));
        assert!(matches!(result, Err(ManifestError::Io { .. })));
    }
}
