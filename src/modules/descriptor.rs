//! Module descriptor types.
//!
//! A descriptor is the parsed per-module document. The on-disk key names are
//! shared with the scaffolding tools that write these files, so they are kept
//! verbatim (`modules-name`, `modules-type`, ...).

use std::fmt;

use serde::{Deserialize, Serialize};

/// Which root a module was discovered under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Origin {
    /// The module root itself.
    Primary,
    /// The `Api` directory below the module root.
    Variant,
}

impl Origin {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Primary => "primary",
            Self::Variant => "variant",
        }
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Module kind. Only controllers are routed; a document without
/// `modules-type` is `Other("")`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ModuleKind {
    Controller,
    Other(String),
}

impl From<String> for ModuleKind {
    fn from(value: String) -> Self {
        if value.trim().eq_ignore_ascii_case("controller") {
            Self::Controller
        } else {
            Self::Other(value)
        }
    }
}

impl From<ModuleKind> for String {
    fn from(kind: ModuleKind) -> Self {
        match kind {
            ModuleKind::Controller => "controller".to_string(),
            ModuleKind::Other(other) => other,
        }
    }
}

/// A controller listed in the descriptor's `controller` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControllerEntry {
    #[serde(default = "enabled_by_default")]
    pub enable: bool,
    pub name: String,
}

fn enabled_by_default() -> bool {
    true
}

/// `modules-middleware` is written either as a single name or a list.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl Default for OneOrMany {
    fn default() -> Self {
        Self::Many(Vec::new())
    }
}

impl From<OneOrMany> for Vec<String> {
    fn from(value: OneOrMany) -> Self {
        match value {
            OneOrMany::One(one) if one.trim().is_empty() => Vec::new(),
            OneOrMany::One(one) => vec![one],
            OneOrMany::Many(many) => many,
        }
    }
}

/// Raw on-disk descriptor document.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct DescriptorDocument {
    #[serde(rename = "modules", default)]
    enabled: bool,
    #[serde(rename = "modules-name", default)]
    name: String,
    #[serde(rename = "modules-name-route", default)]
    route_prefix: String,
    #[serde(rename = "modules-middleware", default)]
    middleware: OneOrMany,
    #[serde(rename = "modules-map", default)]
    map_slot: String,
    #[serde(rename = "modules-type", default)]
    kind: Option<ModuleKind>,
    #[serde(rename = "modules-init", default)]
    init_tag: Option<String>,
    #[serde(default)]
    controller: Vec<ControllerEntry>,
}

impl DescriptorDocument {
    /// Converts the raw document of the module stored in directory `dir`.
    ///
    /// Returns `None` when the document does not name its module.
    pub(crate) fn into_descriptor(self, origin: Origin, dir: &str) -> Option<ModuleDescriptor> {
        let name = self.name.trim().to_lowercase();
        if name.is_empty() {
            return None;
        }

        Some(ModuleDescriptor {
            enabled: self.enabled,
            name,
            route_prefix: self.route_prefix.trim().to_string(),
            middleware: self.middleware.into(),
            map_slot: self.map_slot,
            kind: self.kind.unwrap_or_else(|| ModuleKind::Other(String::new())),
            origin,
            dir: dir.to_string(),
            init_tag: self.init_tag,
            controllers: self.controller,
            namespace_path: None,
        })
    }
}

/// One discovered module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModuleDescriptor {
    pub enabled: bool,
    pub name: String,
    pub route_prefix: String,
    pub middleware: Vec<String>,
    pub map_slot: String,
    pub kind: ModuleKind,
    pub origin: Origin,
    /// Directory name below the origin root, as found on disk.
    pub dir: String,
    pub init_tag: Option<String>,
    pub controllers: Vec<ControllerEntry>,
    /// Set on entries of the merged view only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub namespace_path: Option<String>,
}

impl ModuleDescriptor {
    /// Prefix under which the module's routes are grouped.
    pub fn effective_prefix(&self) -> &str {
        if self.route_prefix.is_empty() {
            &self.name
        } else {
            &self.route_prefix
        }
    }

    /// True if the registrar should act on this module.
    pub fn is_routable(&self) -> bool {
        self.enabled && self.kind == ModuleKind::Controller
    }

    /// Module name with its first letter upper-cased (`post` → `Post`).
    pub fn type_name(&self) -> String {
        upper_first(&self.name)
    }

    /// Namespace path derived from origin and directory (`Modules/<Dir>`,
    /// `Modules/Api/<Dir>`). The directory keeps its on-disk casing.
    pub fn derive_namespace(&self) -> String {
        match self.origin {
            Origin::Primary => format!("Modules/{}", self.dir),
            Origin::Variant => format!("Modules/Api/{}", self.dir),
        }
    }

    /// Returns a copy carrying its namespace path.
    pub fn with_namespace(&self) -> Self {
        let mut descriptor = self.clone();
        descriptor.namespace_path = Some(self.derive_namespace());
        descriptor
    }

    /// Namespace path, derived on the fly for entries of the per-origin lists.
    pub fn namespace(&self) -> String {
        self.namespace_path
            .clone()
            .unwrap_or_else(|| self.derive_namespace())
    }
}

pub(crate) fn upper_first(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
