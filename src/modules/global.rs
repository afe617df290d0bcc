//! The registry document at the top of the module root.
//!
//! It names the per-module descriptor file and carries the process-wide hide
//! lists. Its canonical on-disk name is `<hidden token>_modules.toml`; any other
//! `*.toml` file found in the root is migrated to that name on first use.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::config::schema::RegistryConfig;
use crate::modules::fs::ModuleFs;

const DOCUMENT_EXTENSION: &str = ".toml";

/// Parsed registry document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryDocument {
    /// Name of the descriptor file inside each module directory.
    #[serde(rename = "name-package-yaml", default)]
    pub descriptor_filename: Option<String>,

    /// Directory names excluded from discovery.
    #[serde(rename = "hide-package", default)]
    pub hide_package: Vec<String>,

    /// Module names hidden from discovery.
    #[serde(rename = "module-hidden", default)]
    pub module_hidden: Vec<String>,
}

impl RegistryDocument {
    /// Descriptor filename, falling back to the configured default.
    pub fn descriptor_filename_or<'a>(&'a self, fallback: &'a str) -> &'a str {
        match self.descriptor_filename.as_deref() {
            Some(name) if !name.trim().is_empty() => name,
            _ => fallback,
        }
    }
}

/// Locates, migrates and parses the registry document.
///
/// An absent root, an absent document or an unparsable one all resolve to the
/// empty document.
pub fn resolve(fs: &dyn ModuleFs, config: &RegistryConfig) -> RegistryDocument {
    let root = config.module_root.as_path();
    if !fs.exists(root) {
        return RegistryDocument::default();
    }

    let canonical = config.canonical_document_name();
    let Some(found) = locate(fs, root, &canonical) else {
        tracing::debug!(root = %root.display(), "No registry document in module root");
        return RegistryDocument::default();
    };

    let canonical_path = root.join(&canonical);
    let path = if found == canonical {
        canonical_path
    } else {
        match fs.rename(&root.join(&found), &canonical_path) {
            Ok(()) => {
                tracing::info!(from = %found, to = %canonical, "Renamed registry document to canonical name");
                canonical_path
            }
            Err(e) => {
                tracing::warn!(from = %found, to = %canonical, error = %e, "Failed to rename registry document");
                root.join(&found)
            }
        }
    };

    match fs.read_to_string(&path) {
        Ok(content) => toml::from_str(&content).unwrap_or_else(|e| {
            tracing::warn!(path = %path.display(), error = %e, "Ignoring malformed registry document");
            RegistryDocument::default()
        }),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Failed to read registry document");
            RegistryDocument::default()
        }
    }
}

/// Finds the document file name: the canonical one if present, else the first
/// `*.toml` file by name.
fn locate(fs: &dyn ModuleFs, root: &Path, canonical: &str) -> Option<String> {
    let entries = fs.list(root).ok()?;
    let mut candidates: Vec<String> = entries
        .into_iter()
        .filter(|entry| !entry.is_dir && entry.name.ends_with(DOCUMENT_EXTENSION))
        .map(|entry| entry.name)
        .collect();

    if candidates.iter().any(|name| name == canonical) {
        return Some(canonical.to_string());
    }

    candidates.sort();
    candidates.into_iter().next()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::fs::StdFs;
    use std::fs;

    fn config_for(root: &Path, token: &str) -> RegistryConfig {
        RegistryConfig {
            module_root: root.to_path_buf(),
            hidden_token: token.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_resolve_renames_to_canonical() {
        let root = tempfile::tempdir().unwrap();
        fs::write(
            root.path().join("registry.toml"),
            "name-package-yaml = \"module.toml\"\nhide-package = [\"Legacy\"]\n",
        )
        .unwrap();

        let doc = resolve(&StdFs, &config_for(root.path(), "abc"));

        assert_eq!(doc.descriptor_filename.as_deref(), Some("module.toml"));
        assert_eq!(doc.hide_package, vec!["Legacy"]);
        assert!(doc.module_hidden.is_empty());
        assert!(root.path().join("abc_modules.toml").exists());
        assert!(!root.path().join("registry.toml").exists());
    }

    #[test]
    fn test_resolve_prefers_canonical_file() {
        let root = tempfile::tempdir().unwrap();
        fs::write(root.path().join("_modules.toml"), "module-hidden = [\"Draft\"]\n").unwrap();
        fs::write(root.path().join("a_other.toml"), "module-hidden = [\"Other\"]\n").unwrap();

        let doc = resolve(&StdFs, &config_for(root.path(), ""));

        assert_eq!(doc.module_hidden, vec!["Draft"]);
        assert!(root.path().join("a_other.toml").exists());
    }

    #[test]
    fn test_resolve_without_document_is_default() {
        let root = tempfile::tempdir().unwrap();
        let doc = resolve(&StdFs, &config_for(root.path(), ""));
        assert_eq!(doc, RegistryDocument::default());
        assert_eq!(doc.descriptor_filename_or("_modules.toml"), "_modules.toml");
    }

    #[test]
    fn test_resolve_malformed_document_is_default() {
        let root = tempfile::tempdir().unwrap();
        fs::write(root.path().join("_modules.toml"), "hide-package = [").unwrap();
        assert_eq!(resolve(&StdFs, &config_for(root.path(), "")), RegistryDocument::default());
    }
}
