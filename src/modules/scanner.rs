//! Module directory scanning.
//!
//! # Responsibilities
//! - List the immediate subdirectories of a module root
//! - Drop dot-directories and hidden, excluded and reserved names
//!
//! # Design Decisions
//! - A missing root is "no modules", never an error
//! - Output is sorted so discovery order is deterministic across platforms

use std::collections::HashSet;
use std::path::Path;

use crate::modules::fs::ModuleFs;

/// Filters applied while scanning a root.
#[derive(Debug, Clone, Default)]
pub struct ScanFilter {
    /// Names listed under `hide-package` in the registry document.
    pub excluded: HashSet<String>,
    /// Canonical registry document name; never a module.
    pub hidden_token: String,
    /// Names listed under `module-hidden` in the registry document.
    pub hidden_modules: HashSet<String>,
    /// Names reserved by the layout itself (e.g. the variant directory).
    pub reserved: HashSet<String>,
}

impl ScanFilter {
    fn skips(&self, name: &str) -> bool {
        name.starts_with('.')
            || name == self.hidden_token
            || self.excluded.contains(name)
            || self.hidden_modules.contains(name)
            || self.reserved.contains(name)
    }

    /// Returns a copy of this filter with `name` reserved.
    pub fn reserving(&self, name: impl Into<String>) -> Self {
        let mut filter = self.clone();
        filter.reserved.insert(name.into());
        filter
    }
}

/// Lists module directory names under `root`.
pub fn scan(fs: &dyn ModuleFs, root: &Path, filter: &ScanFilter) -> Vec<String> {
    if !fs.exists(root) {
        tracing::debug!(root = %root.display(), "Module root missing, nothing to scan");
        return Vec::new();
    }

    let entries = match fs.list(root) {
        Ok(entries) => entries,
        Err(e) => {
            tracing::warn!(root = %root.display(), error = %e, "Failed to list module root");
            return Vec::new();
        }
    };

    let mut names: Vec<String> = entries
        .into_iter()
        .filter(|entry| entry.is_dir && !filter.skips(&entry.name))
        .map(|entry| entry.name)
        .collect();
    names.sort();

    tracing::debug!(root = %root.display(), count = names.len(), "Scanned module root");
    names
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::fs::StdFs;
    use std::fs;

    fn make_root(dirs: &[&str], files: &[&str]) -> tempfile::TempDir {
        let root = tempfile::tempdir().unwrap();
        for dir in dirs {
            fs::create_dir_all(root.path().join(dir)).unwrap();
        }
        for file in files {
            fs::write(root.path().join(file), "").unwrap();
        }
        root
    }

    #[test]
    fn test_scan_skips_hidden_and_files() {
        let root = make_root(&["Blog", "Shop", ".hidden"], &["notes.txt"]);
        let filter = ScanFilter {
            excluded: HashSet::from(["Shop".to_string()]),
            hidden_modules: HashSet::from([".hidden".to_string()]),
            ..Default::default()
        };

        assert_eq!(scan(&StdFs, root.path(), &filter), vec!["Blog"]);
    }

    #[test]
    fn test_scan_skips_hidden_token_and_reserved() {
        let root = make_root(&["Api", "Blog", "tok_modules.toml"], &[]);
        let filter = ScanFilter {
            hidden_token: "tok_modules.toml".into(),
            ..Default::default()
        }
        .reserving("Api");

        assert_eq!(scan(&StdFs, root.path(), &filter), vec!["Blog"]);
    }

    #[test]
    fn test_scan_missing_root_is_empty() {
        let root = tempfile::tempdir().unwrap();
        let missing = root.path().join("nope");
        assert!(scan(&StdFs, &missing, &ScanFilter::default()).is_empty());
    }

    #[test]
    fn test_scan_is_sorted_without_dot_dirs() {
        let root = make_root(&["Zeta", "Alpha", ".git", "Mid"], &[]);
        assert_eq!(
            scan(&StdFs, root.path(), &ScanFilter::default()),
            vec!["Alpha", "Mid", "Zeta"]
        );
    }
}
