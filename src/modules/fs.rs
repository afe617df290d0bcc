//! Filesystem access used by module discovery.
//!
//! Discovery only ever lists directories, reads small documents and performs
//! the one-time rename of the registry document. Routing those calls through
//! [`ModuleFs`] lets tests substitute an in-memory or counting implementation.

use std::fmt::Debug;
use std::io;
use std::path::Path;

/// A single entry returned by [`ModuleFs::list`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    pub name: String,
    pub is_dir: bool,
}

/// Filesystem operations needed by the scanner, loader and registry.
pub trait ModuleFs: Send + Sync + Debug {
    /// Returns true if `path` exists.
    fn exists(&self, path: &Path) -> bool;

    /// Lists the immediate children of `path`.
    fn list(&self, path: &Path) -> io::Result<Vec<DirEntry>>;

    /// Reads a whole file as UTF-8.
    fn read_to_string(&self, path: &Path) -> io::Result<String>;

    /// Renames `from` to `to`.
    fn rename(&self, from: &Path, to: &Path) -> io::Result<()>;
}

/// [`ModuleFs`] backed by `std::fs`.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdFs;

impl ModuleFs for StdFs {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn list(&self, path: &Path) -> io::Result<Vec<DirEntry>> {
        let mut entries = Vec::new();
        for entry in std::fs::read_dir(path)? {
            let entry = entry?;
            // Names that are not valid UTF-8 cannot be module names.
            let Ok(name) = entry.file_name().into_string() else {
                continue;
            };
            let is_dir = entry.file_type().map(|t| t.is_dir()).unwrap_or(false);
            entries.push(DirEntry { name, is_dir });
        }
        Ok(entries)
    }

    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }

    fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
        std::fs::rename(from, to)
    }
}
