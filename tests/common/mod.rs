//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tempfile::TempDir;

use module_router::config::schema::{AppConfig, RegistryConfig};
use module_router::modules::{DirEntry, ModuleFs, ModuleRegistry, StdFs};

/// A module root on disk, removed when dropped.
pub struct ModuleTree {
    dir: TempDir,
}

impl ModuleTree {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().unwrap(),
        }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    /// Writes `<root>/<dir>/_modules.toml`.
    pub fn module(&self, dir: &str, descriptor: &str) -> &Self {
        let path = self.root().join(dir);
        fs::create_dir_all(&path).unwrap();
        fs::write(path.join("_modules.toml"), descriptor).unwrap();
        self
    }

    /// Writes a controller module named `name`, tagged for the root `dir` sits under.
    pub fn controller_module(&self, dir: &str, name: &str) -> &Self {
        let init = if dir.starts_with("Api/") { "inlite/api" } else { "inlite" };
        self.module(
            dir,
            &format!(
                "modules = true\nmodules-name = \"{name}\"\nmodules-type = \"controller\"\nmodules-init = \"{init}\"\n"
            ),
        )
    }

    /// Writes a file directly below the module root.
    pub fn root_file(&self, name: &str, content: &str) -> PathBuf {
        let path = self.root().join(name);
        fs::write(&path, content).unwrap();
        path
    }

    pub fn registry_config(&self) -> RegistryConfig {
        RegistryConfig {
            module_root: self.root().to_path_buf(),
            ..Default::default()
        }
    }

    pub fn app_config(&self) -> AppConfig {
        AppConfig {
            registry: self.registry_config(),
            ..Default::default()
        }
    }

    pub fn registry(&self) -> ModuleRegistry {
        ModuleRegistry::new(self.registry_config())
    }
}

/// [`ModuleFs`] over the real filesystem that counts every call.
#[derive(Debug, Default)]
pub struct CountingFs {
    inner: StdFs,
    pub lists: AtomicUsize,
    pub reads: AtomicUsize,
    pub renames: AtomicUsize,
}

impl CountingFs {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Total listings, reads and renames so far.
    pub fn touches(&self) -> usize {
        self.lists.load(Ordering::SeqCst)
            + self.reads.load(Ordering::SeqCst)
            + self.renames.load(Ordering::SeqCst)
    }
}

impl ModuleFs for CountingFs {
    fn exists(&self, path: &Path) -> bool {
        self.inner.exists(path)
    }

    fn list(&self, path: &Path) -> io::Result<Vec<DirEntry>> {
        self.lists.fetch_add(1, Ordering::SeqCst);
        self.inner.list(path)
    }

    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.inner.read_to_string(path)
    }

    fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
        self.renames.fetch_add(1, Ordering::SeqCst);
        self.inner.rename(from, to)
    }
}
