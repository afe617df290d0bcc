//! Per-module descriptor loading.

use std::path::Path;

use crate::modules::descriptor::{DescriptorDocument, ModuleDescriptor, Origin};
use crate::modules::fs::ModuleFs;

/// Loads the descriptor of the module stored in `module_dir`.
///
/// Missing, unreadable and malformed documents yield `None` so that one broken
/// module never hides its siblings.
pub fn load(
    fs: &dyn ModuleFs,
    module_dir: &Path,
    descriptor_filename: &str,
    origin: Origin,
) -> Option<ModuleDescriptor> {
    let path = module_dir.join(descriptor_filename);

    let content = match fs.read_to_string(&path) {
        Ok(content) => content,
        Err(e) => {
            tracing::debug!(path = %path.display(), error = %e, "No readable module descriptor");
            return None;
        }
    };

    let document: DescriptorDocument = match toml::from_str(&content) {
        Ok(document) => document,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Dropping malformed module descriptor");
            return None;
        }
    };

    let dir = module_dir
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let descriptor = document.into_descriptor(origin, &dir);
    if descriptor.is_none() {
        tracing::warn!(path = %path.display(), "Dropping module descriptor without `modules-name`");
    }
    descriptor
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::fs::StdFs;
    use std::fs;

    #[test]
    fn test_load_valid_descriptor() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("_modules.toml"),
            "modules = true\nmodules-name = \"blog\"\n",
        )
        .unwrap();

        let descriptor = load(&StdFs, dir.path(), "_modules.toml", Origin::Primary).unwrap();
        assert_eq!(descriptor.name, "blog");
        assert_eq!(descriptor.origin, Origin::Primary);
    }

    #[test]
    fn test_directory_name_is_recorded() {
        let root = tempfile::tempdir().unwrap();
        let module_dir = root.path().join("BlogPosts");
        fs::create_dir(&module_dir).unwrap();
        fs::write(
            module_dir.join("_modules.toml"),
            "modules = true\nmodules-name = \"blogposts\"\nmodules-type = \"controller\"\n",
        )
        .unwrap();

        let descriptor = load(&StdFs, &module_dir, "_modules.toml", Origin::Primary).unwrap();
        assert_eq!(descriptor.dir, "BlogPosts");
        assert_eq!(descriptor.namespace(), "Modules/BlogPosts");
    }

    #[test]
    fn test_missing_descriptor_is_none() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load(&StdFs, dir.path(), "_modules.toml", Origin::Primary).is_none());
    }

    #[test]
    fn test_corrupt_descriptor_is_none() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("_modules.toml"), "modules = [unterminated").unwrap();
        assert!(load(&StdFs, dir.path(), "_modules.toml", Origin::Variant).is_none());
    }
}
