//! Module reference type.
//!
//! A [`ModuleRef`] is the identity of one discovered source file: the
//! sequence of path segments between a base directory and the file,
//! with the source extension stripped. Two identifier forms are derived
//! from it. The importable form ([`ModuleRef::module_id`]) is faithful
//! to the on-disk structure, including the `__init__` segment of a
//! package initializer. The printable form
//! ([`ModuleRef::printable_module_id`]) collapses the initializer away
//! so that an initializer page visually represents its package rather
//! than itself.

use std::path::{Path, PathBuf};

/// File stem that marks a package initializer module.
pub const INIT_MODULE: &str = "__init__";

/// File extension of discoverable source modules.
pub const SOURCE_EXTENSION: &str = "py";

/// Error returned when a module path is not a descendant of its base.
#[derive(Debug, thiserror::Error)]
#[error("module path {} is not under base path {}", module_path.display(), base_path.display())]
pub struct InvalidModuleReference {
    /// Declared root of the module namespace.
    pub base_path: PathBuf,
    /// Offending source file path.
    pub module_path: PathBuf,
}

/// Identity of one discovered source module.
///
/// Immutable once constructed. Construction fails with
/// [`InvalidModuleReference`] if `module_path` does not lie below
/// `base_path`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ModuleRef {
    base_path: PathBuf,
    module_path: PathBuf,
    ref_path: Vec<String>,
}

impl ModuleRef {
    /// Create a module reference for `module_path` rooted at `base_path`.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidModuleReference`] if `module_path` is not a
    /// strict descendant of `base_path`.
    pub fn new(
        base_path: impl Into<PathBuf>,
        module_path: impl Into<PathBuf>,
    ) -> Result<Self, InvalidModuleReference> {
        let base_path = base_path.into();
        let module_path = module_path.into();

        let Ok(relative) = module_path.strip_prefix(&base_path) else {
            return Err(InvalidModuleReference {
                base_path,
                module_path,
            });
        };

        let mut ref_path: Vec<String> = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect();
        if ref_path.is_empty() {
            return Err(InvalidModuleReference {
                base_path,
                module_path,
            });
        }

        if let Some(last) = ref_path.last_mut()
            && let Some(stem) = Path::new(last.as_str()).file_stem()
        {
            *last = stem.to_string_lossy().into_owned();
        }

        Ok(Self {
            base_path,
            module_path,
            ref_path,
        })
    }

    /// Root of this module's namespace.
    #[must_use]
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Absolute location of the source file.
    #[must_use]
    pub fn module_path(&self) -> &Path {
        &self.module_path
    }

    /// Path segments of `module_path` relative to `base_path`, with the
    /// extension stripped from the final segment.
    ///
    /// The module `foo/bar/baz.py` has ref path `["foo", "bar", "baz"]`;
    /// the initializer `foo/__init__.py` has `["foo", "__init__"]`.
    #[must_use]
    pub fn ref_path(&self) -> &[String] {
        &self.ref_path
    }

    /// Dot-joined ref path, faithful to the importable structure.
    #[must_use]
    pub fn module_id(&self) -> String {
        self.ref_path.join(".")
    }

    /// Whether this module is a package initializer.
    #[must_use]
    pub fn is_package_init(&self) -> bool {
        self.ref_path.last().is_some_and(|s| s == INIT_MODULE)
    }

    /// Ref path with a trailing initializer segment collapsed away.
    #[must_use]
    pub fn printable_ref_path(&self) -> &[String] {
        if self.is_package_init() {
            &self.ref_path[..self.ref_path.len() - 1]
        } else {
            &self.ref_path
        }
    }

    /// Like [`module_id`](Self::module_id) but with the initializer
    /// segment collapsed, e.g. `"foo.__init__"` becomes `"foo"`.
    #[must_use]
    pub fn printable_module_id(&self) -> String {
        self.printable_ref_path().join(".")
    }

    /// Display name: the last printable segment.
    ///
    /// For an initializer this is the containing package name. An
    /// initializer directly under the base directory falls back to the
    /// base directory's own name.
    #[must_use]
    pub fn module_name(&self) -> String {
        match self.printable_ref_path().last() {
            Some(segment) => segment.clone(),
            None => self
                .base_path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
        }
    }

    /// Relative source path, e.g. `foo/bar.py` for module `foo.bar`.
    ///
    /// Uses the literal ref path (initializer segment included) so the
    /// result names the actual file on disk. Joined with `/` regardless
    /// of platform since it feeds URL construction.
    #[must_use]
    pub fn source_rel_path(&self) -> String {
        format!("{}.{SOURCE_EXTENSION}", self.ref_path.join("/"))
    }
}
