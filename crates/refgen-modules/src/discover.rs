//! Recursive source module discovery.
//!
//! Walks a directory tree in sorted order, applying ignore globs to
//! entry names and skipping whitespace-only files. Re-running discovery
//! over an unchanged tree yields an identical sequence.

use std::path::{Path, PathBuf};
use std::{fs, io};

use glob::Pattern;

use crate::module_ref::{InvalidModuleReference, ModuleRef, SOURCE_EXTENSION};

/// Error raised during module discovery.
#[derive(Debug, thiserror::Error)]
pub enum DiscoverError {
    /// An ignore entry is not a valid glob pattern.
    #[error("invalid ignore pattern {pattern:?}")]
    InvalidPattern {
        /// The offending pattern text.
        pattern: String,
        /// Underlying glob error.
        #[source]
        source: glob::PatternError,
    },
    /// A discovered file lies outside the declared base directory.
    #[error(transparent)]
    InvalidModuleReference(#[from] InvalidModuleReference),
    /// Reading a directory or file failed.
    #[error("I/O error at {}", path.display())]
    Io {
        /// Path being read when the error occurred.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
}

/// Discover source modules under `search_dir`, rooted at `base_dir`.
///
/// Directory entries are visited in case-sensitive lexical order. An
/// entry whose name matches any pattern in `ignore` is skipped entirely,
/// including descent into matched directories. Files are yielded when
/// they carry the source extension and contain non-whitespace content;
/// empty files are always skipped. Unreadable files and directories
/// propagate as [`DiscoverError::Io`].
///
/// # Errors
///
/// Returns [`DiscoverError`] for invalid ignore patterns, I/O failures,
/// or files outside `base_dir`.
pub fn discover(
    base_dir: &Path,
    search_dir: &Path,
    ignore: &[String],
) -> Result<Vec<ModuleRef>, DiscoverError> {
    let patterns = compile_patterns(ignore)?;
    let mut modules = Vec::new();
    walk(base_dir, search_dir, &patterns, &mut modules)?;
    Ok(modules)
}

fn compile_patterns(ignore: &[String]) -> Result<Vec<Pattern>, DiscoverError> {
    ignore
        .iter()
        .map(|p| {
            Pattern::new(p).map_err(|source| DiscoverError::InvalidPattern {
                pattern: p.clone(),
                source,
            })
        })
        .collect()
}

fn io_error(path: &Path) -> impl FnOnce(io::Error) -> DiscoverError {
    let path = path.to_path_buf();
    move |source| DiscoverError::Io { path, source }
}

fn walk(
    base_dir: &Path,
    dir: &Path,
    ignore: &[Pattern],
    out: &mut Vec<ModuleRef>,
) -> Result<(), DiscoverError> {
    let mut entries = fs::read_dir(dir)
        .map_err(io_error(dir))?
        .collect::<Result<Vec<_>, _>>()
        .map_err(io_error(dir))?;
    entries.sort_by_key(fs::DirEntry::file_name);

    for entry in entries {
        let name = entry.file_name();
        let name = name.to_string_lossy();
        if ignore.iter().any(|pattern| pattern.matches(&name)) {
            tracing::debug!(name = %name, "ignoring entry");
            continue;
        }

        let path = entry.path();
        if path.is_dir() {
            walk(base_dir, &path, ignore, out)?;
        } else if path.extension().is_some_and(|ext| ext == SOURCE_EXTENSION) {
            let text = fs::read_to_string(&path).map_err(io_error(&path))?;
            if text.trim().is_empty() {
                tracing::debug!(path = %path.display(), "skipping empty module");
                continue;
            }
            out.push(ModuleRef::new(base_dir, path)?);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::fs;

    use pretty_assertions::assert_eq;

    use super::*;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn module_ids(modules: &[ModuleRef]) -> Vec<String> {
        modules.iter().map(ModuleRef::module_id).collect()
    }

    fn ignore(patterns: &[&str]) -> Vec<String> {
        patterns.iter().map(|p| (*p).to_owned()).collect()
    }

    #[test]
    fn test_discover_yields_sorted_modules() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "zeta.py", "z = 1");
        write(dir.path(), "alpha.py", "a = 1");
        write(dir.path(), "pkg/mod.py", "m = 1");

        let modules = discover(dir.path(), dir.path(), &[]).unwrap();

        assert_eq!(module_ids(&modules), ["alpha", "pkg.mod", "zeta"]);
    }

    #[test]
    fn test_discover_is_order_stable() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "b.py", "b = 1");
        write(dir.path(), "a/c.py", "c = 1");
        write(dir.path(), "a/__init__.py", "d = 1");

        let first = discover(dir.path(), dir.path(), &[]).unwrap();
        let second = discover(dir.path(), dir.path(), &[]).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn test_ignored_file_is_excluded_at_any_depth() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "keep.py", "k = 1");
        write(dir.path(), "a/b/skipped.py", "s = 1");

        let modules = discover(dir.path(), dir.path(), &ignore(&["skipped.py"])).unwrap();

        assert_eq!(module_ids(&modules), ["keep"]);
    }

    #[test]
    fn test_ignored_directory_excludes_whole_subtree() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "mod.py", "m = 1");
        write(dir.path(), "tests/test_mod.py", "t = 1");
        write(dir.path(), "tests/deep/helper.py", "h = 1");

        let modules = discover(dir.path(), dir.path(), &ignore(&["tests"])).unwrap();

        assert_eq!(module_ids(&modules), ["mod"]);
    }

    #[test]
    fn test_wildcard_pattern_matches_names() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "mod.py", "m = 1");
        write(dir.path(), "mod_test.py", "t = 1");
        write(dir.path(), "pkg/other_test.py", "t = 2");

        let modules = discover(dir.path(), dir.path(), &ignore(&["*_test.py"])).unwrap();

        assert_eq!(module_ids(&modules), ["mod"]);
    }

    #[test]
    fn test_non_wildcard_pattern_matches_exact_name_only() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "sub/baz.py", "b = 1");
        write(dir.path(), "sub/baz_bob.py", "b = 2");

        let modules = discover(dir.path(), dir.path(), &ignore(&["baz.py"])).unwrap();
        assert_eq!(module_ids(&modules), ["sub.baz_bob"]);

        // Without the extension the pattern matches neither file.
        let modules = discover(dir.path(), dir.path(), &ignore(&["baz"])).unwrap();
        assert_eq!(module_ids(&modules), ["sub.baz", "sub.baz_bob"]);
    }

    #[test]
    fn test_empty_file_is_always_skipped() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "real.py", "x = 1");
        write(dir.path(), "empty.py", "");
        write(dir.path(), "blank.py", "  \n\t\n");

        let modules = discover(dir.path(), dir.path(), &[]).unwrap();

        assert_eq!(module_ids(&modules), ["real"]);
    }

    #[test]
    fn test_non_source_files_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "mod.py", "m = 1");
        write(dir.path(), "notes.md", "# notes");
        write(dir.path(), "data.json", "{}");

        let modules = discover(dir.path(), dir.path(), &[]).unwrap();

        assert_eq!(module_ids(&modules), ["mod"]);
    }

    #[test]
    fn test_search_subdir_with_wider_base() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "mylib/core.py", "c = 1");
        write(dir.path(), "mylib/util/text.py", "t = 1");

        let modules = discover(dir.path(), &dir.path().join("mylib"), &[]).unwrap();

        assert_eq!(module_ids(&modules), ["mylib.core", "mylib.util.text"]);
    }

    #[test]
    fn test_invalid_pattern_is_reported() {
        let dir = tempfile::tempdir().unwrap();

        let err = discover(dir.path(), dir.path(), &ignore(&["[unclosed"])).unwrap_err();

        assert!(matches!(err, DiscoverError::InvalidPattern { .. }));
    }

    #[test]
    fn test_missing_search_dir_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");

        let err = discover(dir.path(), &missing, &[]).unwrap_err();

        assert!(matches!(err, DiscoverError::Io { .. }));
    }
}
