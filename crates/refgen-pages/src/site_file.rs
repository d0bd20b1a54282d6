//! Site file handle for the host pipeline.
//!
//! Carries the routing information the host needs for a generated
//! document: where the source lives, where the built page lands under
//! the site directory, and the URL it is served at.

use std::path::{Path, PathBuf};

/// Host-pipeline handle for one generated document.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SiteFile {
    /// Source path relative to the scratch root, e.g. `_ref/pkg/mod.md`.
    pub src_path: PathBuf,
    /// Absolute source path on disk.
    pub abs_src_path: PathBuf,
    /// Destination path relative to the site directory.
    pub dest_path: PathBuf,
    /// Site-relative URL, always `/`-separated.
    pub url: String,
}

impl SiteFile {
    /// Build routing data for a source document.
    ///
    /// With `use_directory_urls`, `foo/bar.md` is served at `foo/bar/`
    /// from `foo/bar/index.html`, and `foo/index.md` at `foo/` from
    /// `foo/index.html`. Without it, both destination and URL keep the
    /// flat `.html` name.
    #[must_use]
    pub fn new(src_path: PathBuf, src_dir: &Path, use_directory_urls: bool) -> Self {
        let abs_src_path = src_dir.join(&src_path);
        let stem = src_path.with_extension("");
        let is_index = stem.file_name().is_some_and(|name| name == "index");

        let (dest_path, url) = if use_directory_urls {
            let base = if is_index {
                stem.parent().map(Path::to_path_buf).unwrap_or_default()
            } else {
                stem
            };
            let url = match slash_join(&base) {
                s if s.is_empty() => String::new(),
                s => format!("{s}/"),
            };
            (base.join("index.html"), url)
        } else {
            let dest = stem.with_extension("html");
            let url = slash_join(&dest);
            (dest, url)
        };

        Self {
            src_path,
            abs_src_path,
            dest_path,
            url,
        }
    }
}

/// Join path components with `/` regardless of platform.
fn slash_join(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
