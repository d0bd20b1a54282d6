//! Host pipeline contract.
//!
//! The plugin consumes these from the host: build-wide settings and
//! the ordered registry of files the build will render. Only the
//! pieces the plugin touches are modeled.

use std::path::PathBuf;

use refgen_pages::SiteFile;

/// Build-wide host settings the plugin reads.
#[derive(Clone, Debug, Default)]
pub struct HostContext {
    /// Output directory of the built site.
    pub site_dir: PathBuf,
    /// Whether pages are served from directory URLs.
    pub use_directory_urls: bool,
    /// Host-level edit-link base URI.
    pub edit_uri: Option<String>,
    /// Host-level edit-link URI template.
    pub edit_uri_template: Option<String>,
}

/// Ordered, append-only registry of files the build will render.
#[derive(Debug, Default)]
pub struct FileRegistry {
    files: Vec<SiteFile>,
}

impl FileRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a file to the registry.
    pub fn append(&mut self, file: SiteFile) {
        self.files.push(file);
    }

    /// Registered files, in append order.
    #[must_use]
    pub fn files(&self) -> &[SiteFile] {
        &self.files
    }
}
