//! Page generation into a scratch directory.

use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::{fs, io};

use tempfile::TempDir;

use refgen_modules::{INIT_MODULE, ModuleRef};

use crate::site_file::SiteFile;

/// Subdirectory of the scratch root holding generated pages.
const GENERATED_SUBDIR: &str = "_ref";

/// Conventional filename stem for a section's landing page.
const INDEX_STEM: &str = "index";

/// Filename stem used when a module's own name collides with
/// [`INDEX_STEM`].
const INDEX_COLLISION_STEM: &str = "index_";

/// Error raised while generating a page.
#[derive(Debug, thiserror::Error)]
pub enum GenerateError {
    /// Two modules mapped to the same generated output path.
    #[error("page for module {duplicate} collides with already generated module {existing}")]
    PageAlreadyExists {
        /// Module id that first produced the target path.
        existing: String,
        /// Module id that collided with it.
        duplicate: String,
    },
    /// Writing the page or its parent directories failed.
    #[error("I/O error writing generated page {}", path.display())]
    Io {
        /// Target path being written.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
}

/// One generated reference page.
#[derive(Clone, Debug)]
pub struct GeneratedPage {
    /// The module this page documents.
    pub module: ModuleRef,
    /// Absolute path of the rendered markdown document.
    pub doc_path: PathBuf,
    /// Routing handle for the host pipeline.
    pub site_file: SiteFile,
}

/// Substitute a module's identifiers into a page template.
///
/// The template has three named substitution points: `{module_name}`,
/// `{printable_module_id}`, and `{module_id}`.
#[must_use]
pub fn render_template(template: &str, module: &ModuleRef) -> String {
    template
        .replace("{module_name}", &module.module_name())
        .replace("{printable_module_id}", &module.printable_module_id())
        .replace("{module_id}", &module.module_id())
}

/// Generates reference pages into a private scratch directory and keeps
/// the registry of everything generated this build.
///
/// The scratch directory is destroyed when the generator is dropped, so
/// teardown is guaranteed on every exit path. Registry order is
/// generation order, which is deterministic because discovery is.
pub struct PageGenerator {
    scratch: TempDir,
    use_directory_urls: bool,
    init_section_index: bool,
    pages: Vec<GeneratedPage>,
    by_doc_path: HashMap<PathBuf, usize>,
}

impl PageGenerator {
    /// Create a generator with a fresh scratch directory.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the scratch directory cannot be created.
    pub fn new(use_directory_urls: bool, init_section_index: bool) -> io::Result<Self> {
        Ok(Self {
            scratch: TempDir::new()?,
            use_directory_urls,
            init_section_index,
            pages: Vec::new(),
            by_doc_path: HashMap::new(),
        })
    }

    /// Root of the scratch directory.
    #[must_use]
    pub fn scratch_root(&self) -> &Path {
        self.scratch.path()
    }

    /// All pages generated so far, in generation order.
    #[must_use]
    pub fn pages(&self) -> &[GeneratedPage] {
        &self.pages
    }

    /// Look up a generated page by its document path.
    #[must_use]
    pub fn get(&self, doc_path: &Path) -> Option<&GeneratedPage> {
        self.by_doc_path.get(doc_path).map(|&idx| &self.pages[idx])
    }

    /// Scratch-relative target path for a module's page.
    ///
    /// Joins the ref path under [`GENERATED_SUBDIR`] with a `.md`
    /// suffix. When `init_section_index` is enabled, a package
    /// initializer is rewritten to the conventional index filename so
    /// it serves as its section's landing page, and a non-initializer
    /// module that happens to be named like the index file is suffixed
    /// to keep the two apart.
    #[must_use]
    pub fn rel_target_path(&self, module: &ModuleRef) -> PathBuf {
        let mut path = PathBuf::from(GENERATED_SUBDIR);
        let segments = module.ref_path();
        for segment in &segments[..segments.len() - 1] {
            path.push(segment);
        }

        let last = &segments[segments.len() - 1];
        let stem = if self.init_section_index {
            if last == INIT_MODULE {
                INDEX_STEM
            } else if last == INDEX_STEM {
                INDEX_COLLISION_STEM
            } else {
                last
            }
        } else {
            last
        };
        path.push(format!("{stem}.md"));
        path
    }

    /// Absolute target path for a module's page.
    #[must_use]
    pub fn target_path(&self, module: &ModuleRef) -> PathBuf {
        self.scratch.path().join(self.rel_target_path(module))
    }

    /// Render `template` for `module` and write it to the module's
    /// target path, registering the result.
    ///
    /// # Errors
    ///
    /// Returns [`GenerateError::PageAlreadyExists`] if another module
    /// already produced the same target path this build, and
    /// [`GenerateError::Io`] on write failures.
    pub fn generate(
        &mut self,
        module: ModuleRef,
        template: &str,
    ) -> Result<&GeneratedPage, GenerateError> {
        tracing::debug!(module = %module.module_id(), "processing module");
        let rel_path = self.rel_target_path(&module);
        let doc_path = self.scratch.path().join(&rel_path);

        if let Some(&idx) = self.by_doc_path.get(&doc_path) {
            return Err(GenerateError::PageAlreadyExists {
                existing: self.pages[idx].module.module_id(),
                duplicate: module.module_id(),
            });
        }

        tracing::debug!(path = %doc_path.display(), "generating page");
        write_new(&doc_path, &render_template(template, &module)).map_err(|source| {
            GenerateError::Io {
                path: doc_path.clone(),
                source,
            }
        })?;

        let site_file = SiteFile::new(rel_path, self.scratch.path(), self.use_directory_urls);
        self.pages.push(GeneratedPage {
            module,
            doc_path: doc_path.clone(),
            site_file,
        });
        self.by_doc_path.insert(doc_path, self.pages.len() - 1);
        Ok(&self.pages[self.pages.len() - 1])
    }

    /// Destroy the scratch directory, reporting removal errors.
    ///
    /// Dropping the generator cleans up as well; this variant exists
    /// for callers that want the error.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the scratch directory cannot be removed.
    pub fn close(self) -> io::Result<()> {
        self.scratch.close()
    }
}

/// Write `content` to a path that must not exist yet, creating parent
/// directories. The create-new open keeps a registry bug or an outside
/// writer from silently clobbering a page.
fn write_new(path: &Path, content: &str) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut file = fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)?;
    file.write_all(content.as_bytes())
}
