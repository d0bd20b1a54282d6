//! Plugin lifecycle and per-group orchestration.

use std::io;
use std::path::{Path, PathBuf};

use refgen_modules::{DiscoverError, discover};
use refgen_nav::{NavError, NavTree, ReconcileEntry, reconcile_group, relink};
use refgen_pages::{GenerateError, PageGenerator};

use crate::config::{ConfigError, PluginConfig, SourceGroup};
use crate::edit_url::edit_url;
use crate::host::{FileRegistry, HostContext};

/// Default page template. Renders the module name as a heading, the
/// printable dotted identifier, and a `:::` directive block the docs
/// renderer expands into the module's API documentation.
pub const MODULE_PAGE: &str = "# `{module_name}`\n`{printable_module_id}`\n\n::: {module_id}\n";

/// Error surfaced to the host's error-reporting channel. Any variant
/// aborts the current build; partial scratch state is still cleaned up
/// through the shutdown path.
#[derive(Debug, thiserror::Error)]
pub enum PluginError {
    /// Configuration is invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// Module discovery failed.
    #[error(transparent)]
    Discover(#[from] DiscoverError),
    /// Page generation failed.
    #[error(transparent)]
    Generate(#[from] GenerateError),
    /// Navigation reconciliation failed.
    #[error(transparent)]
    Nav(#[from] NavError),
    /// Creating a group's scratch directory failed.
    #[error("failed to create scratch directory")]
    Scratch(#[source] io::Error),
}

/// Build state for one source group: its configuration and the
/// generator owning that group's scratch directory and page registry.
struct GroupState {
    config: SourceGroup,
    generator: PageGenerator,
}

/// The reference-generation plugin.
///
/// Constructed once; build state is created in
/// [`on_files`](Self::on_files) and torn down in
/// [`on_build_complete`](Self::on_build_complete) or
/// [`on_shutdown`](Self::on_shutdown). Teardown is idempotent and also
/// runs via `Drop` of the scratch directories, so an aborted build
/// leaves nothing behind.
pub struct RefGenPlugin {
    config: PluginConfig,
    groups: Vec<GroupState>,
}

impl RefGenPlugin {
    /// Create a plugin from validated configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if any source group is invalid.
    pub fn new(config: PluginConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            groups: Vec::new(),
        })
    }

    /// Discovery phase: discover each group's modules, generate their
    /// pages, and register the outputs with the host file set.
    ///
    /// # Errors
    ///
    /// Returns [`PluginError`] on discovery, generation, or scratch
    /// failures; the build must abort.
    pub fn on_files(
        &mut self,
        files: &mut FileRegistry,
        host: &HostContext,
    ) -> Result<(), PluginError> {
        self.teardown();

        for group in self.config.source_groups.clone() {
            let mut generator =
                PageGenerator::new(host.use_directory_urls, group.init_section_index)
                    .map_err(PluginError::Scratch)?;

            let modules = discover(group.base_path(), &group.search, &group.ignore)?;
            tracing::debug!(
                search = %group.search.display(),
                count = modules.len(),
                "discovered modules"
            );
            for module in modules {
                let page = generator.generate(module, MODULE_PAGE)?;
                files.append(page.site_file.clone());
            }

            self.groups.push(GroupState {
                config: group,
                generator,
            });
        }
        Ok(())
    }

    /// Placeholder nav entries `(module_id, src_path)` for every
    /// generated page. Hosts that carry an explicit nav append these
    /// so they do not warn about generated files missing from it.
    #[must_use]
    pub fn nav_stub_entries(&self) -> Vec<(String, PathBuf)> {
        self.groups
            .iter()
            .flat_map(|group| group.generator.pages())
            .map(|page| (page.module.module_id(), page.site_file.src_path.clone()))
            .collect()
    }

    /// Pre-render phase: edit link for a generated document, or `None`
    /// if this plugin did not generate it.
    ///
    /// The group's `edit_uri`/`edit_uri_template` overrides replace the
    /// host's pair wholesale when either is set. The link targets the
    /// module's original Python source, not the generated markdown.
    #[must_use]
    pub fn edit_url_for(&self, doc_path: &Path, host: &HostContext) -> Option<String> {
        for group in &self.groups {
            let Some(page) = group.generator.get(doc_path) else {
                continue;
            };
            let overridden = group.config.edit_uri.is_some()
                || group.config.edit_uri_template.is_some();
            let (uri, template) = if overridden {
                (
                    group.config.edit_uri.as_deref(),
                    group.config.edit_uri_template.as_deref(),
                )
            } else {
                (host.edit_uri.as_deref(), host.edit_uri_template.as_deref())
            };
            return edit_url(uri, template, &page.module.source_rel_path());
        }
        None
    }

    /// Navigation phase: reconcile each group's pages into the shared
    /// tree, then repair traversal links once, globally.
    ///
    /// # Errors
    ///
    /// Returns [`PluginError::Nav`] on a section collision; the build
    /// must abort.
    pub fn on_nav(&mut self, tree: &mut NavTree) -> Result<(), PluginError> {
        for group in &self.groups {
            let entries = group
                .generator
                .pages()
                .iter()
                .map(|page| ReconcileEntry {
                    doc_path: page.doc_path.clone(),
                    ref_path: page.module.ref_path().to_vec(),
                    title: if group.config.init_section_index && page.module.is_package_init() {
                        None
                    } else {
                        Some(page.module.module_name())
                    },
                })
                .collect();
            reconcile_group(
                tree,
                entries,
                &group.config.nav_heading,
                &group.config.hide_namespace_segments(),
            )?;
        }
        relink(tree);
        Ok(())
    }

    /// Build-complete phase: destroy scratch state. Idempotent.
    pub fn on_build_complete(&mut self) {
        self.teardown();
    }

    /// Shutdown phase: destroy scratch state. Idempotent.
    pub fn on_shutdown(&mut self) {
        self.teardown();
    }

    fn teardown(&mut self) {
        for group in self.groups.drain(..) {
            if let Err(error) = group.generator.close() {
                tracing::warn!(%error, "failed to remove scratch directory");
            }
        }
    }
}
