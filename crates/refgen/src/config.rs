//! Plugin configuration.
//!
//! Parsed with serde from the host's config loader (TOML in tests and
//! standalone use). Each source group is an immutable value object;
//! defaults are applied per field at deserialization time.

use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to parse the configuration text.
    #[error("failed to parse configuration")]
    Parse(#[from] toml::de::Error),
    /// A group's search directory does not exist.
    #[error("search directory {} does not exist", path.display())]
    MissingSearchDir {
        /// Configured search directory.
        path: PathBuf,
    },
    /// A group's base directory does not exist.
    #[error("base directory {} does not exist", path.display())]
    MissingBaseDir {
        /// Configured base directory.
        path: PathBuf,
    },
}

/// One discovery root and its placement rules.
#[derive(Clone, Debug, Deserialize)]
pub struct SourceGroup {
    /// Directory to search for source modules. Must exist.
    pub search: PathBuf,
    /// Root for computing module identifiers. Defaults to `search`.
    #[serde(default)]
    pub base: Option<PathBuf>,
    /// Glob patterns for entry names to skip during discovery.
    #[serde(default = "default_ignore")]
    pub ignore: Vec<String>,
    /// Dot-separated module prefix to strip from navigation placement.
    #[serde(default)]
    pub hide_namespace: String,
    /// Section titles under which this group's pages live.
    #[serde(default = "default_nav_heading")]
    pub nav_heading: Vec<String>,
    /// Edit-link base URI override for this group's pages.
    #[serde(default)]
    pub edit_uri: Option<String>,
    /// Edit-link URI template override; `{path}` is substituted with
    /// the module's relative source path.
    #[serde(default)]
    pub edit_uri_template: Option<String>,
    /// Render package initializers as their section's index page.
    #[serde(default = "default_init_section_index")]
    pub init_section_index: bool,
}

fn default_ignore() -> Vec<String> {
    vec!["test".to_owned(), "tests".to_owned(), "__main__.py".to_owned()]
}

fn default_nav_heading() -> Vec<String> {
    vec!["Reference".to_owned()]
}

fn default_init_section_index() -> bool {
    true
}

impl SourceGroup {
    /// Root for module identifiers: `base` when set, else `search`.
    #[must_use]
    pub fn base_path(&self) -> &Path {
        self.base.as_deref().unwrap_or(&self.search)
    }

    /// The `hide_namespace` prefix split into segments.
    #[must_use]
    pub fn hide_namespace_segments(&self) -> Vec<String> {
        if self.hide_namespace.is_empty() {
            Vec::new()
        } else {
            self.hide_namespace.split('.').map(ToOwned::to_owned).collect()
        }
    }

    /// Check that configured directories exist.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if `search` or `base` is missing.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.search.is_dir() {
            return Err(ConfigError::MissingSearchDir {
                path: self.search.clone(),
            });
        }
        if let Some(base) = &self.base
            && !base.is_dir()
        {
            return Err(ConfigError::MissingBaseDir { path: base.clone() });
        }
        Ok(())
    }
}

/// Top-level plugin configuration.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct PluginConfig {
    /// Independently discovered source groups. They share one
    /// navigation tree; everything else is per group.
    #[serde(default)]
    pub source_groups: Vec<SourceGroup>,
}

impl PluginConfig {
    /// Parse configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] on malformed input.
    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Validate every source group.
    ///
    /// # Errors
    ///
    /// Returns the first group's [`ConfigError`], if any.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for group in &self.source_groups {
            group.validate()?;
        }
        Ok(())
    }
}
