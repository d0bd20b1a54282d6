//! Python API reference generation plugin for documentation sites.
//!
//! Discovers Python source modules per configured source group,
//! generates one markdown reference page per module into a private
//! scratch area, and reconciles those pages into the host pipeline's
//! navigation tree at the position derived from each module's identity.
//!
//! # Build phases
//!
//! The host pipeline drives [`RefGenPlugin`] through its phase hooks in
//! a fixed order:
//!
//! 1. [`on_files`](RefGenPlugin::on_files) — discover modules, render
//!    pages, register the outputs with the host file set.
//! 2. [`edit_url_for`](RefGenPlugin::edit_url_for) — per page, attach
//!    an edit link pointing at the original Python source.
//! 3. [`on_nav`](RefGenPlugin::on_nav) — prune and reinsert generated
//!    pages in the shared navigation, then repair traversal links.
//! 4. [`on_build_complete`](RefGenPlugin::on_build_complete) /
//!    [`on_shutdown`](RefGenPlugin::on_shutdown) — tear down scratch
//!    state. Idempotent.

mod config;
mod edit_url;
mod host;
mod plugin;

pub use config::{ConfigError, PluginConfig, SourceGroup};
pub use edit_url::edit_url;
pub use host::{FileRegistry, HostContext};
pub use plugin::{MODULE_PAGE, PluginError, RefGenPlugin};
