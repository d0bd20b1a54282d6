//! Reference page generation for refgen.
//!
//! [`PageGenerator`] renders one markdown page per discovered module
//! into a private scratch directory and keeps a registry of what it
//! produced. The scratch directory is a [`tempfile::TempDir`], so
//! everything is torn down when the generator is dropped, including on
//! error paths.

mod generator;
mod site_file;

pub use generator::{GenerateError, GeneratedPage, PageGenerator, render_template};
pub use site_file::SiteFile;
