//! Module reference modeling and source discovery for refgen.
//!
//! A [`ModuleRef`] identifies one discovered Python source file by its
//! position relative to a base directory and derives the identifier
//! variants the rest of the pipeline needs (dotted module id, printable
//! id, display name). [`discover`] walks a search directory and yields
//! module references in a deterministic order.
//!
//! # Example
//!
//! ```ignore
//! use refgen_modules::{ModuleRef, discover};
//!
//! let modules = discover("src".as_ref(), "src".as_ref(), &[])?;
//! for module in &modules {
//!     println!("{}", module.module_id());
//! }
//! ```

mod discover;
mod module_ref;

pub use discover::{DiscoverError, discover};
pub use module_ref::{INIT_MODULE, InvalidModuleReference, ModuleRef, SOURCE_EXTENSION};
