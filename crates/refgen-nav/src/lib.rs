//! Navigation tree model and reconciliation for refgen.
//!
//! The navigation tree is owned by the host pipeline and shared across
//! plugins, so it is modeled as an arena: a flat `Vec` of nodes
//! addressed by [`NodeId`] indices, with parent and previous/next
//! relationships stored as indices. Node identity survives any amount
//! of restructuring, which is what lets the reconciler match pages the
//! host placed somewhere else.
//!
//! # Architecture
//!
//! - [`NavTree`] holds the arena and the ordered top-level item list.
//! - [`NavNode`] is a closed sum over {Page, Section, Link}; every
//!   traversal matches exhaustively.
//! - [`reconcile_group`] prunes generated pages from wherever default
//!   placement put them and reinserts them at their computed location.
//! - [`relink`] recomputes parent and previous/next references in one
//!   global pass instead of maintaining them incrementally.

mod reconcile;
mod tree;

pub use reconcile::{NavError, ReconcileEntry, reconcile_group, relink};
pub use tree::{LinkNode, NavNode, NavTree, NodeId, PageNode, SectionNode};
