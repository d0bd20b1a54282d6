//! Arena-based navigation tree.
//!
//! Nodes live in a flat `Vec` and reference each other by [`NodeId`].
//! Detaching a node only removes its id from the parent's child list;
//! the arena slot stays allocated, so an id held elsewhere (for example
//! by the reconciler mid-pass) never dangles. Ownership of order flows
//! downward through child lists; `parent`, `previous`, and `next` are
//! derived references recomputed by [`relink`](crate::relink).

use std::path::PathBuf;

/// Index of a node within its [`NavTree`] arena.
///
/// Ids are only meaningful for the tree that produced them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NodeId(pub(crate) usize);

/// Leaf page backed by a source document.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PageNode {
    /// Display title. `None` marks the page as its section's index:
    /// the rendering side shows the section title instead.
    pub title: Option<String>,
    /// Absolute path of the backing source document. This is the
    /// identity used to match pages the host pipeline auto-placed.
    pub source_path: PathBuf,
    /// Nested items. Usually empty; hand-authored navs may nest
    /// entries beneath a page.
    pub children: Vec<NodeId>,
    /// Containing node, `None` at top level.
    pub parent: Option<NodeId>,
    /// Previous page in depth-first reading order.
    pub previous: Option<NodeId>,
    /// Next page in depth-first reading order.
    pub next: Option<NodeId>,
}

/// Titled grouping of child items.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SectionNode {
    /// Section title.
    pub title: String,
    /// Ordered child items.
    pub children: Vec<NodeId>,
    /// Containing node, `None` at top level.
    pub parent: Option<NodeId>,
}

/// Opaque external link entry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LinkNode {
    /// Link title.
    pub title: String,
    /// Link target.
    pub url: String,
    /// Containing node, `None` at top level.
    pub parent: Option<NodeId>,
}

/// A navigation tree node.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NavNode {
    /// Leaf page backed by a source document.
    Page(PageNode),
    /// Titled grouping of child items.
    Section(SectionNode),
    /// External link.
    Link(LinkNode),
}

impl NavNode {
    /// Display title, if any. Untitled index pages return `None`.
    #[must_use]
    pub fn title(&self) -> Option<&str> {
        match self {
            Self::Page(page) => page.title.as_deref(),
            Self::Section(section) => Some(&section.title),
            Self::Link(link) => Some(&link.title),
        }
    }

    /// Ordered child ids. Links never have children.
    #[must_use]
    pub fn children(&self) -> &[NodeId] {
        match self {
            Self::Page(page) => &page.children,
            Self::Section(section) => &section.children,
            Self::Link(_) => &[],
        }
    }

    /// Containing node id.
    #[must_use]
    pub fn parent(&self) -> Option<NodeId> {
        match self {
            Self::Page(page) => page.parent,
            Self::Section(section) => section.parent,
            Self::Link(link) => link.parent,
        }
    }

    pub(crate) fn set_parent(&mut self, parent: Option<NodeId>) {
        match self {
            Self::Page(page) => page.parent = parent,
            Self::Section(section) => section.parent = parent,
            Self::Link(link) => link.parent = parent,
        }
    }
}

/// Navigation tree shared with the host pipeline.
#[derive(Debug, Default)]
pub struct NavTree {
    pub(crate) nodes: Vec<NavNode>,
    pub(crate) items: Vec<NodeId>,
}

impl NavTree {
    /// Create an empty tree.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Ordered top-level items.
    #[must_use]
    pub fn items(&self) -> &[NodeId] {
        &self.items
    }

    /// Borrow a node.
    ///
    /// # Panics
    ///
    /// Panics if `id` did not come from this tree.
    #[must_use]
    pub fn node(&self, id: NodeId) -> &NavNode {
        &self.nodes[id.0]
    }

    /// Mutably borrow a node.
    ///
    /// # Panics
    ///
    /// Panics if `id` did not come from this tree.
    #[must_use]
    pub fn node_mut(&mut self, id: NodeId) -> &mut NavNode {
        &mut self.nodes[id.0]
    }

    /// Borrow a node as a page, if it is one.
    #[must_use]
    pub fn page(&self, id: NodeId) -> Option<&PageNode> {
        match self.node(id) {
            NavNode::Page(page) => Some(page),
            NavNode::Section(_) | NavNode::Link(_) => None,
        }
    }

    pub(crate) fn push_node(&mut self, node: NavNode) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(node);
        id
    }

    fn attach(&mut self, id: NodeId, parent: Option<NodeId>) {
        match parent {
            None => self.items.push(id),
            Some(parent_id) => match self.node_mut(parent_id) {
                NavNode::Page(page) => page.children.push(id),
                NavNode::Section(section) => section.children.push(id),
                NavNode::Link(_) => panic!("link nodes cannot have children"),
            },
        }
    }

    /// Add a page under `parent` (top level when `None`).
    ///
    /// # Panics
    ///
    /// Panics if `parent` is a link node.
    pub fn add_page(
        &mut self,
        parent: Option<NodeId>,
        title: Option<&str>,
        source_path: impl Into<PathBuf>,
    ) -> NodeId {
        let id = self.push_node(NavNode::Page(PageNode {
            title: title.map(ToOwned::to_owned),
            source_path: source_path.into(),
            children: Vec::new(),
            parent,
            previous: None,
            next: None,
        }));
        self.attach(id, parent);
        id
    }

    /// Add a section under `parent` (top level when `None`).
    ///
    /// # Panics
    ///
    /// Panics if `parent` is a link node.
    pub fn add_section(&mut self, parent: Option<NodeId>, title: &str) -> NodeId {
        let id = self.push_node(NavNode::Section(SectionNode {
            title: title.to_owned(),
            children: Vec::new(),
            parent,
        }));
        self.attach(id, parent);
        id
    }

    /// Add an external link under `parent` (top level when `None`).
    ///
    /// # Panics
    ///
    /// Panics if `parent` is a link node.
    pub fn add_link(&mut self, parent: Option<NodeId>, title: &str, url: &str) -> NodeId {
        let id = self.push_node(NavNode::Link(LinkNode {
            title: title.to_owned(),
            url: url.to_owned(),
            parent,
        }));
        self.attach(id, parent);
        id
    }

    /// Page ids in left-to-right depth-first reading order.
    ///
    /// This is the order [`relink`](crate::relink) chains
    /// `previous`/`next` in.
    #[must_use]
    pub fn pages_in_order(&self) -> Vec<NodeId> {
        let mut pages = Vec::new();
        let mut stack: Vec<NodeId> = self.items.iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            if matches!(self.node(id), NavNode::Page(_)) {
                pages.push(id);
            }
            stack.extend(self.node(id).children().iter().rev());
        }
        pages
    }

    /// Titles of the direct children of `parent` (top level when
    /// `None`), with `None` for untitled index pages.
    #[must_use]
    pub fn child_titles(&self, parent: Option<NodeId>) -> Vec<Option<String>> {
        let ids = match parent {
            None => &self.items,
            Some(id) => self.node(id).children(),
        };
        ids.iter()
            .map(|&id| self.node(id).title().map(ToOwned::to_owned))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_add_page_at_top_level() {
        let mut tree = NavTree::new();

        let id = tree.add_page(None, Some("Home"), "/docs/index.md");

        assert_eq!(tree.items(), [id]);
        let page = tree.page(id).unwrap();
        assert_eq!(page.title.as_deref(), Some("Home"));
        assert_eq!(page.source_path, PathBuf::from("/docs/index.md"));
    }

    #[test]
    fn test_add_section_with_children() {
        let mut tree = NavTree::new();

        let section = tree.add_section(None, "Guide");
        let child = tree.add_page(Some(section), Some("Setup"), "/docs/setup.md");

        assert_eq!(tree.node(section).children(), [child]);
        assert_eq!(tree.node(child).parent(), Some(section));
    }

    #[test]
    fn test_link_has_no_children() {
        let mut tree = NavTree::new();

        let link = tree.add_link(None, "Tracker", "https://example.com/issues");

        assert!(tree.node(link).children().is_empty());
        assert_eq!(tree.node(link).title(), Some("Tracker"));
    }

    #[test]
    fn test_pages_in_order_expands_sections_inline() {
        let mut tree = NavTree::new();
        let first = tree.add_page(None, Some("First"), "/d/first.md");
        let section = tree.add_section(None, "Middle");
        let nested = tree.add_page(Some(section), Some("Nested"), "/d/nested.md");
        let last = tree.add_page(None, Some("Last"), "/d/last.md");

        assert_eq!(tree.pages_in_order(), [first, nested, last]);
    }

    #[test]
    fn test_pages_in_order_includes_page_children() {
        let mut tree = NavTree::new();
        let parent = tree.add_page(None, Some("Parent"), "/d/parent.md");
        let child = tree.add_page(Some(parent), Some("Child"), "/d/child.md");
        let sibling = tree.add_page(None, Some("Sibling"), "/d/sibling.md");

        assert_eq!(tree.pages_in_order(), [parent, child, sibling]);
    }

    #[test]
    fn test_child_titles_reports_untitled_pages() {
        let mut tree = NavTree::new();
        let section = tree.add_section(None, "Reference");
        tree.add_page(Some(section), None, "/d/index.md");
        tree.add_page(Some(section), Some("mod"), "/d/mod.md");

        assert_eq!(
            tree.child_titles(Some(section)),
            [None, Some("mod".to_owned())]
        );
    }
}
