//! Navigation reconciliation.
//!
//! The host pipeline auto-places every discovered document somewhere in
//! the navigation, which is usually wrong for generated reference
//! pages. Reconciliation prunes those pages from wherever they ended
//! up, collapses the section shells left empty behind them, and
//! reinserts each page at the location computed from its module
//! identity. A final [`relink`] pass repairs parent and
//! previous/next references for the whole tree.

use std::collections::{HashMap, VecDeque};
use std::mem;
use std::path::PathBuf;

use crate::tree::{NavNode, NavTree, NodeId, PageNode, SectionNode};

/// Error raised while rebuilding the navigation.
#[derive(Debug, thiserror::Error)]
pub enum NavError {
    /// The slot a generated section needs is occupied by a non-section
    /// item. This indicates a naming conflict the tool cannot resolve
    /// safely, so the build aborts.
    #[error("navigation slot {path:?} is occupied by a non-section item titled {title:?}")]
    Collision {
        /// Titles walked from the root, including the colliding one.
        path: Vec<String>,
        /// Title of the occupying item.
        title: String,
    },
}

/// One generated page, as the reconciler sees it.
#[derive(Clone, Debug)]
pub struct ReconcileEntry {
    /// Absolute path of the generated document. Pages already in the
    /// tree are matched against this, by path identity.
    pub doc_path: PathBuf,
    /// Module ref path; positions the page in the navigation.
    pub ref_path: Vec<String>,
    /// Nav title. `None` marks a section index page.
    pub title: Option<String>,
}

/// Prune and reinsert one source group's generated pages.
///
/// Steps, in order: extract every entry's page from wherever the tree
/// currently holds it (collapsing sections left empty), allocate fresh
/// pages for entries not present, sort the whole batch by ref path,
/// then insert each page under `heading` at its module-derived section
/// path with the `hide_namespace` prefix stripped.
///
/// Call [`relink`] once after every group has been reconciled.
///
/// # Errors
///
/// Returns [`NavError::Collision`] if a needed section slot is held by
/// a non-section item. The tree may be partially updated in that case;
/// the caller is expected to abort the build.
pub fn reconcile_group(
    tree: &mut NavTree,
    entries: Vec<ReconcileEntry>,
    heading: &[String],
    hide_namespace: &[String],
) -> Result<(), NavError> {
    let mut pending: HashMap<PathBuf, ReconcileEntry> = entries
        .into_iter()
        .map(|entry| (entry.doc_path.clone(), entry))
        .collect();

    // Prune: pull already-placed pages out of the tree.
    let mut batch: Vec<(NodeId, ReconcileEntry)> = Vec::new();
    let items = mem::take(&mut tree.items);
    tree.items = prune_children(tree, items, &mut pending, &mut batch);

    // Entries the host never placed get fresh page nodes.
    for (_, entry) in pending.drain() {
        let id = tree.push_node(NavNode::Page(PageNode {
            title: None,
            source_path: entry.doc_path.clone(),
            children: Vec::new(),
            parent: None,
            previous: None,
            next: None,
        }));
        batch.push((id, entry));
    }

    // Ref-path order puts initializer pages first in their section and
    // makes the output deterministic across runs.
    batch.sort_by(|a, b| a.1.ref_path.cmp(&b.1.ref_path));

    for (id, entry) in batch {
        tracing::debug!(module = %entry.ref_path.join("."), "placing generated page");
        if let NavNode::Page(page) = tree.node_mut(id) {
            page.title = entry.title.clone();
        }
        let section_path = nav_section_path(&entry, heading, hide_namespace);
        let section = ensure_section_path(tree, &section_path)?;
        insert_page(tree, section, id);
    }

    Ok(())
}

/// Walk `ids`, extracting matched pages into `batch` and returning the
/// surviving children. Recurses into sections and into page children,
/// and drops sections left with no children.
fn prune_children(
    tree: &mut NavTree,
    ids: Vec<NodeId>,
    pending: &mut HashMap<PathBuf, ReconcileEntry>,
    batch: &mut Vec<(NodeId, ReconcileEntry)>,
) -> Vec<NodeId> {
    let mut kept = Vec::with_capacity(ids.len());
    for id in ids {
        let extracted = match tree.node(id) {
            NavNode::Page(page) => pending.remove(&page.source_path),
            NavNode::Section(_) | NavNode::Link(_) => None,
        };

        // Recurse even through an extracted page: a hand-authored nav
        // may nest other generated pages beneath it.
        let children = take_children(tree, id);
        let children = prune_children(tree, children, pending, batch);
        set_children(tree, id, children);

        if let Some(entry) = extracted {
            batch.push((id, entry));
            continue;
        }
        if matches!(tree.node(id), NavNode::Section(section) if section.children.is_empty()) {
            continue;
        }
        kept.push(id);
    }
    kept
}

/// Compute the section-title path a page belongs under: its containing
/// ref path with the namespace prefix stripped, under the group
/// heading.
fn nav_section_path(
    entry: &ReconcileEntry,
    heading: &[String],
    hide_namespace: &[String],
) -> Vec<String> {
    let containing = &entry.ref_path[..entry.ref_path.len().saturating_sub(1)];
    let containing = if !hide_namespace.is_empty() && containing.starts_with(hide_namespace) {
        &containing[hide_namespace.len()..]
    } else {
        containing
    };
    heading.iter().chain(containing).cloned().collect()
}

/// Materialize the section chain named by `path`, reusing existing
/// sections. Returns the innermost section, or `None` for an empty
/// path (top level).
fn ensure_section_path(
    tree: &mut NavTree,
    path: &[String],
) -> Result<Option<NodeId>, NavError> {
    let mut current: Option<NodeId> = None;
    let mut walked: Vec<String> = Vec::with_capacity(path.len());

    for segment in path {
        walked.push(segment.clone());
        let siblings = match current {
            None => tree.items.as_slice(),
            Some(id) => tree.node(id).children(),
        };
        let found = siblings
            .iter()
            .copied()
            .find(|&id| tree.node(id).title() == Some(segment));

        current = Some(match found {
            Some(id) => match tree.node(id) {
                NavNode::Section(_) => id,
                NavNode::Page(_) | NavNode::Link(_) => {
                    return Err(NavError::Collision {
                        path: walked,
                        title: segment.clone(),
                    });
                }
            },
            None => {
                let id = tree.push_node(NavNode::Section(SectionNode {
                    title: segment.clone(),
                    children: Vec::new(),
                    parent: current,
                }));
                children_mut(tree, current).push(id);
                id
            }
        });
    }
    Ok(current)
}

/// Append `page_id` to `section`'s children, replacing any existing
/// child with the same title. A replaced child's own children move
/// onto the inserted page so hand-placed sub-navigation survives.
fn insert_page(tree: &mut NavTree, section: Option<NodeId>, page_id: NodeId) {
    let title = tree.node(page_id).title().map(ToOwned::to_owned);

    let siblings: Vec<NodeId> = match section {
        None => tree.items.clone(),
        Some(id) => tree.node(id).children().to_vec(),
    };
    let superseded = siblings
        .iter()
        .position(|&id| id != page_id && tree.node(id).title() == title.as_deref())
        .map(|pos| children_mut(tree, section).remove(pos));
    children_mut(tree, section).push(page_id);

    if let Some(old) = superseded {
        let orphans = take_children(tree, old);
        if !orphans.is_empty()
            && let NavNode::Page(page) = tree.node_mut(page_id)
        {
            page.children.extend(orphans);
        }
    }
}

/// Repair `parent` references and chain `previous`/`next` across every
/// page, in left-to-right depth-first order.
///
/// Runs once per build, after every group's reconciliation.
pub fn relink(tree: &mut NavTree) {
    let mut queue: VecDeque<NodeId> = tree.items.iter().copied().collect();
    for id in queue.clone() {
        tree.node_mut(id).set_parent(None);
    }

    let mut previous: Option<NodeId> = None;
    while let Some(id) = queue.pop_front() {
        if matches!(tree.node(id), NavNode::Page(_)) {
            if let Some(prev) = previous
                && let NavNode::Page(page) = tree.node_mut(prev)
            {
                page.next = Some(id);
            }
            if let NavNode::Page(page) = tree.node_mut(id) {
                page.previous = previous;
                page.next = None;
            }
            previous = Some(id);
        }

        let children = tree.node(id).children().to_vec();
        for &child in &children {
            tree.node_mut(child).set_parent(Some(id));
        }
        // Children go to the queue front so a section expands before
        // its later siblings.
        for &child in children.iter().rev() {
            queue.push_front(child);
        }
    }
}

fn take_children(tree: &mut NavTree, id: NodeId) -> Vec<NodeId> {
    match tree.node_mut(id) {
        NavNode::Page(page) => mem::take(&mut page.children),
        NavNode::Section(section) => mem::take(&mut section.children),
        NavNode::Link(_) => Vec::new(),
    }
}

fn set_children(tree: &mut NavTree, id: NodeId, children: Vec<NodeId>) {
    match tree.node_mut(id) {
        NavNode::Page(page) => page.children = children,
        NavNode::Section(section) => section.children = children,
        NavNode::Link(_) => debug_assert!(children.is_empty()),
    }
}

fn children_mut(tree: &mut NavTree, parent: Option<NodeId>) -> &mut Vec<NodeId> {
    match parent {
        None => &mut tree.items,
        Some(id) => match tree.node_mut(id) {
            NavNode::Page(page) => &mut page.children,
            NavNode::Section(section) => &mut section.children,
            NavNode::Link(_) => unreachable!("links are never insertion targets"),
        },
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use pretty_assertions::assert_eq;

    use super::*;

    fn entry(doc_path: &str, ref_path: &[&str], title: Option<&str>) -> ReconcileEntry {
        ReconcileEntry {
            doc_path: PathBuf::from(doc_path),
            ref_path: ref_path.iter().map(|s| (*s).to_owned()).collect(),
            title: title.map(ToOwned::to_owned),
        }
    }

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| (*s).to_owned()).collect()
    }

    fn find_section(tree: &NavTree, parent: Option<NodeId>, title: &str) -> NodeId {
        let ids = match parent {
            None => tree.items(),
            Some(id) => tree.node(id).children(),
        };
        ids.iter()
            .copied()
            .find(|&id| {
                matches!(tree.node(id), NavNode::Section(_)) && tree.node(id).title() == Some(title)
            })
            .unwrap_or_else(|| panic!("no section titled {title:?}"))
    }

    #[test]
    fn test_new_pages_are_placed_under_heading() {
        let mut tree = NavTree::new();
        tree.add_page(None, Some("Home"), "/docs/index.md");

        reconcile_group(
            &mut tree,
            vec![entry("/tmp/_ref/pkg/mod.md", &["pkg", "mod"], Some("mod"))],
            &strings(&["Reference"]),
            &[],
        )
        .unwrap();

        let reference = find_section(&tree, None, "Reference");
        let pkg = find_section(&tree, Some(reference), "pkg");
        assert_eq!(
            tree.child_titles(Some(pkg)),
            [Some("mod".to_owned())]
        );
    }

    #[test]
    fn test_auto_placed_page_moves_to_computed_location() {
        let mut tree = NavTree::new();
        // The host's naive discovery dropped the generated page under
        // an unrelated hand-authored section.
        let misc = tree.add_section(None, "Misc");
        let page = tree.add_page(Some(misc), Some("mod"), "/tmp/_ref/pkg/mod.md");
        tree.add_page(Some(misc), Some("Notes"), "/docs/notes.md");

        reconcile_group(
            &mut tree,
            vec![entry("/tmp/_ref/pkg/mod.md", &["pkg", "mod"], Some("mod"))],
            &strings(&["Reference"]),
            &[],
        )
        .unwrap();

        // Old location no longer holds the page.
        assert_eq!(
            tree.child_titles(Some(misc)),
            [Some("Notes".to_owned())]
        );
        // Same node, new location.
        let reference = find_section(&tree, None, "Reference");
        let pkg = find_section(&tree, Some(reference), "pkg");
        assert_eq!(tree.node(pkg).children(), [page]);
    }

    #[test]
    fn test_emptied_sections_collapse() {
        let mut tree = NavTree::new();
        let shell = tree.add_section(None, "Shell");
        let inner = tree.add_section(Some(shell), "Inner");
        tree.add_page(Some(inner), Some("mod"), "/tmp/_ref/mod.md");
        tree.add_page(None, Some("Home"), "/docs/index.md");

        reconcile_group(
            &mut tree,
            vec![entry("/tmp/_ref/mod.md", &["mod"], Some("mod"))],
            &strings(&["Reference"]),
            &[],
        )
        .unwrap();

        // Both shells emptied out and were removed.
        let titles = tree.child_titles(None);
        assert_eq!(
            titles,
            [Some("Home".to_owned()), Some("Reference".to_owned())]
        );
    }

    #[test]
    fn test_section_with_remaining_children_survives() {
        let mut tree = NavTree::new();
        let guide = tree.add_section(None, "Guide");
        tree.add_page(Some(guide), Some("mod"), "/tmp/_ref/mod.md");
        tree.add_page(Some(guide), Some("Intro"), "/docs/intro.md");

        reconcile_group(
            &mut tree,
            vec![entry("/tmp/_ref/mod.md", &["mod"], Some("mod"))],
            &strings(&["Reference"]),
            &[],
        )
        .unwrap();

        assert_eq!(
            tree.child_titles(Some(guide)),
            [Some("Intro".to_owned())]
        );
    }

    #[test]
    fn test_hide_namespace_and_init_ordering() {
        // hide_namespace "mylib", heading ["Reference"], modules
        // mylib.pkg.mod and mylib.pkg.__init__.
        let mut tree = NavTree::new();

        reconcile_group(
            &mut tree,
            vec![
                entry(
                    "/tmp/_ref/mylib/pkg/mod.md",
                    &["mylib", "pkg", "mod"],
                    Some("mod"),
                ),
                entry(
                    "/tmp/_ref/mylib/pkg/index.md",
                    &["mylib", "pkg", "__init__"],
                    None,
                ),
            ],
            &strings(&["Reference"]),
            &strings(&["mylib"]),
        )
        .unwrap();

        let reference = find_section(&tree, None, "Reference");
        let pkg = find_section(&tree, Some(reference), "pkg");
        // Index page first (no title), then the module.
        assert_eq!(
            tree.child_titles(Some(pkg)),
            [None, Some("mod".to_owned())]
        );
    }

    #[test]
    fn test_namespace_prefix_only_strips_when_leading() {
        let mut tree = NavTree::new();

        reconcile_group(
            &mut tree,
            vec![entry(
                "/tmp/_ref/other/mylib/mod.md",
                &["other", "mylib", "mod"],
                Some("mod"),
            )],
            &strings(&["Reference"]),
            &strings(&["mylib"]),
        )
        .unwrap();

        // "mylib" is not a leading prefix here, nothing is stripped.
        let reference = find_section(&tree, None, "Reference");
        let other = find_section(&tree, Some(reference), "other");
        find_section(&tree, Some(other), "mylib");
    }

    #[test]
    fn test_collision_with_non_section_item() {
        let mut tree = NavTree::new();
        let reference = tree.add_section(None, "Reference");
        tree.add_page(Some(reference), Some("pkg"), "/docs/pkg.md");

        let err = reconcile_group(
            &mut tree,
            vec![entry("/tmp/_ref/pkg/mod.md", &["pkg", "mod"], Some("mod"))],
            &strings(&["Reference"]),
            &[],
        )
        .unwrap_err();

        let NavError::Collision { path, title } = err;
        assert_eq!(path, ["Reference", "pkg"]);
        assert_eq!(title, "pkg");
    }

    #[test]
    fn test_replacing_hand_placed_page_keeps_its_children() {
        let mut tree = NavTree::new();
        let reference = tree.add_section(None, "Reference");
        let pkg = tree.add_section(Some(reference), "pkg");
        let old = tree.add_page(Some(pkg), Some("mod"), "/docs/handwritten-mod.md");
        let extra = tree.add_link(Some(old), "Design notes", "https://example.com/design");

        reconcile_group(
            &mut tree,
            vec![entry("/tmp/_ref/pkg/mod.md", &["pkg", "mod"], Some("mod"))],
            &strings(&["Reference"]),
            &[],
        )
        .unwrap();

        assert_eq!(tree.node(pkg).children().len(), 1);
        let new_page = tree.node(pkg).children()[0];
        assert_ne!(new_page, old);
        assert_eq!(
            tree.page(new_page).unwrap().source_path,
            Path::new("/tmp/_ref/pkg/mod.md")
        );
        // The hand-placed page's sub-navigation moved over.
        assert_eq!(tree.node(new_page).children(), [extra]);
    }

    #[test]
    fn test_batch_is_sorted_by_ref_path() {
        let mut tree = NavTree::new();

        reconcile_group(
            &mut tree,
            vec![
                entry("/t/_ref/b/z.md", &["b", "z"], Some("z")),
                entry("/t/_ref/a.md", &["a"], Some("a")),
                entry("/t/_ref/b/a.md", &["b", "a"], Some("a")),
            ],
            &strings(&["Reference"]),
            &[],
        )
        .unwrap();

        let reference = find_section(&tree, None, "Reference");
        assert_eq!(
            tree.child_titles(Some(reference)),
            [Some("a".to_owned()), Some("b".to_owned())]
        );
        let b = find_section(&tree, Some(reference), "b");
        assert_eq!(
            tree.child_titles(Some(b)),
            [Some("a".to_owned()), Some("z".to_owned())]
        );
    }

    #[test]
    fn test_each_generated_page_appears_exactly_once() {
        let mut tree = NavTree::new();
        let stale = tree.add_section(None, "Stale");
        tree.add_page(Some(stale), Some("mod"), "/t/_ref/pkg/mod.md");

        reconcile_group(
            &mut tree,
            vec![entry("/t/_ref/pkg/mod.md", &["pkg", "mod"], Some("mod"))],
            &strings(&["Reference"]),
            &[],
        )
        .unwrap();
        relink(&mut tree);

        let occurrences = tree
            .pages_in_order()
            .iter()
            .filter(|&&id| tree.page(id).unwrap().source_path == Path::new("/t/_ref/pkg/mod.md"))
            .count();
        assert_eq!(occurrences, 1);
    }

    #[test]
    fn test_relink_chains_pages_in_reading_order() {
        let mut tree = NavTree::new();
        tree.add_page(None, Some("Home"), "/d/index.md");
        let section = tree.add_section(None, "Guide");
        tree.add_page(Some(section), Some("Setup"), "/d/setup.md");
        tree.add_link(Some(section), "Issues", "https://example.com");
        tree.add_page(None, Some("About"), "/d/about.md");

        relink(&mut tree);

        let pages = tree.pages_in_order();
        assert_eq!(pages.len(), 3);
        assert_eq!(tree.page(pages[0]).unwrap().previous, None);
        assert_eq!(tree.page(pages[2]).unwrap().next, None);
        for pair in pages.windows(2) {
            assert_eq!(tree.page(pair[0]).unwrap().next, Some(pair[1]));
            assert_eq!(tree.page(pair[1]).unwrap().previous, Some(pair[0]));
        }
    }

    #[test]
    fn test_relink_repairs_parents_after_moves() {
        let mut tree = NavTree::new();
        let misc = tree.add_section(None, "Misc");
        let page = tree.add_page(Some(misc), Some("mod"), "/t/_ref/mod.md");
        tree.add_page(Some(misc), Some("Keep"), "/d/keep.md");

        reconcile_group(
            &mut tree,
            vec![entry("/t/_ref/mod.md", &["mod"], Some("mod"))],
            &strings(&["Reference"]),
            &[],
        )
        .unwrap();
        relink(&mut tree);

        let reference = find_section(&tree, None, "Reference");
        assert_eq!(tree.node(page).parent(), Some(reference));
        assert_eq!(tree.node(reference).parent(), None);
        // Links under sections get parents too.
        let keep = tree.node(misc).children()[0];
        assert_eq!(tree.node(keep).parent(), Some(misc));
    }

    #[test]
    fn test_relink_single_page_has_no_neighbours() {
        let mut tree = NavTree::new();
        let only = tree.add_page(None, Some("Only"), "/d/only.md");

        relink(&mut tree);

        assert_eq!(tree.page(only).unwrap().previous, None);
        assert_eq!(tree.page(only).unwrap().next, None);
    }

    #[test]
    fn test_reconcile_empty_group_is_noop() {
        let mut tree = NavTree::new();
        tree.add_page(None, Some("Home"), "/d/index.md");

        reconcile_group(&mut tree, Vec::new(), &strings(&["Reference"]), &[]).unwrap();

        assert_eq!(tree.child_titles(None), [Some("Home".to_owned())]);
    }
}
