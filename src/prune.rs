//! Wrapper removal: strip structurally meaningless generic nodes.
//!
//! Two rewrites, applied bottom-up and repeated until a fixed point:
//!
//! - **Empty removal** — a generic node with no children and no inline
//!   text is dropped from its parent's child list.
//! - **Single-child collapse** — a generic node with exactly one child is
//!   replaced by that child; the child inherits the wrapper's indentation
//!   and parent reference, and absorbs the wrapper's text (and reference
//!   id) when it has none of its own.
//!
//! Reference ids outrank structure: an otherwise-empty generic that
//! carries an id is kept, and a wrapper whose id cannot transfer (the
//! child already has one) is left un-collapsed. This stage cannot fail;
//! worst case it is a no-op.

use crate::tree::{NodeId, OutlineTree};

/// Counters describing one wrapper-removal run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PruneStats {
    /// Empty generic nodes deleted.
    pub removed_empty: usize,
    /// Single-child generic nodes collapsed into their child.
    pub collapsed: usize,
    /// Bottom-up passes until the fixed point (at least 1).
    pub passes: usize,
}

impl PruneStats {
    /// Whether the run changed the tree at all.
    pub fn changed(&self) -> bool {
        self.removed_empty > 0 || self.collapsed > 0
    }
}

/// Remove wrapper nodes from the tree, in place.
pub fn remove_wrappers(tree: &mut OutlineTree) -> PruneStats {
    let mut stats = PruneStats::default();
    loop {
        stats.passes += 1;
        if !prune_children(tree, None, &mut stats) {
            break;
        }
    }
    stats
}

/// Rewrite the child list of `parent` (or the root list), processing each
/// child's own subtree first. Returns whether anything changed.
fn prune_children(tree: &mut OutlineTree, parent: Option<NodeId>, stats: &mut PruneStats) -> bool {
    let original: Vec<NodeId> = match parent {
        Some(p) => tree.children(p).to_vec(),
        None => tree.roots.clone(),
    };

    let mut changed = false;
    for &child in &original {
        changed |= prune_children(tree, Some(child), stats);
    }

    let mut retained = Vec::with_capacity(original.len());
    for child in original {
        let survivor = collapse_chain(tree, child, parent, stats, &mut changed);
        let node = tree.node(survivor);
        if node.kind.is_generic()
            && node.children.is_empty()
            && node.inline_text.is_none()
            && node.reference_id.is_none()
        {
            stats.removed_empty += 1;
            changed = true;
            continue;
        }
        retained.push(survivor);
    }

    match parent {
        Some(p) => tree.node_mut(p).children = retained,
        None => tree.roots = retained,
    }
    changed
}

/// Collapse a chain of single-child generic wrappers starting at `id`,
/// returning the node that ends up occupying the child slot.
fn collapse_chain(
    tree: &mut OutlineTree,
    id: NodeId,
    parent: Option<NodeId>,
    stats: &mut PruneStats,
    changed: &mut bool,
) -> NodeId {
    let mut current = id;
    loop {
        let node = tree.node(current);
        if !(node.kind.is_generic() && node.children.len() == 1) {
            return current;
        }
        let child = node.children[0];
        // An id that cannot transfer pins the wrapper in place.
        if node.reference_id.is_some() && tree.node(child).reference_id.is_some() {
            return current;
        }

        let wrapper_indent = node.indent;
        let wrapper_text = node.inline_text.clone();
        let wrapper_reference = node.reference_id.clone();

        let absorbed = tree.node_mut(child);
        absorbed.indent = wrapper_indent;
        absorbed.parent = parent;
        if absorbed.inline_text.is_none() {
            absorbed.inline_text = wrapper_text;
        }
        if absorbed.reference_id.is_none() {
            absorbed.reference_id = wrapper_reference;
        }

        stats.collapsed += 1;
        *changed = true;
        current = child;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kind::ElementKind;
    use crate::parse::parse_outline;
    use crate::tree::OutlineTree;

    fn pruned(text: &str) -> (OutlineTree, PruneStats) {
        let mut tree = OutlineTree::build(parse_outline(text));
        let stats = remove_wrappers(&mut tree);
        (tree, stats)
    }

    #[test]
    fn nested_single_child_generics_collapse_to_leaf() {
        // Scenario: three stacked wrappers over one button.
        let text = "- generic\n  - generic\n    - generic\n      - button \"Go\" [ref=e1]\n";
        let (tree, stats) = pruned(text);
        assert_eq!(tree.roots.len(), 1);
        let survivor = tree.roots[0];
        assert_eq!(tree.node(survivor).kind, ElementKind::Button);
        // The button lands at the outermost wrapper's indentation.
        assert_eq!(tree.node(survivor).indent, 0);
        assert_eq!(tree.node(survivor).parent, None);
        assert_eq!(stats.collapsed, 3);
    }

    #[test]
    fn empty_generic_between_siblings_removed() {
        let text = "- list\n  - button \"a\"\n  - generic\n  - button \"b\"\n  - button \"c\"\n";
        let (tree, stats) = pruned(text);
        let list = tree.roots[0];
        let kinds: Vec<ElementKind> = tree
            .children(list)
            .iter()
            .map(|&c| tree.node(c).kind.clone())
            .collect();
        assert_eq!(
            kinds,
            vec![ElementKind::Button, ElementKind::Button, ElementKind::Button]
        );
        assert_eq!(stats.removed_empty, 1);
    }

    #[test]
    fn wrapper_text_transfers_to_child() {
        let text = "- generic \"Label\"\n  - button [ref=e1]\n";
        let (tree, _) = pruned(text);
        let button = tree.roots[0];
        assert_eq!(tree.node(button).kind, ElementKind::Button);
        assert_eq!(tree.node(button).inline_text.as_deref(), Some("Label"));
    }

    #[test]
    fn child_text_wins_over_wrapper_text() {
        let text = "- generic \"outer\"\n  - button \"inner\"\n";
        let (tree, _) = pruned(text);
        assert_eq!(
            tree.node(tree.roots[0]).inline_text.as_deref(),
            Some("inner")
        );
    }

    #[test]
    fn wrapper_reference_id_transfers() {
        let text = "- generic [ref=e7]\n  - button \"Go\"\n";
        let (tree, _) = pruned(text);
        let button = tree.roots[0];
        assert_eq!(tree.node(button).kind, ElementKind::Button);
        assert_eq!(tree.node(button).reference_id.as_deref(), Some("e7"));
    }

    #[test]
    fn wrapper_with_untransferable_id_is_kept() {
        let text = "- generic [ref=e1]\n  - button [ref=e2]\n";
        let (tree, stats) = pruned(text);
        let wrapper = tree.roots[0];
        assert_eq!(tree.node(wrapper).kind, ElementKind::Generic);
        assert_eq!(tree.node(wrapper).reference_id.as_deref(), Some("e1"));
        assert_eq!(tree.children(wrapper).len(), 1);
        assert_eq!(stats.collapsed, 0);
    }

    #[test]
    fn empty_generic_with_id_is_kept() {
        let text = "- list\n  - generic [ref=e3]\n";
        let (tree, stats) = pruned(text);
        assert_eq!(stats.removed_empty, 0);
        assert_eq!(tree.children(tree.roots[0]).len(), 1);
    }

    #[test]
    fn wrapper_emptied_by_child_removal_is_removed_too() {
        // The inner generic is empty; removing it makes the outer generic
        // empty as well, which a later pass removes.
        let text = "- list\n  - generic\n    - generic\n  - button \"a\"\n";
        let (tree, stats) = pruned(text);
        let list = tree.roots[0];
        assert_eq!(tree.children(list).len(), 1);
        assert_eq!(tree.node(tree.children(list)[0]).kind, ElementKind::Button);
        assert_eq!(stats.removed_empty, 2);
    }

    #[test]
    fn removal_is_idempotent() {
        let text = "- generic\n  - generic\n    - button \"Go\"\n- list\n  - generic\n";
        let mut tree = OutlineTree::build(parse_outline(text));
        let first = remove_wrappers(&mut tree);
        assert!(first.changed());
        let second = remove_wrappers(&mut tree);
        assert!(!second.changed());
        assert_eq!(second.passes, 1);
    }

    #[test]
    fn non_generic_nodes_untouched() {
        let text = "- list\n  - listitem \"only\"\n";
        let (tree, stats) = pruned(text);
        assert!(!stats.changed());
        assert_eq!(tree.roots.len(), 1);
        assert_eq!(tree.children(tree.roots[0]).len(), 1);
    }
}
