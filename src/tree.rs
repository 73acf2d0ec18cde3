//! Outline tree: an index-addressed arena of element nodes.
//!
//! Parent/child relationships live in index lists rather than owned
//! references, so the wrapper remover can rewrite structure by swapping
//! `NodeId`s without any dangling-pointer hazard. A child's back reference
//! to its parent is a plain index used only during collapse bookkeeping.

use serde::{Deserialize, Serialize};

use crate::kind::{self, ElementKind};
use crate::parse::ParsedLine;

/// Stable index of a node within an [`OutlineTree`] arena.
///
/// Ids stay valid for the lifetime of the tree; detaching a node removes
/// it from its parent's child list but never invalidates other ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(transparent)]
pub struct NodeId(u32);

impl NodeId {
    /// Position of this node in the arena.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "node:{}", self.0)
    }
}

/// One element of the page outline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ElementNode {
    /// Declared role.
    pub kind: ElementKind,
    /// Stable re-targeting id; once assigned it is never dropped, even
    /// when the node is folded or its wrapper is collapsed away.
    pub reference_id: Option<String>,
    /// Trimmed visible text.
    pub inline_text: Option<String>,
    /// Indentation depth of the source line.
    pub indent: usize,
    /// Original line index.
    pub line_number: usize,
    /// Ordered children, owned through the arena.
    pub children: Vec<NodeId>,
    /// Non-owning back reference, used only by the wrapper remover.
    pub parent: Option<NodeId>,
    /// Derived importance score (computed, not parsed).
    pub priority: i32,
    /// Set when this node was folded into a detected pattern.
    pub group_id: Option<usize>,
}

/// The forest of outline nodes for one compression run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutlineTree {
    nodes: Vec<ElementNode>,
    /// Ordered root nodes.
    pub roots: Vec<NodeId>,
}

impl OutlineTree {
    /// Build a tree from ordered line descriptors.
    ///
    /// Maintains a stack of open ancestors: each node pops entries whose
    /// indentation is not strictly shallower than its own, then attaches to
    /// the surviving top (or becomes a root). O(n) over all nodes.
    pub fn build(lines: Vec<ParsedLine>) -> Self {
        let mut tree = OutlineTree {
            nodes: Vec::with_capacity(lines.len()),
            roots: Vec::new(),
        };
        let mut stack: Vec<NodeId> = Vec::new();

        for line in lines {
            let priority = kind::score_priority(
                &line.kind,
                line.inline_text.as_deref(),
                line.reference_id.is_some(),
            );
            let id = NodeId(tree.nodes.len() as u32);
            tree.nodes.push(ElementNode {
                kind: line.kind,
                reference_id: line.reference_id,
                inline_text: line.inline_text,
                indent: line.indent,
                line_number: line.line_number,
                children: Vec::new(),
                parent: None,
                priority,
                group_id: None,
            });

            while let Some(&top) = stack.last() {
                if tree.nodes[top.index()].indent >= tree.nodes[id.index()].indent {
                    stack.pop();
                } else {
                    break;
                }
            }

            match stack.last() {
                Some(&parent) => {
                    tree.nodes[parent.index()].children.push(id);
                    tree.nodes[id.index()].parent = Some(parent);
                }
                None => tree.roots.push(id),
            }
            stack.push(id);
        }

        tree
    }

    /// Number of nodes ever constructed (detached nodes included).
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the tree holds no nodes at all.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Immutable access to a node.
    pub fn node(&self, id: NodeId) -> &ElementNode {
        &self.nodes[id.index()]
    }

    /// Mutable access to a node.
    pub fn node_mut(&mut self, id: NodeId) -> &mut ElementNode {
        &mut self.nodes[id.index()]
    }

    /// Ordered children of a node.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.index()].children
    }

    /// Count the nodes reachable from the roots.
    pub fn reachable_count(&self) -> usize {
        let mut count = 0;
        let mut pending: Vec<NodeId> = self.roots.clone();
        while let Some(id) = pending.pop() {
            count += 1;
            pending.extend_from_slice(self.children(id));
        }
        count
    }

    /// Collect `(line_number, reference_id)` pairs for a whole subtree, in
    /// document order.
    pub fn subtree_reference_ids(&self, id: NodeId) -> Vec<(usize, String)> {
        let mut out = Vec::new();
        self.collect_refs(id, &mut out);
        out
    }

    fn collect_refs(&self, id: NodeId, out: &mut Vec<(usize, String)>) {
        let node = self.node(id);
        if let Some(ref reference) = node.reference_id {
            out.push((node.line_number, reference.clone()));
        }
        for &child in &node.children {
            self.collect_refs(child, out);
        }
    }

    /// Maximum depth below a node (0 for a leaf).
    pub fn subtree_depth(&self, id: NodeId) -> usize {
        self.children(id)
            .iter()
            .map(|&child| 1 + self.subtree_depth(child))
            .max()
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::parse_outline;

    fn build(text: &str) -> OutlineTree {
        OutlineTree::build(parse_outline(text))
    }

    #[test]
    fn empty_input_builds_empty_forest() {
        let tree = build("");
        assert!(tree.is_empty());
        assert!(tree.roots.is_empty());
    }

    #[test]
    fn flat_siblings_become_roots() {
        let tree = build("- button \"a\"\n- button \"b\"\n- button \"c\"\n");
        assert_eq!(tree.roots.len(), 3);
        for &root in &tree.roots {
            assert!(tree.children(root).is_empty());
            assert_eq!(tree.node(root).parent, None);
        }
    }

    #[test]
    fn indentation_nests_children() {
        let tree = build("- list\n  - listitem \"a\"\n  - listitem \"b\"\n");
        assert_eq!(tree.roots.len(), 1);
        let list = tree.roots[0];
        assert_eq!(tree.children(list).len(), 2);
        for &child in tree.children(list) {
            assert_eq!(tree.node(child).parent, Some(list));
            assert!(tree.node(child).indent > tree.node(list).indent);
        }
    }

    #[test]
    fn dedent_pops_back_to_ancestor() {
        let text = "- list\n  - listitem \"a\"\n    - link \"x\"\n  - listitem \"b\"\n- button \"z\"\n";
        let tree = build(text);
        assert_eq!(tree.roots.len(), 2);
        let list = tree.roots[0];
        assert_eq!(tree.children(list).len(), 2);
        let first_item = tree.children(list)[0];
        assert_eq!(tree.children(first_item).len(), 1);
        let second_item = tree.children(list)[1];
        assert!(tree.children(second_item).is_empty());
    }

    #[test]
    fn equal_indent_never_nests() {
        let tree = build("- generic\n- generic\n");
        assert_eq!(tree.roots.len(), 2);
    }

    #[test]
    fn mixed_sibling_indents_share_parent() {
        // The 4-indent node opens first, then the 2-indent node pops back
        // to the root; both are direct children of the root.
        let tree = build("- generic\n    - button \"a\"\n  - button \"b\"\n");
        let root = tree.roots[0];
        assert_eq!(tree.children(root).len(), 2);
        let indents: Vec<usize> = tree
            .children(root)
            .iter()
            .map(|&c| tree.node(c).indent)
            .collect();
        assert_eq!(indents, vec![4, 2]);
    }

    #[test]
    fn subtree_reference_ids_in_document_order() {
        let text = "- list [ref=e1]\n  - listitem [ref=e2]\n    - link [ref=e3]\n  - listitem [ref=e4]\n";
        let tree = build(text);
        let refs: Vec<String> = tree
            .subtree_reference_ids(tree.roots[0])
            .into_iter()
            .map(|(_, id)| id)
            .collect();
        assert_eq!(refs, vec!["e1", "e2", "e3", "e4"]);
    }

    #[test]
    fn subtree_depth() {
        let tree = build("- list\n  - listitem\n    - link\n");
        assert_eq!(tree.subtree_depth(tree.roots[0]), 2);
        let item = tree.children(tree.roots[0])[0];
        assert_eq!(tree.subtree_depth(item), 1);
        let link = tree.children(item)[0];
        assert_eq!(tree.subtree_depth(link), 0);
    }

    #[test]
    fn priority_computed_at_build() {
        let tree = build("- button \"Go\" [ref=e1]\n- generic\n");
        assert!(tree.node(tree.roots[0]).priority > tree.node(tree.roots[1]).priority);
    }
}
