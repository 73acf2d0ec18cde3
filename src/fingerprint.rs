//! Structural fingerprints: fixed-width similarity signatures per node.
//!
//! Each node gets a 32-bit signature bundled from weighted string
//! features — a skeleton of its role and its children's roles, a shape
//! of child counts, a census of important descendant roles, an
//! interactivity marker, and a depth marker. Every feature is hashed and
//! votes `±weight` on each bit position; a bit of the final signature is
//! 1 where the accumulated vote is positive. Two nodes are similar when
//! their signatures differ in at most [`SIMILARITY_THRESHOLD`] bits.
//!
//! Heavier weight goes to skeleton and shape than to depth, so two list
//! rows with the same child structure but different text land within the
//! threshold while a row and a toolbar do not.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use crate::kind::ElementKind;
use crate::tree::{NodeId, OutlineTree};

/// Width of a signature in bits.
pub const SIGNATURE_BITS: u32 = 32;

/// Maximum Hamming distance at which two signatures count as similar.
pub const SIMILARITY_THRESHOLD: u32 = 3;

/// How many children (and grandchildren) the skeleton and shape features
/// look at.
const STRUCTURE_WINDOW: usize = 3;

/// A fixed-width structural similarity signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Signature(u32);

impl Signature {
    /// The raw bit pattern.
    pub fn raw(self) -> u32 {
        self.0
    }

    /// Count of differing bits between two signatures.
    pub fn hamming(self, other: Signature) -> u32 {
        (self.0 ^ other.0).count_ones()
    }

    /// Whether two signatures are within the similarity threshold.
    ///
    /// Symmetric and reflexive: `a.similar(b) == b.similar(a)` and
    /// `a.similar(a)` always holds.
    pub fn similar(self, other: Signature) -> bool {
        self.hamming(other) <= SIMILARITY_THRESHOLD
    }
}

/// Compute the signature of one node.
///
/// Prefer [`SignatureCache::get`] inside loops; the tree is immutable
/// once fingerprinting starts, so signatures never need recomputing.
pub fn signature_of(tree: &OutlineTree, id: NodeId) -> Signature {
    let mut votes = [0i32; SIGNATURE_BITS as usize];
    for (feature, weight) in node_features(tree, id) {
        let bits = hash_feature(&feature);
        for (position, vote) in votes.iter_mut().enumerate() {
            if (bits >> position) & 1 == 1 {
                *vote += weight;
            } else {
                *vote -= weight;
            }
        }
    }

    let mut signature = 0u32;
    for (position, &vote) in votes.iter().enumerate() {
        // Tie → break with bit position parity.
        if vote > 0 || (vote == 0 && position % 2 == 0) {
            signature |= 1 << position;
        }
    }
    Signature(signature)
}

/// The ordered, weighted feature strings of a node.
fn node_features(tree: &OutlineTree, id: NodeId) -> Vec<(String, i32)> {
    let node = tree.node(id);
    let mut features = Vec::with_capacity(5);

    // (a) Skeleton: own role plus the roles of the first few children and
    // grandchildren.
    let mut skeleton = format!("skel:{}", node.kind);
    for &child in node.children.iter().take(STRUCTURE_WINDOW) {
        skeleton.push('/');
        skeleton.push_str(tree.node(child).kind.as_str());
    }
    let mut grandchildren = 0;
    'outer: for &child in node.children.iter().take(STRUCTURE_WINDOW) {
        for &grandchild in tree.children(child) {
            skeleton.push_str("//");
            skeleton.push_str(tree.node(grandchild).kind.as_str());
            grandchildren += 1;
            if grandchildren == STRUCTURE_WINDOW {
                break 'outer;
            }
        }
    }
    features.push((skeleton, 3));

    // (b) Shape: child count plus the child counts of the first few
    // children.
    let mut shape = format!("shape:{}", node.children.len());
    for &child in node.children.iter().take(STRUCTURE_WINDOW) {
        shape.push(':');
        shape.push_str(&tree.children(child).len().to_string());
    }
    features.push((shape, 3));

    // (c) Census of important roles within a shallow window.
    features.push((census_feature(tree, id), 2));

    // (d) Interactivity marker.
    if is_shallowly_interactive(tree, id) {
        features.push(("interactive".to_string(), 2));
    }

    // (e) Depth marker.
    features.push((format!("depth:{}", tree.subtree_depth(id)), 1));

    features
}

/// Count buttons, links, text, images, inputs, and list items among the
/// node and its descendants down to two levels.
fn census_feature(tree: &OutlineTree, id: NodeId) -> String {
    let mut buttons = 0usize;
    let mut links = 0usize;
    let mut text = 0usize;
    let mut images = 0usize;
    let mut inputs = 0usize;
    let mut items = 0usize;

    let mut tally = |kind: &ElementKind| match kind {
        ElementKind::Button => buttons += 1,
        ElementKind::Link => links += 1,
        ElementKind::Text | ElementKind::Heading | ElementKind::Paragraph => text += 1,
        ElementKind::Image => images += 1,
        ElementKind::Textbox
        | ElementKind::Checkbox
        | ElementKind::Radio
        | ElementKind::Combobox
        | ElementKind::Option => inputs += 1,
        ElementKind::ListItem => items += 1,
        _ => {}
    };

    tally(&tree.node(id).kind);
    for &child in tree.children(id) {
        tally(&tree.node(child).kind);
        for &grandchild in tree.children(child) {
            tally(&tree.node(grandchild).kind);
        }
    }

    format!("census:b{buttons}:l{links}:t{text}:i{images}:f{inputs}:li{items}")
}

/// Whether the node or a child within one level is interactive.
fn is_shallowly_interactive(tree: &OutlineTree, id: NodeId) -> bool {
    if tree.node(id).kind.is_interactive() {
        return true;
    }
    tree.children(id)
        .iter()
        .any(|&child| tree.node(child).kind.is_interactive())
}

/// Hash one feature string down to 32 bits.
fn hash_feature(feature: &str) -> u32 {
    let mut hasher = DefaultHasher::new();
    feature.hash(&mut hasher);
    hasher.finish() as u32
}

/// Per-run signature cache, indexed by [`NodeId`].
///
/// Scoped to one invocation so concurrent compressions never share state
/// and the cache never outgrows its tree.
#[derive(Debug)]
pub struct SignatureCache {
    signatures: Vec<Option<Signature>>,
}

impl SignatureCache {
    /// Create an empty cache sized for the given tree.
    pub fn for_tree(tree: &OutlineTree) -> Self {
        Self {
            signatures: vec![None; tree.len()],
        }
    }

    /// The signature of `id`, computing and caching it on first use.
    pub fn get(&mut self, tree: &OutlineTree, id: NodeId) -> Signature {
        if let Some(signature) = self.signatures[id.index()] {
            return signature;
        }
        let signature = signature_of(tree, id);
        self.signatures[id.index()] = Some(signature);
        signature
    }
}
