//! List pattern detection: find foldable runs of similar siblings.
//!
//! Two passes over each sibling list:
//!
//! 1. **Semantic** — maximal consecutive runs of declared `listitem`
//!    nodes. A qualifying run is further examined with the structural
//!    fingerprint to pick the best mutually-similar sub-run as the
//!    representative pattern (flanking segments are re-scanned); when no
//!    sub-run qualifies, role agreement alone is enough and the whole run
//!    folds.
//! 2. **Structural** — the remaining siblings, grouped by indentation,
//!    searched with a sliding window: the window start's fingerprint is
//!    the base, the run greedily extends while the next node stays within
//!    the similarity threshold, the longest qualifying run is taken, its
//!    members removed, and the flanks re-scanned.
//!
//! Patterns never overlap and are reported in start order.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::fingerprint::SignatureCache;
use crate::kind::ElementKind;
use crate::tree::{NodeId, OutlineTree};

/// What evidence a pattern rests on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PatternKind {
    /// Members share the declared `listitem` role.
    Semantic,
    /// Members were matched by fingerprint similarity alone.
    Structural,
}

/// A detected run of similar siblings, the unit of folding.
#[derive(Debug, Clone)]
pub struct ListPattern {
    /// Evidence class.
    pub kind: PatternKind,
    /// Identifier linking the member nodes of this pattern.
    pub group_id: usize,
    /// Position of the first member within the sibling sequence.
    pub start: usize,
    /// One past the position of the last member.
    pub end: usize,
    /// Matched nodes in original order; always `>= min_group` long.
    pub items: Vec<NodeId>,
    /// The members' own reference ids, in original order.
    pub reference_ids: Vec<String>,
}

impl ListPattern {
    /// The first item, retained verbatim in output.
    pub fn sample(&self) -> NodeId {
        self.items[0]
    }

    /// Number of matched items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Always false: a pattern holds at least `min_group` items.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Detect patterns in every sibling list of the tree.
///
/// Returns patterns keyed by parent (`None` for the root list), ordered by
/// start position within each list. Group ids are assigned in pre-order
/// traversal order, so identical input always yields identical ids.
pub fn detect_all(
    tree: &OutlineTree,
    min_group: usize,
) -> BTreeMap<Option<NodeId>, Vec<ListPattern>> {
    let mut cache = SignatureCache::for_tree(tree);
    let mut patterns = BTreeMap::new();
    let mut next_group = 0usize;
    walk(
        tree,
        &mut cache,
        None,
        &tree.roots,
        min_group,
        &mut next_group,
        &mut patterns,
    );
    patterns
}

fn walk(
    tree: &OutlineTree,
    cache: &mut SignatureCache,
    parent: Option<NodeId>,
    siblings: &[NodeId],
    min_group: usize,
    next_group: &mut usize,
    out: &mut BTreeMap<Option<NodeId>, Vec<ListPattern>>,
) {
    let found = detect_siblings(tree, cache, siblings, min_group, next_group);
    if !found.is_empty() {
        out.insert(parent, found);
    }
    for &child in siblings {
        walk(
            tree,
            cache,
            Some(child),
            tree.children(child),
            min_group,
            next_group,
            out,
        );
    }
}

/// Copy each pattern's group id onto its member nodes.
pub fn annotate_groups(
    tree: &mut OutlineTree,
    patterns: &BTreeMap<Option<NodeId>, Vec<ListPattern>>,
) {
    for list in patterns.values() {
        for pattern in list {
            for &item in &pattern.items {
                tree.node_mut(item).group_id = Some(pattern.group_id);
            }
        }
    }
}

/// Detect patterns within one sibling list.
pub fn detect_siblings(
    tree: &OutlineTree,
    cache: &mut SignatureCache,
    siblings: &[NodeId],
    min_group: usize,
    next_group: &mut usize,
) -> Vec<ListPattern> {
    if siblings.len() < min_group {
        return Vec::new();
    }

    let mut patterns = Vec::new();
    let mut covered = vec![false; siblings.len()];

    // Semantic pass: maximal consecutive listitem runs.
    let mut position = 0;
    while position < siblings.len() {
        if tree.node(siblings[position]).kind != ElementKind::ListItem {
            position += 1;
            continue;
        }
        let run_start = position;
        while position < siblings.len()
            && tree.node(siblings[position]).kind == ElementKind::ListItem
        {
            position += 1;
        }
        if position - run_start >= min_group {
            semantic_runs(
                tree,
                cache,
                siblings,
                run_start,
                position,
                min_group,
                next_group,
                &mut patterns,
            );
        }
    }
    for pattern in &patterns {
        for index in pattern.start..pattern.end {
            covered[index] = true;
        }
    }

    // Structural pass over the uncovered remainder, segment by segment,
    // grouped by indentation within each segment.
    let mut segment_start = 0;
    while segment_start < siblings.len() {
        if covered[segment_start] {
            segment_start += 1;
            continue;
        }
        let mut segment_end = segment_start;
        while segment_end < siblings.len() && !covered[segment_end] {
            segment_end += 1;
        }

        let mut by_indent: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
        for index in segment_start..segment_end {
            let indent = tree.node(siblings[index]).indent;
            by_indent.entry(indent).or_default().push(index);
        }
        for positions in by_indent.values() {
            structural_runs(tree, cache, siblings, positions, min_group, next_group, &mut patterns);
        }

        segment_start = segment_end;
    }

    patterns.sort_by_key(|pattern| pattern.start);
    patterns
}

/// Fold a consecutive `listitem` run `[start, end)`, preferring the
/// longest mutually-similar sub-run and re-scanning the flanks.
#[allow(clippy::too_many_arguments)]
fn semantic_runs(
    tree: &OutlineTree,
    cache: &mut SignatureCache,
    siblings: &[NodeId],
    start: usize,
    end: usize,
    min_group: usize,
    next_group: &mut usize,
    out: &mut Vec<ListPattern>,
) {
    if end - start < min_group {
        return;
    }

    let (best_start, best_len) = longest_similar_run(tree, cache, siblings, start, end);
    if best_len >= min_group && best_len < end - start {
        semantic_runs(tree, cache, siblings, start, best_start, min_group, next_group, out);
        out.push(make_pattern(
            tree,
            siblings,
            PatternKind::Semantic,
            best_start,
            best_start + best_len,
            next_group,
        ));
        semantic_runs(
            tree,
            cache,
            siblings,
            best_start + best_len,
            end,
            min_group,
            next_group,
            out,
        );
    } else {
        // Either the whole run is mutually similar or nothing qualifying
        // is: role agreement alone carries it.
        out.push(make_pattern(
            tree,
            siblings,
            PatternKind::Semantic,
            start,
            end,
            next_group,
        ));
    }
}

/// Longest run in `[start, end)` whose members are all within the
/// similarity threshold of the run's first element. First longest wins.
fn longest_similar_run(
    tree: &OutlineTree,
    cache: &mut SignatureCache,
    siblings: &[NodeId],
    start: usize,
    end: usize,
) -> (usize, usize) {
    let mut best_start = start;
    let mut best_len = 0;
    for window_start in start..end {
        let base = cache.get(tree, siblings[window_start]);
        let mut cursor = window_start + 1;
        while cursor < end && base.similar(cache.get(tree, siblings[cursor])) {
            cursor += 1;
        }
        let len = cursor - window_start;
        if len > best_len {
            best_start = window_start;
            best_len = len;
        }
    }
    (best_start, best_len)
}

/// Sliding-window search over one indentation group of uncovered
/// positions. The longest qualifying run folds; the flanks re-scan.
fn structural_runs(
    tree: &OutlineTree,
    cache: &mut SignatureCache,
    siblings: &[NodeId],
    positions: &[usize],
    min_group: usize,
    next_group: &mut usize,
    out: &mut Vec<ListPattern>,
) {
    if positions.len() < min_group {
        return;
    }

    let mut best_offset = 0;
    let mut best_len = 0;
    for offset in 0..positions.len() {
        let base = cache.get(tree, siblings[positions[offset]]);
        let mut cursor = offset + 1;
        while cursor < positions.len()
            && base.similar(cache.get(tree, siblings[positions[cursor]]))
        {
            cursor += 1;
        }
        let len = cursor - offset;
        if len > best_len {
            best_offset = offset;
            best_len = len;
        }
    }

    if best_len < min_group {
        return;
    }

    structural_runs(
        tree,
        cache,
        siblings,
        &positions[..best_offset],
        min_group,
        next_group,
        out,
    );
    let matched = &positions[best_offset..best_offset + best_len];
    out.push(make_pattern_from_positions(
        tree,
        siblings,
        PatternKind::Structural,
        matched,
        next_group,
    ));
    structural_runs(
        tree,
        cache,
        siblings,
        &positions[best_offset + best_len..],
        min_group,
        next_group,
        out,
    );
}

fn make_pattern(
    tree: &OutlineTree,
    siblings: &[NodeId],
    kind: PatternKind,
    start: usize,
    end: usize,
    next_group: &mut usize,
) -> ListPattern {
    let positions: Vec<usize> = (start..end).collect();
    make_pattern_from_positions(tree, siblings, kind, &positions, next_group)
}

fn make_pattern_from_positions(
    tree: &OutlineTree,
    siblings: &[NodeId],
    kind: PatternKind,
    positions: &[usize],
    next_group: &mut usize,
) -> ListPattern {
    let items: Vec<NodeId> = positions.iter().map(|&index| siblings[index]).collect();
    let reference_ids = items
        .iter()
        .filter_map(|&item| tree.node(item).reference_id.clone())
        .collect();
    let group_id = *next_group;
    *next_group += 1;
    ListPattern {
        kind,
        group_id,
        start: positions[0],
        end: positions[positions.len() - 1] + 1,
        items,
        reference_ids,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::parse_outline;

    fn detect(text: &str) -> (OutlineTree, BTreeMap<Option<NodeId>, Vec<ListPattern>>) {
        let tree = OutlineTree::build(parse_outline(text));
        let patterns = detect_all(&tree, 3);
        (tree, patterns)
    }

    fn uniform_items(count: usize) -> String {
        let mut text = String::from("- list\n");
        for index in 0..count {
            text.push_str(&format!(
                "  - listitem [ref=e{index}]\n    - link \"Item {index}\" [ref=e{index}a]\n"
            ));
        }
        text
    }

    #[test]
    fn uniform_listitem_run_is_one_semantic_pattern() {
        let (tree, patterns) = detect(&uniform_items(48));
        let list = tree.roots[0];
        let found = &patterns[&Some(list)];
        assert_eq!(found.len(), 1);
        let pattern = &found[0];
        assert_eq!(pattern.kind, PatternKind::Semantic);
        assert_eq!(pattern.len(), 48);
        assert_eq!(pattern.start, 0);
        assert_eq!(pattern.end, 48);
        assert_eq!(pattern.sample(), tree.children(list)[0]);
        assert_eq!(pattern.reference_ids.len(), 48);
        assert_eq!(pattern.reference_ids[0], "e0");
    }

    #[test]
    fn short_runs_are_not_patterns() {
        let (_, patterns) = detect(&uniform_items(2));
        assert!(patterns.is_empty());
    }

    #[test]
    fn min_group_is_respected() {
        let tree = OutlineTree::build(parse_outline(&uniform_items(4)));
        assert!(detect_all(&tree, 5).is_empty());
        assert_eq!(detect_all(&tree, 4).len(), 1);
    }

    #[test]
    fn mixed_listitem_run_splits_into_structural_subruns() {
        // Five link-shaped items, then five with a different skeleton.
        let mut text = String::from("- list\n");
        for index in 0..5 {
            text.push_str(&format!(
                "  - listitem [ref=a{index}]\n    - link \"x\"\n"
            ));
        }
        for index in 0..5 {
            text.push_str(&format!(
                "  - listitem [ref=b{index}]\n    - button \"1\"\n    - button \"2\"\n    - img\n"
            ));
        }
        let (tree, patterns) = detect(&text);
        let found = &patterns[&Some(tree.roots[0])];
        assert_eq!(found.len(), 2);
        assert!(found.iter().all(|p| p.kind == PatternKind::Semantic));
        assert_eq!(found[0].len(), 5);
        assert_eq!(found[1].len(), 5);
        assert!(found[0].end <= found[1].start);
    }

    #[test]
    fn dissimilar_short_listitem_run_still_folds_by_role() {
        // Three listitems with three different skeletons: no similar
        // sub-run exists, but the role run still folds.
        let text = "- list\n  - listitem [ref=a]\n    - link \"x\"\n  - listitem [ref=b]\n    - button \"1\"\n    - button \"2\"\n    - img\n  - listitem [ref=c]\n    - table\n      - row\n      - row\n      - row\n      - row\n";
        let (tree, patterns) = detect(text);
        let found = &patterns[&Some(tree.roots[0])];
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].kind, PatternKind::Semantic);
        assert_eq!(found[0].len(), 3);
    }

    #[test]
    fn repeated_rows_found_structurally() {
        let mut text = String::from("- table\n  - heading \"Report\"\n");
        for index in 0..4 {
            text.push_str(&format!(
                "  - row [ref=r{index}]\n    - cell \"a\"\n    - cell \"b\"\n"
            ));
        }
        text.push_str("  - button \"Export\"\n");
        let (tree, patterns) = detect(&text);
        let found = &patterns[&Some(tree.roots[0])];
        assert_eq!(found.len(), 1);
        let pattern = &found[0];
        assert_eq!(pattern.kind, PatternKind::Structural);
        assert_eq!(pattern.len(), 4);
        // Heading and button stay out of the run.
        assert_eq!(pattern.start, 1);
        assert_eq!(pattern.end, 5);
    }

    #[test]
    fn structural_runs_never_cross_indentation_groups() {
        // Six identically-shaped rows, but two indentation groups.
        let text = "- generic \"wrap\"\n    - row \"a\"\n    - row \"b\"\n    - row \"c\"\n  - row \"d\"\n  - row \"e\"\n  - row \"f\"\n";
        let (tree, patterns) = detect(text);
        let found = &patterns[&Some(tree.roots[0])];
        assert_eq!(found.len(), 2);
        assert!(found.iter().all(|p| p.len() == 3));
    }

    #[test]
    fn semantic_members_excluded_from_structural_pass() {
        let (_, patterns) = detect(&uniform_items(6));
        let all: Vec<&ListPattern> = patterns.values().flatten().collect();
        assert_eq!(all.len(), 1);
    }

    #[test]
    fn group_ids_are_unique_and_annotated() {
        let mut text = uniform_items(5);
        text.push_str("- table\n");
        for index in 0..3 {
            text.push_str(&format!("  - row [ref=r{index}]\n    - cell \"x\"\n"));
        }
        let mut tree = OutlineTree::build(parse_outline(&text));
        let patterns = detect_all(&tree, 3);
        let mut ids: Vec<usize> = patterns
            .values()
            .flatten()
            .map(|pattern| pattern.group_id)
            .collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), 2);

        annotate_groups(&mut tree, &patterns);
        for list in patterns.values() {
            for pattern in list {
                for &item in &pattern.items {
                    assert_eq!(tree.node(item).group_id, Some(pattern.group_id));
                }
            }
        }
    }

    #[test]
    fn nested_sibling_lists_inspected_independently() {
        // Items inside each listitem form their own foldable run.
        let mut text = String::from("- list\n");
        for outer in 0..3 {
            text.push_str(&format!("  - listitem [ref=o{outer}]\n"));
            for inner in 0..4 {
                text.push_str(&format!(
                    "    - link \"{outer}-{inner}\" [ref=i{outer}x{inner}]\n"
                ));
            }
        }
        let (tree, patterns) = detect(&text);
        // One semantic pattern at the list level...
        assert!(patterns.contains_key(&Some(tree.roots[0])));
        // ...and one structural pattern inside each listitem.
        let items = tree.children(tree.roots[0]).to_vec();
        for item in items {
            let inner = &patterns[&Some(item)];
            assert_eq!(inner.len(), 1);
            assert_eq!(inner[0].kind, PatternKind::Structural);
            assert_eq!(inner[0].len(), 4);
        }
    }
}
