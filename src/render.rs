//! Outline rendering: fold patterns, truncate text, respect the budget.
//!
//! A single depth-first walk over the cleaned tree. Detected patterns
//! render as their sample node (with a few children as a structural
//! sample) followed by one fold line; everything else renders one line
//! per element, indentation preserved. The line budget is advisory — a
//! structure that has begun always completes, and the header reports the
//! line count actually achieved.
//!
//! Reference ids are never lost: every id the rendered text does not show
//! inline is carried by a [`FoldSummary`], so the structured result is
//! lossless even though the text is not.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::detect::ListPattern;
use crate::error::RenderError;
use crate::tree::{NodeId, OutlineTree};

/// Character cap for rendered inline text.
pub const TEXT_CAP: usize = 50;

/// Ellipsis marker appended to truncated text and id lists.
pub const ELLIPSIS: &str = "...";

/// How many of a sample's children render as its structural sample.
pub const SAMPLE_CHILD_LIMIT: usize = 3;

/// How many reference ids a fold line shows before eliding.
pub const FOLD_REF_PREVIEW: usize = 5;

/// One fold in the rendered outline, with its complete hidden-id list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FoldSummary {
    /// Group id linking this fold to its member nodes.
    pub group_id: usize,
    /// Role token of the folded elements.
    pub kind: String,
    /// Total matched items, sample included.
    pub items: usize,
    /// First and last original line numbers covered by the fold.
    pub first_line: usize,
    /// Last original line number covered by the fold.
    pub last_line: usize,
    /// Every reference id the fold hides from the rendered text, in
    /// document order.
    pub reference_ids: Vec<String>,
}

/// The result of one compression run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompressedOutline {
    /// Header plus rendered body.
    pub text: String,
    /// Body lines actually emitted.
    pub rendered_lines: usize,
    /// Input lines that parsed into nodes.
    pub original_lines: usize,
    /// Folds in emission order, each carrying its hidden reference ids.
    pub folds: Vec<FoldSummary>,
}

impl CompressedOutline {
    /// All reference ids recoverable from this result: ids inline in the
    /// rendered text plus ids inside fold summaries.
    pub fn reference_ids(&self) -> Vec<String> {
        let mut ids = Vec::new();
        for line in self.text.lines() {
            if let Some(open) = line.rfind("[ref=") {
                if let Some(close) = line[open..].find(']') {
                    ids.push(line[open + "[ref=".len()..open + close].to_string());
                }
            }
        }
        for fold in &self.folds {
            ids.extend(fold.reference_ids.iter().cloned());
        }
        ids
    }

    /// Fraction of original lines saved by compression.
    pub fn compression_ratio(&self) -> f64 {
        if self.original_lines == 0 {
            return 0.0;
        }
        1.0 - self.rendered_lines as f64 / self.original_lines as f64
    }
}

/// Render the tree into a compressed outline document.
///
/// `max_lines` must be positive; `original_lines` is the parsed input
/// line count reported in the header.
pub fn render(
    tree: &OutlineTree,
    patterns: &BTreeMap<Option<NodeId>, Vec<ListPattern>>,
    max_lines: usize,
    original_lines: usize,
) -> Result<CompressedOutline, RenderError> {
    if max_lines == 0 {
        return Err(RenderError::InvalidBudget { requested: 0 });
    }

    let mut state = RenderState {
        tree,
        patterns,
        budget: max_lines as isize,
        lines: Vec::new(),
        folds: Vec::new(),
        next_synthetic_group: patterns.values().map(Vec::len).sum(),
    };
    state.render_roots();

    let rendered_lines = state.lines.len();
    let mut text = format!("Page Outline ({rendered_lines}/{original_lines} lines):\n");
    for line in &state.lines {
        text.push_str(line);
        text.push('\n');
    }

    Ok(CompressedOutline {
        text,
        rendered_lines,
        original_lines,
        folds: state.folds,
    })
}

struct RenderState<'a> {
    tree: &'a OutlineTree,
    patterns: &'a BTreeMap<Option<NodeId>, Vec<ListPattern>>,
    budget: isize,
    lines: Vec<String>,
    folds: Vec<FoldSummary>,
    next_synthetic_group: usize,
}

impl RenderState<'_> {
    /// Render the root list, stopping before a new root once the budget
    /// is spent. Whatever is cut off is preserved as one summary line
    /// plus a fold summary carrying every cut reference id.
    fn render_roots(&mut self) {
        let roots = self.tree.roots.clone();
        let memberships = self.pattern_memberships(None);
        let mut emitted = vec![false; memberships.pattern_count];

        for (position, &root) in roots.iter().enumerate() {
            if self.budget <= 0 && position > 0 {
                self.truncate_roots(&roots[position..], &memberships, &emitted);
                return;
            }
            self.render_position(None, root, &memberships, &mut emitted);
        }
    }

    /// Render one sibling list in order, folding pattern members.
    fn render_siblings(&mut self, parent: NodeId) {
        let children = self.tree.children(parent).to_vec();
        let memberships = self.pattern_memberships(Some(parent));
        let mut emitted = vec![false; memberships.pattern_count];
        for &child in &children {
            self.render_position(Some(parent), child, &memberships, &mut emitted);
        }
    }

    fn render_position(
        &mut self,
        parent: Option<NodeId>,
        id: NodeId,
        memberships: &Memberships,
        emitted: &mut [bool],
    ) {
        match memberships.by_node.get(&id) {
            Some(&pattern_index) => {
                if !emitted[pattern_index] {
                    emitted[pattern_index] = true;
                    let pattern = &self.patterns[&parent][pattern_index];
                    self.render_pattern(pattern);
                }
                // Non-sample members were folded; nothing to emit here.
            }
            None => self.render_node(id),
        }
    }

    /// One line for the node, then its children.
    fn render_node(&mut self, id: NodeId) {
        self.emit(node_line(self.tree, id));
        self.render_siblings(id);
    }

    /// The sample in full (capped structural sample of children), then
    /// the fold line, then the bookkeeping summary.
    fn render_pattern(&mut self, pattern: &ListPattern) {
        let sample = pattern.sample();
        self.emit(node_line(self.tree, sample));

        let children = self.tree.children(sample).to_vec();
        let mut hidden: Vec<(usize, String)> = Vec::new();

        if children.len() <= SAMPLE_CHILD_LIMIT {
            self.render_siblings(sample);
        } else {
            // Keep the highest-priority children, in document order.
            let mut ranked: Vec<usize> = (0..children.len()).collect();
            ranked.sort_by_key(|&index| {
                (std::cmp::Reverse(self.tree.node(children[index]).priority), index)
            });
            let mut keep: Vec<usize> = ranked.into_iter().take(SAMPLE_CHILD_LIMIT).collect();
            keep.sort_unstable();
            for (index, &child) in children.iter().enumerate() {
                if keep.contains(&index) {
                    self.render_node(child);
                } else {
                    hidden.extend(self.tree.subtree_reference_ids(child));
                }
            }
        }

        for &member in &pattern.items[1..] {
            hidden.extend(self.tree.subtree_reference_ids(member));
        }
        hidden.sort_by_key(|&(line, _)| line);
        let hidden_ids: Vec<String> = hidden.into_iter().map(|(_, id)| id).collect();

        let sample_node = self.tree.node(sample);
        self.emit(fold_line(
            sample_node.indent,
            sample_node.kind.as_str(),
            pattern.len() - 1,
            &hidden_ids,
        ));

        let first_line = sample_node.line_number;
        let last_line = pattern
            .items
            .iter()
            .map(|&item| self.tree.node(item).line_number)
            .max()
            .unwrap_or(sample_node.line_number);
        self.folds.push(FoldSummary {
            group_id: pattern.group_id,
            kind: sample_node.kind.as_str().to_string(),
            items: pattern.len(),
            first_line,
            last_line,
            reference_ids: hidden_ids,
        });
    }

    /// Summarize the top-level content the budget cut off.
    ///
    /// Members of a pattern whose fold line already went out are skipped;
    /// their ids are in that fold's summary and must not appear twice.
    fn truncate_roots(&mut self, remaining: &[NodeId], memberships: &Memberships, emitted: &[bool]) {
        let mut hidden: Vec<(usize, String)> = Vec::new();
        let mut elements = 0usize;
        for &root in remaining {
            if let Some(&pattern_index) = memberships.by_node.get(&root) {
                if emitted[pattern_index] {
                    continue;
                }
            }
            hidden.extend(self.tree.subtree_reference_ids(root));
            elements += count_subtree(self.tree, root);
        }
        if elements == 0 {
            return;
        }
        hidden.sort_by_key(|&(line, _)| line);
        let hidden_ids: Vec<String> = hidden.into_iter().map(|(_, id)| id).collect();

        let first_line = remaining
            .first()
            .map(|&root| self.tree.node(root).line_number)
            .unwrap_or(0);
        self.emit(format!(
            "- truncated (... and {elements} more elements) {}",
            refs_suffix(&hidden_ids)
        ));
        let group_id = self.next_synthetic_group;
        self.next_synthetic_group += 1;
        self.folds.push(FoldSummary {
            group_id,
            kind: "truncated".to_string(),
            items: elements,
            first_line,
            last_line: remaining
                .last()
                .map(|&root| self.tree.node(root).line_number)
                .unwrap_or(first_line),
            reference_ids: hidden_ids,
        });
    }

    fn pattern_memberships(&self, parent: Option<NodeId>) -> Memberships {
        let mut by_node = HashMap::new();
        let mut pattern_count = 0;
        if let Some(list) = self.patterns.get(&parent) {
            pattern_count = list.len();
            for (pattern_index, pattern) in list.iter().enumerate() {
                for &item in &pattern.items {
                    by_node.insert(item, pattern_index);
                }
            }
        }
        Memberships {
            by_node,
            pattern_count,
        }
    }

    fn emit(&mut self, line: String) {
        self.lines.push(line);
        self.budget -= 1;
    }
}

struct Memberships {
    by_node: HashMap<NodeId, usize>,
    pattern_count: usize,
}

/// Format one element line, truncating its text.
fn node_line(tree: &OutlineTree, id: NodeId) -> String {
    let node = tree.node(id);
    let mut line = format!("{}- {}", " ".repeat(node.indent), node.kind);
    if let Some(ref text) = node.inline_text {
        line.push_str(&format!(" \"{}\"", truncate_text(text)));
    }
    if let Some(ref reference) = node.reference_id {
        line.push_str(&format!(" [ref={reference}]"));
    }
    line
}

/// Format a fold marker line.
fn fold_line(indent: usize, kind: &str, more: usize, hidden_ids: &[String]) -> String {
    format!(
        "{}- {kind} (... and {more} more similar) {}",
        " ".repeat(indent),
        refs_suffix(hidden_ids)
    )
    .trim_end()
    .to_string()
}

/// `[refs: a, b, c, ...]` with at most [`FOLD_REF_PREVIEW`] ids shown.
fn refs_suffix(hidden_ids: &[String]) -> String {
    if hidden_ids.is_empty() {
        return String::new();
    }
    let preview: Vec<&str> = hidden_ids
        .iter()
        .take(FOLD_REF_PREVIEW)
        .map(String::as_str)
        .collect();
    let ellipsis = if hidden_ids.len() > FOLD_REF_PREVIEW {
        format!(", {ELLIPSIS}")
    } else {
        String::new()
    };
    format!("[refs: {}{ellipsis}]", preview.join(", "))
}

/// Truncate to [`TEXT_CAP`] characters, appending the ellipsis marker.
/// Cosmetic only; never touches reference ids.
fn truncate_text(text: &str) -> String {
    if text.chars().count() <= TEXT_CAP {
        return text.to_string();
    }
    let mut truncated: String = text.chars().take(TEXT_CAP).collect();
    truncated.push_str(ELLIPSIS);
    truncated
}

/// Nodes in a subtree, the root included.
fn count_subtree(tree: &OutlineTree, id: NodeId) -> usize {
    1 + tree
        .children(id)
        .iter()
        .map(|&child| count_subtree(tree, child))
        .sum::<usize>()
}
