//! Compressor facade: the public entry point for the pagefold pipeline.
//!
//! A [`Compressor`] owns a validated configuration and runs the whole
//! pipeline — parse, build, prune, detect, render — on one outline
//! document at a time. Invocations are independent and share no state,
//! so a host may run any number of them in parallel.

use serde::{Deserialize, Serialize};

use crate::detect;
use crate::error::{ConfigError, FoldResult};
use crate::parse;
use crate::prune;
use crate::render::{self, CompressedOutline};
use crate::tree::OutlineTree;

/// Tunables threaded through a compression run.
///
/// These two numbers are the engine's entire configuration surface; there
/// is no configuration file and no persisted state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompressConfig {
    /// Advisory cap on rendered body lines (default: 200).
    pub max_lines: usize,
    /// Minimum run length considered a list (default: 3).
    pub min_group: usize,
}

impl Default for CompressConfig {
    fn default() -> Self {
        Self {
            max_lines: 200,
            min_group: 3,
        }
    }
}

/// Summary numbers for one compression run, for tooling and the CLI.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompressStats {
    /// Input lines that parsed into nodes.
    pub original_lines: usize,
    /// Body lines actually rendered.
    pub rendered_lines: usize,
    /// Nodes surviving wrapper removal.
    pub retained_nodes: usize,
    /// Empty generic nodes deleted.
    pub wrappers_removed: usize,
    /// Single-child generic nodes collapsed.
    pub wrappers_collapsed: usize,
    /// Detected list patterns.
    pub patterns: usize,
    /// Elements hidden behind fold markers.
    pub folded_elements: usize,
    /// Fraction of original lines saved.
    pub compression_ratio: f64,
}

/// The outline compression engine.
pub struct Compressor {
    config: CompressConfig,
}

impl Compressor {
    /// Create a compressor, validating the configuration.
    ///
    /// Fails fast on structural impossibilities: a zero line budget or a
    /// group minimum below 2.
    pub fn new(config: CompressConfig) -> FoldResult<Self> {
        if config.max_lines == 0 {
            return Err(ConfigError::LineBudgetZero.into());
        }
        if config.min_group < 2 {
            return Err(ConfigError::GroupSizeTooSmall {
                value: config.min_group,
            }
            .into());
        }
        Ok(Self { config })
    }

    /// The active configuration.
    pub fn config(&self) -> &CompressConfig {
        &self.config
    }

    /// Compress one outline document.
    ///
    /// Pure and synchronous: identical input text yields identical
    /// output, and nothing survives the call.
    pub fn compress(&self, text: &str) -> FoldResult<CompressedOutline> {
        let (outline, _) = self.run(text)?;
        Ok(outline)
    }

    /// Compress one outline document and report pipeline statistics.
    pub fn stats(&self, text: &str) -> FoldResult<CompressStats> {
        Ok(self.run(text)?.1)
    }

    fn run(&self, text: &str) -> FoldResult<(CompressedOutline, CompressStats)> {
        let lines = parse::parse_outline(text);
        let original_lines = lines.len();
        tracing::debug!(lines = original_lines, "parsed outline");

        let mut tree = OutlineTree::build(lines);
        let prune_stats = prune::remove_wrappers(&mut tree);
        tracing::debug!(
            removed = prune_stats.removed_empty,
            collapsed = prune_stats.collapsed,
            passes = prune_stats.passes,
            "removed wrappers"
        );

        let patterns = detect::detect_all(&tree, self.config.min_group);
        let pattern_count: usize = patterns.values().map(Vec::len).sum();
        tracing::debug!(patterns = pattern_count, "detected list patterns");
        detect::annotate_groups(&mut tree, &patterns);

        let outline = render::render(&tree, &patterns, self.config.max_lines, original_lines)?;
        tracing::info!(
            rendered = outline.rendered_lines,
            original = outline.original_lines,
            folds = outline.folds.len(),
            "outline compressed"
        );

        let folded_elements = outline
            .folds
            .iter()
            .map(|fold| fold.items.saturating_sub(1))
            .sum();
        let stats = CompressStats {
            original_lines,
            rendered_lines: outline.rendered_lines,
            retained_nodes: tree.reachable_count(),
            wrappers_removed: prune_stats.removed_empty,
            wrappers_collapsed: prune_stats.collapsed,
            patterns: pattern_count,
            folded_elements,
            compression_ratio: outline.compression_ratio(),
        };
        Ok((outline, stats))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ConfigError, FoldError};

    fn default_compressor() -> Compressor {
        Compressor::new(CompressConfig::default()).unwrap()
    }

    #[test]
    fn zero_line_budget_rejected() {
        let result = Compressor::new(CompressConfig {
            max_lines: 0,
            min_group: 3,
        });
        assert!(matches!(
            result,
            Err(FoldError::Config(ConfigError::LineBudgetZero))
        ));
    }

    #[test]
    fn degenerate_group_minimum_rejected() {
        let result = Compressor::new(CompressConfig {
            max_lines: 100,
            min_group: 1,
        });
        assert!(matches!(
            result,
            Err(FoldError::Config(ConfigError::GroupSizeTooSmall { value: 1 }))
        ));
    }

    #[test]
    fn default_config_is_valid() {
        let compressor = default_compressor();
        assert_eq!(compressor.config().max_lines, 200);
        assert_eq!(compressor.config().min_group, 3);
    }

    #[test]
    fn compress_is_deterministic() {
        let mut text = String::from("- list\n");
        for index in 0..12 {
            text.push_str(&format!(
                "  - listitem [ref=e{index}]\n    - link \"Item {index}\"\n"
            ));
        }
        let compressor = default_compressor();
        let first = compressor.compress(&text).unwrap();
        let second = compressor.compress(&text).unwrap();
        assert_eq!(first.text, second.text);
        assert_eq!(first.reference_ids(), second.reference_ids());
    }

    #[test]
    fn stats_reflect_the_pipeline() {
        let mut text = String::from("- generic\n  - list\n");
        for index in 0..8 {
            text.push_str(&format!("    - listitem \"row {index}\" [ref=e{index}]\n"));
        }
        let compressor = default_compressor();
        let stats = compressor.stats(&text).unwrap();
        assert_eq!(stats.original_lines, 10);
        assert_eq!(stats.wrappers_collapsed, 1);
        assert_eq!(stats.patterns, 1);
        assert_eq!(stats.folded_elements, 7);
        assert!(stats.compression_ratio > 0.0);
        assert!(stats.retained_nodes < 10);
    }

    #[test]
    fn empty_document_compresses_cleanly() {
        let compressor = default_compressor();
        let outline = compressor.compress("").unwrap();
        assert_eq!(outline.text, "Page Outline (0/0 lines):\n");
    }
}
