//! Diagnostic error types for the pagefold engine.
//!
//! The engine has almost no failure surface: malformed input lines are
//! dropped during parsing, and every pipeline stage after that is total.
//! The errors that remain are structural impossibilities — a caller asking
//! for a zero-line rendering or a degenerate group minimum — and each
//! carries a miette `#[diagnostic]` code and help text so the caller knows
//! exactly which precondition was violated.

use miette::Diagnostic;
use thiserror::Error;

/// Top-level error type for the pagefold engine.
///
/// Each variant wraps a subsystem-specific error, preserving the full
/// diagnostic chain (error codes, help text) through to the user.
#[derive(Debug, Error, Diagnostic)]
pub enum FoldError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Render(#[from] RenderError),
}

// ---------------------------------------------------------------------------
// Configuration errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("line budget must be positive")]
    #[diagnostic(
        code(pagefold::config::line_budget),
        help(
            "A zero-line outline cannot hold any content. \
             Set `max_lines` to the number of output lines the caller can \
             afford; the renderer treats it as advisory and may exceed it \
             slightly to finish a begun structure."
        )
    )]
    LineBudgetZero,

    #[error("minimum group size {value} is too small")]
    #[diagnostic(
        code(pagefold::config::group_size),
        help(
            "Folding a group of fewer than 2 elements would replace single \
             nodes with fold markers and grow the output. Use a minimum \
             group size of at least 2 (the default is 3)."
        )
    )]
    GroupSizeTooSmall { value: usize },
}

// ---------------------------------------------------------------------------
// Renderer errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum RenderError {
    #[error("cannot render with a line budget of {requested}")]
    #[diagnostic(
        code(pagefold::render::budget),
        help(
            "The renderer was invoked with a non-positive line budget. \
             This is a caller bug: validate the budget up front (the \
             `Compressor` constructor already does) instead of asking for \
             an empty rendering."
        )
    )]
    InvalidBudget { requested: usize },
}

/// Convenience alias for functions returning pagefold results.
pub type FoldResult<T> = std::result::Result<T, FoldError>;
