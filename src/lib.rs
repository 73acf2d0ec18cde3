//! # pagefold
//!
//! An outline compression engine for browser-automation agents. pagefold
//! takes the machine-generated, indented text description of a page's
//! interactive structure and folds its repetitive parts, producing a
//! drastically shorter outline that still contains every distinct
//! structural pattern and every element reference id.
//!
//! ## Architecture
//!
//! - **Line parser** (`parse`): best-effort per-line extraction of role,
//!   text, reference id, and indentation
//! - **Tree builder** (`tree`): depth-stack reconstruction into an
//!   index-addressed arena
//! - **Wrapper remover** (`prune`): bottom-up fixed-point removal of
//!   structurally empty generic nodes
//! - **Fingerprints** (`fingerprint`): 32-bit structural signatures via
//!   weighted-majority bit voting, compared by Hamming distance
//! - **List detection** (`detect`): semantic and structural runs of
//!   similar siblings, the fold candidates
//! - **Renderer** (`render`): budgeted depth-first rendering with one
//!   sample plus a fold marker per detected run
//!
//! ## Library usage
//!
//! ```no_run
//! use pagefold::engine::{CompressConfig, Compressor};
//!
//! let compressor = Compressor::new(CompressConfig::default()).unwrap();
//! let outline = compressor
//!     .compress("- list\n  - listitem \"First\" [ref=e1]\n")
//!     .unwrap();
//! println!("{}", outline.text);
//! ```

pub mod detect;
pub mod engine;
pub mod error;
pub mod fingerprint;
pub mod kind;
pub mod parse;
pub mod prune;
pub mod render;
pub mod tree;
