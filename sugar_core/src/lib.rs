//! `sugar_core` is the engine behind the `sugar` CLI: it compiles HTML-style
//! template sugar (`<snippet:card>`, `<layout>`, `<slot>`, and `--var`
//! attributes) in Kirby templates into plain PHP snippet calls, leaving
//! everything else in the file byte-for-byte identical — including line
//! numbers, so PHP error positions still point at the template source.
//!
//! ## Processing pipeline
//!
//! ```text
//! Template text
//!   → Scanner (state machine emitting open/close tag events with exact spans)
//!     → PHP sub-scanner (finds block extents, string/comment aware)
//!   → Transformer registry (snippet/layout → slot → css-var, first match wins)
//!   → Splice buffer (span replacements + line-indexed joining)
//! ```
//!
//! ## Key types
//!
//! - [`Tag`] / [`Attribute`] — one parsed markup element with byte offsets,
//!   line count and layout metadata.
//! - [`TagSink`] — receives tag events from [`parse`].
//! - [`Registry`] — the ordered transformer list.
//! - [`SpliceBuffer`] — applies span replacements in one pass.
//! - [`BuildOptions`] / [`build`] — the file-batch layer used by the CLI.
//!
//! ## Quick start
//!
//! ```rust
//! let input = "<snippet:card title=\"Hello\" />";
//! let output = sugar_core::transform(input).unwrap();
//! assert!(output.starts_with("<?php snippet('card'"));
//! ```

pub use config::*;
pub use error::*;
pub use project::*;
pub use scanner::*;
pub use splice::*;
pub use tag::*;
pub use transform::*;
pub use transformers::*;

pub mod config;
mod error;
pub(crate) mod php;
pub mod project;
mod scanner;
mod splice;
mod tag;
mod transform;
mod transformers;
