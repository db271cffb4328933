//! # Layout
//!
//! Backend-independent layout decisions shared by both renderers: font-size
//! resolution ([`style`]) and table column planning ([`columns`]). Both are
//! pure functions of the document, so the markup and command-stream backends
//! cannot drift apart on sizing or column splits.

pub mod columns;
pub mod style;

pub use columns::widths;
pub use style::resolve_font_size;
