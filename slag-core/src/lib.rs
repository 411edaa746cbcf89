//! slag core library - ingot cards, canonical S-expression text and the showcase page

// Global invariants enforced in this crate:
// - No global mutable state; ingot lists are passed in explicitly
// - Rendering never reorders, drops or deduplicates ingots
// - Identical input yields byte-for-byte identical output
// - Text embedded in markup is always HTML-escaped

pub mod clipboard;
pub mod config;
pub mod console;
pub mod ingot;
pub mod markup;
pub mod page;
pub mod sexp;

pub use config::ResolvedConfig;
pub use console::{log_canonical_text, DiagnosticSink, LogSink, WriterSink};
pub use ingot::{example_ingots, Ingot, IngotCounts, Status};
pub use markup::render_markup;
pub use page::{mount_ingots, render_page, PageDocument, Surface};
pub use sexp::{parse_crucible, parse_ingot, to_canonical_text};
