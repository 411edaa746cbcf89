//! Canonical S-expression text for ingots
//!
//! One ingot per line, keyword-tagged, fixed field order:
//!
//! ```text
//! (ingot :id "i1" :status ore :solo t :grade 1 :skill default :heat 0 :max 5 :proof "true" :work "...")
//! ```
//!
//! `id`, `proof` and `work` are quoted; every other value is a bare token.

pub mod parser;
pub mod writer;

pub use parser::{parse_crucible, parse_ingot};
pub use writer::to_canonical_text;

/// Opening of every ingot line, including the separating space
pub const INGOT_OPEN: &str = "(ingot ";
