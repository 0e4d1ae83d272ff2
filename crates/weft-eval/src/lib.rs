#![forbid(unsafe_code)]

//! Restricted expression evaluation for conditional rendering.
//!
//! This crate is the leaf of the binding core. It provides:
//!
//! - [`resolve_path`] / [`resolve_in_record`]: dotted/bracketed path
//!   resolution against JSON values, absent-tolerant (never panics).
//! - [`evaluate_expression`]: a fixed six-operator comparison grammar
//!   (`===`, `!==`, `==`, `!=`, `>`, `<`) over a data record.
//! - [`evaluate_conditions`] / [`evaluate_conditions_within`]: the
//!   `show-if` / `class-if` marker passes that toggle visibility and class
//!   membership on document-tree elements.
//!
//! The grammar is deliberately not a parser: the operator is chosen by
//! substring presence in a fixed priority order, and evaluation of anything
//! outside the six comparisons resolves to `false`. Expanding this into a
//! general expression evaluator would reintroduce the injection surface the
//! restriction exists to avoid.

pub mod conditions;
pub mod expr;
pub mod path;

pub use conditions::{
    CLASS_IF_ATTR, SHOW_IF_ATTR, SHOWN_CLASS, evaluate_conditions, evaluate_conditions_within,
};
pub use expr::{Literal, evaluate_expression, parse_literal};
pub use path::{resolve_in_record, resolve_path};

/// The read-only data context expressions are evaluated against.
pub type DataRecord = serde_json::Map<String, serde_json::Value>;
