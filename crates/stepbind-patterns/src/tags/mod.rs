//! Tag-expression parsing, evaluation and tag-set normalisation.
//!
//! Binding scopes restrict step definitions and hooks with expressions such
//! as `@checkout and not @wip`.
mod ast;
mod lexer;
mod parser;
mod sets;

pub use ast::{TagExprError, TagExpression};
pub use sets::{merge_tag_sets, normalise_tag};
