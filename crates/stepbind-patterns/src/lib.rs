//! Step-text pattern utilities for stepbind.
//!
//! The crate holds the pure pattern machinery shared by binding discovery and
//! the runtime matcher: Cucumber Expression compilation, the heuristic that
//! tells expressions from regexes, method-name pattern synthesis, whole-text
//! anchoring, capture extraction with offsets, tag expressions and step
//! keywords.

mod anchor;
mod capture;
mod detector;
mod errors;
mod expression;
mod keyword;
mod method_name;
mod tags;

pub use anchor::{anchor_regex, compile_anchored, strip_anchors};
pub use capture::{
    CapturedArgument, extract_captured_values, extract_captures, extract_slot_captures,
};
pub use detector::{ExpressionKind, detect_expression_kind, is_cucumber_expression};
pub use errors::{PatternError, SyntaxErrorInfo};
pub use expression::{
    CompiledParameter, CucumberExpression, ExpressionRegex, FLOAT_REGEX, INT_REGEX,
    MATCH_ALL_REGEX, ParameterRegex, ParameterTypeLookup, StandardParameterTypes, WORD_REGEX,
    build_expression_regex,
};
pub use keyword::{StepDefinitionType, StepKeyword, UnknownKeyword};
pub use method_name::{compile_method_name_pattern, method_name_regex};
pub use tags::{TagExprError, TagExpression, merge_tag_sets, normalise_tag};
