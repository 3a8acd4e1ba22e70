//! Convert parsed expression nodes into anchored regular-expression sources.

use crate::errors::{PatternError, syntax_error};

use super::parser::{Node, parse_expression};
use super::{ParameterRegex, ParameterTypeLookup};

/// Regex used for `{string}`: one group for double quotes, one for single.
pub(crate) const QUOTED_STRING_REGEX: &str =
    r#"(?:(?:"([^"\\]*(?:\\.[^"\\]*)*)")|(?:'([^'\\]*(?:\\.[^'\\]*)*)'))"#;

/// Parameter position in a compiled expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledParameter {
    /// Parameter type name as written between the braces.
    pub name: String,
    /// Capture group indices that may hold the parameter value.
    pub groups: Vec<usize>,
}

/// Regex source and parameter layout produced from an expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpressionRegex {
    /// Anchored regex source.
    pub source: String,
    /// Parameters in declaration order.
    pub parameters: Vec<CompiledParameter>,
    /// Literal text every matching step must start with.
    pub literal_prefix: String,
}

/// Build an anchored regular expression from a Cucumber Expression.
///
/// # Errors
/// Returns [`PatternError`] when the expression is malformed or names a
/// parameter type the lookup does not know.
///
/// # Examples
/// ```
/// # use stepbind_patterns::{StandardParameterTypes, build_expression_regex};
/// let built = build_expression_regex("I have {int} cucumbers in my belly", &StandardParameterTypes)
///     .expect("example ensures fallible call succeeds");
/// assert_eq!(built.source, r"^I have (-?\d+) cucumbers in my belly$");
/// ```
pub fn build_expression_regex(
    expression: &str,
    lookup: &dyn ParameterTypeLookup,
) -> Result<ExpressionRegex, PatternError> {
    let nodes = parse_expression(expression)?;
    let mut source = String::with_capacity(expression.len().saturating_mul(2) + 2);
    source.push('^');
    let mut parameters = Vec::new();
    let mut next_group = 1usize;

    for node in &nodes {
        match node {
            Node::Text(text) => source.push_str(&regex::escape(text)),
            Node::Optional(text) => push_optional(&mut source, text),
            Node::Alternation(alternatives) => {
                source.push_str("(?:");
                for (index, alternative) in alternatives.iter().enumerate() {
                    if index > 0 {
                        source.push('|');
                    }
                    for part in alternative {
                        match part {
                            Node::Text(text) => source.push_str(&regex::escape(text)),
                            Node::Optional(text) => push_optional(&mut source, text),
                            Node::Parameter { .. } | Node::Alternation(_) => {}
                        }
                    }
                }
                source.push(')');
            }
            Node::Parameter { name, start } => {
                let Some(shape) = lookup.parameter_regex(name) else {
                    return Err(syntax_error(
                        "undefined parameter type",
                        *start,
                        Some(name.clone()),
                    ));
                };
                match shape {
                    ParameterRegex::Pattern(pattern) => {
                        source.push('(');
                        source.push_str(&make_non_capturing(&pattern));
                        source.push(')');
                        parameters.push(CompiledParameter {
                            name: name.clone(),
                            groups: vec![next_group],
                        });
                        next_group += 1;
                    }
                    ParameterRegex::QuotedString => {
                        source.push_str(QUOTED_STRING_REGEX);
                        parameters.push(CompiledParameter {
                            name: name.clone(),
                            groups: vec![next_group, next_group + 1],
                        });
                        next_group += 2;
                    }
                }
            }
        }
    }

    source.push('$');
    let literal_prefix = nodes
        .iter()
        .map_while(|node| match node {
            Node::Text(text) => Some(text.as_str()),
            _ => None,
        })
        .collect();
    Ok(ExpressionRegex {
        source,
        parameters,
        literal_prefix,
    })
}

fn push_optional(source: &mut String, text: &str) {
    source.push_str("(?:");
    source.push_str(&regex::escape(text));
    source.push_str(")?");
}

/// Rewrite capturing groups in a parameter regex as non-capturing ones so a
/// parameter always contributes exactly one argument.
pub(crate) fn make_non_capturing(pattern: &str) -> String {
    let mut out = String::with_capacity(pattern.len() + 8);
    let mut chars = pattern.chars().peekable();
    let mut in_class = false;
    while let Some(ch) = chars.next() {
        match ch {
            '\\' => {
                out.push(ch);
                if let Some(next) = chars.next() {
                    out.push(next);
                }
            }
            '[' if !in_class => {
                in_class = true;
                out.push(ch);
                if chars.peek() == Some(&'^') {
                    out.push('^');
                    chars.next();
                }
                if chars.peek() == Some(&']') {
                    out.push(']');
                    chars.next();
                }
            }
            ']' if in_class => {
                in_class = false;
                out.push(ch);
            }
            '(' if !in_class => {
                if chars.peek() == Some(&'?') {
                    let rest: String = chars.clone().take(3).collect();
                    let named = rest.starts_with("?P<")
                        || (rest.starts_with("?<") && !rest.starts_with("?<=") && !rest.starts_with("?<!"));
                    if named {
                        for skipped in chars.by_ref() {
                            if skipped == '>' {
                                break;
                            }
                        }
                        out.push_str("(?:");
                    } else {
                        out.push('(');
                    }
                } else {
                    out.push_str("(?:");
                }
            }
            other => out.push(other),
        }
    }
    out
}
