//! Recursive grouping of expression tokens into optionals, parameters and
//! alternations.

use crate::errors::{PatternError, syntax_error};

use super::lexer::{Token, lex_expression};

/// Parsed building block of a Cucumber Expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Node {
    Text(String),
    Optional(String),
    Parameter { name: String, start: usize },
    Alternation(Vec<Vec<Node>>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Item {
    Node(Node),
    Space(char),
    Slash(usize),
}

pub(crate) fn parse_expression(expression: &str) -> Result<Vec<Node>, PatternError> {
    let tokens = lex_expression(expression)?;
    let items = collect_items(tokens, expression.len())?;
    group_alternations(items)
}

fn collect_items(tokens: Vec<Token>, end: usize) -> Result<Vec<Item>, PatternError> {
    let mut items = Vec::with_capacity(tokens.len());
    let mut iter = tokens.into_iter();
    while let Some(token) = iter.next() {
        let item = match token {
            Token::Text { value, .. } => Item::Node(Node::Text(value)),
            Token::Whitespace { value, .. } => Item::Space(value),
            Token::Alternation { start } => Item::Slash(start),
            Token::BeginParameter { start } => parse_parameter(&mut iter, start, end)?,
            Token::BeginOptional { start } => parse_optional(&mut iter, start, end)?,
            // A closing token with nothing open is plain text.
            Token::EndParameter { .. } => Item::Node(Node::Text("}".into())),
            Token::EndOptional { .. } => Item::Node(Node::Text(")".into())),
        };
        items.push(item);
    }
    Ok(items)
}

fn parse_parameter(
    iter: &mut impl Iterator<Item = Token>,
    start: usize,
    end: usize,
) -> Result<Item, PatternError> {
    let mut name = String::new();
    loop {
        match iter.next() {
            Some(Token::EndParameter { .. }) => {
                return Ok(Item::Node(Node::Parameter { name, start }));
            }
            Some(Token::Text { value, .. }) => name.push_str(&value),
            Some(_) => {
                return Err(syntax_error(
                    "parameter names may not contain whitespace, '{', '(', ')' or '/'",
                    start,
                    Some(name),
                ));
            }
            None => {
                return Err(syntax_error(
                    "missing closing '}' for parameter",
                    end,
                    Some(name),
                ));
            }
        }
    }
}

fn parse_optional(
    iter: &mut impl Iterator<Item = Token>,
    start: usize,
    end: usize,
) -> Result<Item, PatternError> {
    let mut text = String::new();
    loop {
        match iter.next() {
            Some(Token::EndOptional { .. }) => {
                if text.is_empty() {
                    return Err(syntax_error(
                        "an optional must contain some text",
                        start,
                        None,
                    ));
                }
                return Ok(Item::Node(Node::Optional(text)));
            }
            Some(Token::Text { value, .. }) => text.push_str(&value),
            Some(Token::Whitespace { value, .. }) => text.push(value),
            Some(Token::BeginParameter { start: inner }) => {
                return Err(syntax_error(
                    "an optional may not contain a parameter type",
                    inner,
                    None,
                ));
            }
            Some(Token::BeginOptional { start: inner }) => {
                return Err(syntax_error("optionals may not be nested", inner, None));
            }
            Some(Token::Alternation { start: inner }) => {
                return Err(syntax_error(
                    "an optional may not contain an alternation",
                    inner,
                    None,
                ));
            }
            Some(Token::EndParameter { .. }) => text.push('}'),
            None => {
                return Err(syntax_error("missing closing ')' for optional", end, None));
            }
        }
    }
}

fn group_alternations(items: Vec<Item>) -> Result<Vec<Node>, PatternError> {
    let mut nodes = Vec::new();
    let mut word: Vec<Item> = Vec::new();
    for item in items {
        if let Item::Space(ch) = item {
            flush_word(std::mem::take(&mut word), &mut nodes)?;
            nodes.push(Node::Text(ch.to_string()));
        } else {
            word.push(item);
        }
    }
    flush_word(word, &mut nodes)?;
    Ok(merge_text(nodes))
}

fn flush_word(word: Vec<Item>, nodes: &mut Vec<Node>) -> Result<(), PatternError> {
    if !word.iter().any(|item| matches!(item, Item::Slash(_))) {
        nodes.extend(word.into_iter().filter_map(|item| match item {
            Item::Node(node) => Some(node),
            Item::Space(_) | Item::Slash(_) => None,
        }));
        return Ok(());
    }

    let mut alternatives = Vec::new();
    let mut current: Vec<Node> = Vec::new();
    let mut boundary = None;
    for item in word {
        match item {
            Item::Slash(start) => {
                alternatives.push(check_alternative(std::mem::take(&mut current), start)?);
                boundary = Some(start);
            }
            Item::Node(node) => current.push(node),
            Item::Space(_) => {}
        }
    }
    alternatives.push(check_alternative(current, boundary.unwrap_or_default())?);
    nodes.push(Node::Alternation(alternatives));
    Ok(())
}

fn check_alternative(alternative: Vec<Node>, position: usize) -> Result<Vec<Node>, PatternError> {
    if alternative.is_empty() {
        return Err(syntax_error("an alternative may not be empty", position, None));
    }
    if let Some(Node::Parameter { name, start }) = alternative
        .iter()
        .find(|node| matches!(node, Node::Parameter { .. }))
    {
        return Err(syntax_error(
            "an alternative may not contain a parameter type",
            *start,
            Some(name.clone()),
        ));
    }
    if alternative.iter().all(|node| matches!(node, Node::Optional(_))) {
        return Err(syntax_error(
            "an alternative may not exclusively contain optionals",
            position,
            None,
        ));
    }
    Ok(merge_text(alternative))
}

fn merge_text(nodes: Vec<Node>) -> Vec<Node> {
    let mut merged: Vec<Node> = Vec::with_capacity(nodes.len());
    for node in nodes {
        if let (Node::Text(next), Some(Node::Text(existing))) = (&node, merged.last_mut()) {
            existing.push_str(next);
            continue;
        }
        merged.push(node);
    }
    merged
}
