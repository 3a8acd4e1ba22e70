//! Expression lexer converting Cucumber Expressions into semantic tokens.

use crate::errors::{PatternError, syntax_error};

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Token {
    Text { value: String, start: usize },
    Whitespace { value: char, start: usize },
    BeginParameter { start: usize },
    EndParameter { start: usize },
    BeginOptional { start: usize },
    EndOptional { start: usize },
    Alternation { start: usize },
}

fn is_escapable(ch: char) -> bool {
    matches!(ch, '{' | '}' | '(' | ')' | '/' | '\\') || ch.is_whitespace()
}

pub(crate) fn lex_expression(expression: &str) -> Result<Vec<Token>, PatternError> {
    let mut tokens = Vec::new();
    let mut literal = String::new();
    let mut literal_start = 0;
    let mut chars = expression.char_indices().peekable();

    let flush_literal = |literal: &mut String, start: usize, tokens: &mut Vec<Token>| {
        if !literal.is_empty() {
            tokens.push(Token::Text {
                value: std::mem::take(literal),
                start,
            });
        }
    };

    while let Some((pos, ch)) = chars.next() {
        let structural = match ch {
            '\\' => {
                let Some((_, escaped)) = chars.next() else {
                    return Err(syntax_error(
                        "the end of the expression can not be escaped",
                        pos,
                        None,
                    ));
                };
                if !is_escapable(escaped) {
                    return Err(syntax_error(
                        "only '{', '}', '(', ')', '/', '\\' and whitespace can be escaped",
                        pos,
                        None,
                    ));
                }
                if literal.is_empty() {
                    literal_start = pos;
                }
                literal.push(escaped);
                continue;
            }
            '{' => Token::BeginParameter { start: pos },
            '}' => Token::EndParameter { start: pos },
            '(' => Token::BeginOptional { start: pos },
            ')' => Token::EndOptional { start: pos },
            '/' => Token::Alternation { start: pos },
            c if c.is_whitespace() => Token::Whitespace {
                value: c,
                start: pos,
            },
            other => {
                if literal.is_empty() {
                    literal_start = pos;
                }
                literal.push(other);
                continue;
            }
        };
        flush_literal(&mut literal, literal_start, &mut tokens);
        tokens.push(structural);
    }

    flush_literal(&mut literal, literal_start, &mut tokens);
    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lex(input: &str) -> Vec<Token> {
        lex_expression(input).unwrap_or_else(|err| panic!("lexing `{input}` failed: {err}"))
    }

    #[test]
    fn tokenises_text_whitespace_and_parameters() {
        assert_eq!(
            lex("I have {int}"),
            vec![
                Token::Text {
                    value: "I".into(),
                    start: 0
                },
                Token::Whitespace {
                    value: ' ',
                    start: 1
                },
                Token::Text {
                    value: "have".into(),
                    start: 2
                },
                Token::Whitespace {
                    value: ' ',
                    start: 6
                },
                Token::BeginParameter { start: 7 },
                Token::Text {
                    value: "int".into(),
                    start: 8
                },
                Token::EndParameter { start: 11 },
            ]
        );
    }

    #[test]
    fn recognises_optionals_and_alternation() {
        assert_eq!(
            lex("cuke(s)/x"),
            vec![
                Token::Text {
                    value: "cuke".into(),
                    start: 0
                },
                Token::BeginOptional { start: 4 },
                Token::Text {
                    value: "s".into(),
                    start: 5
                },
                Token::EndOptional { start: 6 },
                Token::Alternation { start: 7 },
                Token::Text {
                    value: "x".into(),
                    start: 8
                },
            ]
        );
    }

    #[test]
    fn escapes_special_characters_into_text() {
        assert_eq!(
            lex(r"a\{b\}\/c"),
            vec![Token::Text {
                value: "a{b}/c".into(),
                start: 0
            }]
        );
    }

    #[test]
    fn rejects_trailing_escape() {
        let Err(err) = lex_expression("broken\\") else {
            panic!("trailing escape should fail");
        };
        assert!(err.to_string().contains("can not be escaped"));
    }

    #[test]
    fn rejects_escaping_ordinary_characters() {
        let Err(err) = lex_expression(r"\d") else {
            panic!("escaping `d` should fail");
        };
        assert!(err.to_string().contains("at byte 0"));
    }
}
