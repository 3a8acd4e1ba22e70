//! Tokenises tag expressions into keywords, parentheses, and tag identifiers.
//!
//! Tags start with `@` and run until whitespace or a parenthesis, so forms
//! such as `@issue:123` or `@env.staging` survive intact; a backslash escapes
//! the next character. Keywords are case insensitive.

use std::iter::Peekable;
use std::str::CharIndices;

use super::ast::TagExprError;

#[derive(Clone, Debug)]
pub(super) struct Token {
    pub(super) kind: TokenKind,
    pub(super) start: usize,
}

impl Token {
    pub(super) fn describe(&self) -> String {
        match &self.kind {
            TokenKind::Tag(tag) => tag.clone(),
            TokenKind::And => "'and'".to_string(),
            TokenKind::Or => "'or'".to_string(),
            TokenKind::Not => "'not'".to_string(),
            TokenKind::LParen => "'('".to_string(),
            TokenKind::RParen => "')'".to_string(),
            TokenKind::End => "<end>".to_string(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(super) enum TokenKind {
    Tag(String),
    And,
    Or,
    Not,
    LParen,
    RParen,
    End,
}

pub(super) struct Lexer<'a> {
    chars: Peekable<CharIndices<'a>>,
    len: usize,
}

impl<'a> Lexer<'a> {
    pub(super) fn new(input: &'a str) -> Self {
        Self {
            chars: input.char_indices().peekable(),
            len: input.len(),
        }
    }

    pub(super) fn next_token(&mut self) -> Result<Token, TagExprError> {
        while self.chars.next_if(|(_, ch)| ch.is_whitespace()).is_some() {}
        let Some((start, ch)) = self.chars.next() else {
            return Ok(Token {
                kind: TokenKind::End,
                start: self.len,
            });
        };
        let kind = match ch {
            '(' => TokenKind::LParen,
            ')' => TokenKind::RParen,
            '@' => TokenKind::Tag(self.lex_tag(start)?),
            c if c.is_ascii_alphabetic() => self.lex_keyword(start, c)?,
            other => {
                return Err(TagExprError::new(
                    start,
                    format!("unexpected character '{other}'"),
                ));
            }
        };
        Ok(Token { kind, start })
    }

    fn lex_tag(&mut self, start: usize) -> Result<String, TagExprError> {
        let mut tag = String::from("@");
        while let Some((pos, ch)) = self.chars.next_if(|(_, ch)| is_tag_char(*ch)) {
            if ch == '\\' {
                let Some((_, escaped)) = self.chars.next() else {
                    return Err(TagExprError::new(pos, "dangling escape in tag"));
                };
                tag.push(escaped);
            } else {
                tag.push(ch);
            }
        }
        if tag.len() == 1 {
            return Err(TagExprError::new(start + 1, "expected tag name after '@'"));
        }
        Ok(tag)
    }

    fn lex_keyword(&mut self, start: usize, first: char) -> Result<TokenKind, TagExprError> {
        let mut word = String::from(first);
        while let Some((_, ch)) = self.chars.next_if(|(_, ch)| ch.is_ascii_alphabetic()) {
            word.push(ch);
        }
        match word.to_ascii_lowercase().as_str() {
            "and" => Ok(TokenKind::And),
            "or" => Ok(TokenKind::Or),
            "not" => Ok(TokenKind::Not),
            _ => Err(TagExprError::new(
                start,
                format!("unexpected identifier '{word}'"),
            )),
        }
    }
}

fn is_tag_char(ch: char) -> bool {
    !ch.is_whitespace() && !matches!(ch, '(' | ')')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &str) -> Vec<TokenKind> {
        let mut lexer = Lexer::new(input);
        let mut kinds = Vec::new();
        loop {
            let token = lexer
                .next_token()
                .unwrap_or_else(|err| panic!("lexing `{input}` failed: {err}"));
            if token.kind == TokenKind::End {
                return kinds;
            }
            kinds.push(token.kind);
        }
    }

    #[test]
    fn keeps_punctuation_inside_tags() {
        assert_eq!(
            kinds("@issue:123 AND (@env.staging)"),
            vec![
                TokenKind::Tag("@issue:123".into()),
                TokenKind::And,
                TokenKind::LParen,
                TokenKind::Tag("@env.staging".into()),
                TokenKind::RParen,
            ]
        );
    }

    #[test]
    fn unescapes_parentheses_in_tags() {
        assert_eq!(kinds(r"@odd\(tag\)"), vec![TokenKind::Tag("@odd(tag)".into())]);
    }

    #[test]
    fn rejects_lone_at_sign() {
        let Err(err) = Lexer::new("@ and @b").next_token() else {
            panic!("lone '@' should fail");
        };
        assert_eq!(err.offset(), 1);
    }
}
