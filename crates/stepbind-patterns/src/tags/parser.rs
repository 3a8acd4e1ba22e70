//! Recursive-descent parser producing tag-expression syntax trees.

use super::ast::{Expr, TagExprError};
use super::lexer::{Lexer, Token, TokenKind};

#[derive(Clone, Copy)]
enum Binary {
    And,
    Or,
}

impl Binary {
    fn name(self) -> &'static str {
        match self {
            Self::And => "and",
            Self::Or => "or",
        }
    }

    fn matches(self, kind: &TokenKind) -> bool {
        matches!(
            (self, kind),
            (Self::And, TokenKind::And) | (Self::Or, TokenKind::Or)
        )
    }

    fn build(self, lhs: Expr, rhs: Expr) -> Expr {
        match self {
            Self::And => Expr::And(Box::new(lhs), Box::new(rhs)),
            Self::Or => Expr::Or(Box::new(lhs), Box::new(rhs)),
        }
    }
}

pub(super) struct Parser<'a> {
    lexer: Lexer<'a>,
    current: Token,
}

impl<'a> Parser<'a> {
    pub(super) fn new(input: &'a str) -> Result<Self, TagExprError> {
        let mut lexer = Lexer::new(input);
        let current = lexer.next_token()?;
        Ok(Self { lexer, current })
    }

    pub(super) fn parse_expression(&mut self) -> Result<Expr, TagExprError> {
        self.parse_binary(Binary::Or)
    }

    pub(super) fn expect_end(&self) -> Result<(), TagExprError> {
        if self.current.kind == TokenKind::End {
            Ok(())
        } else {
            Err(TagExprError::new(
                self.current.start,
                format!("unexpected token {}", self.current.describe()),
            ))
        }
    }

    fn advance(&mut self) -> Result<Token, TagExprError> {
        let next = self.lexer.next_token()?;
        Ok(std::mem::replace(&mut self.current, next))
    }

    fn parse_operand(&mut self, op: Binary) -> Result<Expr, TagExprError> {
        match op {
            Binary::Or => self.parse_binary(Binary::And),
            Binary::And => self.parse_not(),
        }
    }

    fn parse_binary(&mut self, op: Binary) -> Result<Expr, TagExprError> {
        let mut node = self.parse_operand(op)?;
        while op.matches(&self.current.kind) {
            self.advance()?;
            if matches!(
                self.current.kind,
                TokenKind::Or | TokenKind::And | TokenKind::RParen | TokenKind::End
            ) {
                return Err(TagExprError::new(
                    self.current.start,
                    format!("expected tag or '(' after '{}'", op.name()),
                ));
            }
            let rhs = self.parse_operand(op)?;
            node = op.build(node, rhs);
        }
        Ok(node)
    }

    fn parse_not(&mut self) -> Result<Expr, TagExprError> {
        if self.current.kind == TokenKind::Not {
            self.advance()?;
            let operand = self.parse_not()?;
            return Ok(Expr::Not(Box::new(operand)));
        }
        self.parse_primary()
    }

    fn parse_primary(&mut self) -> Result<Expr, TagExprError> {
        let token = self.advance()?;
        match &token.kind {
            TokenKind::Tag(tag) => Ok(Expr::Tag(tag.clone())),
            TokenKind::LParen => {
                let expr = self.parse_expression()?;
                if self.current.kind == TokenKind::RParen {
                    self.advance()?;
                    Ok(expr)
                } else {
                    Err(TagExprError::new(token.start, "missing ')'"))
                }
            }
            TokenKind::End => Err(TagExprError::new(token.start, "expected tag or '('")),
            _ => Err(TagExprError::new(
                token.start,
                format!("expected tag or '(' but found {}", token.describe()),
            )),
        }
    }
}
