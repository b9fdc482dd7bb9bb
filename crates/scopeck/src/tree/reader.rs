//! Reader for the textual tree dump
//!
//! ```text
//! (SCOPE
//!   (VARIABLE @1 (TYPE int) (ID x))
//!   (ASSIGN @2 (ID x) (CONST (TYPE int) 4)))
//! ```
//!
//! A node carries at most one payload (word, number or quoted string), which
//! may appear before or after its children. A node without an `@line` marker
//! inherits the line of its parent.

use logos::Logos;

use super::token::{Token, TokenKind};
use super::{NodeKind, Tree};
use crate::common::{SemaError, SemaResult, Span};

/// Stack-based reader producing a parent-linked [`Tree`]
pub struct TreeReader<'a> {
    inner: logos::Lexer<'a, TokenKind>,
    peeked: Option<Token>,
}

impl<'a> TreeReader<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            inner: TokenKind::lexer(source),
            peeked: None,
        }
    }

    /// Read a whole dump into a tree
    pub fn read(source: &'a str) -> SemaResult<Tree> {
        TreeReader::new(source).read_tree()
    }

    fn read_tree(&mut self) -> SemaResult<Tree> {
        self.expect_lparen()?;
        let (kind, line) = self.header(1)?;
        let mut tree = Tree::new(kind, line);

        // Nodes whose closing parenthesis has not been read yet, innermost last
        let mut open = vec![(tree.root(), line)];
        while let Some(&(id, line)) = open.last() {
            let token = self.next_token()?;
            match token.kind {
                TokenKind::LParen => {
                    let (kind, child_line) = self.header(line)?;
                    let child = tree.push(id, kind, None, child_line);
                    open.push((child, child_line));
                }
                TokenKind::RParen => {
                    open.pop();
                }
                TokenKind::Word(value) | TokenKind::Number(value) | TokenKind::Str(value) => {
                    if tree.value(id).is_some() {
                        return Err(SemaError::syntax(
                            format!("{} node already has a value", tree.kind(id)),
                            token.span,
                        ));
                    }
                    tree.set_value(id, &value);
                }
                other => {
                    return Err(SemaError::syntax(
                        format!("expected '(', ')' or a value, found {other}"),
                        token.span,
                    ));
                }
            }
        }

        let token = self.next_token()?;
        if token.kind != TokenKind::Eof {
            return Err(SemaError::syntax(
                format!("expected end of file, found {}", token.kind),
                token.span,
            ));
        }
        Ok(tree)
    }

    /// Node tag and line, right after the opening parenthesis
    fn header(&mut self, inherited: u32) -> SemaResult<(NodeKind, u32)> {
        let token = self.next_token()?;
        let kind = match &token.kind {
            TokenKind::Word(word) => word.parse::<NodeKind>().map_err(|()| {
                SemaError::syntax(format!("unknown node kind '{word}'"), token.span)
            })?,
            other => {
                return Err(SemaError::syntax(
                    format!("expected node kind, found {other}"),
                    token.span,
                ));
            }
        };

        let line = if let TokenKind::Line(line) = self.peek()?.kind {
            self.next_token()?;
            line
        } else {
            inherited
        };
        Ok((kind, line))
    }

    fn expect_lparen(&mut self) -> SemaResult<()> {
        let token = self.next_token()?;
        if token.kind == TokenKind::LParen {
            Ok(())
        } else {
            Err(SemaError::syntax(
                format!("expected '(', found {}", token.kind),
                token.span,
            ))
        }
    }

    fn next_token(&mut self) -> SemaResult<Token> {
        if let Some(token) = self.peeked.take() {
            return Ok(token);
        }

        match self.inner.next() {
            Some(Ok(kind)) => Ok(Token::new(kind, self.inner.span().into())),
            Some(Err(())) => Err(SemaError::syntax(
                format!("unexpected input '{}'", self.inner.slice()),
                self.inner.span().into(),
            )),
            None => {
                let len = self.inner.source().len();
                Ok(Token::new(TokenKind::Eof, Span::new(len, len)))
            }
        }
    }

    fn peek(&mut self) -> SemaResult<&Token> {
        let token = match self.peeked.take() {
            Some(token) => token,
            None => self.next_token()?,
        };
        Ok(self.peeked.insert(token))
    }
}
