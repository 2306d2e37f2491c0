//! Location step states: step scanning, separator disambiguation, node type
//! tests and function calls.

use super::names::is_name_char;
use super::{Lexer, State};
use crate::ast::Axis;
use crate::error::XPathError;
use crate::token::TokenKind;

const NODE_TYPES: [&str; 4] = ["comment", "text", "processing-instruction", "node"];

impl<'a> Lexer<'a> {
    pub(super) fn step_state(&mut self) -> Result<State, XPathError> {
        self.skip_ws();
        let offset = self.pos;
        // `*` is only ever a whole name test, never part of a name.
        if self.peek() == Some('*') {
            self.next();
        } else {
            while self.peek().is_some_and(is_name_char) {
                self.next();
            }
        }
        let tok = &self.input[offset..self.pos];

        let kind = self.parse_separators(tok, offset)?;
        self.next_path_state(kind)
    }

    fn parse_separators(&mut self, tok: &'a str, offset: usize) -> Result<TokenKind, XPathError> {
        self.skip_ws();
        match self.peek() {
            Some(':') if self.peek_at(1) == Some(':') => self.axis(tok, offset),
            Some(found @ (':' | '(')) if tok == "*" => Err(XPathError::UnexpectedCharacter {
                found,
                offset: self.pos,
            }),
            Some(':') if !tok.is_empty() => {
                self.emit_val(TokenKind::NCName, tok, offset);
                self.next();
                self.skip_ws();
                Ok(TokenKind::NCName)
            }
            Some('@') if tok.is_empty() => {
                self.next();
                self.emit(TokenKind::AbbrAxis);
                self.skip_ws();
                Ok(TokenKind::AbbrAxis)
            }
            Some('(') if !tok.is_empty() => {
                if NODE_TYPES.contains(&tok) {
                    self.node_type(tok, offset)
                } else {
                    self.function(tok, offset)
                }
            }
            Some(found) if tok.is_empty() && matches!(found, ':' | '@' | '(') => {
                Err(XPathError::UnexpectedCharacter {
                    found,
                    offset: self.pos,
                })
            }
            _ if tok.is_empty() => Err(self.incomplete_step()),
            _ => {
                self.emit_val(TokenKind::QName, tok, offset);
                Ok(TokenKind::QName)
            }
        }
    }

    fn axis(&mut self, tok: &'a str, offset: usize) -> Result<TokenKind, XPathError> {
        if Axis::from_name(tok).is_none() {
            return Err(XPathError::InvalidAxisSpecifier {
                axis: tok.to_string(),
                offset,
            });
        }
        self.emit_val(TokenKind::Axis, tok, offset);
        self.next();
        self.next();
        self.skip_ws();
        Ok(TokenKind::Axis)
    }

    fn node_type(&mut self, tok: &'a str, offset: usize) -> Result<TokenKind, XPathError> {
        self.emit_val(TokenKind::NodeType, tok, offset);
        self.next();
        self.skip_ws();
        if tok == "processing-instruction" && matches!(self.peek(), Some('\'' | '"')) {
            self.lex_literal(TokenKind::ProcLiteral)?;
            self.skip_ws();
        }
        if self.peek() != Some(')') {
            return Err(XPathError::UnterminatedNodeType {
                node_type: tok.to_string(),
                offset,
            });
        }
        self.next();
        self.ignore();
        Ok(TokenKind::NodeType)
    }

    fn function(&mut self, tok: &'a str, offset: usize) -> Result<TokenKind, XPathError> {
        self.emit_val(TokenKind::Function, tok, offset);
        self.next();
        self.skip_ws();

        if self.peek() == Some(')') {
            self.next();
            self.emit(TokenKind::EndFunction);
            return Ok(TokenKind::Function);
        }

        self.emit_empty(TokenKind::Argument);
        loop {
            self.lex_nested()?;
            self.skip_ws();
            match self.peek() {
                Some(',') => {
                    self.next();
                    self.emit(TokenKind::Argument);
                }
                Some(')') => {
                    self.next();
                    self.emit(TokenKind::EndFunction);
                    return Ok(TokenKind::Function);
                }
                None => {
                    return Err(XPathError::UnterminatedFunctionCall {
                        function: tok.to_string(),
                        offset,
                    });
                }
                Some(found) => {
                    return Err(XPathError::UnexpectedCharacter {
                        found,
                        offset: self.pos,
                    });
                }
            }
        }
    }

    /// Decides what follows a step: more of the same step, predicates, a
    /// separator, or the end of the path.
    pub(super) fn next_path_state(&mut self, kind: TokenKind) -> Result<State, XPathError> {
        let multi_part = matches!(kind, TokenKind::Axis | TokenKind::AbbrAxis | TokenKind::NCName);
        if multi_part {
            return Ok(State::Step);
        }

        self.skip_ws();
        while self.peek() == Some('[') {
            self.predicate()?;
            self.skip_ws();
        }

        if self.peek() == Some('/') {
            if self.peek_at(1) == Some('/') {
                return Ok(State::AbbrRelLocPath);
            }
            return Ok(State::RelLocPath);
        }

        self.emit_empty(TokenKind::EndPath);
        Ok(State::Operator)
    }

    fn predicate(&mut self) -> Result<(), XPathError> {
        let open = self.pos;
        self.next();
        self.emit(TokenKind::PredicateStart);
        self.lex_nested()?;
        self.skip_ws();
        if self.peek() != Some(']') {
            return Err(XPathError::UnterminatedPredicate { offset: open });
        }
        self.next();
        self.emit(TokenKind::PredicateEnd);
        Ok(())
    }

    fn incomplete_step(&self) -> XPathError {
        match self.last_token() {
            Some(last) => XPathError::IncompleteStep {
                token: last.text.to_string(),
                offset: last.offset,
            },
            None => XPathError::IncompleteStep {
                token: String::new(),
                offset: self.pos,
            },
        }
    }
}
