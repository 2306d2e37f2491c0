//! Builds an [`Expression`] from the token stream produced by the lexer.
//!
//! Precedence, loosest first: `or`, `and`, equality, relational, then
//! primaries (literals, numbers, variables, function calls and location
//! paths). Abbreviated steps are expanded here, so the engine only ever
//! sees explicit axes.

use crate::ast::{
    Axis, ComparisonOperator, Expression, LocationPath, LogicalOperator, NodeTest, NodeTypeTest,
    Step,
};
use crate::error::XPathError;
use crate::functions::FunctionRegistry;
use crate::lexer::{Lexer, LexerOptions};
use crate::token::{Token, TokenKind};

/// Parses `input` with the built-in function set and default lexer options.
pub fn parse_expression(input: &str) -> Result<Expression, XPathError> {
    parse_expression_with(input, &FunctionRegistry::default(), LexerOptions::default())
}

/// Parses `input`, checking every function call against `functions`.
pub fn parse_expression_with(
    input: &str,
    functions: &FunctionRegistry,
    options: LexerOptions,
) -> Result<Expression, XPathError> {
    let tokens = Lexer::with_options(input, options).run()?;
    let mut parser = Parser {
        input,
        tokens: &tokens,
        pos: 0,
        functions,
    };

    if tokens.is_empty() {
        return Err(parser.error("empty expression"));
    }
    let expr = parser.parse_or()?;
    match parser.peek() {
        Some(token) => Err(parser.unexpected(token)),
        None => Ok(expr),
    }
}

struct Parser<'t, 'a> {
    input: &'a str,
    tokens: &'t [Token<'a>],
    pos: usize,
    functions: &'t FunctionRegistry,
}

impl<'t, 'a> Parser<'t, 'a> {
    // --- Operators ---

    fn parse_or(&mut self) -> Result<Expression, XPathError> {
        let mut left = self.parse_and()?;
        while self.eat_operator(|op| op == "or").is_some() {
            let right = self.parse_and()?;
            left = logical(left, LogicalOperator::Or, right);
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> Result<Expression, XPathError> {
        let mut left = self.parse_equality()?;
        while self.eat_operator(|op| op == "and").is_some() {
            let right = self.parse_equality()?;
            left = logical(left, LogicalOperator::And, right);
        }
        Ok(left)
    }

    fn parse_equality(&mut self) -> Result<Expression, XPathError> {
        let mut left = self.parse_relational()?;
        while let Some(op) = self.eat_comparison(true) {
            let right = self.parse_relational()?;
            left = comparison(left, op, right);
        }
        Ok(left)
    }

    fn parse_relational(&mut self) -> Result<Expression, XPathError> {
        let mut left = self.parse_primary()?;
        while let Some(op) = self.eat_comparison(false) {
            let right = self.parse_primary()?;
            left = comparison(left, op, right);
        }
        Ok(left)
    }

    fn eat_comparison(&mut self, equality: bool) -> Option<ComparisonOperator> {
        let op = self
            .peek()
            .filter(|t| t.is(TokenKind::Operator))
            .and_then(|t| ComparisonOperator::from_symbol(t.text))
            .filter(|op| op.is_equality() == equality)?;
        self.pos += 1;
        Some(op)
    }

    fn eat_operator(&mut self, accept: impl Fn(&str) -> bool) -> Option<Token<'a>> {
        let token = self
            .peek()
            .filter(|t| t.is(TokenKind::Operator) && accept(t.text))?;
        self.pos += 1;
        Some(token)
    }

    // --- Primaries ---

    fn parse_primary(&mut self) -> Result<Expression, XPathError> {
        let Some(token) = self.peek() else {
            return Err(self.error("unexpected end of expression"));
        };
        match token.kind {
            TokenKind::StringLiteral => {
                self.pos += 1;
                Ok(Expression::Literal(token.text.to_string()))
            }
            TokenKind::NumberLiteral => {
                self.pos += 1;
                let n = token
                    .text
                    .parse()
                    .map_err(|_| self.error(format!("invalid number '{}'", token.text)))?;
                Ok(Expression::Number(n))
            }
            TokenKind::Variable => {
                self.pos += 1;
                let primary = Expression::Variable(token.text.to_string());
                self.parse_filter_path(primary)
            }
            TokenKind::Function => {
                let call = self.parse_function_call(None)?;
                self.parse_filter_path(call)
            }
            TokenKind::NCName if self.peek_kind_at(1) == Some(TokenKind::Function) => {
                self.pos += 1;
                let call = self.parse_function_call(Some(token.text))?;
                self.parse_filter_path(call)
            }
            TokenKind::Operator
            | TokenKind::Argument
            | TokenKind::EndFunction
            | TokenKind::PredicateStart
            | TokenKind::PredicateEnd
            | TokenKind::EndPath
            | TokenKind::ProcLiteral => Err(self.unexpected(token)),
            _ => self.parse_location_path().map(Expression::LocationPath),
        }
    }

    fn parse_function_call(&mut self, prefix: Option<&str>) -> Result<Expression, XPathError> {
        let token = self.expect(TokenKind::Function)?;
        let name = match prefix {
            Some(prefix) => format!("{}:{}", prefix, token.text),
            None => token.text.to_string(),
        };

        let mut args = Vec::new();
        loop {
            let next = self.advance()?;
            match next.kind {
                TokenKind::EndFunction => break,
                TokenKind::Argument => args.push(self.parse_or()?),
                _ => return Err(self.unexpected(next)),
            }
        }

        self.functions.check_call(&name, args.len())?;
        Ok(Expression::FunctionCall { name, args })
    }

    /// Continues a variable or function call with predicates and steps.
    /// Without either, the primary is returned unchanged.
    fn parse_filter_path(&mut self, primary: Expression) -> Result<Expression, XPathError> {
        let predicates = self.parse_predicates()?;
        let mut steps = Vec::new();
        loop {
            let next = self.advance()?;
            match next.kind {
                TokenKind::EndPath => break,
                TokenKind::RelLocPath => steps.push(self.parse_step()?),
                TokenKind::AbbrRelLocPath => {
                    steps.push(Step::descendant_or_self_node());
                    steps.push(self.parse_step()?);
                }
                _ => return Err(self.unexpected(next)),
            }
        }

        if predicates.is_empty() && steps.is_empty() {
            return Ok(primary);
        }
        Ok(Expression::FilterPath {
            primary: Box::new(primary),
            predicates,
            steps,
        })
    }

    // --- Location Paths ---

    fn parse_location_path(&mut self) -> Result<LocationPath, XPathError> {
        let mut is_absolute = false;
        let mut steps = Vec::new();

        match self.peek_kind_at(0) {
            Some(TokenKind::AbsLocPath) => {
                self.pos += 1;
                is_absolute = true;
                if self.peek_kind_at(0) == Some(TokenKind::EndPath) {
                    self.pos += 1;
                    return Ok(LocationPath { is_absolute, steps });
                }
            }
            Some(TokenKind::AbbrAbsLocPath) => {
                self.pos += 1;
                is_absolute = true;
                steps.push(Step::descendant_or_self_node());
            }
            _ => {}
        }

        steps.push(self.parse_step()?);
        loop {
            let next = self.advance()?;
            match next.kind {
                TokenKind::EndPath => break,
                TokenKind::RelLocPath => steps.push(self.parse_step()?),
                TokenKind::AbbrRelLocPath => {
                    steps.push(Step::descendant_or_self_node());
                    steps.push(self.parse_step()?);
                }
                _ => return Err(self.unexpected(next)),
            }
        }
        Ok(LocationPath { is_absolute, steps })
    }

    fn parse_step(&mut self) -> Result<Step, XPathError> {
        let explicit_axis = match self.peek() {
            Some(t) if t.is(TokenKind::Axis) => {
                self.pos += 1;
                let axis = Axis::from_name(t.text)
                    .ok_or_else(|| self.error(format!("unknown axis '{}'", t.text)))?;
                Some(axis)
            }
            Some(t) if t.is(TokenKind::AbbrAxis) => {
                self.pos += 1;
                Some(Axis::Attribute)
            }
            _ => None,
        };
        let axis = explicit_axis.unwrap_or(Axis::Child);

        let token = self.advance()?;
        let mut step = match token.kind {
            TokenKind::QName if token.text == "." || token.text == ".." => {
                if explicit_axis.is_some() {
                    return Err(self.error(format!(
                        "abbreviated step '{}' cannot take an axis",
                        token.text
                    )));
                }
                let axis = if token.text == "." {
                    Axis::SelfAxis
                } else {
                    Axis::Parent
                };
                Step::new(axis, NodeTest::NodeType(NodeTypeTest::Node))
            }
            TokenKind::QName if token.text == "*" => Step::new(axis, NodeTest::Wildcard),
            TokenKind::QName => Step::new(axis, NodeTest::name(token.text)),
            TokenKind::NCName => {
                let local = self.expect(TokenKind::QName)?;
                Step::new(axis, NodeTest::prefixed(token.text, local.text))
            }
            TokenKind::NodeType => Step::new(axis, NodeTest::NodeType(self.node_type_test(token)?)),
            _ => return Err(self.unexpected(token)),
        };

        step.predicates = self.parse_predicates()?;
        Ok(step)
    }

    fn node_type_test(&mut self, token: Token<'a>) -> Result<NodeTypeTest, XPathError> {
        Ok(match token.text {
            "text" => NodeTypeTest::Text,
            "node" => NodeTypeTest::Node,
            "comment" => NodeTypeTest::Comment,
            "processing-instruction" => {
                let target = match self.peek() {
                    Some(t) if t.is(TokenKind::ProcLiteral) => {
                        self.pos += 1;
                        Some(t.text.to_string())
                    }
                    _ => None,
                };
                NodeTypeTest::ProcessingInstruction(target)
            }
            other => return Err(self.error(format!("unknown node type '{}'", other))),
        })
    }

    fn parse_predicates(&mut self) -> Result<Vec<Expression>, XPathError> {
        let mut predicates = Vec::new();
        while self.peek_kind_at(0) == Some(TokenKind::PredicateStart) {
            self.pos += 1;
            predicates.push(self.parse_or()?);
            self.expect(TokenKind::PredicateEnd)?;
        }
        Ok(predicates)
    }

    // --- Cursor Helpers ---

    fn peek(&self) -> Option<Token<'a>> {
        self.tokens.get(self.pos).copied()
    }

    fn peek_kind_at(&self, n: usize) -> Option<TokenKind> {
        self.tokens.get(self.pos + n).map(|t| t.kind)
    }

    fn advance(&mut self) -> Result<Token<'a>, XPathError> {
        let token = self
            .peek()
            .ok_or_else(|| self.error("unexpected end of expression"))?;
        self.pos += 1;
        Ok(token)
    }

    fn expect(&mut self, kind: TokenKind) -> Result<Token<'a>, XPathError> {
        let token = self.advance()?;
        if token.is(kind) {
            Ok(token)
        } else {
            Err(self.unexpected(token))
        }
    }

    fn error(&self, message: impl Into<String>) -> XPathError {
        XPathError::XPathParse(self.input.to_string(), message.into())
    }

    fn unexpected(&self, token: Token<'a>) -> XPathError {
        self.error(format!(
            "unexpected {:?} '{}' at offset {}",
            token.kind, token.text, token.offset
        ))
    }
}

fn logical(left: Expression, op: LogicalOperator, right: Expression) -> Expression {
    Expression::Logical {
        left: Box::new(left),
        op,
        right: Box::new(right),
    }
}

fn comparison(left: Expression, op: ComparisonOperator, right: Expression) -> Expression {
    Expression::Comparison {
        left: Box::new(left),
        op,
        right: Box::new(right),
    }
}
