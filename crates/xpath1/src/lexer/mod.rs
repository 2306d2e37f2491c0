//! A hand-rolled state machine that turns a path expression into tokens.
//!
//! Each state consumes characters, emits zero or more tokens and names the
//! next state. The linear transitions are driven by a loop in
//! [`Lexer::lex_expression`]; native recursion is only used for function
//! arguments and predicates, bounded by [`LexerOptions::max_depth`].

mod names;
mod paths;

use crate::error::XPathError;
use crate::token::{Token, TokenKind};
use names::is_step_start;

/// Tunables for a single lexer run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LexerOptions {
    /// Maximum nesting of function arguments and predicates.
    pub max_depth: usize,
}

impl Default for LexerOptions {
    fn default() -> Self {
        Self { max_depth: 32 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Start,
    AbsLocPath,
    AbbrAbsLocPath,
    RelLocPath,
    AbbrRelLocPath,
    Step,
    Operator,
    Done,
}

/// Tokenizes `input` with the default options.
pub fn tokenize(input: &str) -> Result<Vec<Token<'_>>, XPathError> {
    Lexer::new(input).run()
}

pub struct Lexer<'a> {
    input: &'a str,
    /// Start of the token currently being scanned.
    start: usize,
    pos: usize,
    depth: usize,
    options: LexerOptions,
    tokens: Vec<Token<'a>>,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self::with_options(input, LexerOptions::default())
    }

    pub fn with_options(input: &'a str, options: LexerOptions) -> Self {
        Self {
            input,
            start: 0,
            pos: 0,
            depth: 0,
            options,
            tokens: Vec::new(),
        }
    }

    /// Lexes the whole input. A lexer is consumed by a single run.
    pub fn run(mut self) -> Result<Vec<Token<'a>>, XPathError> {
        self.lex_expression()?;
        Ok(self.tokens)
    }

    fn lex_expression(&mut self) -> Result<(), XPathError> {
        let mut state = State::Start;
        loop {
            log::trace!("lexer state {:?} at offset {}", state, self.pos);
            state = match state {
                State::Start => self.start_state()?,
                State::AbsLocPath => self.abs_loc_path_state(),
                State::AbbrAbsLocPath => self.separator_state(TokenKind::AbbrAbsLocPath, 2),
                State::RelLocPath => self.separator_state(TokenKind::RelLocPath, 1),
                State::AbbrRelLocPath => self.separator_state(TokenKind::AbbrRelLocPath, 2),
                State::Step => self.step_state()?,
                State::Operator => self.operator_state()?,
                State::Done => return Ok(()),
            };
        }
    }

    /// Lexes one sub-expression one nesting level down.
    fn lex_nested(&mut self) -> Result<(), XPathError> {
        if self.depth >= self.options.max_depth {
            return Err(XPathError::NestingTooDeep {
                limit: self.options.max_depth,
            });
        }
        self.depth += 1;
        let result = self.lex_expression();
        self.depth -= 1;
        result
    }

    // --- States ---

    fn start_state(&mut self) -> Result<State, XPathError> {
        self.skip_ws();
        let Some(c) = self.peek() else {
            return Ok(State::Done);
        };

        match c {
            '/' if self.peek_at(1) == Some('/') => Ok(State::AbbrAbsLocPath),
            '/' => Ok(State::AbsLocPath),
            '\'' | '"' => {
                self.lex_literal(TokenKind::StringLiteral)?;
                Ok(State::Operator)
            }
            '0'..='9' => {
                self.lex_number();
                Ok(State::Operator)
            }
            '.' if self.peek_at(1).is_some_and(|n| n.is_ascii_digit()) => {
                self.lex_number();
                Ok(State::Operator)
            }
            '$' => self.variable_state(),
            c if is_step_start(c) => Ok(State::Step),
            found => Err(XPathError::UnexpectedCharacter {
                found,
                offset: self.pos,
            }),
        }
    }

    fn abs_loc_path_state(&mut self) -> State {
        self.next();
        self.emit(TokenKind::AbsLocPath);
        self.skip_ws();
        // A lone `/` selects the root and ends the path.
        if self.peek().is_some_and(is_step_start) {
            State::Step
        } else {
            self.emit_empty(TokenKind::EndPath);
            State::Operator
        }
    }

    fn separator_state(&mut self, kind: TokenKind, width: usize) -> State {
        for _ in 0..width {
            self.next();
        }
        self.emit(kind);
        self.skip_ws();
        State::Step
    }

    fn variable_state(&mut self) -> Result<State, XPathError> {
        let dollar = self.pos;
        self.next();
        self.ignore();
        while let Some(c) = self.peek() {
            let continues_qname = c == ':'
                && self.pos > self.start
                && self.peek_at(1).is_some_and(names::is_name_start);
            if names::is_name_char(c) || continues_qname {
                self.next();
            } else {
                break;
            }
        }
        if self.pos == self.start {
            return Err(XPathError::UnexpectedCharacter {
                found: '$',
                offset: dollar,
            });
        }
        self.emit(TokenKind::Variable);
        self.next_path_state(TokenKind::Variable)
    }

    fn operator_state(&mut self) -> Result<State, XPathError> {
        self.skip_ws();
        let Some(c) = self.peek() else {
            return Ok(State::Done);
        };

        let width = match c {
            ',' | ')' | ']' if self.depth > 0 => return Ok(State::Done),
            '=' => 1,
            '!' if self.peek_at(1) == Some('=') => 2,
            '<' | '>' if self.peek_at(1) == Some('=') => 2,
            '<' | '>' => 1,
            c if names::is_name_start(c) => {
                let word: String = self
                    .remaining()
                    .chars()
                    .take_while(|&c| names::is_name_char(c))
                    .collect();
                if word == "and" || word == "or" {
                    word.len()
                } else {
                    return Err(XPathError::UnexpectedCharacter {
                        found: c,
                        offset: self.pos,
                    });
                }
            }
            found => {
                return Err(XPathError::UnexpectedCharacter {
                    found,
                    offset: self.pos,
                });
            }
        };

        self.pos += width;
        self.emit(TokenKind::Operator);
        Ok(State::Start)
    }

    // --- Literals ---

    fn lex_literal(&mut self, kind: TokenKind) -> Result<(), XPathError> {
        let open = self.pos;
        let Some(quote) = self.next() else {
            return Err(XPathError::UnterminatedLiteral { offset: open });
        };
        self.ignore();
        loop {
            match self.next() {
                None => return Err(XPathError::UnterminatedLiteral { offset: open }),
                Some(c) if c == quote => break,
                Some(_) => {}
            }
        }
        let text = &self.input[self.start..self.pos - quote.len_utf8()];
        self.emit_val(kind, text, self.start);
        self.ignore();
        Ok(())
    }

    fn lex_number(&mut self) {
        self.ignore();
        self.skip_digits();
        if self.peek() == Some('.') {
            self.next();
            self.skip_digits();
        }
        self.emit(TokenKind::NumberLiteral);
    }

    fn skip_digits(&mut self) {
        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.next();
        }
    }

    // --- Cursor helpers ---

    fn remaining(&self) -> &'a str {
        &self.input[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.remaining().chars().next()
    }

    /// Peeks `n` characters ahead; `peek_at(0)` is `peek()`.
    fn peek_at(&self, n: usize) -> Option<char> {
        self.remaining().chars().nth(n)
    }

    fn next(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    /// Drops everything scanned since the last emit.
    fn ignore(&mut self) {
        self.start = self.pos;
    }

    fn skip_ws(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.next();
        }
        self.ignore();
    }

    fn emit(&mut self, kind: TokenKind) {
        let text = &self.input[self.start..self.pos];
        self.emit_val(kind, text, self.start);
        self.ignore();
    }

    fn emit_empty(&mut self, kind: TokenKind) {
        self.emit_val(kind, "", self.pos);
    }

    fn emit_val(&mut self, kind: TokenKind, text: &'a str, offset: usize) {
        let token = Token::new(kind, text, offset);
        log::trace!("emit {}", token);
        self.tokens.push(token);
    }

    fn last_token(&self) -> Option<&Token<'a>> {
        self.tokens.last()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::render_tokens;
    use TokenKind::*;

    fn kinds(input: &str) -> Vec<(TokenKind, String)> {
        tokenize(input)
            .unwrap()
            .into_iter()
            .map(|t| (t.kind, t.text.to_string()))
            .collect()
    }

    fn tok(kind: TokenKind, text: &str) -> (TokenKind, String) {
        (kind, text.to_string())
    }

    #[test]
    fn test_relative_path() {
        assert_eq!(
            kinds("foo/bar"),
            vec![tok(QName, "foo"), tok(RelLocPath, "/"), tok(QName, "bar"), tok(EndPath, "")]
        );
    }

    #[test]
    fn test_absolute_paths() {
        assert_eq!(
            kinds("/a//b"),
            vec![
                tok(AbsLocPath, "/"),
                tok(QName, "a"),
                tok(AbbrRelLocPath, "//"),
                tok(QName, "b"),
                tok(EndPath, ""),
            ]
        );
        assert_eq!(kinds("//*"), vec![tok(AbbrAbsLocPath, "//"), tok(QName, "*"), tok(EndPath, "")]);
        assert_eq!(kinds("/"), vec![tok(AbsLocPath, "/"), tok(EndPath, "")]);
    }

    #[test]
    fn test_axis_before_name_before_predicate() {
        assert_eq!(
            kinds("child::foo[@id='x']"),
            vec![
                tok(Axis, "child"),
                tok(QName, "foo"),
                tok(PredicateStart, "["),
                tok(AbbrAxis, "@"),
                tok(QName, "id"),
                tok(EndPath, ""),
                tok(Operator, "="),
                tok(StringLiteral, "x"),
                tok(PredicateEnd, "]"),
                tok(EndPath, ""),
            ]
        );
    }

    #[test]
    fn test_whitespace_around_axis_separator() {
        assert_eq!(
            kinds(" ancestor :: node ( ) "),
            vec![tok(Axis, "ancestor"), tok(NodeType, "node"), tok(EndPath, "")]
        );
    }

    #[test]
    fn test_namespace_prefix() {
        assert_eq!(
            kinds("xsl:template/p:*"),
            vec![
                tok(NCName, "xsl"),
                tok(QName, "template"),
                tok(RelLocPath, "/"),
                tok(NCName, "p"),
                tok(QName, "*"),
                tok(EndPath, ""),
            ]
        );
    }

    #[test]
    fn test_abbreviated_steps() {
        assert_eq!(
            kinds(".././/@*"),
            vec![
                tok(QName, ".."),
                tok(RelLocPath, "/"),
                tok(QName, "."),
                tok(AbbrRelLocPath, "//"),
                tok(AbbrAxis, "@"),
                tok(QName, "*"),
                tok(EndPath, ""),
            ]
        );
    }

    #[test]
    fn test_processing_instruction_literal() {
        assert_eq!(
            kinds("processing-instruction('xml-stylesheet')"),
            vec![
                tok(NodeType, "processing-instruction"),
                tok(ProcLiteral, "xml-stylesheet"),
                tok(EndPath, ""),
            ]
        );
    }

    #[test]
    fn test_function_arguments() {
        assert_eq!(
            kinds("concat(a, 'b', count(c/d))"),
            vec![
                tok(Function, "concat"),
                tok(Argument, ""),
                tok(QName, "a"),
                tok(EndPath, ""),
                tok(Argument, ","),
                tok(StringLiteral, "b"),
                tok(Argument, ","),
                tok(Function, "count"),
                tok(Argument, ""),
                tok(QName, "c"),
                tok(RelLocPath, "/"),
                tok(QName, "d"),
                tok(EndPath, ""),
                tok(EndFunction, ")"),
                tok(EndPath, ""),
                tok(EndFunction, ")"),
                tok(EndPath, ""),
            ]
        );
        assert_eq!(
            kinds("last()"),
            vec![tok(Function, "last"), tok(EndFunction, ")"), tok(EndPath, "")]
        );
    }

    #[test]
    fn test_operators_and_scalars() {
        assert_eq!(
            kinds("$n >= 1.5 and .5 != 'x' or name() = \"y\""),
            vec![
                tok(Variable, "n"),
                tok(EndPath, ""),
                tok(Operator, ">="),
                tok(NumberLiteral, "1.5"),
                tok(Operator, "and"),
                tok(NumberLiteral, ".5"),
                tok(Operator, "!="),
                tok(StringLiteral, "x"),
                tok(Operator, "or"),
                tok(Function, "name"),
                tok(EndFunction, ")"),
                tok(EndPath, ""),
                tok(Operator, "="),
                tok(StringLiteral, "y"),
            ]
        );
    }

    #[test]
    fn test_variable_path() {
        assert_eq!(
            kinds("$items/item"),
            vec![tok(Variable, "items"), tok(RelLocPath, "/"), tok(QName, "item"), tok(EndPath, "")]
        );
    }

    #[test]
    fn test_offsets() {
        let tokens = tokenize("a / b").unwrap();
        let offsets: Vec<usize> = tokens.iter().map(|t| t.offset).collect();
        assert_eq!(offsets, vec![0, 2, 4, 5]);
    }

    #[test]
    fn test_invalid_axis() {
        assert_eq!(
            tokenize("a::b").unwrap_err(),
            XPathError::InvalidAxisSpecifier {
                axis: "a".to_string(),
                offset: 0
            }
        );
    }

    #[test]
    fn test_unterminated_function_call() {
        assert!(matches!(
            tokenize("foo(").unwrap_err(),
            XPathError::UnterminatedFunctionCall { ref function, offset: 0 } if function == "foo"
        ));
        assert!(matches!(
            tokenize("concat('a', 'b'").unwrap_err(),
            XPathError::UnterminatedFunctionCall { .. }
        ));
    }

    #[test]
    fn test_incomplete_steps() {
        for input in ["child::", "ns:", "@", "child::/foo", "foo/"] {
            assert!(
                matches!(tokenize(input), Err(XPathError::IncompleteStep { .. })),
                "expected IncompleteStep for {input:?}"
            );
        }
    }

    #[test]
    fn test_unterminated_node_type() {
        assert!(matches!(
            tokenize("text(").unwrap_err(),
            XPathError::UnterminatedNodeType { ref node_type, .. } if node_type == "text"
        ));
        assert!(matches!(
            tokenize("processing-instruction('a'").unwrap_err(),
            XPathError::UnterminatedNodeType { .. }
        ));
    }

    #[test]
    fn test_other_errors() {
        assert_eq!(
            tokenize("foo[1").unwrap_err(),
            XPathError::UnterminatedPredicate { offset: 3 }
        );
        assert_eq!(
            tokenize("'abc").unwrap_err(),
            XPathError::UnterminatedLiteral { offset: 0 }
        );
        assert_eq!(
            tokenize("a + b").unwrap_err(),
            XPathError::UnexpectedCharacter { found: '+', offset: 2 }
        );
        assert_eq!(
            tokenize("a)").unwrap_err(),
            XPathError::UnexpectedCharacter { found: ')', offset: 1 }
        );
        assert!(matches!(
            tokenize("foo bar"),
            Err(XPathError::UnexpectedCharacter { found: 'b', .. })
        ));
    }

    #[test]
    fn test_wildcard_is_a_whole_name_test() {
        assert_eq!(kinds("*"), vec![tok(QName, "*"), tok(EndPath, "")]);
        assert_eq!(
            kinds("p:*"),
            vec![tok(NCName, "p"), tok(QName, "*"), tok(EndPath, "")]
        );
        assert_eq!(
            tokenize("a*b").unwrap_err(),
            XPathError::UnexpectedCharacter { found: '*', offset: 1 }
        );
        assert_eq!(
            tokenize("*:x").unwrap_err(),
            XPathError::UnexpectedCharacter { found: ':', offset: 1 }
        );
        assert_eq!(
            tokenize("*()").unwrap_err(),
            XPathError::UnexpectedCharacter { found: '(', offset: 1 }
        );
    }

    #[test]
    fn test_nesting_limit() {
        let options = LexerOptions { max_depth: 2 };
        assert!(Lexer::with_options("f(g(1))", options).run().is_ok());
        assert_eq!(
            Lexer::with_options("f(g(h(1)))", options).run().unwrap_err(),
            XPathError::NestingTooDeep { limit: 2 }
        );
        assert_eq!(
            Lexer::with_options("a[b[c[1]]]", options).run().unwrap_err(),
            XPathError::NestingTooDeep { limit: 2 }
        );
    }

    #[test]
    fn test_render_reconstructs_input() {
        for input in [
            "/a/b",
            "//para[@type='warning'][1]",
            "child::foo[@id='x']",
            "ancestor-or-self::node()",
            "p:item/@xml:lang",
            "processing-instruction('pi')",
            "count(//a)>=2 and not(b)",
            "../following-sibling::*[position()=last()]",
            "$v/item",
        ] {
            let rendered = render_tokens(&tokenize(input).unwrap());
            assert_eq!(rendered, input);
            assert_eq!(kinds(&rendered), kinds(input));
        }
    }

    #[test]
    fn test_empty_input() {
        assert!(tokenize("").unwrap().is_empty());
        assert!(tokenize("   ").unwrap().is_empty());
    }
}
