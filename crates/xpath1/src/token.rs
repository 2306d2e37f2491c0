//! The lexical vocabulary produced by the lexer and consumed by the parser.

use std::fmt;

/// The kind of a lexical unit in a path expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// `/` opening an absolute location path.
    AbsLocPath,
    /// `//` opening an absolute location path.
    AbbrAbsLocPath,
    /// `/` between two steps.
    RelLocPath,
    /// `//` between two steps.
    AbbrRelLocPath,
    /// An element or attribute name, `*`, `.` or `..`.
    QName,
    /// A namespace prefix followed by a single `:`.
    NCName,
    /// One of the thirteen axis names followed by `::`.
    Axis,
    /// The abbreviated attribute axis `@`.
    AbbrAxis,
    /// `comment`, `text`, `processing-instruction` or `node` followed by `()`.
    NodeType,
    /// The optional target literal of `processing-instruction('target')`.
    ProcLiteral,
    Function,
    /// Opens each argument of a function call.
    Argument,
    EndFunction,
    StringLiteral,
    NumberLiteral,
    Variable,
    Operator,
    PredicateStart,
    PredicateEnd,
    EndPath,
}

/// A single token. `text` borrows from the lexed input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: TokenKind,
    pub text: &'a str,
    /// Byte offset of the token in the input.
    pub offset: usize,
}

impl<'a> Token<'a> {
    pub fn new(kind: TokenKind, text: &'a str, offset: usize) -> Self {
        Self { kind, text, offset }
    }

    pub fn is(&self, kind: TokenKind) -> bool {
        self.kind == kind
    }
}

impl fmt::Display for Token<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}({:?})@{}", self.kind, self.text, self.offset)
    }
}

/// Re-serializes a token stream into an equivalent path expression.
///
/// Whitespace is normalized away except around word operators, and string
/// literals are always re-quoted with the quote character they cannot contain.
pub fn render_tokens(tokens: &[Token<'_>]) -> String {
    let mut out = String::new();
    // Each entry is true once the function at that depth has seen its first argument.
    let mut open_calls: Vec<bool> = Vec::new();

    for token in tokens {
        match token.kind {
            TokenKind::AbsLocPath | TokenKind::RelLocPath => out.push('/'),
            TokenKind::AbbrAbsLocPath | TokenKind::AbbrRelLocPath => out.push_str("//"),
            TokenKind::QName | TokenKind::NumberLiteral => out.push_str(token.text),
            TokenKind::NCName => {
                out.push_str(token.text);
                out.push(':');
            }
            TokenKind::Axis => {
                out.push_str(token.text);
                out.push_str("::");
            }
            TokenKind::AbbrAxis => out.push('@'),
            TokenKind::NodeType => {
                out.push_str(token.text);
                out.push_str("()");
            }
            TokenKind::ProcLiteral => {
                // Reopen the `()` just written so the target sits inside it.
                out.pop();
                push_quoted(&mut out, token.text);
                out.push(')');
            }
            TokenKind::Function => {
                out.push_str(token.text);
                out.push('(');
                open_calls.push(false);
            }
            TokenKind::Argument => {
                if let Some(seen_first) = open_calls.last_mut() {
                    if *seen_first {
                        out.push(',');
                    }
                    *seen_first = true;
                }
            }
            TokenKind::EndFunction => {
                open_calls.pop();
                out.push(')');
            }
            TokenKind::StringLiteral => push_quoted(&mut out, token.text),
            TokenKind::Variable => {
                out.push('$');
                out.push_str(token.text);
            }
            TokenKind::Operator => {
                if token.text.chars().all(char::is_alphabetic) {
                    out.push(' ');
                    out.push_str(token.text);
                    out.push(' ');
                } else {
                    out.push_str(token.text);
                }
            }
            TokenKind::PredicateStart => out.push('['),
            TokenKind::PredicateEnd => out.push(']'),
            TokenKind::EndPath => {}
        }
    }
    out
}

fn push_quoted(out: &mut String, text: &str) {
    let quote = if text.contains('\'') { '"' } else { '\'' };
    out.push(quote);
    out.push_str(text);
    out.push(quote);
}
