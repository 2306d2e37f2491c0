//! An XPath 1.0 location path lexer, parser and axis evaluation engine over
//! any tree that implements [`DataSourceNode`].

pub mod ast;
pub mod axes;
pub mod datasource;
pub mod engine;
pub mod error;
pub mod functions;
pub mod lexer;
pub mod operators;
pub mod parser;
pub mod token;
pub mod value;

pub use ast::{Axis, Expression, LocationPath, NodeTest, NodeTypeTest, Step};
pub use datasource::{DataSourceNode, NodeType, QName};
pub use engine::{EvaluationContext, evaluate, evaluate_location_path, find};
pub use functions::FunctionRegistry;
pub use lexer::{Lexer, LexerOptions, tokenize};
pub use token::{Token, TokenKind, render_tokens};
pub use value::XPathValue;

// Re-export test utilities for integration testing in downstream crates
pub use datasource::tests;
pub use error::XPathError;
pub use parser::{parse_expression, parse_expression_with};
