use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum XPathError {
    #[error("Invalid axis specifier '{axis}' at offset {offset}")]
    InvalidAxisSpecifier { axis: String, offset: usize },

    #[error("Step is not complete after '{token}' at offset {offset}")]
    IncompleteStep { token: String, offset: usize },

    #[error("Missing ) at end of node type test '{node_type}' at offset {offset}")]
    UnterminatedNodeType { node_type: String, offset: usize },

    #[error("Missing ) at end of function declaration '{function}' at offset {offset}")]
    UnterminatedFunctionCall { function: String, offset: usize },

    #[error("Missing ] at end of predicate opened at offset {offset}")]
    UnterminatedPredicate { offset: usize },

    #[error("Unterminated string literal starting at offset {offset}")]
    UnterminatedLiteral { offset: usize },

    #[error("Unexpected character '{found}' at offset {offset}")]
    UnexpectedCharacter { found: char, offset: usize },

    #[error("Expression nesting exceeds the limit of {limit}")]
    NestingTooDeep { limit: usize },

    #[error("XPath parse error in '{0}': {1}")]
    XPathParse(String, String),

    #[error("Function '{function}' error: {message}")]
    FunctionError { function: String, message: String },

    #[error("Conversion error: {0}")]
    ConversionError(String),

    #[error("Variable '{0}' not found")]
    UnknownVariable(String),

    #[error("Inconsistent tree adapter: {0}")]
    InconsistentTreeAdapter(String),
}
