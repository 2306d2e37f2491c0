//! Query XML documents with XPath location paths.
//!
//! This crate ties the `petty-xpath1` engine to the `petty-xmltree` adapter
//! and shapes results for the `petty-xpath` binary.

pub mod error;

pub use error::CliError;

use petty_xmltree::{XmlDocument, XmlNode};
use petty_xpath1::{
    DataSourceNode, EvaluationContext, FunctionRegistry, LexerOptions, NodeType, XPathValue,
    evaluate, parse_expression_with,
};
use petty_xpath1::value::format_number;
use serde::Serialize;
use std::collections::HashMap;

/// Settings for a single query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryOptions {
    pub max_depth: usize,
    /// Fail on undeclared variables instead of treating them as empty strings.
    pub strict: bool,
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self {
            max_depth: LexerOptions::default().max_depth,
            strict: false,
        }
    }
}

impl QueryOptions {
    fn lexer_options(&self) -> LexerOptions {
        LexerOptions {
            max_depth: self.max_depth,
        }
    }
}

/// One selected node, flattened for output.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeRecord {
    pub kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub value: String,
}

/// The result of a query, tagged by its XPath type.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "kebab-case")]
pub enum QueryResult {
    NodeSet(Vec<NodeRecord>),
    String(String),
    Number(f64),
    Boolean(bool),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TokenRecord {
    pub kind: String,
    pub text: String,
    pub offset: usize,
}

/// Lexes `expr` without evaluating it.
pub fn tokens(expr: &str, options: QueryOptions) -> Result<Vec<TokenRecord>, CliError> {
    let tokens = petty_xpath1::Lexer::with_options(expr, options.lexer_options()).run()?;
    Ok(tokens
        .into_iter()
        .map(|t| TokenRecord {
            kind: format!("{:?}", t.kind),
            text: t.text.to_string(),
            offset: t.offset,
        })
        .collect())
}

/// Evaluates `expr` with the document root as both context and root node.
pub fn query(expr: &str, xml: &str, options: QueryOptions) -> Result<QueryResult, CliError> {
    let functions = FunctionRegistry::default();
    let parsed = parse_expression_with(expr, &functions, options.lexer_options())?;
    let doc = XmlDocument::parse(xml)?;
    let root = doc.root_node();
    let variables = HashMap::new();
    let e_ctx =
        EvaluationContext::new(root, root, &functions, &variables).with_strict(options.strict);

    let result = match evaluate(&parsed, &e_ctx)? {
        XPathValue::NodeSet(nodes) => {
            log::info!("'{}' selected {} node(s)", expr, nodes.len());
            QueryResult::NodeSet(nodes.into_iter().map(node_record).collect())
        }
        XPathValue::String(s) => QueryResult::String(s),
        XPathValue::Number(n) => QueryResult::Number(n),
        XPathValue::Boolean(b) => QueryResult::Boolean(b),
    };
    Ok(result)
}

fn node_record<'a>(node: XmlNode<'a, 'a>) -> NodeRecord {
    let kind = match node.node_type() {
        NodeType::Root => "root",
        NodeType::Element => "element",
        NodeType::Attribute => "attribute",
        NodeType::Namespace => "namespace",
        NodeType::Text => "text",
        NodeType::Comment => "comment",
        NodeType::ProcessingInstruction => "processing-instruction",
    };
    let name = node.name().map(|q| match q.prefix {
        Some(prefix) => format!("{}:{}", prefix, q.local_part),
        None => q.local_part.to_string(),
    });
    NodeRecord {
        kind,
        name,
        value: node.string_value(),
    }
}

// --- Rendering ---

/// Plain text output: one line per node, or the scalar itself.
pub fn render_text(result: &QueryResult) -> String {
    match result {
        QueryResult::NodeSet(nodes) => nodes
            .iter()
            .map(|n| match &n.name {
                Some(name) => format!("{} {}\t{}", n.kind, name, n.value),
                None => format!("{}\t{}", n.kind, n.value),
            })
            .collect::<Vec<_>>()
            .join("\n"),
        QueryResult::String(s) => s.clone(),
        QueryResult::Number(n) => format_number(*n),
        QueryResult::Boolean(b) => b.to_string(),
    }
}

pub fn render_json<T: Serialize>(value: &T) -> Result<String, CliError> {
    Ok(serde_json::to_string_pretty(value)?)
}

pub fn render_tokens_text(tokens: &[TokenRecord]) -> String {
    tokens
        .iter()
        .map(|t| format!("{:>4}  {:<16} {:?}", t.offset, t.kind, t.text))
        .collect::<Vec<_>>()
        .join("\n")
}
