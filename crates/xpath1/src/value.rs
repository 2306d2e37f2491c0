//! The result of evaluating an expression and its XPath 1.0 coercions.

use crate::datasource::DataSourceNode;
use crate::error::XPathError;
use std::fmt;

/// Represents the possible result types of an XPath expression evaluation.
#[derive(Debug, Clone, PartialEq)]
pub enum XPathValue<N> {
    NodeSet(Vec<N>),
    String(String),
    Number(f64),
    Boolean(bool),
}

impl<'a, N: DataSourceNode<'a>> XPathValue<N> {
    /// Coerces the value to a boolean as per XPath 1.0 rules.
    pub fn to_bool(&self) -> bool {
        match self {
            XPathValue::NodeSet(nodes) => !nodes.is_empty(),
            XPathValue::String(s) => !s.is_empty(),
            XPathValue::Number(n) => *n != 0.0 && !n.is_nan(),
            XPathValue::Boolean(b) => *b,
        }
    }

    /// Coerces the value to a number as per XPath 1.0 rules. A node-set
    /// converts through the string value of its first node in document order.
    pub fn to_number(&self) -> f64 {
        match self {
            XPathValue::Number(n) => *n,
            XPathValue::String(s) => parse_number(s),
            XPathValue::Boolean(true) => 1.0,
            XPathValue::Boolean(false) => 0.0,
            XPathValue::NodeSet(nodes) => nodes
                .iter()
                .min()
                .map_or(f64::NAN, |n| parse_number(&n.string_value())),
        }
    }

    /// Unwraps a node-set, failing for any scalar.
    pub fn expect_node_set(self, what: &str) -> Result<Vec<N>, XPathError> {
        match self {
            XPathValue::NodeSet(nodes) => Ok(nodes),
            other => Err(XPathError::ConversionError(format!(
                "{} must be a node-set, found {}",
                what,
                other.type_name()
            ))),
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            XPathValue::NodeSet(_) => "node-set",
            XPathValue::String(_) => "string",
            XPathValue::Number(_) => "number",
            XPathValue::Boolean(_) => "boolean",
        }
    }
}

impl<'a, N: DataSourceNode<'a>> fmt::Display for XPathValue<N> {
    /// Coerces the value to a string as per XPath 1.0 rules.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            XPathValue::NodeSet(nodes) => match nodes.iter().min() {
                Some(n) => f.write_str(&n.string_value()),
                None => Ok(()),
            },
            XPathValue::String(s) => f.write_str(s),
            XPathValue::Number(n) => f.write_str(&format_number(*n)),
            XPathValue::Boolean(b) => write!(f, "{}", b),
        }
    }
}

/// Parses the XPath `Number` production, surrounded by optional
/// whitespace. Anything else is NaN.
pub fn parse_number(s: &str) -> f64 {
    let trimmed = s.trim();
    let digits = trimmed.strip_prefix('-').unwrap_or(trimmed);
    let mut parts = digits.splitn(2, '.');
    let int_part = parts.next().unwrap_or_default();
    let frac_part = parts.next();

    let all_digits = |p: &str| p.chars().all(|c| c.is_ascii_digit());
    let well_formed = all_digits(int_part)
        && frac_part.is_none_or(all_digits)
        && (!int_part.is_empty() || frac_part.is_some_and(|p| !p.is_empty()));

    if !well_formed {
        return f64::NAN;
    }
    trimmed.parse().unwrap_or(f64::NAN)
}

/// Formats a number the way `string()` does: integers without a
/// fractional part, and `NaN`/`Infinity` spelled out.
pub fn format_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string()
    } else if n == 0.0 {
        "0".to_string()
    } else if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datasource::tests::{MockNode, create_test_tree};

    type Value<'a> = XPathValue<MockNode<'a>>;

    #[test]
    fn test_to_bool() {
        let tree = create_test_tree();
        assert!(Value::NodeSet(vec![tree.node(1)]).to_bool());
        assert!(!Value::NodeSet(vec![]).to_bool());
        assert!(!Value::String(String::new()).to_bool());
        assert!(Value::String("false".into()).to_bool());
        assert!(!Value::Number(f64::NAN).to_bool());
        assert!(!Value::Number(-0.0).to_bool());
        assert!(Value::Number(0.1).to_bool());
    }

    #[test]
    fn test_to_number() {
        let tree = create_test_tree();
        assert_eq!(Value::String(" 12.5 ".into()).to_number(), 12.5);
        assert_eq!(Value::String("-.5".into()).to_number(), -0.5);
        assert!(Value::String("1e3".into()).to_number().is_nan());
        assert!(Value::String("inf".into()).to_number().is_nan());
        assert!(Value::String(".".into()).to_number().is_nan());
        assert_eq!(Value::Boolean(true).to_number(), 1.0);
        // "Hello" is not numeric.
        assert!(Value::NodeSet(vec![tree.node(1)]).to_number().is_nan());
        assert!(Value::NodeSet(vec![]).to_number().is_nan());
    }

    #[test]
    fn test_to_string() {
        let tree = create_test_tree();
        // The first node in document order wins, not the first in the list.
        assert_eq!(Value::NodeSet(vec![tree.node(11), tree.node(1)]).to_string(), "Hello");
        assert_eq!(Value::NodeSet(vec![]).to_string(), "");
        assert_eq!(Value::Number(3.0).to_string(), "3");
        assert_eq!(Value::Number(-0.0).to_string(), "0");
        assert_eq!(Value::Number(2.5).to_string(), "2.5");
        assert_eq!(Value::Number(f64::NEG_INFINITY).to_string(), "-Infinity");
        assert_eq!(Value::Number(f64::NAN).to_string(), "NaN");
        assert_eq!(Value::Boolean(false).to_string(), "false");
    }

    #[test]
    fn test_expect_node_set() {
        let tree = create_test_tree();
        let nodes = Value::NodeSet(vec![tree.node(5)]).expect_node_set("arg").unwrap();
        assert_eq!(nodes, vec![tree.node(5)]);
        assert!(matches!(
            Value::Number(1.0).expect_node_set("arg"),
            Err(XPathError::ConversionError(_))
        ));
    }
}
