//! Contains pure functions for evaluating comparison and logical operators.
//!
//! Comparisons involving a node-set are existential: the result is true when
//! some node in the set satisfies the comparison.

use crate::ast::{ComparisonOperator, LogicalOperator};
use crate::datasource::DataSourceNode;
use crate::value::{XPathValue, parse_number};

pub fn compare<'a, N: DataSourceNode<'a>>(
    op: ComparisonOperator,
    left: &XPathValue<N>,
    right: &XPathValue<N>,
) -> bool {
    match (left, right) {
        (XPathValue::NodeSet(l), XPathValue::NodeSet(r)) => {
            let right_values: Vec<String> = r.iter().map(|n| n.string_value()).collect();
            l.iter().any(|ln| {
                let lv = ln.string_value();
                right_values.iter().any(|rv| compare_strings(op, &lv, rv))
            })
        }
        (XPathValue::NodeSet(nodes), other) => compare_node_set(op, nodes, other),
        (other, XPathValue::NodeSet(nodes)) => compare_node_set(flip(op), nodes, other),
        _ => compare_scalars(op, left, right),
    }
}

pub fn logical<'a, N: DataSourceNode<'a>>(
    op: LogicalOperator,
    left: &XPathValue<N>,
    right: &XPathValue<N>,
) -> bool {
    match op {
        LogicalOperator::Or => left.to_bool() || right.to_bool(),
        LogicalOperator::And => left.to_bool() && right.to_bool(),
    }
}

/// Swaps the operands of a relational operator, so `a < b` becomes `b > a`.
fn flip(op: ComparisonOperator) -> ComparisonOperator {
    use ComparisonOperator::*;
    match op {
        LessThan => GreaterThan,
        LessThanOrEqual => GreaterThanOrEqual,
        GreaterThan => LessThan,
        GreaterThanOrEqual => LessThanOrEqual,
        eq => eq,
    }
}

fn compare_node_set<'a, N: DataSourceNode<'a>>(
    op: ComparisonOperator,
    nodes: &[N],
    other: &XPathValue<N>,
) -> bool {
    match other {
        XPathValue::Boolean(b) => compare_numbers(op, bool_number(!nodes.is_empty()), bool_number(*b)),
        XPathValue::Number(n) => nodes
            .iter()
            .any(|node| compare_numbers(op, parse_number(&node.string_value()), *n)),
        XPathValue::String(s) => nodes
            .iter()
            .any(|node| compare_strings(op, &node.string_value(), s)),
        XPathValue::NodeSet(_) => false,
    }
}

fn compare_scalars<'a, N: DataSourceNode<'a>>(
    op: ComparisonOperator,
    left: &XPathValue<N>,
    right: &XPathValue<N>,
) -> bool {
    if !op.is_equality() {
        return compare_numbers(op, left.to_number(), right.to_number());
    }
    let equal = match (left, right) {
        (XPathValue::Boolean(_), _) | (_, XPathValue::Boolean(_)) => {
            left.to_bool() == right.to_bool()
        }
        (XPathValue::Number(_), _) | (_, XPathValue::Number(_)) => {
            left.to_number() == right.to_number()
        }
        _ => left.to_string() == right.to_string(),
    };
    equal == (op == ComparisonOperator::Equals)
}

fn compare_strings(op: ComparisonOperator, left: &str, right: &str) -> bool {
    match op {
        ComparisonOperator::Equals => left == right,
        ComparisonOperator::NotEquals => left != right,
        _ => compare_numbers(op, parse_number(left), parse_number(right)),
    }
}

fn compare_numbers(op: ComparisonOperator, left: f64, right: f64) -> bool {
    use ComparisonOperator::*;
    match op {
        Equals => left == right,
        NotEquals => left != right,
        LessThan => left < right,
        LessThanOrEqual => left <= right,
        GreaterThan => left > right,
        GreaterThanOrEqual => left >= right,
    }
}

fn bool_number(b: bool) -> f64 {
    if b { 1.0 } else { 0.0 }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datasource::tests::{MockNode, create_test_tree};
    use ComparisonOperator::*;

    type Value<'a> = XPathValue<MockNode<'a>>;

    #[test]
    fn test_logical_operators() {
        let t = Value::Boolean(true);
        let f = Value::Boolean(false);
        assert!(logical(LogicalOperator::Or, &t, &f));
        assert!(!logical(LogicalOperator::And, &t, &f));
        assert!(logical(LogicalOperator::And, &Value::String("x".into()), &Value::Number(1.0)));
    }

    #[test]
    fn test_scalar_equality() {
        let hello = Value::String("hello".into());
        let world = Value::String("world".into());
        assert!(compare(NotEquals, &hello, &world));
        assert!(compare(Equals, &hello, &hello));
        assert!(compare(Equals, &Value::Number(1.0), &Value::String("1.0".into())));
        assert!(compare(Equals, &Value::Boolean(true), &Value::String("x".into())));
        assert!(!compare(Equals, &Value::Number(f64::NAN), &Value::Number(f64::NAN)));
    }

    #[test]
    fn test_relational_operators() {
        assert!(compare(LessThan, &Value::Number(1.0), &Value::String("2".into())));
        assert!(compare(GreaterThanOrEqual, &Value::Number(2.0), &Value::Number(2.0)));
        assert!(!compare(GreaterThan, &Value::String("a".into()), &Value::Number(0.0)));
    }

    #[test]
    fn test_node_set_comparisons_are_existential() {
        let tree = create_test_tree();
        // Both para elements: "Hello" and "World".
        let paras = Value::NodeSet(vec![tree.node(1), tree.node(11)]);
        assert!(compare(Equals, &paras, &Value::String("World".into())));
        assert!(compare(NotEquals, &paras, &Value::String("World".into())));
        assert!(!compare(Equals, &paras, &Value::String("Inner".into())));
        assert!(!compare(Equals, &Value::NodeSet(vec![]), &Value::String("".into())));
        assert!(compare(Equals, &paras, &Value::Boolean(true)));
        assert!(compare(Equals, &Value::NodeSet(vec![]), &Value::Boolean(false)));
    }

    #[test]
    fn test_node_set_against_node_set() {
        let tree = create_test_tree();
        let div = Value::NodeSet(vec![tree.node(7)]);
        let span = Value::NodeSet(vec![tree.node(8), tree.node(1)]);
        assert!(compare(Equals, &div, &span));
        assert!(!compare(Equals, &div, &Value::NodeSet(vec![])));
    }

    #[test]
    fn test_node_set_on_the_right_flips_relation() {
        let tree = create_test_tree();
        // Attribute "p1" is not numeric, so no comparison holds.
        let id = Value::NodeSet(vec![tree.node(3)]);
        assert!(!compare(LessThan, &Value::Number(0.0), &id));
        assert_eq!(flip(LessThan), GreaterThan);
        assert_eq!(flip(Equals), Equals);
    }
}
