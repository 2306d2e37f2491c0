//! The evaluation engine for executing a parsed AST against a generic `DataSourceNode`.

use crate::ast::{Axis, Expression, LocationPath, LogicalOperator, NodeTest, NodeTypeTest, Step};
use crate::datasource::{DataSourceNode, NodeType};
use crate::error::XPathError;
use crate::functions::{self, FunctionRegistry};
use crate::value::XPathValue;
use crate::{axes, operators};
use std::collections::HashMap;
use std::marker::PhantomData;

/// A container for all state needed during expression evaluation.
/// `'a` is the lifetime of the underlying data source.
/// `'d` is the lifetime of the evaluation context itself.
pub struct EvaluationContext<'a, 'd, N: DataSourceNode<'a>> {
    pub context_node: N,
    pub root_node: N,
    pub functions: &'d FunctionRegistry,
    pub context_position: usize, // 1-based index
    pub context_size: usize,
    pub variables: &'d HashMap<String, XPathValue<N>>,
    /// If true, an undeclared variable is an error instead of an empty string.
    pub strict: bool,
    _marker: PhantomData<&'a ()>,
}

impl<'a, 'd, N: DataSourceNode<'a>> EvaluationContext<'a, 'd, N> {
    pub fn new(
        context_node: N,
        root_node: N,
        functions: &'d FunctionRegistry,
        variables: &'d HashMap<String, XPathValue<N>>,
    ) -> Self {
        Self {
            context_node,
            root_node,
            functions,
            context_position: 1,
            context_size: 1,
            variables,
            strict: false,
            _marker: PhantomData,
        }
    }

    pub fn with_position(mut self, position: usize, size: usize) -> Self {
        self.context_position = position;
        self.context_size = size;
        self
    }

    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// A context for evaluating a predicate against one node of a list.
    fn for_node(&self, node: N, position: usize, size: usize) -> Self {
        Self {
            context_node: node,
            root_node: self.root_node,
            functions: self.functions,
            context_position: position,
            context_size: size,
            variables: self.variables,
            strict: self.strict,
            _marker: PhantomData,
        }
    }
}

/// Evaluates a compiled expression and returns a concrete `XPathValue`.
pub fn evaluate<'a, N>(
    expr: &Expression,
    e_ctx: &EvaluationContext<'a, '_, N>,
) -> Result<XPathValue<N>, XPathError>
where
    N: DataSourceNode<'a> + 'a,
{
    match expr {
        Expression::Literal(s) => Ok(XPathValue::String(s.clone())),
        Expression::Number(n) => Ok(XPathValue::Number(*n)),
        Expression::LocationPath(path) => {
            let nodes = evaluate_location_path(path, e_ctx)?;
            Ok(XPathValue::NodeSet(nodes))
        }
        Expression::Variable(name) => match e_ctx.variables.get(name) {
            Some(value) => Ok(value.clone()),
            None if e_ctx.strict => Err(XPathError::UnknownVariable(name.clone())),
            None => Ok(XPathValue::String(String::new())),
        },
        Expression::FunctionCall { name, args } => {
            let mut evaluated_args = Vec::with_capacity(args.len());
            for arg in args {
                evaluated_args.push(evaluate(arg, e_ctx)?);
            }
            functions::evaluate_function(name, evaluated_args, e_ctx)
        }
        Expression::FilterPath {
            primary,
            predicates,
            steps,
        } => {
            let mut nodes = evaluate(primary, e_ctx)?.expect_node_set("filtered expression")?;
            // Filter predicates count positions in document order.
            nodes.sort();
            nodes.dedup();
            let filtered = apply_predicates(nodes, predicates, e_ctx)?;
            Ok(XPathValue::NodeSet(evaluate_steps(filtered, steps, e_ctx)?))
        }
        Expression::Comparison { left, op, right } => {
            let left_val = evaluate(left, e_ctx)?;
            let right_val = evaluate(right, e_ctx)?;
            Ok(XPathValue::Boolean(operators::compare(*op, &left_val, &right_val)))
        }
        Expression::Logical { left, op, right } => {
            let left_val = evaluate(left, e_ctx)?;
            // The right operand is not evaluated once the left decides.
            match (op, left_val.to_bool()) {
                (LogicalOperator::Or, true) => Ok(XPathValue::Boolean(true)),
                (LogicalOperator::And, false) => Ok(XPathValue::Boolean(false)),
                _ => {
                    let right_val = evaluate(right, e_ctx)?;
                    Ok(XPathValue::Boolean(operators::logical(*op, &left_val, &right_val)))
                }
            }
        }
    }
}

/// Evaluates a location path from the context node, or from the root when
/// the path is absolute.
pub fn evaluate_location_path<'a, N>(
    path: &LocationPath,
    e_ctx: &EvaluationContext<'a, '_, N>,
) -> Result<Vec<N>, XPathError>
where
    N: DataSourceNode<'a> + 'a,
{
    let start = if path.is_absolute {
        e_ctx.root_node
    } else {
        e_ctx.context_node
    };
    evaluate_steps(vec![start], &path.steps, e_ctx)
}

/// Applies each step to every node of the current set. Results from
/// different context nodes are merged into document order without duplicates.
fn evaluate_steps<'a, N>(
    start: Vec<N>,
    steps: &[Step],
    e_ctx: &EvaluationContext<'a, '_, N>,
) -> Result<Vec<N>, XPathError>
where
    N: DataSourceNode<'a> + 'a,
{
    let mut current = start;
    for step in steps {
        let mut next = Vec::new();
        for &node in &current {
            next.extend(find(node, step, e_ctx)?);
        }
        next.sort();
        next.dedup();
        log::debug!(
            "step {}::{:?} selected {} node(s) from {} context node(s)",
            step.axis,
            step.node_test,
            next.len(),
            current.len()
        );
        current = next;
    }
    Ok(current)
}

/// Evaluates one step from a single context node.
///
/// The result is in axis order: document order for forward axes and
/// nearest-first for reverse axes. Nodes are not deduplicated.
pub fn find<'a, N>(
    node: N,
    step: &Step,
    e_ctx: &EvaluationContext<'a, '_, N>,
) -> Result<Vec<N>, XPathError>
where
    N: DataSourceNode<'a> + 'a,
{
    let mut candidates = Vec::new();
    let matches = |n: N| matches_node_test(n, &step.node_test, step.axis);
    axes::collect(step.axis, node, &matches, &mut candidates)?;
    apply_predicates(candidates, &step.predicates, e_ctx)
}

/// Tests a node against a `NodeTest` as seen from `axis`.
pub fn matches_node_test<'a, N: DataSourceNode<'a>>(node: N, test: &NodeTest, axis: Axis) -> bool {
    let principal = match axis {
        Axis::Attribute => NodeType::Attribute,
        Axis::Namespace => NodeType::Namespace,
        _ => NodeType::Element,
    };
    match test {
        NodeTest::Wildcard => node.node_type() == principal,
        NodeTest::Name { prefix, local } => {
            node.node_type() == principal
                && node.name().is_some_and(|q| {
                    let prefix_ok = prefix.as_deref().is_none_or(|p| q.prefix == Some(p));
                    prefix_ok && (local == "*" || q.local_part == local.as_str())
                })
        }
        NodeTest::NodeType(ntt) => match ntt {
            NodeTypeTest::Text => node.node_type() == NodeType::Text,
            NodeTypeTest::Comment => node.node_type() == NodeType::Comment,
            NodeTypeTest::ProcessingInstruction(target) => {
                node.node_type() == NodeType::ProcessingInstruction
                    && target.as_deref().is_none_or(|t| {
                        node.name().is_some_and(|q| q.local_part == t)
                    })
            }
            NodeTypeTest::Node => true,
        },
    }
}

/// Filters a list by each predicate in turn. Proximity positions follow
/// the list order, which is axis order when called from `find`.
fn apply_predicates<'a, N>(
    nodes: Vec<N>,
    predicates: &[Expression],
    e_ctx: &EvaluationContext<'a, '_, N>,
) -> Result<Vec<N>, XPathError>
where
    N: DataSourceNode<'a> + 'a,
{
    let mut final_nodes = nodes;
    for predicate in predicates {
        let context_size = final_nodes.len();
        let mut predicate_results = Vec::new();
        for (i, node) in final_nodes.into_iter().enumerate() {
            let predicate_e_ctx = e_ctx.for_node(node, i + 1, context_size);
            let keep = match evaluate(predicate, &predicate_e_ctx)? {
                XPathValue::Number(n) => n == (i + 1) as f64,
                other => other.to_bool(),
            };
            if keep {
                predicate_results.push(node);
            }
        }
        final_nodes = predicate_results;
    }
    Ok(final_nodes)
}
