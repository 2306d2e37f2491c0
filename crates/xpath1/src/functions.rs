//! Defines the registry and built-in implementations for XPath 1.0 functions.

use crate::datasource::{DataSourceNode, find_attribute};
use crate::engine::EvaluationContext;
use crate::error::XPathError;
use crate::value::XPathValue;
use language_tags::LanguageTag;
use std::collections::HashMap;

/// How many arguments a function accepts. `max` is `None` for variadics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Arity {
    pub min: usize,
    pub max: Option<usize>,
}

impl Arity {
    pub fn accepts(&self, count: usize) -> bool {
        count >= self.min && self.max.is_none_or(|max| count <= max)
    }

    fn describe(&self) -> String {
        match self.max {
            Some(max) if max == self.min => format!("Expected {} argument(s)", max),
            Some(max) => format!("Expected {} to {} arguments", self.min, max),
            None => format!("Expected at least {} arguments", self.min),
        }
    }
}

/// The names and arities of the functions an expression may call.
pub struct FunctionRegistry {
    functions: HashMap<&'static str, Arity>,
}

impl FunctionRegistry {
    pub fn new() -> Self {
        Self {
            functions: HashMap::new(),
        }
    }

    pub fn register(&mut self, name: &'static str, min: usize, max: Option<usize>) {
        self.functions.insert(name, Arity { min, max });
    }

    pub fn get(&self, name: &str) -> Option<Arity> {
        self.functions.get(name).copied()
    }

    /// Fails unless `name` is registered and accepts `count` arguments.
    pub fn check_call(&self, name: &str, count: usize) -> Result<(), XPathError> {
        let arity = self.get(name).ok_or_else(|| XPathError::FunctionError {
            function: name.to_string(),
            message: "Unknown XPath function".to_string(),
        })?;
        if arity.accepts(count) {
            Ok(())
        } else {
            Err(XPathError::FunctionError {
                function: format!("{}()", name),
                message: arity.describe(),
            })
        }
    }
}

impl Default for FunctionRegistry {
    fn default() -> Self {
        let mut registry = Self::new();
        // Boolean
        registry.register("boolean", 1, Some(1));
        registry.register("not", 1, Some(1));
        registry.register("true", 0, Some(0));
        registry.register("false", 0, Some(0));
        registry.register("lang", 1, Some(1));
        // Number
        registry.register("number", 0, Some(1));
        registry.register("sum", 1, Some(1));
        registry.register("floor", 1, Some(1));
        registry.register("ceiling", 1, Some(1));
        registry.register("round", 1, Some(1));
        // Node-set
        registry.register("string", 0, Some(1));
        registry.register("count", 1, Some(1));
        registry.register("position", 0, Some(0));
        registry.register("last", 0, Some(0));
        registry.register("local-name", 0, Some(1));
        registry.register("name", 0, Some(1));
        // String
        registry.register("concat", 2, None);
        registry.register("contains", 2, Some(2));
        registry.register("starts-with", 2, Some(2));
        registry.register("string-length", 0, Some(1));
        registry.register("normalize-space", 0, Some(1));
        registry
    }
}

/// Dispatches a function call to the correct implementation.
pub fn evaluate_function<'a, 'd, N: DataSourceNode<'a>>(
    name: &str,
    args: Vec<XPathValue<N>>,
    e_ctx: &EvaluationContext<'a, 'd, N>,
) -> Result<XPathValue<N>, XPathError> {
    e_ctx.functions.check_call(name, args.len())?;

    match name {
        // Boolean
        "boolean" => func_boolean(args),
        "not" => func_not(args),
        "true" => Ok(XPathValue::Boolean(true)),
        "false" => Ok(XPathValue::Boolean(false)),
        "lang" => func_lang(args, e_ctx),

        // Number
        "number" => func_number(args, e_ctx),
        "sum" => func_sum(args),
        "floor" => Ok(XPathValue::Number(first_number(args).floor())),
        "ceiling" => Ok(XPathValue::Number(first_number(args).ceil())),
        "round" => Ok(XPathValue::Number(round(first_number(args)))),

        // Node-set
        "string" => Ok(XPathValue::String(string_or_context(args, e_ctx))),
        "count" => func_count(args),
        "position" => Ok(XPathValue::Number(e_ctx.context_position as f64)),
        "last" => Ok(XPathValue::Number(e_ctx.context_size as f64)),
        "local-name" => func_local_name(args, e_ctx),
        "name" => func_name(args, e_ctx),

        // String
        "concat" => Ok(XPathValue::String(
            args.iter().map(|a| a.to_string()).collect(),
        )),
        "contains" => func_contains(args),
        "starts-with" => func_starts_with(args),
        "string-length" => {
            let s = string_or_context(args, e_ctx);
            Ok(XPathValue::Number(s.chars().count() as f64))
        }
        "normalize-space" => {
            let s = string_or_context(args, e_ctx);
            let normalized = s.split_whitespace().collect::<Vec<_>>().join(" ");
            Ok(XPathValue::String(normalized))
        }

        // Registered by a caller but without an implementation here.
        _ => Err(XPathError::FunctionError {
            function: name.to_string(),
            message: "No implementation for registered function".to_string(),
        }),
    }
}

// --- Helpers ---

fn first_number<'a, N: DataSourceNode<'a>>(args: Vec<XPathValue<N>>) -> f64 {
    args.first().map_or(f64::NAN, |a| a.to_number())
}

fn string_or_context<'a, 'd, N: DataSourceNode<'a>>(
    mut args: Vec<XPathValue<N>>,
    e_ctx: &EvaluationContext<'a, 'd, N>,
) -> String {
    if args.is_empty() {
        e_ctx.context_node.string_value()
    } else {
        args.remove(0).to_string()
    }
}

/// The node a name function reports on: the first argument node in
/// document order, or the context node with no argument.
fn subject_node<'a, 'd, N: DataSourceNode<'a>>(
    mut args: Vec<XPathValue<N>>,
    function: &str,
    e_ctx: &EvaluationContext<'a, 'd, N>,
) -> Result<Option<N>, XPathError> {
    if args.is_empty() {
        return Ok(Some(e_ctx.context_node));
    }
    let nodes = args.remove(0).expect_node_set(&format!("{}() argument", function))?;
    Ok(nodes.into_iter().min())
}

/// XPath rounding: NaN and infinities pass through, values within half of
/// zero become zero, and everything else rounds half away from zero.
pub fn round(n: f64) -> f64 {
    if n.is_nan() || n.is_infinite() {
        n
    } else if (-0.5..=0.5).contains(&n) {
        0.0
    } else {
        n.round()
    }
}

// --- Boolean Functions ---

fn func_boolean<'a, N: DataSourceNode<'a>>(
    args: Vec<XPathValue<N>>,
) -> Result<XPathValue<N>, XPathError> {
    Ok(XPathValue::Boolean(args.iter().any(|a| a.to_bool())))
}

fn func_not<'a, N: DataSourceNode<'a>>(
    args: Vec<XPathValue<N>>,
) -> Result<XPathValue<N>, XPathError> {
    Ok(XPathValue::Boolean(!args.iter().any(|a| a.to_bool())))
}

fn func_lang<'a, 'd, N: DataSourceNode<'a>>(
    mut args: Vec<XPathValue<N>>,
    e_ctx: &EvaluationContext<'a, 'd, N>,
) -> Result<XPathValue<N>, XPathError> {
    let requested = args.remove(0).to_string();
    let mut current = Some(e_ctx.context_node);

    // If context node is not an element, start with its parent.
    if current.is_some_and(|n| !n.is_element()) {
        current = current.and_then(|n| n.parent());
    }

    while let Some(node) = current {
        if let Some(attr) = find_attribute(node, Some("xml"), "lang") {
            // The nearest xml:lang decides, matching or not.
            return Ok(XPathValue::Boolean(language_matches(
                &attr.string_value(),
                &requested,
            )));
        }
        current = node.parent();
    }
    Ok(XPathValue::Boolean(false))
}

/// Basic language-range matching: `en` matches `en` and `en-GB`, but
/// `en-GB` never matches a bare `en`. Both sides must be well-formed
/// BCP 47 tags. Subtags compare without regard to ASCII case.
pub fn language_matches(tag: &str, range: &str) -> bool {
    let (Ok(tag), Ok(range)) = (LanguageTag::parse(tag), LanguageTag::parse(range)) else {
        return false;
    };
    let mut tag_subtags = tag.as_str().split('-');
    range
        .as_str()
        .split('-')
        .all(|wanted| tag_subtags.next().is_some_and(|t| t.eq_ignore_ascii_case(wanted)))
}

// --- Number Functions ---

fn func_number<'a, 'd, N: DataSourceNode<'a>>(
    args: Vec<XPathValue<N>>,
    e_ctx: &EvaluationContext<'a, 'd, N>,
) -> Result<XPathValue<N>, XPathError> {
    let n = match args.first() {
        Some(arg) => arg.to_number(),
        None => XPathValue::NodeSet(vec![e_ctx.context_node]).to_number(),
    };
    Ok(XPathValue::Number(n))
}

fn func_sum<'a, N: DataSourceNode<'a>>(
    mut args: Vec<XPathValue<N>>,
) -> Result<XPathValue<N>, XPathError> {
    let nodes = args.remove(0).expect_node_set("sum() argument")?;
    let total = nodes
        .into_iter()
        .map(|n| XPathValue::NodeSet(vec![n]).to_number())
        .sum();
    Ok(XPathValue::Number(total))
}

// --- Node-Set Functions ---

fn func_count<'a, N: DataSourceNode<'a>>(
    mut args: Vec<XPathValue<N>>,
) -> Result<XPathValue<N>, XPathError> {
    let nodes = args.remove(0).expect_node_set("count() argument")?;
    Ok(XPathValue::Number(nodes.len() as f64))
}

fn func_local_name<'a, 'd, N: DataSourceNode<'a>>(
    args: Vec<XPathValue<N>>,
    e_ctx: &EvaluationContext<'a, 'd, N>,
) -> Result<XPathValue<N>, XPathError> {
    let name = subject_node(args, "local-name", e_ctx)?
        .and_then(|n| n.name())
        .map(|q| q.local_part.to_string())
        .unwrap_or_default();
    Ok(XPathValue::String(name))
}

fn func_name<'a, 'd, N: DataSourceNode<'a>>(
    args: Vec<XPathValue<N>>,
    e_ctx: &EvaluationContext<'a, 'd, N>,
) -> Result<XPathValue<N>, XPathError> {
    let name = subject_node(args, "name", e_ctx)?
        .and_then(|n| n.name())
        .map(|q| match q.prefix {
            Some(prefix) => format!("{}:{}", prefix, q.local_part),
            None => q.local_part.to_string(),
        })
        .unwrap_or_default();
    Ok(XPathValue::String(name))
}

// --- String Functions ---

fn func_contains<'a, N: DataSourceNode<'a>>(
    mut args: Vec<XPathValue<N>>,
) -> Result<XPathValue<N>, XPathError> {
    let needle = args.remove(1).to_string();
    let haystack = args.remove(0).to_string();
    Ok(XPathValue::Boolean(haystack.contains(&needle)))
}

fn func_starts_with<'a, N: DataSourceNode<'a>>(
    mut args: Vec<XPathValue<N>>,
) -> Result<XPathValue<N>, XPathError> {
    let prefix = args.remove(1).to_string();
    let s = args.remove(0).to_string();
    Ok(XPathValue::Boolean(s.starts_with(&prefix)))
}
