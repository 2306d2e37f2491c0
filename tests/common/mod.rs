#![allow(dead_code)]

use petty_xmltree::{XmlDocument, XmlNode};
use petty_xpath1::{
    Axis, DataSourceNode, EvaluationContext, FunctionRegistry, XPathValue, axes, evaluate,
    parse_expression,
};
use std::collections::HashMap;

pub type TestResult = Result<(), Box<dyn std::error::Error>>;

/// A catalogue with attributes, namespaces, mixed content and a comment.
pub const CATALOGUE_XML: &str = r#"<catalogue xmlns:dc="http://purl.org/dc/elements/1.1/" xml:lang="en-GB">
    <section id="s1">
        <book id="b1" price="12.5"><dc:title>Dune</dc:title><year>1965</year></book>
        <book id="b2" price="7"><dc:title>Emma</dc:title><year>1815</year></book>
        <!-- restock -->
    </section>
    <section id="s2">
        <book id="b3" price="-0.5"><dc:title>Ulysses</dc:title></book>
        <note>mixed <em>content</em> here<?render inline?></note>
    </section>
</catalogue>"#;

pub const SIBLINGS_XML: &str = "<r><a/><b/><c/></r>";

/// All nodes along `axis` from `node`, unfiltered.
pub fn axis_nodes<'a>(axis: Axis, node: XmlNode<'a, 'a>) -> Vec<XmlNode<'a, 'a>> {
    let mut out = Vec::new();
    axes::collect(axis, node, &|_| true, &mut out).unwrap();
    out
}

/// Every tree node reachable through child links, in document order.
/// Attribute and namespace nodes are not included.
pub fn tree_nodes<'a>(doc: &'a XmlDocument<'a>) -> Vec<XmlNode<'a, 'a>> {
    axis_nodes(Axis::DescendantOrSelf, doc.root_node())
}

/// Evaluates `xpath` with the document root as the context node.
pub fn eval<'a>(doc: &'a XmlDocument<'a>, xpath: &str) -> XPathValue<XmlNode<'a, 'a>> {
    let root = doc.root_node();
    let funcs = FunctionRegistry::default();
    let vars = HashMap::new();
    let e_ctx = EvaluationContext::new(root, root, &funcs, &vars);
    let expr = parse_expression(xpath).unwrap();
    evaluate(&expr, &e_ctx).unwrap()
}

/// Selects the nodes of a location path from the document root.
pub fn select<'a>(doc: &'a XmlDocument<'a>, xpath: &str) -> Vec<XmlNode<'a, 'a>> {
    match eval(doc, xpath) {
        XPathValue::NodeSet(nodes) => nodes,
        other => panic!("'{}' did not select nodes: {:?}", xpath, other),
    }
}

pub fn local_name<'a>(node: XmlNode<'a, 'a>) -> &'a str {
    node.name().map(|q| q.local_part).unwrap_or("")
}
