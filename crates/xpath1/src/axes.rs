//! Contains the traversal for each XPath axis.
//!
//! Every collector walks the tree from one context node and pushes each
//! candidate for which `matches` returns true. Forward axes push in
//! document order, reverse axes push nearest-first. Nothing is
//! deduplicated here.

use crate::ast::Axis;
use crate::datasource::{DataSourceNode, NodeType};
use crate::error::XPathError;

/// Collects the nodes along `axis` from `node` that satisfy `matches`.
pub fn collect<'a, N, F>(
    axis: Axis,
    node: N,
    matches: &F,
    results: &mut Vec<N>,
) -> Result<(), XPathError>
where
    N: DataSourceNode<'a>,
    F: Fn(N) -> bool,
{
    match axis {
        Axis::Child => collect_child_nodes(node, matches, results),
        Axis::Parent => collect_parent_nodes(node, matches, results),
        Axis::Ancestor => collect_ancestor_nodes(node, matches, results),
        Axis::AncestorOrSelf => {
            collect_self_nodes(node, matches, results);
            collect_ancestor_nodes(node, matches, results);
        }
        Axis::Descendant => collect_descendant_nodes(node, matches, results),
        Axis::DescendantOrSelf => collect_descendant_or_self_nodes(node, matches, results),
        Axis::Following => collect_following_nodes(node, matches, results)?,
        Axis::FollowingSibling => collect_following_sibling_nodes(node, matches, results)?,
        Axis::Preceding => collect_preceding_nodes(node, matches, results)?,
        Axis::PrecedingSibling => collect_preceding_sibling_nodes(node, matches, results)?,
        Axis::Attribute => collect_attribute_nodes(node, matches, results),
        Axis::Namespace => collect_namespace_nodes(node, matches, results),
        Axis::SelfAxis => collect_self_nodes(node, matches, results),
    }
    Ok(())
}

fn push_if<'a, N, F>(node: N, matches: &F, results: &mut Vec<N>)
where
    N: DataSourceNode<'a>,
    F: Fn(N) -> bool,
{
    if matches(node) {
        results.push(node);
    }
}

pub fn collect_self_nodes<'a, N, F>(node: N, matches: &F, results: &mut Vec<N>)
where
    N: DataSourceNode<'a>,
    F: Fn(N) -> bool,
{
    push_if(node, matches, results);
}

pub fn collect_child_nodes<'a, N, F>(node: N, matches: &F, results: &mut Vec<N>)
where
    N: DataSourceNode<'a>,
    F: Fn(N) -> bool,
{
    for child in node.children() {
        push_if(child, matches, results);
    }
}

pub fn collect_attribute_nodes<'a, N, F>(node: N, matches: &F, results: &mut Vec<N>)
where
    N: DataSourceNode<'a>,
    F: Fn(N) -> bool,
{
    if node.is_element() {
        for attr in node.attributes() {
            push_if(attr, matches, results);
        }
    }
}

pub fn collect_namespace_nodes<'a, N, F>(node: N, matches: &F, results: &mut Vec<N>)
where
    N: DataSourceNode<'a>,
    F: Fn(N) -> bool,
{
    if node.is_element() {
        for ns in node.namespaces() {
            push_if(ns, matches, results);
        }
    }
}

/// Pre-order walk of all strict descendants.
pub fn collect_descendant_nodes<'a, N, F>(node: N, matches: &F, results: &mut Vec<N>)
where
    N: DataSourceNode<'a>,
    F: Fn(N) -> bool,
{
    for child in node.children() {
        push_if(child, matches, results);
        collect_descendant_nodes(child, matches, results);
    }
}

pub fn collect_descendant_or_self_nodes<'a, N, F>(node: N, matches: &F, results: &mut Vec<N>)
where
    N: DataSourceNode<'a>,
    F: Fn(N) -> bool,
{
    push_if(node, matches, results);
    collect_descendant_nodes(node, matches, results);
}

/// The subtree rooted at `node` in reverse document order: the last
/// descendant first and `node` itself last.
fn collect_subtree_reversed<'a, N, F>(node: N, matches: &F, results: &mut Vec<N>)
where
    N: DataSourceNode<'a>,
    F: Fn(N) -> bool,
{
    let children: Vec<N> = node.children().collect();
    for &child in children.iter().rev() {
        collect_subtree_reversed(child, matches, results);
    }
    push_if(node, matches, results);
}

pub fn collect_parent_nodes<'a, N, F>(node: N, matches: &F, results: &mut Vec<N>)
where
    N: DataSourceNode<'a>,
    F: Fn(N) -> bool,
{
    if let Some(parent) = node.parent() {
        push_if(parent, matches, results);
    }
}

pub fn collect_ancestor_nodes<'a, N, F>(node: N, matches: &F, results: &mut Vec<N>)
where
    N: DataSourceNode<'a>,
    F: Fn(N) -> bool,
{
    let mut current = node.parent();
    while let Some(p) = current {
        push_if(p, matches, results);
        current = p.parent();
    }
}

pub fn collect_following_sibling_nodes<'a, N, F>(
    node: N,
    matches: &F,
    results: &mut Vec<N>,
) -> Result<(), XPathError>
where
    N: DataSourceNode<'a>,
    F: Fn(N) -> bool,
{
    if let Some((siblings, index)) = locate_among_siblings(node)? {
        for &sibling in &siblings[index + 1..] {
            push_if(sibling, matches, results);
        }
    }
    Ok(())
}

pub fn collect_preceding_sibling_nodes<'a, N, F>(
    node: N,
    matches: &F,
    results: &mut Vec<N>,
) -> Result<(), XPathError>
where
    N: DataSourceNode<'a>,
    F: Fn(N) -> bool,
{
    if let Some((siblings, index)) = locate_among_siblings(node)? {
        for &sibling in siblings[..index].iter().rev() {
            push_if(sibling, matches, results);
        }
    }
    Ok(())
}

/// Everything after `node` in document order, excluding its descendants.
pub fn collect_following_nodes<'a, N, F>(
    node: N,
    matches: &F,
    results: &mut Vec<N>,
) -> Result<(), XPathError>
where
    N: DataSourceNode<'a>,
    F: Fn(N) -> bool,
{
    let mut current = node;
    if is_owned_by_element(node) {
        // The owner's children come after its attributes and namespaces.
        let Some(owner) = node.parent() else {
            return Ok(());
        };
        collect_descendant_nodes(owner, matches, results);
        current = owner;
    }

    while let Some((siblings, index)) = locate_among_siblings(current)? {
        for &sibling in &siblings[index + 1..] {
            collect_descendant_or_self_nodes(sibling, matches, results);
        }
        current = siblings_parent(current);
    }
    Ok(())
}

/// Everything before `node` in document order, excluding its ancestors,
/// nearest first.
pub fn collect_preceding_nodes<'a, N, F>(
    node: N,
    matches: &F,
    results: &mut Vec<N>,
) -> Result<(), XPathError>
where
    N: DataSourceNode<'a>,
    F: Fn(N) -> bool,
{
    let mut current = node;
    if is_owned_by_element(node) {
        // The owner element is an ancestor, so it is skipped.
        let Some(owner) = node.parent() else {
            return Ok(());
        };
        current = owner;
    }

    while let Some((siblings, index)) = locate_among_siblings(current)? {
        for &sibling in siblings[..index].iter().rev() {
            collect_subtree_reversed(sibling, matches, results);
        }
        current = siblings_parent(current);
    }
    Ok(())
}

fn is_owned_by_element<'a, N: DataSourceNode<'a>>(node: N) -> bool {
    matches!(node.node_type(), NodeType::Attribute | NodeType::Namespace)
}

fn siblings_parent<'a, N: DataSourceNode<'a>>(node: N) -> N {
    // Only called after `locate_among_siblings` found a parent.
    node.parent().unwrap_or(node)
}

/// Returns the children of `node`'s parent and `node`'s index among them,
/// or `None` at the root. Attribute and namespace nodes have no siblings.
fn locate_among_siblings<'a, N: DataSourceNode<'a>>(
    node: N,
) -> Result<Option<(Vec<N>, usize)>, XPathError> {
    if is_owned_by_element(node) {
        return Ok(None);
    }
    let Some(parent) = node.parent() else {
        return Ok(None);
    };
    let siblings: Vec<N> = parent.children().collect();
    match siblings.iter().position(|&s| s == node) {
        Some(index) => Ok(Some((siblings, index))),
        None => {
            log::warn!("{:?} is missing from the children of its parent {:?}", node, parent);
            Err(XPathError::InconsistentTreeAdapter(format!(
                "{:?} is not among the children of its parent {:?}",
                node, parent
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datasource::tests::{MockNode, create_test_tree};

    fn all<'a>(axis: Axis, node: MockNode<'a>) -> Vec<usize> {
        let mut results = Vec::new();
        collect(axis, node, &|_| true, &mut results).unwrap();
        results.into_iter().map(|n| n.id).collect()
    }

    #[test]
    fn test_collect_child() {
        let tree = create_test_tree();
        assert_eq!(all(Axis::Child, tree.node(0)), vec![1, 6, 7, 10, 11]);
        assert!(all(Axis::Child, tree.node(5)).is_empty());
    }

    #[test]
    fn test_collect_parent() {
        let tree = create_test_tree();
        assert_eq!(all(Axis::Parent, tree.node(9)), vec![8]);
        assert_eq!(all(Axis::Parent, tree.node(3)), vec![1]);
        assert!(all(Axis::Parent, tree.node(0)).is_empty());
    }

    #[test]
    fn test_collect_ancestor() {
        let tree = create_test_tree();
        assert_eq!(all(Axis::Ancestor, tree.node(9)), vec![8, 7, 0]);
        assert_eq!(all(Axis::AncestorOrSelf, tree.node(9)), vec![9, 8, 7, 0]);
        assert!(all(Axis::Ancestor, tree.node(0)).is_empty());
    }

    #[test]
    fn test_collect_descendant_in_document_order() {
        let tree = create_test_tree();
        assert_eq!(
            all(Axis::Descendant, tree.node(0)),
            vec![1, 5, 6, 7, 8, 9, 10, 11, 12]
        );
        assert_eq!(all(Axis::DescendantOrSelf, tree.node(7)), vec![7, 8, 9]);
    }

    #[test]
    fn test_collect_siblings() {
        let tree = create_test_tree();
        assert_eq!(all(Axis::FollowingSibling, tree.node(1)), vec![6, 7, 10, 11]);
        assert_eq!(all(Axis::PrecedingSibling, tree.node(11)), vec![10, 7, 6, 1]);
        assert!(all(Axis::FollowingSibling, tree.node(0)).is_empty());
        assert!(all(Axis::PrecedingSibling, tree.node(3)).is_empty());
    }

    #[test]
    fn test_collect_following_preceding() {
        let tree = create_test_tree();
        // Following of "Hello" are its parent's later siblings with their subtrees.
        assert_eq!(all(Axis::Following, tree.node(5)), vec![6, 7, 8, 9, 10, 11, 12]);
        // Preceding of "Inner" skips the ancestors div and span.
        assert_eq!(all(Axis::Preceding, tree.node(9)), vec![6, 5, 1]);
        assert_eq!(all(Axis::Preceding, tree.node(11)), vec![10, 9, 8, 7, 6, 5, 1]);
        assert!(all(Axis::Following, tree.node(0)).is_empty());
        assert!(all(Axis::Preceding, tree.node(0)).is_empty());
    }

    #[test]
    fn test_following_preceding_from_attribute() {
        let tree = create_test_tree();
        assert_eq!(all(Axis::Following, tree.node(3)), vec![5, 6, 7, 8, 9, 10, 11, 12]);
        assert!(all(Axis::Preceding, tree.node(3)).is_empty());
    }

    #[test]
    fn test_collect_attribute_and_namespace() {
        let tree = create_test_tree();
        assert_eq!(all(Axis::Attribute, tree.node(1)), vec![3, 4]);
        assert_eq!(all(Axis::Namespace, tree.node(1)), vec![2]);
        assert!(all(Axis::Attribute, tree.node(0)).is_empty());
        assert!(all(Axis::Namespace, tree.node(5)).is_empty());
    }

    #[test]
    fn test_matches_filters_during_walk() {
        let tree = create_test_tree();
        let mut results = Vec::new();
        let elements_only = |n: MockNode<'_>| n.node_type() == NodeType::Element;
        collect(Axis::Descendant, tree.node(0), &elements_only, &mut results).unwrap();
        let ids: Vec<usize> = results.iter().map(|n| n.id).collect();
        assert_eq!(ids, vec![1, 7, 8, 11]);
    }

    #[test]
    fn test_inconsistent_adapter_is_an_error() {
        let mut tree = create_test_tree();
        tree.break_child_list(7);
        let div = tree.node(7);
        for axis in [
            Axis::Following,
            Axis::FollowingSibling,
            Axis::Preceding,
            Axis::PrecedingSibling,
        ] {
            let mut results = Vec::new();
            assert!(matches!(
                collect(axis, div, &|_| true, &mut results),
                Err(XPathError::InconsistentTreeAdapter(_))
            ));
        }
    }
}
