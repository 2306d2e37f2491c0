//! Defines the core abstraction for a navigable, read-only data source tree.
use std::hash::Hash;

/// A qualified name, consisting of an optional prefix and a local part.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct QName<'a> {
    pub prefix: Option<&'a str>,
    pub local_part: &'a str,
}

/// The type of a node in the data source tree, aligned with the XPath 1.0 data model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeType {
    Root,
    Element,
    Attribute,
    Namespace,
    Text,
    Comment,
    ProcessingInstruction,
}

/// The contract every tree must satisfy to be queried by the engine.
///
/// The engine only ever reads through this trait and never outlives the
/// tree. Node identity is `Eq`; `Ord` must agree with document order for
/// callers that sort results.
///
/// `'a` is the lifetime of the underlying data source (e.g., the XML string).
pub trait DataSourceNode<'a>:
    std::fmt::Debug + Clone + Copy + PartialEq + Eq + Hash + PartialOrd + Ord
{
    fn node_type(&self) -> NodeType;

    /// The qualified name of the node. Returns `None` for text, comment and
    /// root nodes. For a processing instruction this is its target, and for
    /// a namespace node the local part is the bound prefix (empty for the
    /// default namespace).
    fn name(&self) -> Option<QName<'a>>;

    /// The string value of the node, as defined by the XPath 1.0 `string()` function.
    /// - For a text node, this is its content.
    /// - For an element or the root, the concatenation of all descendant text.
    /// - For an attribute, its value; for a namespace node, its URI.
    /// - For a comment or processing instruction, its content.
    fn string_value(&self) -> String;

    /// The attribute nodes of this node, empty for non-elements.
    fn attributes(&self) -> Box<dyn Iterator<Item = Self> + 'a>;

    /// One namespace node per in-scope binding, empty for non-elements.
    /// Each yielded node reports this element as its parent.
    fn namespaces(&self) -> Box<dyn Iterator<Item = Self> + 'a>;

    /// The child nodes of this node in document order.
    fn children(&self) -> Box<dyn Iterator<Item = Self> + 'a>;

    /// The parent node. Returns `None` only for the root, which is what
    /// terminates every upward traversal.
    fn parent(&self) -> Option<Self>;

    fn is_element(&self) -> bool {
        self.node_type() == NodeType::Element
    }
}

/// Finds an attribute of `node` by prefix and local name.
pub fn find_attribute<'a, N: DataSourceNode<'a>>(
    node: N,
    prefix: Option<&str>,
    local: &str,
) -> Option<N> {
    node.attributes().find(|attr| {
        attr.name()
            .is_some_and(|q| q.prefix == prefix && q.local_part == local)
    })
}

// Test utilities - publicly available for integration testing in downstream crates
pub mod tests {
    use super::*;
    use std::cmp::Ordering;
    use std::collections::HashMap;
    use std::hash::Hasher;

    #[derive(Debug, Clone)]
    struct MockNodeData<'a> {
        node_type: NodeType,
        name: Option<QName<'a>>,
        value: String,
        children: Vec<usize>,
        attributes: Vec<usize>,
        namespaces: Vec<usize>,
    }

    #[derive(Debug)]
    pub struct MockTree<'a> {
        nodes: HashMap<usize, MockNodeData<'a>>,
        parent_map: HashMap<usize, usize>,
    }

    /// A node handle that navigates through a borrowed `MockTree`.
    #[derive(Debug, Clone, Copy)]
    pub struct MockNode<'a> {
        pub id: usize,
        pub tree: &'a MockTree<'a>,
    }

    impl<'a> PartialEq for MockNode<'a> {
        fn eq(&self, other: &Self) -> bool {
            self.id == other.id
        }
    }
    impl<'a> Eq for MockNode<'a> {}

    impl<'a> PartialOrd for MockNode<'a> {
        fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
            Some(self.cmp(other))
        }
    }
    impl<'a> Ord for MockNode<'a> {
        fn cmp(&self, other: &Self) -> Ordering {
            self.id.cmp(&other.id)
        }
    }

    impl<'a> Hash for MockNode<'a> {
        fn hash<H: Hasher>(&self, state: &mut H) {
            self.id.hash(state);
        }
    }

    impl<'a> MockNode<'a> {
        fn ids(&self, ids: Vec<usize>) -> Box<dyn Iterator<Item = Self> + 'a> {
            let tree = self.tree;
            Box::new(ids.into_iter().map(move |id| MockNode { id, tree }))
        }
    }

    impl<'a> DataSourceNode<'a> for MockNode<'a> {
        fn node_type(&self) -> NodeType {
            self.tree.nodes[&self.id].node_type
        }

        fn name(&self) -> Option<QName<'a>> {
            self.tree.nodes[&self.id].name
        }

        fn string_value(&self) -> String {
            self.tree.nodes[&self.id].value.clone()
        }

        fn attributes(&self) -> Box<dyn Iterator<Item = Self> + 'a> {
            self.ids(self.tree.nodes[&self.id].attributes.clone())
        }

        fn namespaces(&self) -> Box<dyn Iterator<Item = Self> + 'a> {
            self.ids(self.tree.nodes[&self.id].namespaces.clone())
        }

        fn children(&self) -> Box<dyn Iterator<Item = Self> + 'a> {
            self.ids(self.tree.nodes[&self.id].children.clone())
        }

        fn parent(&self) -> Option<Self> {
            self.tree.parent_map.get(&self.id).map(|&pid| MockNode {
                id: pid,
                tree: self.tree,
            })
        }
    }

    impl<'a> MockTree<'a> {
        pub fn node(&'a self, id: usize) -> MockNode<'a> {
            MockNode { id, tree: self }
        }

        /// Removes `id` from its parent's child list while keeping its parent
        /// link, producing an adapter whose parent/children views disagree.
        pub fn break_child_list(&mut self, id: usize) {
            if let Some(parent) = self.parent_map.get(&id).copied()
                && let Some(data) = self.nodes.get_mut(&parent)
            {
                data.children.retain(|&c| c != id);
            }
        }

        fn insert(&mut self, id: usize, parent: Option<usize>, data: MockNodeData<'a>) {
            if let Some(pid) = parent {
                self.parent_map.insert(id, pid);
            }
            self.nodes.insert(id, data);
        }
    }

    fn data<'a>(node_type: NodeType, name: Option<QName<'a>>, value: &str) -> MockNodeData<'a> {
        MockNodeData {
            node_type,
            name,
            value: value.to_string(),
            children: vec![],
            attributes: vec![],
            namespaces: vec![],
        }
    }

    fn qname<'a>(prefix: Option<&'a str>, local_part: &'a str) -> Option<QName<'a>> {
        Some(QName { prefix, local_part })
    }

    /// Creates a small mock tree for testing. Ids follow document order:
    /// <root>                                             <!-- id 0 -->
    ///   <para xmlns:p="urn:p" id="p1" xml:lang="en">     <!-- id 1, ns 2, attrs 3&4 -->
    ///     Hello                                          <!-- id 5 -->
    ///   </para>
    ///   <!-- comment node -->                            <!-- id 6 -->
    ///   <div><span>Inner</span></div>                    <!-- ids 7, 8, text 9 -->
    ///   <?pi-target pi-value?>                           <!-- id 10 -->
    ///   <para>World</para>                               <!-- id 11, text 12 -->
    /// </root>
    pub fn create_test_tree<'a>() -> MockTree<'a> {
        let mut tree = MockTree {
            nodes: HashMap::new(),
            parent_map: HashMap::new(),
        };

        let mut root = data(NodeType::Root, None, "HelloInnerWorld");
        root.children = vec![1, 6, 7, 10, 11];
        tree.insert(0, None, root);

        let mut para = data(NodeType::Element, qname(None, "para"), "Hello");
        para.namespaces = vec![2];
        para.attributes = vec![3, 4];
        para.children = vec![5];
        tree.insert(1, Some(0), para);
        tree.insert(2, Some(1), data(NodeType::Namespace, qname(None, "p"), "urn:p"));
        tree.insert(3, Some(1), data(NodeType::Attribute, qname(None, "id"), "p1"));
        tree.insert(4, Some(1), data(NodeType::Attribute, qname(Some("xml"), "lang"), "en"));
        tree.insert(5, Some(1), data(NodeType::Text, None, "Hello"));

        tree.insert(6, Some(0), data(NodeType::Comment, None, " comment node "));

        let mut div = data(NodeType::Element, qname(None, "div"), "Inner");
        div.children = vec![8];
        tree.insert(7, Some(0), div);
        let mut span = data(NodeType::Element, qname(None, "span"), "Inner");
        span.children = vec![9];
        tree.insert(8, Some(7), span);
        tree.insert(9, Some(8), data(NodeType::Text, None, "Inner"));

        tree.insert(
            10,
            Some(0),
            data(NodeType::ProcessingInstruction, qname(None, "pi-target"), "pi-value"),
        );

        let mut para2 = data(NodeType::Element, qname(None, "para"), "World");
        para2.children = vec![12];
        tree.insert(11, Some(0), para2);
        tree.insert(12, Some(11), data(NodeType::Text, None, "World"));

        tree
    }

    #[test]
    fn test_mock_tree_shape() {
        let tree = create_test_tree();
        let root = tree.node(0);
        assert_eq!(root.parent(), None);
        let children: Vec<usize> = root.children().map(|n| n.id).collect();
        assert_eq!(children, vec![1, 6, 7, 10, 11]);
        let para = tree.node(1);
        assert!(para.is_element());
        assert_eq!(para.namespaces().map(|n| n.id).collect::<Vec<_>>(), vec![2]);
        assert_eq!(tree.node(2).parent(), Some(para));
        assert_eq!(find_attribute(para, Some("xml"), "lang"), Some(tree.node(4)));
        assert_eq!(find_attribute(para, None, "lang"), None);
    }
}
