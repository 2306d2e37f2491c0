//! XML datasource implementation using roxmltree.
//!
//! roxmltree keeps attributes and namespace bindings as data on elements,
//! so both are surfaced as synthetic handles that remember their element
//! and index. Whitespace-only text nodes are dropped from child lists.

use petty_xpath1::{DataSourceNode, NodeType, QName};
use roxmltree::Node;
use std::cmp::Ordering;
use std::hash::{Hash, Hasher};

const XML_NAMESPACE: &str = "http://www.w3.org/XML/1998/namespace";

/// Wrapper around roxmltree::Document providing data source capabilities
pub struct XmlDocument<'input> {
    doc: roxmltree::Document<'input>,
}

impl<'input> XmlDocument<'input> {
    pub fn parse(text: &'input str) -> Result<Self, roxmltree::Error> {
        let doc = roxmltree::Document::parse(text)?;
        Ok(Self { doc })
    }

    pub fn root_node(&self) -> XmlNode<'_, 'input> {
        XmlNode::Node(self.doc.root())
    }

    /// The outermost element of the document.
    pub fn document_element(&self) -> XmlNode<'_, 'input> {
        XmlNode::Node(self.doc.root_element())
    }
}

#[derive(Debug, Clone, Copy)]
pub enum XmlNode<'a, 'input> {
    /// A tree node: the root, an element, text, a comment or a PI.
    Node(Node<'a, 'input>),
    /// The `index`th attribute of `parent`.
    Attribute { parent: Node<'a, 'input>, index: usize },
    /// The `index`th in-scope namespace binding of `parent`.
    Namespace { parent: Node<'a, 'input>, index: usize },
}

impl<'a, 'input> XmlNode<'a, 'input> {
    pub fn inner(&self) -> Option<Node<'a, 'input>> {
        match self {
            XmlNode::Node(node) => Some(*node),
            _ => None,
        }
    }

    /// Document order key: an element sorts before its namespaces, which
    /// sort before its attributes, which sort before its first child.
    fn order_key(&self) -> (u32, u8, usize) {
        match self {
            XmlNode::Node(n) => (n.id().get(), 0, 0),
            XmlNode::Namespace { parent, index } => (parent.id().get(), 1, *index),
            XmlNode::Attribute { parent, index } => (parent.id().get(), 2, *index),
        }
    }
}

impl PartialEq for XmlNode<'_, '_> {
    fn eq(&self, other: &Self) -> bool {
        self.order_key() == other.order_key()
    }
}

impl Eq for XmlNode<'_, '_> {}

impl PartialOrd for XmlNode<'_, '_> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for XmlNode<'_, '_> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.order_key().cmp(&other.order_key())
    }
}

impl Hash for XmlNode<'_, '_> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.order_key().hash(state);
    }
}

fn keep_child(node: &Node<'_, '_>) -> bool {
    if node.is_text() {
        node.text().is_some_and(|t| !t.trim().is_empty())
    } else {
        true
    }
}

impl<'a> DataSourceNode<'a> for XmlNode<'a, 'a> {
    fn node_type(&self) -> NodeType {
        match self {
            XmlNode::Node(n) if n.is_root() => NodeType::Root,
            XmlNode::Node(n) if n.is_text() => NodeType::Text,
            XmlNode::Node(n) if n.is_comment() => NodeType::Comment,
            XmlNode::Node(n) if n.is_pi() => NodeType::ProcessingInstruction,
            XmlNode::Node(_) => NodeType::Element,
            XmlNode::Attribute { .. } => NodeType::Attribute,
            XmlNode::Namespace { .. } => NodeType::Namespace,
        }
    }

    fn name(&self) -> Option<QName<'a>> {
        match self {
            XmlNode::Node(n) if n.is_element() => {
                let tag = n.tag_name();
                let prefix = tag
                    .namespace()
                    .and_then(|uri| n.lookup_prefix(uri))
                    .filter(|p| !p.is_empty());
                Some(QName {
                    prefix,
                    local_part: tag.name(),
                })
            }
            XmlNode::Node(n) => n.pi().map(|pi| QName {
                prefix: None,
                local_part: pi.target,
            }),
            XmlNode::Attribute { parent, index } => parent.attributes().nth(*index).map(|attr| {
                // The xml prefix is bound implicitly and is not always found by lookup.
                let prefix = match attr.namespace() {
                    Some(XML_NAMESPACE) => Some("xml"),
                    Some(uri) => parent.lookup_prefix(uri),
                    None => None,
                };
                QName {
                    prefix,
                    local_part: attr.name(),
                }
            }),
            XmlNode::Namespace { parent, index } => {
                parent.namespaces().nth(*index).map(|ns| QName {
                    prefix: None,
                    local_part: ns.name().unwrap_or(""),
                })
            }
        }
    }

    fn string_value(&self) -> String {
        match self {
            XmlNode::Node(n) if n.is_text() || n.is_comment() => {
                n.text().unwrap_or("").to_string()
            }
            XmlNode::Node(n) if n.is_pi() => {
                n.pi().and_then(|pi| pi.value).unwrap_or("").to_string()
            }
            XmlNode::Node(n) => n
                .descendants()
                .filter(|d| d.is_text())
                .filter_map(|d| d.text())
                .collect(),
            XmlNode::Attribute { parent, index } => parent
                .attributes()
                .nth(*index)
                .map(|attr| attr.value().to_string())
                .unwrap_or_default(),
            XmlNode::Namespace { parent, index } => parent
                .namespaces()
                .nth(*index)
                .map(|ns| ns.uri().to_string())
                .unwrap_or_default(),
        }
    }

    fn attributes(&self) -> Box<dyn Iterator<Item = Self> + 'a> {
        match self {
            XmlNode::Node(n) if n.is_element() => {
                let parent = *n;
                let count = n.attributes().len();
                Box::new((0..count).map(move |index| XmlNode::Attribute { parent, index }))
            }
            _ => Box::new(std::iter::empty()),
        }
    }

    fn namespaces(&self) -> Box<dyn Iterator<Item = Self> + 'a> {
        match self {
            XmlNode::Node(n) if n.is_element() => {
                let parent = *n;
                let count = n.namespaces().count();
                Box::new((0..count).map(move |index| XmlNode::Namespace { parent, index }))
            }
            _ => Box::new(std::iter::empty()),
        }
    }

    fn children(&self) -> Box<dyn Iterator<Item = Self> + 'a> {
        match self {
            XmlNode::Node(n) => Box::new(n.children().filter(keep_child).map(XmlNode::Node)),
            _ => Box::new(std::iter::empty()),
        }
    }

    fn parent(&self) -> Option<Self> {
        match self {
            XmlNode::Node(n) => n.parent().map(XmlNode::Node),
            XmlNode::Attribute { parent, .. } | XmlNode::Namespace { parent, .. } => {
                Some(XmlNode::Node(*parent))
            }
        }
    }
}
