//! Building nodes from a parser's output

use crate::document::DocumentTypeData;
use crate::element::ElementData;
use crate::error::DomResult;
use crate::fragment::FragmentData;
use crate::node::{NodeData, NodeId, NodeType};
use crate::tree::DomTree;

/// One parsed node, as produced by a [`MarkupParser`](crate::MarkupParser)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedNode {
    /// The top level of a parse; its children become the result
    Document(Vec<ParsedNode>),
    Element {
        name: String,
        attributes: Vec<(String, String)>,
        children: Vec<ParsedNode>,
    },
    Text(String),
    Comment(String),
    Doctype {
        name: String,
        public_id: String,
        system_id: String,
    },
}

impl ParsedNode {
    /// Shorthand for an element without attributes
    pub fn element(name: &str, children: Vec<ParsedNode>) -> Self {
        ParsedNode::Element {
            name: name.to_string(),
            attributes: Vec::new(),
            children,
        }
    }

    pub fn node_type(&self) -> NodeType {
        match self {
            ParsedNode::Document(_) => NodeType::Document,
            ParsedNode::Element { .. } => NodeType::Element,
            ParsedNode::Text(_) => NodeType::Text,
            ParsedNode::Comment(_) => NodeType::Comment,
            ParsedNode::Doctype { .. } => NodeType::DocumentType,
        }
    }
}

impl DomTree {
    /// Build `parsed` into a new fragment owned by `owner`
    ///
    /// Children of a `template` go into its content fragment. A nested
    /// `Document` entry contributes its children in place. The walk keeps its
    /// own stack, so parse depth is not bounded by the call stack.
    pub(crate) fn build_fragment(&mut self, parsed: ParsedNode, owner: Option<NodeId>) -> DomResult<NodeId> {
        let fragment = self.alloc(NodeData::DocumentFragment(FragmentData::default()), owner);
        let top = match parsed {
            ParsedNode::Document(children) => children,
            other => vec![other],
        };

        let mut stack = vec![(fragment, top.into_iter())];
        let mut created = 0usize;
        while let Some((parent, pending)) = stack.last_mut() {
            let parent = *parent;
            let Some(item) = pending.next() else {
                stack.pop();
                continue;
            };

            let (id, children) = match item {
                ParsedNode::Document(children) => {
                    stack.push((parent, children.into_iter()));
                    continue;
                }
                ParsedNode::Text(data) => (self.alloc(NodeData::Text(data), owner), None),
                ParsedNode::Comment(data) => (self.alloc(NodeData::Comment(data), owner), None),
                ParsedNode::Doctype {
                    name,
                    public_id,
                    system_id,
                } => {
                    let data = DocumentTypeData {
                        name,
                        public_id,
                        system_id,
                    };
                    (self.alloc(NodeData::DocumentType(data), owner), None)
                }
                ParsedNode::Element {
                    name,
                    attributes,
                    children,
                } => {
                    let mut data = ElementData::with_attributes(
                        &name,
                        attributes.iter().map(|(n, v)| (n.as_str(), v.as_str())),
                    );
                    let content = if data.is_template() {
                        let content = self.alloc(NodeData::DocumentFragment(FragmentData::default()), owner);
                        data.template_content = Some(content);
                        Some(content)
                    } else {
                        None
                    };
                    let id = self.alloc(NodeData::Element(data), owner);
                    (id, Some((content.unwrap_or(id), children)))
                }
            };

            let index = self.node(parent)?.child_nodes.len();
            self.link_at(parent, index, &[id])?;
            created += 1;
            if let Some((target, children)) = children {
                stack.push((target, children.into_iter()));
            }
        }

        log::trace!("deserialized {} nodes into {}", created, fragment);
        Ok(fragment)
    }

    /// Build parser output into a new fragment owned by `document`
    pub fn deserialize(&mut self, document: NodeId, parsed: ParsedNode) -> DomResult<NodeId> {
        let owner = self.owner_for_factory(document)?;
        self.build_fragment(parsed, owner)
    }
}
