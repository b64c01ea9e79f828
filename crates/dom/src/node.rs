//! DOM Node representation

use rustc_hash::FxHashSet;
use std::fmt;

use crate::attr::AttrData;
use crate::document::{DocumentData, DocumentTypeData};
use crate::element::ElementData;
use crate::fragment::FragmentData;
use crate::node_list::NodeList;

/// Unique identifier for a node in a [`DomTree`](crate::DomTree)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    pub(crate) fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw ID value
    pub fn as_u32(self) -> u32 {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeId({})", self.0)
    }
}

/// The numeric `nodeType` of a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum NodeType {
    Element = 1,
    Attribute = 2,
    Text = 3,
    CDataSection = 4,
    EntityReference = 5,
    Entity = 6,
    ProcessingInstruction = 7,
    Comment = 8,
    Document = 9,
    DocumentType = 10,
    DocumentFragment = 11,
    Notation = 12,
}

impl NodeType {
    pub fn as_u16(self) -> u16 {
        self as u16
    }

    pub fn from_u16(value: u16) -> Option<Self> {
        Some(match value {
            1 => NodeType::Element,
            2 => NodeType::Attribute,
            3 => NodeType::Text,
            4 => NodeType::CDataSection,
            5 => NodeType::EntityReference,
            6 => NodeType::Entity,
            7 => NodeType::ProcessingInstruction,
            8 => NodeType::Comment,
            9 => NodeType::Document,
            10 => NodeType::DocumentType,
            11 => NodeType::DocumentFragment,
            12 => NodeType::Notation,
            _ => return None,
        })
    }
}

/// Variant payload of a node
#[derive(Debug)]
pub enum NodeData {
    Document(DocumentData),
    DocumentType(DocumentTypeData),
    DocumentFragment(FragmentData),
    Element(ElementData),
    Text(String),
    Comment(String),
    Attr(AttrData),
}

/// A node in the DOM tree
///
/// Nodes are only created by [`DomTree`](crate::DomTree) factories. `parent`,
/// `parent_element` and `owner_document` are back-references; the child
/// list is the only owning edge. `ancestors` caches the transitive closure of
/// the parent chain and is rewritten for the whole subtree on every reparent.
#[derive(Debug)]
pub struct Node {
    pub(crate) id: NodeId,
    pub(crate) data: NodeData,
    pub(crate) parent: Option<NodeId>,
    pub(crate) parent_element: Option<NodeId>,
    pub(crate) owner_document: Option<NodeId>,
    pub(crate) child_nodes: NodeList,
    pub(crate) ancestors: FxHashSet<NodeId>,
}

impl Node {
    pub(crate) fn new(id: NodeId, data: NodeData, owner_document: Option<NodeId>) -> Self {
        Self {
            id,
            data,
            parent: None,
            parent_element: None,
            owner_document,
            child_nodes: NodeList::new(),
            ancestors: FxHashSet::default(),
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn data(&self) -> &NodeData {
        &self.data
    }

    pub fn node_type(&self) -> NodeType {
        match &self.data {
            NodeData::Document(_) => NodeType::Document,
            NodeData::DocumentType(_) => NodeType::DocumentType,
            NodeData::DocumentFragment(_) => NodeType::DocumentFragment,
            NodeData::Element(_) => NodeType::Element,
            NodeData::Text(_) => NodeType::Text,
            NodeData::Comment(_) => NodeType::Comment,
            NodeData::Attr(_) => NodeType::Attribute,
        }
    }

    /// `nodeName`: the uppercase tag name for elements, `#text` and friends otherwise
    pub fn node_name(&self) -> &str {
        match &self.data {
            NodeData::Document(_) => "#document",
            NodeData::DocumentType(doctype) => &doctype.name,
            NodeData::DocumentFragment(_) => "#document-fragment",
            NodeData::Element(element) => element.tag_name(),
            NodeData::Text(_) => "#text",
            NodeData::Comment(_) => "#comment",
            NodeData::Attr(attr) => &attr.name,
        }
    }

    /// `nodeValue`: character data, the value of an attribute, `None` otherwise
    pub fn node_value(&self) -> Option<&str> {
        match &self.data {
            NodeData::Text(data) | NodeData::Comment(data) => Some(data),
            NodeData::Attr(attr) => Some(&attr.value),
            _ => None,
        }
    }

    pub fn parent_node(&self) -> Option<NodeId> {
        self.parent
    }

    /// The parent, but only when it is an element
    pub fn parent_element(&self) -> Option<NodeId> {
        self.parent_element
    }

    pub fn owner_document(&self) -> Option<NodeId> {
        self.owner_document
    }

    pub fn child_nodes(&self) -> &NodeList {
        &self.child_nodes
    }

    pub fn first_child(&self) -> Option<NodeId> {
        self.child_nodes.first()
    }

    pub fn last_child(&self) -> Option<NodeId> {
        self.child_nodes.last()
    }

    pub fn has_child_nodes(&self) -> bool {
        !self.child_nodes.is_empty()
    }

    /// Whether `id` is somewhere on this node's parent chain
    pub fn has_ancestor(&self, id: NodeId) -> bool {
        self.ancestors.contains(&id)
    }

    pub fn is_document(&self) -> bool {
        matches!(self.data, NodeData::Document(_))
    }

    pub fn is_element(&self) -> bool {
        matches!(self.data, NodeData::Element(_))
    }

    pub fn is_text(&self) -> bool {
        matches!(self.data, NodeData::Text(_))
    }

    pub fn is_comment(&self) -> bool {
        matches!(self.data, NodeData::Comment(_))
    }

    pub fn is_fragment(&self) -> bool {
        matches!(self.data, NodeData::DocumentFragment(_))
    }

    pub fn is_doctype(&self) -> bool {
        matches!(self.data, NodeData::DocumentType(_))
    }

    pub fn is_attr(&self) -> bool {
        matches!(self.data, NodeData::Attr(_))
    }

    /// Text or comment
    pub fn is_character_data(&self) -> bool {
        matches!(self.data, NodeData::Text(_) | NodeData::Comment(_))
    }

    /// Whether this node kind can hold children
    pub fn is_parent_kind(&self) -> bool {
        matches!(
            self.data,
            NodeData::Document(_) | NodeData::DocumentFragment(_) | NodeData::Element(_)
        )
    }

    pub fn as_element(&self) -> Option<&ElementData> {
        match &self.data {
            NodeData::Element(data) => Some(data),
            _ => None,
        }
    }

    pub(crate) fn as_element_mut(&mut self) -> Option<&mut ElementData> {
        match &mut self.data {
            NodeData::Element(data) => Some(data),
            _ => None,
        }
    }

    /// Character data of a text or comment node
    pub fn as_character_data(&self) -> Option<&str> {
        match &self.data {
            NodeData::Text(data) | NodeData::Comment(data) => Some(data),
            _ => None,
        }
    }

    pub(crate) fn as_character_data_mut(&mut self) -> Option<&mut String> {
        match &mut self.data {
            NodeData::Text(data) | NodeData::Comment(data) => Some(data),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match &self.data {
            NodeData::Text(data) => Some(data),
            _ => None,
        }
    }

    pub fn as_attr(&self) -> Option<&AttrData> {
        match &self.data {
            NodeData::Attr(data) => Some(data),
            _ => None,
        }
    }

    pub(crate) fn as_attr_mut(&mut self) -> Option<&mut AttrData> {
        match &mut self.data {
            NodeData::Attr(data) => Some(data),
            _ => None,
        }
    }

    pub fn as_doctype(&self) -> Option<&DocumentTypeData> {
        match &self.data {
            NodeData::DocumentType(data) => Some(data),
            _ => None,
        }
    }

    pub fn as_document(&self) -> Option<&DocumentData> {
        match &self.data {
            NodeData::Document(data) => Some(data),
            _ => None,
        }
    }

    pub(crate) fn as_document_mut(&mut self) -> Option<&mut DocumentData> {
        match &mut self.data {
            NodeData::Document(data) => Some(data),
            _ => None,
        }
    }

    pub fn as_fragment(&self) -> Option<&FragmentData> {
        match &self.data {
            NodeData::DocumentFragment(data) => Some(data),
            _ => None,
        }
    }

    pub(crate) fn as_fragment_mut(&mut self) -> Option<&mut FragmentData> {
        match &mut self.data {
            NodeData::DocumentFragment(data) => Some(data),
            _ => None,
        }
    }

    /// Lowercase tag name, if this is an element
    pub fn local_name(&self) -> Option<&str> {
        self.as_element().map(|e| e.local_name())
    }
}
