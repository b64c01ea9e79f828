//! DOM Tree structure

use rustc_hash::{FxHashMap, FxHashSet};
use std::fmt;
use std::rc::Rc;

use crate::collab::{MarkupParser, SelectorEngine, SelectorEngineFactory};
use crate::document::DocumentData;
use crate::error::{DomError, DomResult};
use crate::node::{Node, NodeData, NodeId};

/// Arena that owns every node
///
/// A tree starts out with one document and can hold any number of further
/// documents. Nodes are never freed individually: a removed node stays
/// addressable, detached, until the tree is dropped.
pub struct DomTree {
    /// All nodes in the arena
    nodes: FxHashMap<NodeId, Node>,
    /// Next available node ID
    next_id: u32,
    /// The document created with the tree
    document_id: NodeId,
    markup_parser: Option<Rc<dyn MarkupParser>>,
    selector_factory: Option<SelectorEngineFactory>,
}

impl DomTree {
    /// Create a tree holding one empty document
    pub fn new() -> Self {
        let document_id = NodeId::new(0);
        let document = Node::new(document_id, NodeData::Document(DocumentData::new()), None);

        let mut nodes = FxHashMap::default();
        nodes.insert(document_id, document);

        Self {
            nodes,
            next_id: 1,
            document_id,
            markup_parser: None,
            selector_factory: None,
        }
    }

    /// Get the document created with the tree
    pub fn document_id(&self) -> NodeId {
        self.document_id
    }

    /// Get a node by ID
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    pub(crate) fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(&id)
    }

    /// Get a node by ID, failing with [`DomError::NodeNotFound`]
    pub fn node(&self, id: NodeId) -> DomResult<&Node> {
        self.nodes.get(&id).ok_or(DomError::NodeNotFound(id))
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> DomResult<&mut Node> {
        self.nodes.get_mut(&id).ok_or(DomError::NodeNotFound(id))
    }

    pub fn has_node(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    /// Get the number of nodes in the arena, detached ones included
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if the arena only holds its initial document
    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }

    /// The only way nodes come into existence
    pub(crate) fn alloc(&mut self, data: NodeData, owner_document: Option<NodeId>) -> NodeId {
        let id = NodeId::new(self.next_id);
        self.next_id += 1;
        self.nodes.insert(id, Node::new(id, data, owner_document));
        log::trace!("alloc {}", id);
        id
    }

    /// Link `child` under `parent` (or unlink it with `None`)
    ///
    /// Only the back-references are touched; the caller owns the child list.
    /// The ancestor sets of the whole moved subtree are rewritten eagerly so
    /// `contains` stays a set lookup. Attaching also propagates the owner
    /// document, detaching keeps it.
    pub(crate) fn set_parent(&mut self, child: NodeId, parent: Option<NodeId>) -> DomResult<()> {
        let (ancestors, parent_element, owner) = match parent {
            Some(parent_id) => {
                let parent_node = self.node(parent_id)?;
                let mut ancestors = parent_node.ancestors.clone();
                ancestors.insert(parent_id);
                let owner = if parent_node.is_document() {
                    Some(parent_id)
                } else {
                    parent_node.owner_document
                };
                (ancestors, parent_node.is_element().then_some(parent_id), Some(owner))
            }
            None => (FxHashSet::default(), None, None),
        };

        let node = self.node_mut(child)?;
        node.parent = parent;
        node.parent_element = parent_element;
        node.ancestors = ancestors;

        let mut stack: Vec<NodeId> = node.child_nodes.iter().collect();
        while let Some(id) = stack.pop() {
            let Some(parent_id) = self.get(id).and_then(|n| n.parent) else {
                continue;
            };
            let mut ancestors = match self.get(parent_id) {
                Some(parent_node) => parent_node.ancestors.clone(),
                None => continue,
            };
            ancestors.insert(parent_id);
            if let Some(node) = self.get_mut(id) {
                node.ancestors = ancestors;
                stack.extend(node.child_nodes.iter());
            }
        }

        if let Some(owner) = owner {
            self.propagate_owner(child, owner);
        }
        Ok(())
    }

    /// Stamp `owner` on `root` and everything below it, template contents included
    pub(crate) fn propagate_owner(&mut self, root: NodeId, owner: Option<NodeId>) {
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            if let Some(node) = self.get_mut(id) {
                if !node.is_document() {
                    node.owner_document = owner;
                }
                stack.extend(node.child_nodes.iter());
                if let Some(content) = node.as_element().and_then(|e| e.template_content) {
                    stack.push(content);
                }
            }
        }
    }

    /// Get all children of a node
    pub fn children(&self, id: NodeId) -> Vec<NodeId> {
        self.get(id)
            .map(|n| n.child_nodes.to_vec())
            .unwrap_or_default()
    }

    /// Element children of a node
    pub fn element_children(&self, id: NodeId) -> Vec<NodeId> {
        self.get(id)
            .map(|n| n.child_nodes.elements().to_vec())
            .unwrap_or_default()
    }

    pub fn parent_node(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.parent)
    }

    pub fn parent_element(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.parent_element)
    }

    pub fn owner_document(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.owner_document)
    }

    /// Position of `id` in its parent's child list
    pub fn index_in_parent(&self, id: NodeId) -> Option<usize> {
        let parent = self.parent_node(id)?;
        self.get(parent)?.child_nodes.index_of(id)
    }

    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        let parent = self.parent_node(id)?;
        let list = &self.get(parent)?.child_nodes;
        list.item(list.index_of(id)? + 1)
    }

    pub fn previous_sibling(&self, id: NodeId) -> Option<NodeId> {
        let parent = self.parent_node(id)?;
        let list = &self.get(parent)?.child_nodes;
        list.item(list.index_of(id)?.checked_sub(1)?)
    }

    pub fn next_element_sibling(&self, id: NodeId) -> Option<NodeId> {
        let parent = self.parent_node(id)?;
        let list = &self.get(parent)?.child_nodes;
        let index = list.index_of(id)?;
        list.iter()
            .skip(index + 1)
            .find(|&sibling| self.get(sibling).is_some_and(|n| n.is_element()))
    }

    pub fn previous_element_sibling(&self, id: NodeId) -> Option<NodeId> {
        let parent = self.parent_node(id)?;
        let list = &self.get(parent)?.child_nodes;
        let index = list.index_of(id)?;
        list.iter()
            .take(index)
            .rev()
            .find(|&sibling| self.get(sibling).is_some_and(|n| n.is_element()))
    }

    /// All descendants of a node in tree order, excluding the node itself
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut result = Vec::new();
        let mut stack: Vec<NodeId> = self.get(id).map(|n| n.child_nodes.to_vec()).unwrap_or_default();
        stack.reverse();
        while let Some(current) = stack.pop() {
            result.push(current);
            if let Some(node) = self.get(current) {
                stack.extend(node.child_nodes.iter().rev());
            }
        }
        result
    }

    /// Install the parser used by innerHTML, outerHTML and DOMParser
    pub fn set_markup_parser(&mut self, parser: Rc<dyn MarkupParser>) {
        self.markup_parser = Some(parser);
    }

    pub(crate) fn markup_parser(&self) -> DomResult<Rc<dyn MarkupParser>> {
        self.markup_parser
            .clone()
            .ok_or(DomError::MissingCollaborator("markup parser"))
    }

    /// Install the factory that builds each document's selector engine
    pub fn set_selector_engine_factory(&mut self, factory: SelectorEngineFactory) {
        self.selector_factory = Some(factory);
    }

    /// The selector engine of `document`, built on first use and cached on it
    pub(crate) fn selector_engine(&self, document: NodeId) -> DomResult<Rc<dyn SelectorEngine>> {
        let factory = self
            .selector_factory
            .ok_or(DomError::MissingCollaborator("selector engine"))?;
        let data = self
            .node(document)?
            .as_document()
            .ok_or(DomError::InvalidArgument("Not a document"))?;
        Ok(data
            .selector_engine
            .get_or_init(|| {
                log::debug!("creating selector engine for {}", document);
                factory(document)
            })
            .clone())
    }

    /// Pretty print a subtree for debugging
    pub fn pretty_print_from(&self, root: NodeId) -> String {
        let mut output = String::new();
        let mut stack = vec![(root, 0usize)];

        while let Some((id, depth)) = stack.pop() {
            let Some(node) = self.get(id) else { continue };
            let indent = "  ".repeat(depth);

            match &node.data {
                NodeData::Document(_) => output.push_str(&format!("{}#document\n", indent)),
                NodeData::DocumentFragment(_) => {
                    output.push_str(&format!("{}#document-fragment\n", indent))
                }
                NodeData::DocumentType(doctype) => {
                    output.push_str(&format!("{}<!DOCTYPE {}>\n", indent, doctype.name))
                }
                NodeData::Element(elem) => {
                    let attrs: Vec<String> = elem
                        .attributes
                        .iter()
                        .map(|(k, v)| format!("{}=\"{}\"", k, v))
                        .collect();
                    let attrs_str = if attrs.is_empty() {
                        String::new()
                    } else {
                        format!(" {}", attrs.join(" "))
                    };
                    output.push_str(&format!("{}<{}{}>\n", indent, elem.local_name(), attrs_str));
                }
                NodeData::Text(text) => {
                    let trimmed = text.trim();
                    if !trimmed.is_empty() {
                        output.push_str(&format!("{}#text: {:?}\n", indent, trimmed));
                    }
                }
                NodeData::Comment(text) => {
                    output.push_str(&format!("{}<!-- {} -->\n", indent, text));
                }
                NodeData::Attr(attr) => {
                    output.push_str(&format!("{}@{}={:?}\n", indent, attr.name, attr.value));
                }
            }

            for child in node.child_nodes.iter().rev() {
                stack.push((child, depth + 1));
            }
        }

        output
    }

    /// Pretty print the initial document
    pub fn pretty_print(&self) -> String {
        self.pretty_print_from(self.document_id)
    }
}

impl Default for DomTree {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for DomTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.pretty_print())
    }
}
