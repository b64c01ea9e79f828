//! Interfaces of the external collaborators: the markup parser and the
//! selector engine

use std::rc::Rc;

use crate::deserialize::ParsedNode;
use crate::error::DomResult;
use crate::node::NodeId;
use crate::tree::DomTree;

/// Turns markup into the parsed node array consumed by the deserializer
pub trait MarkupParser {
    /// Parse a whole document. Returns [`ParsedNode::Document`].
    fn parse(&self, html: &str) -> ParsedNode;

    /// Parse a fragment as if it were the content of a `context` element.
    /// Returns [`ParsedNode::Document`] holding the top-level fragment nodes.
    fn parse_fragment(&self, html: &str, context: &str) -> ParsedNode;
}

/// Selector matching bound to one document
pub trait SelectorEngine {
    /// First descendant of `context` matching `selector`, in tree order
    fn first(&self, tree: &DomTree, selector: &str, context: NodeId) -> DomResult<Option<NodeId>>;

    /// Every descendant of `context` matching `selector`, in tree order
    fn select(&self, tree: &DomTree, selector: &str, context: NodeId) -> DomResult<Vec<NodeId>>;

    /// Whether `node` itself matches `selector`
    fn matches(&self, tree: &DomTree, selector: &str, node: NodeId) -> DomResult<bool>;
}

/// Builds the selector engine of a document the first time it is queried
pub type SelectorEngineFactory = fn(document: NodeId) -> Rc<dyn SelectorEngine>;
