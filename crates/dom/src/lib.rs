//! Sapling DOM - Document Object Model
//!
//! A browser-independent DOM: an arena of nodes with live child lists,
//! attributes, class lists and datasets, fragments, templates, markup
//! serialization and tree-order comparison. HTML parsing and selector
//! matching are plugged in through [`MarkupParser`] and [`SelectorEngine`].

mod attr;
mod character_data;
mod collab;
mod dataset;
mod deserialize;
mod document;
mod dom_parser;
mod element;
mod error;
mod fragment;
mod mutation;
mod node;
mod node_list;
mod position;
mod query;
mod serialize;
mod token_list;
mod tree;

pub use attr::{AttrData, NamedNodeMap};
pub use collab::{MarkupParser, SelectorEngine, SelectorEngineFactory};
pub use dataset::{Dataset, DatasetMut};
pub use deserialize::ParsedNode;
pub use document::{DocumentData, DocumentTypeData, XHTML_NAMESPACE};
pub use element::ElementData;
pub use error::{DomError, DomResult};
pub use fragment::FragmentData;
pub use mutation::NodeOrText;
pub use node::{Node, NodeData, NodeId, NodeType};
pub use node_list::{HtmlCollection, NodeList};
pub use position::DocumentPosition;
pub use query::Queryable;
pub use token_list::{ClassListMut, DomTokenList};
pub use tree::DomTree;
