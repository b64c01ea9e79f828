//! Sapling - a browser-independent DOM
//!
//! Re-exports the DOM of [`sapling_dom`] and wires in the HTML parser from
//! [`sapling_html`] and the selector engine from [`sapling_select`].
//!
//! ```
//! use sapling::{DomParser, Queryable};
//!
//! let mut tree = sapling::new_tree();
//! let doc = DomParser::new(&mut tree)
//!     .parse_from_string("<p id='greeting'>Hello</p>", "text/html")
//!     .unwrap();
//! let p = tree.get_element_by_id(doc, "greeting").unwrap();
//! assert_eq!(tree.text_content(p).as_deref(), Some("Hello"));
//! ```

use std::rc::Rc;

pub use sapling_dom::*;
pub use sapling_html::{HtmlError, HtmlParser, ParserConfig};
pub use sapling_select::{selector_engine_factory, SelectorError, Selectors};

/// A tree with the HTML parser and the selector engine installed
pub fn new_tree() -> DomTree {
    new_tree_with(ParserConfig::default())
}

/// Like [`new_tree`], with an explicit parser configuration
pub fn new_tree_with(config: ParserConfig) -> DomTree {
    log::debug!("creating tree with {:?}", config);
    let mut tree = DomTree::new();
    tree.set_markup_parser(Rc::new(HtmlParser::with_config(config)));
    tree.set_selector_engine_factory(selector_engine_factory);
    tree
}

/// `new DOMParser()`, creating its documents in a tree
pub struct DomParser<'a> {
    tree: &'a mut DomTree,
}

impl<'a> DomParser<'a> {
    pub fn new(tree: &'a mut DomTree) -> Self {
        Self { tree }
    }

    /// `parseFromString(source, mimeType)`; only `text/html` is supported
    pub fn parse_from_string(&mut self, source: &str, mime_type: &str) -> DomResult<NodeId> {
        self.tree.parse_from_string(source, mime_type)
    }
}
