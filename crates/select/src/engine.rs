//! Selector engine bound to one document
//!
//! Compiled selector lists are cached per selector string.

use std::cell::RefCell;
use std::rc::Rc;

use rustc_hash::FxHashMap;
use sapling_dom::{DomError, DomResult, DomTree, NodeId, SelectorEngine};

use crate::matching::{matches_any, MatchingContext};
use crate::selector::Selector;

/// Compiled lists kept before the cache is cleared
const CACHE_CAPACITY: usize = 256;

/// The [`SelectorEngine`] of a document
#[derive(Debug)]
pub struct Selectors {
    document: NodeId,
    cache: RefCell<FxHashMap<String, Rc<Vec<Selector>>>>,
}

impl Selectors {
    pub fn new(document: NodeId) -> Self {
        Self {
            document,
            cache: RefCell::new(FxHashMap::default()),
        }
    }

    /// Document this engine serves
    pub fn document(&self) -> NodeId {
        self.document
    }

    /// Parse `source` as a selector list, reusing an earlier compilation
    pub fn compile(&self, source: &str) -> DomResult<Rc<Vec<Selector>>> {
        if let Some(compiled) = self.cache.borrow().get(source) {
            return Ok(compiled.clone());
        }

        let compiled = Selector::parse_list(source).map_err(|err| {
            log::debug!("rejecting selector {:?}: {}", source, err);
            DomError::Syntax(format!("'{}' is not a valid selector: {}", source, err))
        })?;
        let compiled = Rc::new(compiled);

        let mut cache = self.cache.borrow_mut();
        if cache.len() >= CACHE_CAPACITY {
            log::trace!("selector cache of {} full, clearing", self.document);
            cache.clear();
        }
        cache.insert(source.to_string(), compiled.clone());
        Ok(compiled)
    }

    /// `:scope` is the context element; for a document or fragment context it
    /// falls back to the root element
    fn context_for(tree: &DomTree, context: NodeId) -> MatchingContext {
        match tree.get(context) {
            Some(node) if node.is_element() => MatchingContext::with_scope(context),
            _ => MatchingContext::new(),
        }
    }

    fn matching_descendants<'t>(
        tree: &'t DomTree,
        selectors: &'t [Selector],
        context: NodeId,
    ) -> impl Iterator<Item = NodeId> + 't {
        let ctx = Self::context_for(tree, context);
        tree.descendants(context)
            .into_iter()
            .filter(move |&id| matches_any(tree, id, selectors, &ctx))
    }
}

impl SelectorEngine for Selectors {
    fn first(&self, tree: &DomTree, selector: &str, context: NodeId) -> DomResult<Option<NodeId>> {
        let selectors = self.compile(selector)?;
        let found = Self::matching_descendants(tree, &selectors, context).next();
        Ok(found)
    }

    fn select(&self, tree: &DomTree, selector: &str, context: NodeId) -> DomResult<Vec<NodeId>> {
        let selectors = self.compile(selector)?;
        let found: Vec<NodeId> = Self::matching_descendants(tree, &selectors, context).collect();
        log::trace!("{:?} matched {} nodes under {}", selector, found.len(), context);
        Ok(found)
    }

    fn matches(&self, tree: &DomTree, selector: &str, node: NodeId) -> DomResult<bool> {
        let selectors = self.compile(selector)?;
        let ctx = Self::context_for(tree, node);
        Ok(matches_any(tree, node, &selectors, &ctx))
    }
}

/// Factory to install with [`DomTree::set_selector_engine_factory`]
pub fn selector_engine_factory(document: NodeId) -> Rc<dyn SelectorEngine> {
    Rc::new(Selectors::new(document))
}
