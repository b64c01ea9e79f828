//! DOM query functionality (getElementById, getElementsByClassName, etc.)
//!
//! Every query is scoped to the descendants of a root node, which may be a
//! document, a fragment or an element.

use crate::document::XHTML_NAMESPACE;
use crate::element::ElementData;
use crate::node::NodeId;
use crate::tree::DomTree;

/// Trait for querying the DOM
pub trait Queryable {
    /// First descendant element of `root` whose id is `id`
    fn get_element_by_id(&self, root: NodeId, id: &str) -> Option<NodeId>;

    /// Descendant elements with the given tag name, `"*"` for all
    fn get_elements_by_tag_name(&self, root: NodeId, tag_name: &str) -> Vec<NodeId>;

    /// Descendant elements carrying every class in `class_names`
    fn get_elements_by_class_name(&self, root: NodeId, class_names: &str) -> Vec<NodeId>;

    /// Like [`Queryable::get_elements_by_tag_name`], for the XHTML namespace only
    fn get_elements_by_tag_name_ns(&self, root: NodeId, namespace: &str, local_name: &str) -> Vec<NodeId>;
}

impl DomTree {
    fn descendant_elements(&self, root: NodeId) -> impl Iterator<Item = (NodeId, &ElementData)> + '_ {
        self.descendants(root)
            .into_iter()
            .filter_map(move |id| Some((id, self.get(id)?.as_element()?)))
    }
}

impl Queryable for DomTree {
    fn get_element_by_id(&self, root: NodeId, id: &str) -> Option<NodeId> {
        if id.is_empty() {
            return None;
        }
        self.descendant_elements(root)
            .find(|(_, elem)| elem.id() == id)
            .map(|(node_id, _)| node_id)
    }

    fn get_elements_by_tag_name(&self, root: NodeId, tag_name: &str) -> Vec<NodeId> {
        if tag_name == "*" {
            return self.descendant_elements(root).map(|(id, _)| id).collect();
        }
        let tag_upper = tag_name.to_ascii_uppercase();
        self.descendant_elements(root)
            .filter(|(_, elem)| elem.tag_name() == tag_upper)
            .map(|(id, _)| id)
            .collect()
    }

    fn get_elements_by_class_name(&self, root: NodeId, class_names: &str) -> Vec<NodeId> {
        let wanted: Vec<&str> = class_names.split_ascii_whitespace().collect();
        if wanted.is_empty() {
            return Vec::new();
        }
        self.descendant_elements(root)
            .filter(|(_, elem)| wanted.iter().all(|class| elem.has_class(class)))
            .map(|(id, _)| id)
            .collect()
    }

    fn get_elements_by_tag_name_ns(&self, root: NodeId, namespace: &str, local_name: &str) -> Vec<NodeId> {
        if namespace != XHTML_NAMESPACE {
            return Vec::new();
        }
        self.get_elements_by_tag_name(root, local_name)
    }
}
