//! Tree mutation: insertion, removal, replacement, cloning and text content
//!
//! Every operation validates all of its arguments before it links or
//! unlinks anything, so a failing call leaves the tree as it was.

use crate::document::DocumentData;
use crate::element::ElementData;
use crate::error::{DomError, DomResult};
use crate::fragment::FragmentData;
use crate::node::{NodeData, NodeId};
use crate::node_list::ChildEntry;
use crate::tree::DomTree;

/// An argument of `append`, `before`, `replaceWith` and friends
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeOrText {
    Node(NodeId),
    /// Becomes a new Text node
    Text(String),
}

impl From<NodeId> for NodeOrText {
    fn from(id: NodeId) -> Self {
        NodeOrText::Node(id)
    }
}

impl From<&str> for NodeOrText {
    fn from(text: &str) -> Self {
        NodeOrText::Text(text.to_string())
    }
}

impl From<String> for NodeOrText {
    fn from(text: String) -> Self {
        NodeOrText::Text(text)
    }
}

const ANCESTOR_VIOLATION: &str = "The new child is an ancestor of the parent";

impl DomTree {
    /// The owner document a child of `parent` ends up with
    pub(crate) fn owner_for_child(&self, parent: NodeId) -> DomResult<Option<NodeId>> {
        let node = self.node(parent)?;
        Ok(if node.is_document() {
            Some(parent)
        } else {
            node.owner_document
        })
    }

    fn check_parent(&self, parent: NodeId) -> DomResult<()> {
        let node = self.node(parent)?;
        if node.is_attr() {
            return Err(DomError::HierarchyRequest("Cannot add children to an Attribute"));
        }
        if !node.is_parent_kind() {
            return Err(DomError::HierarchyRequest("This node type does not support this method"));
        }
        Ok(())
    }

    /// `child` may be placed under `parent`
    fn check_insertable(&self, parent: NodeId, child: NodeId) -> DomResult<()> {
        let node = self.node(child)?;
        if node.is_document() || node.is_attr() {
            return Err(DomError::HierarchyRequest("The node cannot be inserted here"));
        }
        if child == parent || self.node(parent)?.has_ancestor(child) {
            return Err(DomError::HierarchyRequest(ANCESTOR_VIOLATION));
        }
        Ok(())
    }

    fn check_items(&self, parent: NodeId, items: &[NodeOrText]) -> DomResult<()> {
        self.check_parent(parent)?;
        for item in items {
            if let NodeOrText::Node(id) = item {
                self.check_insertable(parent, *id)?;
            }
        }
        Ok(())
    }

    /// Take `node` out of its parent's child list and clear its parent
    pub(crate) fn unlink(&mut self, node: NodeId) -> DomResult<()> {
        if let Some(parent) = self.node(node)?.parent {
            self.node_mut(parent)?.child_nodes.mutator().remove(node);
            self.set_parent(node, None)?;
        }
        Ok(())
    }

    /// Splice detached `nodes` into `parent` at `index` and parent them
    pub(crate) fn link_at(&mut self, parent: NodeId, index: usize, nodes: &[NodeId]) -> DomResult<()> {
        let entries = nodes
            .iter()
            .map(|&id| Ok(ChildEntry::new(id, self.node(id)?.is_element())))
            .collect::<DomResult<Vec<_>>>()?;
        let children = &mut self.node_mut(parent)?.child_nodes;
        if index >= children.len() {
            children.mutator().push(&entries);
        } else {
            children.mutator().splice(index, 0, &entries);
        }
        for &id in nodes {
            self.set_parent(id, Some(parent))?;
        }
        Ok(())
    }

    /// Empty a node's child list, leaving every former child detached
    pub(crate) fn take_children(&mut self, node: NodeId) -> DomResult<Vec<NodeId>> {
        let children = self.node_mut(node)?.child_nodes.mutator().clear();
        for &child in &children {
            self.set_parent(child, None)?;
        }
        Ok(children)
    }

    /// Turn validated arguments into detached nodes ready for linking:
    /// strings become Text nodes, fragments give up their children, other
    /// nodes leave their current parent
    fn materialize_items(&mut self, parent: NodeId, items: Vec<NodeOrText>) -> DomResult<Vec<NodeId>> {
        let owner = self.owner_for_child(parent)?;
        let mut nodes = Vec::with_capacity(items.len());
        for item in items {
            match item {
                NodeOrText::Text(text) => nodes.push(self.alloc(NodeData::Text(text), owner)),
                NodeOrText::Node(id) if self.node(id)?.is_fragment() => {
                    nodes.extend(self.take_children(id)?);
                }
                NodeOrText::Node(id) => {
                    if nodes.contains(&id) {
                        continue;
                    }
                    self.unlink(id)?;
                    nodes.push(id);
                }
            }
        }
        Ok(nodes)
    }

    /// `parent.appendChild(child)`
    ///
    /// A fragment hands all of its children over and is returned empty. A
    /// node that is already a child of `parent` stays where it is.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> DomResult<NodeId> {
        self.check_parent(parent)?;
        self.check_insertable(parent, child)?;

        if self.node(child)?.is_fragment() {
            let children = self.take_children(child)?;
            let len = self.node(parent)?.child_nodes.len();
            self.link_at(parent, len, &children)?;
            return Ok(child);
        }
        if self.node(child)?.parent == Some(parent) {
            return Ok(child);
        }

        self.unlink(child)?;
        let len = self.node(parent)?.child_nodes.len();
        self.link_at(parent, len, &[child])?;
        log::trace!("appended {} to {}", child, parent);
        Ok(child)
    }

    /// `parent.insertBefore(new_node, reference)`; `None` appends
    pub fn insert_before(
        &mut self,
        parent: NodeId,
        new_node: NodeId,
        reference: Option<NodeId>,
    ) -> DomResult<NodeId> {
        let Some(reference) = reference else {
            return self.append_child(parent, new_node);
        };
        self.check_parent(parent)?;
        self.check_insertable(parent, new_node)?;
        if self.node(parent)?.child_nodes.index_of(reference).is_none() {
            return Err(DomError::NotFound(
                "Child to insert before is not a child of this node",
            ));
        }
        if new_node == reference {
            return Ok(new_node);
        }

        let nodes = if self.node(new_node)?.is_fragment() {
            self.take_children(new_node)?
        } else {
            self.unlink(new_node)?;
            vec![new_node]
        };
        // Unlinking may have shifted the reference
        let index = self
            .node(parent)?
            .child_nodes
            .index_of(reference)
            .ok_or(DomError::NotFound("Child to insert before is not a child of this node"))?;
        self.link_at(parent, index, &nodes)?;
        Ok(new_node)
    }

    /// `parent.removeChild(child)`
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> DomResult<NodeId> {
        let node = self
            .get(child)
            .ok_or(DomError::InvalidArgument("Node.removeChild: Argument 1 is not an object."))?;
        if node.parent != Some(parent) {
            return Err(DomError::NotFound(
                "Node.removeChild: The node to be removed is not a child of this node",
            ));
        }
        self.unlink(child)?;
        Ok(child)
    }

    /// `parent.replaceChild(new_child, old_child)`; returns the old child
    pub fn replace_child(
        &mut self,
        parent: NodeId,
        new_child: NodeId,
        old_child: NodeId,
    ) -> DomResult<NodeId> {
        if self.node(old_child)?.parent != Some(parent) {
            return Err(DomError::NotFound("Old child's parent is not the current node."));
        }
        self.replace_with(old_child, vec![NodeOrText::Node(new_child)])?;
        Ok(old_child)
    }

    /// `node.remove()`
    pub fn remove(&mut self, node: NodeId) -> DomResult<()> {
        self.unlink(node)
    }

    /// Nearest sibling of `node` in the given direction that is not one of
    /// the nodes about to be inserted
    fn viable_sibling(&self, parent: NodeId, node: NodeId, items: &[NodeOrText], forward: bool) -> Option<NodeId> {
        let list = &self.get(parent)?.child_nodes;
        let index = list.index_of(node)?;
        let is_viable = |sibling: &NodeId| !items.contains(&NodeOrText::Node(*sibling));
        if forward {
            list.iter().skip(index + 1).find(is_viable)
        } else {
            list.iter().take(index).rev().find(is_viable)
        }
    }

    /// `node.before(...items)`
    pub fn before(&mut self, node: NodeId, items: Vec<NodeOrText>) -> DomResult<()> {
        let Some(parent) = self.node(node)?.parent else {
            return Ok(());
        };
        self.check_items(parent, &items)?;
        let viable = self.viable_sibling(parent, node, &items, false);
        let nodes = self.materialize_items(parent, items)?;
        let index = match viable {
            Some(sibling) => self.node(parent)?.child_nodes.index_of(sibling).map_or(0, |i| i + 1),
            None => 0,
        };
        self.link_at(parent, index, &nodes)
    }

    /// `node.after(...items)`
    pub fn after(&mut self, node: NodeId, items: Vec<NodeOrText>) -> DomResult<()> {
        let Some(parent) = self.node(node)?.parent else {
            return Ok(());
        };
        self.check_items(parent, &items)?;
        let viable = self.viable_sibling(parent, node, &items, true);
        let nodes = self.materialize_items(parent, items)?;
        let list = &self.node(parent)?.child_nodes;
        let index = viable.and_then(|s| list.index_of(s)).unwrap_or(list.len());
        self.link_at(parent, index, &nodes)
    }

    /// `node.replaceWith(...items)`
    pub fn replace_with(&mut self, node: NodeId, items: Vec<NodeOrText>) -> DomResult<()> {
        let Some(parent) = self.node(node)?.parent else {
            return Ok(());
        };
        self.check_items(parent, &items)?;
        let viable = self.viable_sibling(parent, node, &items, true);
        let nodes = self.materialize_items(parent, items)?;

        let list = &self.node(parent)?.child_nodes;
        let mut index = viable.and_then(|s| list.index_of(s)).unwrap_or(list.len());
        // `node` is still in place unless it was one of the items
        if index > 0 && list.item(index - 1) == Some(node) {
            index -= 1;
            self.node_mut(parent)?.child_nodes.mutator().splice(index, 1, &[]);
            self.set_parent(node, None)?;
        }
        self.link_at(parent, index, &nodes)
    }

    /// `parent.append(...items)`
    pub fn append(&mut self, parent: NodeId, items: Vec<NodeOrText>) -> DomResult<()> {
        self.check_items(parent, &items)?;
        let nodes = self.materialize_items(parent, items)?;
        let len = self.node(parent)?.child_nodes.len();
        self.link_at(parent, len, &nodes)
    }

    /// `parent.prepend(...items)`
    pub fn prepend(&mut self, parent: NodeId, items: Vec<NodeOrText>) -> DomResult<()> {
        self.check_items(parent, &items)?;
        let nodes = self.materialize_items(parent, items)?;
        self.link_at(parent, 0, &nodes)
    }

    /// `parent.replaceChildren(...items)`
    pub fn replace_children(&mut self, parent: NodeId, items: Vec<NodeOrText>) -> DomResult<()> {
        self.check_items(parent, &items)?;
        let nodes = self.materialize_items(parent, items)?;
        self.take_children(parent)?;
        self.link_at(parent, 0, &nodes)
    }

    /// `node.contains(other)`: `other` is `node` or below it
    pub fn contains(&self, node: NodeId, other: NodeId) -> bool {
        node == other || self.get(other).is_some_and(|n| n.has_ancestor(node))
    }

    pub fn is_same_node(&self, node: NodeId, other: NodeId) -> bool {
        node == other
    }

    /// `node.getRootNode({ composed })`; a composed walk crosses from a
    /// fragment to the host it is attached to
    pub fn get_root_node(&self, node: NodeId, composed: bool) -> DomResult<NodeId> {
        let mut current = node;
        loop {
            let current_node = self.node(current)?;
            if let Some(parent) = current_node.parent {
                current = parent;
                continue;
            }
            match current_node.as_fragment().and_then(|f| f.host) {
                Some(host) if composed => current = host,
                _ => return Ok(current),
            }
        }
    }

    /// `node.textContent`: `None` for documents and doctypes
    ///
    /// Text descendants are concatenated in tree order; comments are skipped.
    pub fn text_content(&self, node: NodeId) -> Option<String> {
        let target = self.get(node)?;
        match &target.data {
            NodeData::Text(data) | NodeData::Comment(data) => return Some(data.clone()),
            NodeData::Attr(attr) => return Some(attr.value.clone()),
            NodeData::Document(_) | NodeData::DocumentType(_) => return None,
            NodeData::Element(_) | NodeData::DocumentFragment(_) => {}
        }

        let mut out = String::new();
        for id in self.descendants(node) {
            if let Some(text) = self.get(id).and_then(|n| n.as_text()) {
                out.push_str(text);
            }
        }
        Some(out)
    }

    /// `node.textContent = text`
    ///
    /// Elements and fragments lose all children and get a single Text node,
    /// even for an empty string.
    pub fn set_text_content(&mut self, node: NodeId, text: &str) -> DomResult<()> {
        match &self.node(node)?.data {
            NodeData::Text(_) | NodeData::Comment(_) => self.set_data(node, text),
            NodeData::Attr(_) => self.set_attr_value(node, text),
            NodeData::Document(_) | NodeData::DocumentType(_) => Ok(()),
            NodeData::Element(_) | NodeData::DocumentFragment(_) => {
                self.take_children(node)?;
                let owner = self.owner_for_child(node)?;
                let text_node = self.alloc(NodeData::Text(text.to_string()), owner);
                self.link_at(node, 0, &[text_node])
            }
        }
    }

    /// `node.nodeValue = value`; ignored where `nodeValue` is null
    pub fn set_node_value(&mut self, node: NodeId, value: &str) -> DomResult<()> {
        match &self.node(node)?.data {
            NodeData::Text(_) | NodeData::Comment(_) => self.set_data(node, value),
            NodeData::Attr(_) => self.set_attr_value(node, value),
            _ => Ok(()),
        }
    }

    /// A copy of `node` alone, with the same owner document
    fn shallow_clone(&mut self, node: NodeId) -> DomResult<NodeId> {
        let source = self.node(node)?;
        let owner = source.owner_document;
        let data = match &source.data {
            NodeData::Document(_) => NodeData::Document(DocumentData::new()),
            NodeData::DocumentType(doctype) => NodeData::DocumentType(doctype.clone()),
            NodeData::DocumentFragment(_) => NodeData::DocumentFragment(FragmentData::default()),
            NodeData::Element(element) => NodeData::Element(element.clone_without_content()),
            NodeData::Text(data) => NodeData::Text(data.clone()),
            NodeData::Comment(data) => NodeData::Comment(data.clone()),
            NodeData::Attr(attr) => NodeData::Attr(crate::attr::AttrData::new(
                attr.name.as_str(),
                attr.value.as_str(),
            )),
        };
        let is_template = matches!(&data, NodeData::Element(e) if e.is_template());
        let copy = self.alloc(data, owner);
        if is_template {
            let content = self.alloc(NodeData::DocumentFragment(FragmentData::default()), owner);
            if let Some(element) = self.node_mut(copy)?.as_element_mut() {
                element.template_content = Some(content);
            }
        }
        Ok(copy)
    }

    /// `node.cloneNode(deep)`
    ///
    /// Deep clones copy the subtree and template contents with an explicit
    /// work list, so depth is not limited by the call stack.
    pub fn clone_node(&mut self, node: NodeId, deep: bool) -> DomResult<NodeId> {
        let copy = self.shallow_clone(node)?;
        if !deep {
            return Ok(copy);
        }

        let mut stack = vec![(node, copy)];
        while let Some((source, target)) = stack.pop() {
            let source_node = self.node(source)?;
            let children = source_node.child_nodes.to_vec();
            let content = source_node.as_element().and_then(ElementData::template_content);

            for child in children {
                let child_copy = self.shallow_clone(child)?;
                let len = self.node(target)?.child_nodes.len();
                self.link_at(target, len, &[child_copy])?;
                stack.push((child, child_copy));
            }
            if let Some(content) = content {
                let target_content = self
                    .node(target)?
                    .as_element()
                    .and_then(ElementData::template_content);
                if let Some(target_content) = target_content {
                    stack.push((content, target_content));
                }
            }
        }
        Ok(copy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> (DomTree, NodeId) {
        let tree = DomTree::new();
        let doc = tree.document_id();
        (tree, doc)
    }

    fn assert_tree_invariant(tree: &DomTree, root: NodeId) {
        let mut all = tree.descendants(root);
        all.push(root);
        for id in all {
            let node = tree.get(id).unwrap();
            if let Some(parent) = node.parent_node() {
                assert!(tree.get(parent).unwrap().child_nodes().contains(id));
                assert!(node.has_ancestor(parent));
                assert_eq!(node.owner_document(), tree.owner_for_child(parent).unwrap());
            }
            for child in node.child_nodes().iter() {
                assert_eq!(tree.parent_node(child), Some(id));
            }
        }
    }

    #[test]
    fn test_cycle_prevention() {
        let (mut tree, doc) = setup();
        let a = tree.create_element(doc, "div").unwrap();
        let b = tree.create_element(doc, "div").unwrap();
        tree.append_child(a, b).unwrap();

        let err = tree.append_child(b, a).unwrap_err();
        assert_eq!(err, DomError::HierarchyRequest(ANCESTOR_VIOLATION));
        assert_eq!(err.name(), "HierarchyRequestError");
        assert_eq!(tree.parent_node(b), Some(a));
        assert_eq!(tree.parent_node(a), None);
        assert!(tree.append_child(a, a).is_err());
    }

    #[test]
    fn test_append_moves_between_parents() {
        let (mut tree, doc) = setup();
        let a = tree.create_element(doc, "div").unwrap();
        let b = tree.create_element(doc, "div").unwrap();
        let c = tree.create_element(doc, "p").unwrap();
        tree.append_child(a, c).unwrap();
        tree.append_child(b, c).unwrap();
        assert!(tree.children(a).is_empty());
        assert_eq!(tree.children(b), vec![c]);
        assert_eq!(tree.parent_element(c), Some(b));
        assert!(tree.contains(b, c));
        assert!(!tree.contains(a, c));
    }

    #[test]
    fn test_appends_keep_elements_view_in_step() {
        let (mut tree, doc) = setup();
        let parent = tree.create_element(doc, "div").unwrap();
        let a = tree.create_element(doc, "p").unwrap();
        let b = tree.create_element(doc, "p").unwrap();
        tree.append(parent, vec![a.into(), "text".into()]).unwrap();
        tree.append_child(parent, b).unwrap();

        let list = tree.node(parent).unwrap().child_nodes();
        assert_eq!(list.len(), 3);
        assert_eq!(list.last(), Some(b));
        assert_eq!(list.elements().to_vec(), vec![a, b]);
        assert_tree_invariant(&tree, parent);
    }

    #[test]
    fn test_append_existing_child_is_noop() {
        let (mut tree, doc) = setup();
        let parent = tree.create_element(doc, "div").unwrap();
        let first = tree.create_element(doc, "p").unwrap();
        let second = tree.create_element(doc, "p").unwrap();
        tree.append(parent, vec![first.into(), second.into()]).unwrap();
        tree.append_child(parent, first).unwrap();
        assert_eq!(tree.children(parent), vec![first, second]);
    }

    #[test]
    fn test_fragment_insertion_empties_fragment() {
        let (mut tree, doc) = setup();
        let parent = tree.create_element(doc, "div").unwrap();
        let frag = tree.create_document_fragment(doc).unwrap();
        let kids: Vec<NodeId> = (0..3)
            .map(|_| tree.create_element(doc, "span").unwrap())
            .collect();
        for &kid in &kids {
            tree.append_child(frag, kid).unwrap();
        }

        assert_eq!(tree.append_child(parent, frag).unwrap(), frag);
        assert!(tree.children(frag).is_empty());
        assert_eq!(tree.children(parent), kids);
        for &kid in &kids {
            assert_eq!(tree.parent_node(kid), Some(parent));
        }
        assert_tree_invariant(&tree, parent);
    }

    #[test]
    fn test_insert_before() {
        let (mut tree, doc) = setup();
        let parent = tree.create_element(doc, "ul").unwrap();
        let a = tree.create_element(doc, "li").unwrap();
        let b = tree.create_element(doc, "li").unwrap();
        let c = tree.create_element(doc, "li").unwrap();
        tree.append(parent, vec![a.into(), b.into()]).unwrap();

        tree.insert_before(parent, c, Some(a)).unwrap();
        assert_eq!(tree.children(parent), vec![c, a, b]);

        // Moving a later sibling in front of an earlier one
        tree.insert_before(parent, b, Some(c)).unwrap();
        assert_eq!(tree.children(parent), vec![b, c, a]);

        tree.insert_before(parent, a, Some(a)).unwrap();
        assert_eq!(tree.children(parent), vec![b, c, a]);

        let stray = tree.create_element(doc, "li").unwrap();
        assert_eq!(
            tree.insert_before(parent, c, Some(stray)),
            Err(DomError::NotFound("Child to insert before is not a child of this node"))
        );
        tree.insert_before(parent, stray, None).unwrap();
        assert_eq!(tree.children(parent).last(), Some(&stray));
        assert_eq!(tree.node(parent).unwrap().child_nodes().elements().to_vec(), vec![b, c, a, stray]);
    }

    #[test]
    fn test_remove_child_errors() {
        let (mut tree, doc) = setup();
        let parent = tree.create_element(doc, "div").unwrap();
        let other = tree.create_element(doc, "div").unwrap();
        let child = tree.create_element(doc, "p").unwrap();
        tree.append_child(parent, child).unwrap();

        assert_eq!(
            tree.remove_child(other, child),
            Err(DomError::NotFound(
                "Node.removeChild: The node to be removed is not a child of this node"
            ))
        );
        let bogus = NodeId::new(9_999);
        let err = tree.remove_child(parent, bogus).unwrap_err();
        assert_eq!(err.name(), "TypeError");

        assert_eq!(tree.remove_child(parent, child), Ok(child));
        assert_eq!(tree.parent_node(child), None);
        assert_eq!(tree.owner_document(child), Some(doc));
    }

    #[test]
    fn test_replace_child() {
        let (mut tree, doc) = setup();
        let parent = tree.create_element(doc, "div").unwrap();
        let old = tree.create_element(doc, "p").unwrap();
        let new = tree.create_element(doc, "span").unwrap();
        let stranger = tree.create_element(doc, "em").unwrap();
        tree.append_child(parent, old).unwrap();

        assert!(matches!(
            tree.replace_child(parent, new, stranger),
            Err(DomError::NotFound(_))
        ));
        assert_eq!(tree.replace_child(parent, new, old), Ok(old));
        assert_eq!(tree.children(parent), vec![new]);
        assert_eq!(tree.parent_node(old), None);
    }

    #[test]
    fn test_before_after_with_text() {
        let (mut tree, doc) = setup();
        let parent = tree.create_element(doc, "div").unwrap();
        let mid = tree.create_element(doc, "b").unwrap();
        tree.append_child(parent, mid).unwrap();

        tree.before(mid, vec!["x".into()]).unwrap();
        tree.after(mid, vec!["y".into()]).unwrap();
        assert_eq!(tree.text_content(parent).as_deref(), Some("xy"));
        assert_eq!(tree.children(parent)[1], mid);
        assert_eq!(tree.node(parent).unwrap().child_nodes().elements().to_vec(), vec![mid]);
    }

    #[test]
    fn test_before_with_sibling_in_arguments() {
        let (mut tree, doc) = setup();
        let parent = tree.create_element(doc, "div").unwrap();
        let a = tree.create_element(doc, "a").unwrap();
        let b = tree.create_element(doc, "b").unwrap();
        let c = tree.create_element(doc, "i").unwrap();
        tree.append(parent, vec![a.into(), b.into(), c.into()]).unwrap();

        tree.before(c, vec![a.into(), b.into()]).unwrap();
        assert_eq!(tree.children(parent), vec![a, b, c]);
        tree.after(a, vec![c.into()]).unwrap();
        assert_eq!(tree.children(parent), vec![a, c, b]);
    }

    #[test]
    fn test_replace_with() {
        let (mut tree, doc) = setup();
        let parent = tree.create_element(doc, "div").unwrap();
        let a = tree.create_element(doc, "a").unwrap();
        let b = tree.create_element(doc, "b").unwrap();
        let c = tree.create_element(doc, "i").unwrap();
        tree.append(parent, vec![a.into(), b.into()]).unwrap();

        tree.replace_with(a, vec![c.into(), "t".into()]).unwrap();
        assert_eq!(tree.children(parent).len(), 3);
        assert_eq!(tree.children(parent)[0], c);
        assert_eq!(tree.parent_node(a), None);

        // Replacing a node with itself keeps it in place
        tree.replace_with(b, vec![b.into()]).unwrap();
        assert_eq!(tree.parent_node(b), Some(parent));
        assert_eq!(tree.children(parent).last(), Some(&b));
        assert_tree_invariant(&tree, parent);
    }

    #[test]
    fn test_failed_append_changes_nothing() {
        let (mut tree, doc) = setup();
        let parent = tree.create_element(doc, "div").unwrap();
        let child = tree.create_element(doc, "p").unwrap();
        tree.append_child(parent, child).unwrap();
        let loose = tree.create_element(doc, "span").unwrap();

        // The second argument is invalid, so the first must not move either
        let result = tree.append(child, vec![loose.into(), parent.into()]);
        assert!(result.is_err());
        assert_eq!(tree.parent_node(loose), None);
        assert!(tree.children(child).is_empty());
    }

    #[test]
    fn test_leaf_and_attr_parents_rejected() {
        let (mut tree, doc) = setup();
        let text = tree.create_text_node(doc, "hi").unwrap();
        let el = tree.create_element(doc, "p").unwrap();
        assert!(matches!(tree.append_child(text, el), Err(DomError::HierarchyRequest(_))));

        let attr = tree.create_attribute(doc, "title").unwrap();
        assert_eq!(
            tree.append_child(attr, el),
            Err(DomError::HierarchyRequest("Cannot add children to an Attribute"))
        );
        assert!(tree.append_child(el, doc).is_err());
    }

    #[test]
    fn test_text_content() {
        let (mut tree, doc) = setup();
        let div = tree.create_element(doc, "div").unwrap();
        let comment = tree.create_comment(doc, "skip").unwrap();
        let span = tree.create_element(doc, "span").unwrap();
        tree.append(div, vec!["a".into(), comment.into(), span.into()]).unwrap();
        tree.append(span, vec!["b".into()]).unwrap();
        assert_eq!(tree.text_content(div).as_deref(), Some("ab"));
        assert_eq!(tree.text_content(comment).as_deref(), Some("skip"));
        assert_eq!(tree.text_content(doc), None);

        tree.set_text_content(div, "").unwrap();
        assert_eq!(tree.children(div).len(), 1);
        assert_eq!(tree.parent_node(span), None);
        assert_eq!(tree.text_content(div).as_deref(), Some(""));
    }

    #[test]
    fn test_clone_node() {
        let (mut tree, doc) = setup();
        let div = tree.create_element(doc, "div").unwrap();
        tree.set_attribute(div, "class", "a b").unwrap();
        tree.set_attribute(div, "id", "x").unwrap();
        let p = tree.create_element(doc, "p").unwrap();
        tree.append_child(div, p).unwrap();
        tree.append(p, vec!["text".into()]).unwrap();

        let shallow = tree.clone_node(div, false).unwrap();
        assert!(tree.children(shallow).is_empty());
        assert_eq!(tree.id(shallow).unwrap(), "x");
        assert!(tree.class_list(shallow).unwrap().contains("b"));

        let deep = tree.clone_node(div, true).unwrap();
        assert_eq!(tree.text_content(deep).as_deref(), Some("text"));
        let copy_p = tree.children(deep)[0];
        assert_ne!(copy_p, p);
        assert_eq!(tree.parent_node(copy_p), Some(deep));
        assert_eq!(tree.owner_document(copy_p), Some(doc));

        // The copy is independent of the original
        tree.set_attribute(deep, "id", "y").unwrap();
        assert_eq!(tree.id(div).unwrap(), "x");
    }

    #[test]
    fn test_get_root_node_composed() {
        let (mut tree, doc) = setup();
        let host = tree.create_element(doc, "div").unwrap();
        tree.append_child(doc, host).unwrap();
        let shadow = tree.create_document_fragment(doc).unwrap();
        let inner = tree.create_element(doc, "span").unwrap();
        tree.append_child(shadow, inner).unwrap();
        tree.attach_fragment_host(shadow, host).unwrap();

        assert_eq!(tree.get_root_node(inner, false).unwrap(), shadow);
        assert_eq!(tree.get_root_node(inner, true).unwrap(), doc);
    }
}
