//! Attributes: `Attr` nodes and the `NamedNodeMap` that stores them

use rustc_hash::FxHashMap;

use crate::error::{DomError, DomResult};
use crate::node::{NodeData, NodeId};
use crate::tree::DomTree;

/// Payload of an `Attr` node
#[derive(Debug, Clone)]
pub struct AttrData {
    pub(crate) name: String,
    pub(crate) value: String,
    pub(crate) owner_element: Option<NodeId>,
}

impl AttrData {
    pub(crate) fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            owner_element: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Same as the name; namespaces are not modelled
    pub fn local_name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn owner_element(&self) -> Option<NodeId> {
        self.owner_element
    }

    pub fn specified(&self) -> bool {
        true
    }
}

#[derive(Debug, Clone)]
struct AttrSlot {
    name: String,
    /// `None` once the attribute has been removed
    value: Option<String>,
    /// Attr node materialized for this slot, if any
    node: Option<NodeId>,
}

/// Attribute storage of one element
///
/// Slots keep the position of the first insertion of a name: removing an
/// attribute leaves a hole that is skipped by index access and refilled if
/// the same name comes back. Attr nodes are only created when asked for and
/// then cached, so repeated lookups return the same node.
#[derive(Debug, Clone, Default)]
pub struct NamedNodeMap {
    slots: Vec<AttrSlot>,
    index: FxHashMap<String, usize>,
    length: usize,
    capacity: usize,
}

impl NamedNodeMap {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Number of present attributes
    pub fn len(&self) -> usize {
        self.length
    }

    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// Highest number of attributes ever present at once; index positions
    /// up to this were handed out and are never reclaimed
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        let slot = &self.slots[*self.index.get(name)?];
        slot.value.as_deref()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Present attributes as `(name, value)`, in slot order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.slots
            .iter()
            .filter_map(|slot| slot.value.as_deref().map(|value| (slot.name.as_str(), value)))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.iter().map(|(name, _)| name)
    }

    /// Name of the `index`-th present attribute
    pub fn name_at(&self, index: usize) -> Option<&str> {
        if index >= self.length {
            return None;
        }
        self.names().nth(index)
    }

    pub(crate) fn cached_node(&self, name: &str) -> Option<NodeId> {
        self.index.get(name).and_then(|&i| self.slots[i].node)
    }

    pub(crate) fn cache_node(&mut self, name: &str, node: Option<NodeId>) {
        if let Some(&i) = self.index.get(name) {
            self.slots[i].node = node;
        }
    }

    /// Store a value, returning the cached Attr node that must follow it
    pub(crate) fn set_value(&mut self, name: &str, value: &str) -> Option<NodeId> {
        match self.index.get(name) {
            Some(&i) => {
                let slot = &mut self.slots[i];
                if slot.value.is_none() {
                    self.length += 1;
                }
                slot.value = Some(value.to_string());
            }
            None => {
                self.index.insert(name.to_string(), self.slots.len());
                self.slots.push(AttrSlot {
                    name: name.to_string(),
                    value: Some(value.to_string()),
                    node: None,
                });
                self.length += 1;
            }
        }
        self.capacity = self.capacity.max(self.length);
        self.cached_node(name)
    }

    /// Clear a slot. Returns `None` when the attribute was not present,
    /// otherwise the Attr node that was cached for it.
    pub(crate) fn remove(&mut self, name: &str) -> Option<Option<NodeId>> {
        let &i = self.index.get(name)?;
        let slot = &mut self.slots[i];
        slot.value.take()?;
        self.length -= 1;
        Some(slot.node.take())
    }

    /// Values only, for cloning an element
    pub(crate) fn clone_values(&self) -> NamedNodeMap {
        let mut map = NamedNodeMap::new();
        for (name, value) in self.iter() {
            map.set_value(name, value);
        }
        map
    }
}

impl DomTree {
    /// The attribute map of an element
    pub fn attributes(&self, element: NodeId) -> DomResult<&NamedNodeMap> {
        self.node(element)?
            .as_element()
            .map(|e| &e.attributes)
            .ok_or(DomError::InvalidArgument("Node is not an element"))
    }

    fn attributes_mut(&mut self, element: NodeId) -> DomResult<&mut NamedNodeMap> {
        self.node_mut(element)?
            .as_element_mut()
            .map(|e| &mut e.attributes)
            .ok_or(DomError::InvalidArgument("Node is not an element"))
    }

    /// Write an attribute value and keep the cached Attr node in step.
    /// With `bubble` the element reacts (id and class caches).
    pub(crate) fn set_named_value(
        &mut self,
        element: NodeId,
        name: &str,
        value: &str,
        bubble: bool,
    ) -> DomResult<()> {
        let cached = self.attributes_mut(element)?.set_value(name, value);
        if let Some(attr) = cached.and_then(|id| self.get_mut(id)).and_then(|n| n.as_attr_mut()) {
            attr.value = value.to_string();
        }
        if bubble {
            self.on_attribute_changed(element, name, Some(value))?;
        }
        Ok(())
    }

    /// Remove an attribute value, orphaning its cached Attr node.
    /// Returns whether the attribute was present.
    pub(crate) fn remove_named_value(&mut self, element: NodeId, name: &str) -> DomResult<bool> {
        let Some(cached) = self.attributes_mut(element)?.remove(name) else {
            return Ok(false);
        };
        self.on_attribute_changed(element, name, None)?;
        if let Some(attr) = cached.and_then(|id| self.get_mut(id)).and_then(|n| n.as_attr_mut()) {
            attr.owner_element = None;
        }
        Ok(true)
    }

    /// Keep the id cache and class list in step with their attributes
    pub(crate) fn on_attribute_changed(
        &mut self,
        element: NodeId,
        name: &str,
        value: Option<&str>,
    ) -> DomResult<()> {
        let data = self
            .node_mut(element)?
            .as_element_mut()
            .ok_or(DomError::InvalidArgument("Node is not an element"))?;
        let value = value.unwrap_or("");
        match name {
            "id" => data.current_id = value.to_string(),
            "class" => data.class_list.set_value(value),
            _ => {}
        }
        Ok(())
    }

    /// The Attr node for a present attribute, created on first request
    fn materialize_attr(&mut self, element: NodeId, name: &str) -> DomResult<Option<NodeId>> {
        let map = self.attributes(element)?;
        let Some(value) = map.get(name) else {
            return Ok(None);
        };
        if let Some(cached) = map.cached_node(name) {
            return Ok(Some(cached));
        }

        let mut data = AttrData::new(name, value);
        data.owner_element = Some(element);
        let owner_document = self.owner_document(element);
        let attr = self.alloc(NodeData::Attr(data), owner_document);
        self.attributes_mut(element)?.cache_node(name, Some(attr));
        Ok(Some(attr))
    }

    /// `attributes.item(index)`
    pub fn attribute_item(&mut self, element: NodeId, index: usize) -> DomResult<Option<NodeId>> {
        let Some(name) = self.attributes(element)?.name_at(index).map(str::to_string) else {
            return Ok(None);
        };
        self.materialize_attr(element, &name)
    }

    /// `attributes.getNamedItem(name)`
    pub fn get_named_item(&mut self, element: NodeId, name: &str) -> DomResult<Option<NodeId>> {
        self.materialize_attr(element, name)
    }

    /// `attributes.setNamedItem(attr)`: returns the Attr it displaced, if any
    pub fn set_named_item(&mut self, element: NodeId, attr: NodeId) -> DomResult<Option<NodeId>> {
        let data = self
            .node(attr)?
            .as_attr()
            .ok_or(DomError::InvalidArgument(
                "Failed to execute 'setNamedItem' on 'NamedNodeMap': parameter 1 is not of type 'Attr'.",
            ))?;
        match data.owner_element {
            Some(owner) if owner == element => return Ok(Some(attr)),
            Some(_) => return Err(DomError::InUseAttribute),
            None => {}
        }
        let name = data.name.clone();
        let value = data.value.clone();

        let owner_document = self.owner_document(element);
        let map = self.attributes(element)?;
        let cached = map.cached_node(&name);
        let old_value = map.get(&name).map(str::to_string);
        let previous = match (cached, old_value) {
            (Some(cached), _) => {
                if let Some(old) = self.get_mut(cached).and_then(|n| n.as_attr_mut()) {
                    old.owner_element = None;
                }
                Some(cached)
            }
            (None, Some(old_value)) => {
                let detached = AttrData::new(name.as_str(), old_value);
                Some(self.alloc(NodeData::Attr(detached), owner_document))
            }
            (None, None) => None,
        };

        let node = self.node_mut(attr)?;
        node.owner_document = owner_document;
        if let Some(data) = node.as_attr_mut() {
            data.owner_element = Some(element);
        }
        // Cache first so the value write below does not need a lookup
        let map = self.attributes_mut(element)?;
        map.set_value(&name, &value);
        map.cache_node(&name, Some(attr));
        self.on_attribute_changed(element, &name, Some(&value))?;
        Ok(previous)
    }

    /// `attributes.removeNamedItem(name)`: returns the removed, now ownerless, Attr
    pub fn remove_named_item(&mut self, element: NodeId, name: &str) -> DomResult<NodeId> {
        let attr = self
            .materialize_attr(element, name)?
            .ok_or(DomError::NotFound("Node was not found"))?;
        self.remove_named_value(element, name)?;
        Ok(attr)
    }

    /// `attr.value = value`, written through to the owning element
    pub fn set_attr_value(&mut self, attr: NodeId, value: &str) -> DomResult<()> {
        let data = self
            .node_mut(attr)?
            .as_attr_mut()
            .ok_or(DomError::InvalidArgument("Node is not an attribute"))?;
        data.value = value.to_string();
        if let Some(owner) = data.owner_element {
            let name = data.name.clone();
            self.set_named_value(owner, &name, value, true)?;
        }
        Ok(())
    }

    /// `document.createAttribute(name)`
    pub fn create_attribute(&mut self, document: NodeId, name: &str) -> DomResult<NodeId> {
        crate::element::validate_name(name)?;
        let owner = self.owner_for_factory(document)?;
        Ok(self.alloc(
            NodeData::Attr(AttrData::new(name.to_ascii_lowercase(), "")),
            owner,
        ))
    }
}
