//! CharacterData: the string payload of Text and Comment nodes
//!
//! Offsets and lengths are counted in UTF-16 code units, so results agree
//! with what script sees for text outside the Basic Multilingual Plane.

use crate::error::{DomError, DomResult};
use crate::node::{NodeData, NodeId};
use crate::tree::DomTree;

const NOT_CHARACTER_DATA: &str = "Node is not a CharacterData node";
const OFFSET_OUT_OF_RANGE: &str = "The offset is greater than the node's length";

fn utf16_len(data: &str) -> usize {
    data.encode_utf16().count()
}

/// Replace `count` units at `offset`, clamping `count` to the end
fn splice_utf16(data: &str, offset: usize, count: usize, replacement: &str) -> DomResult<String> {
    let units: Vec<u16> = data.encode_utf16().collect();
    if offset > units.len() {
        return Err(DomError::IndexSize(OFFSET_OUT_OF_RANGE));
    }
    let end = offset.saturating_add(count).min(units.len());
    let mut out: Vec<u16> = Vec::with_capacity(units.len() - (end - offset) + replacement.len());
    out.extend_from_slice(&units[..offset]);
    out.extend(replacement.encode_utf16());
    out.extend_from_slice(&units[end..]);
    Ok(String::from_utf16_lossy(&out))
}

impl DomTree {
    /// `data` of a Text or Comment node
    pub fn data(&self, node: NodeId) -> DomResult<&str> {
        self.node(node)?
            .as_character_data()
            .ok_or(DomError::InvalidArgument(NOT_CHARACTER_DATA))
    }

    /// `data = value` (also `nodeValue` and `textContent` on these nodes)
    pub fn set_data(&mut self, node: NodeId, value: &str) -> DomResult<()> {
        let data = self
            .node_mut(node)?
            .as_character_data_mut()
            .ok_or(DomError::InvalidArgument(NOT_CHARACTER_DATA))?;
        data.clear();
        data.push_str(value);
        Ok(())
    }

    /// `length` in UTF-16 code units
    pub fn data_length(&self, node: NodeId) -> DomResult<usize> {
        Ok(utf16_len(self.data(node)?))
    }

    pub fn append_data(&mut self, node: NodeId, value: &str) -> DomResult<()> {
        self.node_mut(node)?
            .as_character_data_mut()
            .ok_or(DomError::InvalidArgument(NOT_CHARACTER_DATA))?
            .push_str(value);
        Ok(())
    }

    /// `substringData(offset, count)`; `count` is clamped to the end
    pub fn substring_data(&self, node: NodeId, offset: usize, count: usize) -> DomResult<String> {
        let units: Vec<u16> = self.data(node)?.encode_utf16().collect();
        if offset > units.len() {
            return Err(DomError::IndexSize(OFFSET_OUT_OF_RANGE));
        }
        let end = offset.saturating_add(count).min(units.len());
        Ok(String::from_utf16_lossy(&units[offset..end]))
    }

    pub fn insert_data(&mut self, node: NodeId, offset: usize, value: &str) -> DomResult<()> {
        self.replace_data(node, offset, 0, value)
    }

    pub fn delete_data(&mut self, node: NodeId, offset: usize, count: usize) -> DomResult<()> {
        self.replace_data(node, offset, count, "")
    }

    /// `replaceData(offset, count, data)`
    pub fn replace_data(&mut self, node: NodeId, offset: usize, count: usize, value: &str) -> DomResult<()> {
        let updated = splice_utf16(self.data(node)?, offset, count, value)?;
        self.set_data(node, &updated)
    }

    /// `text.splitText(offset)`
    ///
    /// The text after `offset` moves into a new Text node, inserted right
    /// after `node` when it has a parent. Returns the new node.
    pub fn split_text(&mut self, node: NodeId, offset: usize) -> DomResult<NodeId> {
        let source = self.node(node)?;
        let Some(data) = source.as_text() else {
            return Err(DomError::InvalidArgument("Node is not a Text node"));
        };
        let length = utf16_len(data);
        if offset > length {
            return Err(DomError::IndexSize(OFFSET_OUT_OF_RANGE));
        }
        let tail = self.substring_data(node, offset, length - offset)?;
        let owner = source.owner_document;
        let parent = source.parent;

        let new_node = self.alloc(NodeData::Text(tail), owner);
        if let Some(parent) = parent {
            let index = self.index_in_parent(node).map_or(0, |index| index + 1);
            self.link_at(parent, index, &[new_node])?;
        }
        self.replace_data(node, offset, length - offset, "")?;
        log::trace!("split {} at {} into {}", node, offset, new_node);
        Ok(new_node)
    }
}
