//! Child lists and their live elements-only view

use std::ops::Index;

use crate::node::NodeId;

/// One entry of a child list
///
/// The element flag is captured when the entry is created so the elements
/// view can be patched without looking nodes back up in the arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ChildEntry {
    pub(crate) id: NodeId,
    pub(crate) is_element: bool,
}

impl ChildEntry {
    pub(crate) fn new(id: NodeId, is_element: bool) -> Self {
        Self { id, is_element }
    }
}

/// A live, ordered view of the element members of a [`NodeList`]
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct HtmlCollection {
    items: Vec<NodeId>,
}

impl HtmlCollection {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn item(&self, index: usize) -> Option<NodeId> {
        self.items.get(index).copied()
    }

    pub fn first(&self) -> Option<NodeId> {
        self.items.first().copied()
    }

    pub fn last(&self) -> Option<NodeId> {
        self.items.last().copied()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.items.contains(&id)
    }

    pub fn index_of(&self, id: NodeId) -> Option<usize> {
        self.items.iter().position(|&item| item == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.items.iter().copied()
    }

    pub fn to_vec(&self) -> Vec<NodeId> {
        self.items.clone()
    }
}

impl Index<usize> for HtmlCollection {
    type Output = NodeId;

    fn index(&self, index: usize) -> &NodeId {
        &self.items[index]
    }
}

/// An ordered child list
///
/// Read access is public. Mutation goes through [`NodeListMutator`], which
/// only the tree can obtain, and every mutation patches the elements view in
/// place instead of rebuilding it.
#[derive(Debug, Default)]
pub struct NodeList {
    entries: Vec<ChildEntry>,
    elements: HtmlCollection,
}

impl NodeList {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn item(&self, index: usize) -> Option<NodeId> {
        self.entries.get(index).map(|entry| entry.id)
    }

    pub fn first(&self) -> Option<NodeId> {
        self.entries.first().map(|entry| entry.id)
    }

    pub fn last(&self) -> Option<NodeId> {
        self.entries.last().map(|entry| entry.id)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.index_of(id).is_some()
    }

    pub fn index_of(&self, id: NodeId) -> Option<usize> {
        self.entries.iter().position(|entry| entry.id == id)
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = NodeId> + ExactSizeIterator + '_ {
        self.entries.iter().map(|entry| entry.id)
    }

    pub fn to_vec(&self) -> Vec<NodeId> {
        self.iter().collect()
    }

    /// The elements-only view of this list
    pub fn elements(&self) -> &HtmlCollection {
        &self.elements
    }

    pub(crate) fn mutator(&mut self) -> NodeListMutator<'_> {
        NodeListMutator { list: self }
    }
}

/// Crate-private write access to a [`NodeList`]
pub(crate) struct NodeListMutator<'a> {
    list: &'a mut NodeList,
}

impl NodeListMutator<'_> {
    /// Append `items`, extending the elements view in place
    pub(crate) fn push(&mut self, items: &[ChildEntry]) {
        self.list.entries.extend_from_slice(items);
        self.list
            .elements
            .items
            .extend(items.iter().filter(|entry| entry.is_element).map(|entry| entry.id));
    }

    /// Remove `delete_count` entries at `index` and insert `items` there
    ///
    /// `index` and `delete_count` are clamped to the list. The elements view
    /// is patched at the position of the first element at or after `index`,
    /// or at its end when no element follows. Returns the removed ids.
    pub(crate) fn splice(
        &mut self,
        index: usize,
        delete_count: usize,
        items: &[ChildEntry],
    ) -> Vec<NodeId> {
        let index = index.min(self.list.entries.len());
        let end = index.saturating_add(delete_count).min(self.list.entries.len());

        // Elements before the splice point map one to one onto the view prefix
        let anchor = self.list.entries[..index]
            .iter()
            .filter(|entry| entry.is_element)
            .count();

        let removed: Vec<ChildEntry> = self
            .list
            .entries
            .splice(index..end, items.iter().copied())
            .collect();

        let removed_elements = removed.iter().filter(|entry| entry.is_element).count();
        let inserted = items.iter().filter(|entry| entry.is_element).map(|entry| entry.id);
        if removed_elements > 0 || items.iter().any(|entry| entry.is_element) {
            self.list
                .elements
                .items
                .splice(anchor..anchor + removed_elements, inserted);
        }

        removed.into_iter().map(|entry| entry.id).collect()
    }

    pub(crate) fn index_of(&self, id: NodeId) -> Option<usize> {
        self.list.index_of(id)
    }

    pub(crate) fn remove(&mut self, id: NodeId) -> bool {
        match self.index_of(id) {
            Some(index) => {
                self.splice(index, 1, &[]);
                true
            }
            None => false,
        }
    }

    pub(crate) fn clear(&mut self) -> Vec<NodeId> {
        let len = self.list.entries.len();
        self.splice(0, len, &[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn el(n: u32) -> ChildEntry {
        ChildEntry::new(NodeId::new(n), true)
    }

    fn txt(n: u32) -> ChildEntry {
        ChildEntry::new(NodeId::new(n), false)
    }

    fn assert_view_in_sync(list: &NodeList) {
        let expected: Vec<NodeId> = list
            .entries
            .iter()
            .filter(|entry| entry.is_element)
            .map(|entry| entry.id)
            .collect();
        assert_eq!(list.elements().to_vec(), expected);
    }

    #[test]
    fn test_push_updates_view() {
        let mut list = NodeList::new();
        list.mutator().push(&[el(1), txt(2), el(3)]);
        assert_eq!(list.len(), 3);
        assert_eq!(list.elements().len(), 2);
        assert_view_in_sync(&list);
    }

    #[test]
    fn test_splice_insert_in_middle() {
        let mut list = NodeList::new();
        list.mutator().push(&[el(1), txt(2), el(3)]);
        list.mutator().splice(2, 0, &[el(4), txt(5)]);
        assert_eq!(
            list.to_vec(),
            vec![NodeId::new(1), NodeId::new(2), NodeId::new(4), NodeId::new(5), NodeId::new(3)]
        );
        assert_eq!(list.elements().to_vec(), vec![NodeId::new(1), NodeId::new(4), NodeId::new(3)]);
        assert_view_in_sync(&list);
    }

    #[test]
    fn test_splice_remove_and_replace() {
        let mut list = NodeList::new();
        list.mutator().push(&[txt(1), el(2), el(3), txt(4), el(5)]);
        let removed = list.mutator().splice(1, 3, &[txt(6), el(7)]);
        assert_eq!(removed, vec![NodeId::new(2), NodeId::new(3), NodeId::new(4)]);
        assert_eq!(list.elements().to_vec(), vec![NodeId::new(7), NodeId::new(5)]);
        assert_view_in_sync(&list);
    }

    #[test]
    fn test_splice_without_following_element_appends() {
        let mut list = NodeList::new();
        list.mutator().push(&[el(1), txt(2)]);
        list.mutator().splice(2, 0, &[el(3)]);
        assert_eq!(list.elements().last(), Some(NodeId::new(3)));
        assert_view_in_sync(&list);
    }

    #[test]
    fn test_zero_splice_is_noop() {
        let mut list = NodeList::new();
        list.mutator().push(&[el(1), el(2)]);
        let removed = list.mutator().splice(1, 0, &[]);
        assert!(removed.is_empty());
        assert_eq!(list.elements().to_vec(), vec![NodeId::new(1), NodeId::new(2)]);
    }

    #[test]
    fn test_out_of_range_splice_is_clamped() {
        let mut list = NodeList::new();
        list.mutator().push(&[el(1)]);
        let removed = list.mutator().splice(5, 10, &[el(2)]);
        assert!(removed.is_empty());
        assert_eq!(list.to_vec(), vec![NodeId::new(1), NodeId::new(2)]);
        assert_view_in_sync(&list);
    }

    #[test]
    fn test_random_sequence_keeps_view_in_sync() {
        let mut list = NodeList::new();
        let mut next = 0u32;
        // Small deterministic LCG so the sequence is reproducible
        let mut seed = 0x2545_f491u32;
        for _ in 0..200 {
            seed = seed.wrapping_mul(1_103_515_245).wrapping_add(12_345);
            let len = list.len();
            let index = if len == 0 { 0 } else { (seed as usize >> 3) % (len + 1) };
            let delete = (seed as usize >> 7) % 3;
            let count = (seed as usize >> 11) % 3;
            let items: Vec<ChildEntry> = (0..count)
                .map(|i| {
                    next += 1;
                    ChildEntry::new(NodeId::new(next), (seed >> (13 + i)) & 1 == 1)
                })
                .collect();
            list.mutator().splice(index, delete, &items);
            assert_view_in_sync(&list);
        }
    }

    #[test]
    fn test_remove_and_clear() {
        let mut list = NodeList::new();
        list.mutator().push(&[el(1), txt(2), el(3)]);
        assert!(list.mutator().remove(NodeId::new(1)));
        assert!(!list.mutator().remove(NodeId::new(9)));
        assert_eq!(list.elements().to_vec(), vec![NodeId::new(3)]);
        let cleared = list.mutator().clear();
        assert_eq!(cleared.len(), 2);
        assert!(list.is_empty());
        assert!(list.elements().is_empty());
    }
}
