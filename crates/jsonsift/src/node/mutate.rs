use std::mem;

use super::{Children, Document, Link, Node, NodeId, NodeKind, Slot, render};
use crate::{error::NodeError, value::Value};

/// Write handle to a node.
///
/// Every structural change marks the node and its ancestors dirty; their
/// cached values and renderings are dropped and rebuilt on next access.
/// Removed nodes stay in the arena as orphans without a parent.
pub struct NodeMut<'a, 'src> {
    doc: &'a mut Document<'src>,
    id: NodeId,
}

impl<'a, 'src> NodeMut<'a, 'src> {
    pub(super) fn new(doc: &'a mut Document<'src>, id: NodeId) -> Self {
        Self { doc, id }
    }

    /// Id of the node being edited.
    #[must_use]
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Read view of this node.
    #[must_use]
    pub fn node(&self) -> Node<'_> {
        Node {
            doc: &*self.doc,
            id: self.id,
        }
    }

    /// Write handle to an object member.
    pub fn get_mut(&mut self, key: &str) -> Option<NodeMut<'_, 'src>> {
        let id = self.node().get(key)?.id();
        Some(NodeMut::new(self.doc, id))
    }

    /// Write handle to an array element.
    pub fn at_mut(&mut self, index: usize) -> Option<NodeMut<'_, 'src>> {
        let id = self.node().at(index)?.id();
        Some(NodeMut::new(self.doc, id))
    }

    /// Appends `value` to this array, returning the new element.
    ///
    /// # Errors
    ///
    /// Fails unless the node is an array.
    pub fn append(&mut self, value: &Value) -> Result<NodeId, NodeError> {
        let size = self.array()?.len();
        self.insert(size, value)
    }

    /// Inserts `value` at `index`, shifting later elements right.
    ///
    /// # Errors
    ///
    /// Fails unless the node is an array and `index <= size`.
    pub fn insert(&mut self, index: usize, value: &Value) -> Result<NodeId, NodeError> {
        let size = self.array()?.len();
        if index > size {
            return Err(NodeError::IndexOutOfBounds { index, size });
        }
        let child = self.doc.attach(Some(self.id), Link::Index(index), value);
        self.array()?.insert(index, child);
        self.renumber(index + 1);
        self.touch();
        Ok(child)
    }

    /// Sets member `key` of this object. An existing member keeps its
    /// position; its old value is orphaned.
    ///
    /// # Errors
    ///
    /// Fails unless the node is an object.
    pub fn set(&mut self, key: &str, value: &Value) -> Result<NodeId, NodeError> {
        self.object()?;
        let child = self
            .doc
            .attach(Some(self.id), Link::Key(key.to_owned()), value);
        if let Some(old) = self.object()?.insert(key.to_owned(), child) {
            self.orphan(old);
        }
        self.touch();
        Ok(child)
    }

    /// Removes member `key`, keeping the order of the remaining members.
    ///
    /// # Errors
    ///
    /// Fails unless the node is an object holding `key`.
    pub fn remove_key(&mut self, key: &str) -> Result<NodeId, NodeError> {
        let old = self
            .object()?
            .shift_remove(key)
            .ok_or_else(|| NodeError::KeyNotFound(key.to_owned()))?;
        self.orphan(old);
        self.touch();
        Ok(old)
    }

    /// Removes the element at `index`; later elements shift left.
    ///
    /// # Errors
    ///
    /// Fails unless the node is an array and `index < size`.
    pub fn remove_at(&mut self, index: usize) -> Result<NodeId, NodeError> {
        let items = self.array()?;
        let size = items.len();
        if index >= size {
            return Err(NodeError::IndexOutOfBounds { index, size });
        }
        let old = items.remove(index);
        self.renumber(index);
        self.orphan(old);
        self.touch();
        Ok(old)
    }

    /// Replaces the node's content with `value`, changing its kind if needed.
    /// The node keeps its place in the parent.
    pub fn set_value(&mut self, value: &Value) {
        let slot = &mut self.doc.slots[self.id.0];
        let link = mem::replace(&mut slot.link, Link::Root);
        let parent = slot.parent;
        let old = mem::replace(&mut slot.children, Children::Leaf);
        let (kind, text) = render::content(value);
        *slot = Slot::new(kind, text, link, parent);
        match old {
            Children::Array(ids) => ids.into_iter().for_each(|id| self.orphan(id)),
            Children::Object(ids) => ids.into_values().for_each(|id| self.orphan(id)),
            Children::Leaf => {}
        }
        self.doc.attach_children(self.id, value);
        self.touch();
    }

    /// Detaches this node from its parent.
    ///
    /// # Errors
    ///
    /// Fails with [`NodeError::Detached`] for the root or an already removed
    /// node.
    pub fn delete(self) -> Result<(), NodeError> {
        let slot = self.doc.slot(self.id);
        let parent = slot.parent.ok_or(NodeError::Detached)?;
        let link = slot.link.clone();
        let mut parent = NodeMut::new(self.doc, parent);
        match link {
            Link::Key(key) => parent.remove_key(&key).map(drop),
            Link::Index(index) => parent.remove_at(index).map(drop),
            Link::Root => Err(NodeError::Detached),
        }
    }

    fn array(&mut self) -> Result<&mut Vec<NodeId>, NodeError> {
        let slot = &mut self.doc.slots[self.id.0];
        match &mut slot.children {
            Children::Array(items) => Ok(items),
            Children::Leaf => Err(NodeError::NotContainer(slot.kind)),
            _ => Err(NodeError::TypeMismatch {
                expected: NodeKind::Array,
                found: slot.kind,
            }),
        }
    }

    fn object(&mut self) -> Result<&mut indexmap::IndexMap<String, NodeId>, NodeError> {
        let slot = &mut self.doc.slots[self.id.0];
        match &mut slot.children {
            Children::Object(members) => Ok(members),
            Children::Leaf => Err(NodeError::NotContainer(slot.kind)),
            _ => Err(NodeError::TypeMismatch {
                expected: NodeKind::Object,
                found: slot.kind,
            }),
        }
    }

    /// Rewrites the index links of elements from `from` onwards.
    fn renumber(&mut self, from: usize) {
        let Children::Array(items) = &self.doc.slots[self.id.0].children else {
            return;
        };
        let tail: Vec<NodeId> = items[from..].to_vec();
        for (offset, id) in tail.into_iter().enumerate() {
            self.doc.slots[id.0].link = Link::Index(from + offset);
        }
    }

    fn orphan(&mut self, id: NodeId) {
        let slot = &mut self.doc.slots[id.0];
        slot.parent = None;
        slot.link = Link::Root;
    }

    /// Marks this node and every ancestor dirty.
    fn touch(&mut self) {
        let mut next = Some(self.id);
        while let Some(id) = next {
            let slot = &mut self.doc.slots[id.0];
            slot.invalidate();
            next = slot.parent;
        }
    }
}
