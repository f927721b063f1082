use std::fmt;

use crate::cursor::Cursor;
use crate::error::{Error, Result};
use crate::locking::Locking;
use crate::node::{Node, NodeId, EMPTY};

/// An append-only singly-linked list of `i32`s, with a head sentinel.
///
/// Nodes live in an arena and point at their successor by [`NodeId`]. The list is the only owner
/// of its nodes, so dropping it frees the whole chain at once, whatever its length.
/// Appending takes `&mut self`: the chain is built by one thread before any cursor exists, and
/// after that its shape never changes. Only node values are shared mutable state, and those are
/// guarded by the discipline `L`.
pub struct List<L: Locking> {
    nodes: Vec<Node<L>>,
    tail: NodeId,
    latch: L::ListLatch,
}

impl<L: Locking> List<L> {
    /// A list holding only the head sentinel.
    pub fn new() -> Self {
        List {
            nodes: vec![Node::empty()],
            tail: NodeId::HEAD,
            latch: Default::default(),
        }
    }

    /// A list of `len` empty nodes after the head.
    pub fn with_len(len: usize) -> Result<Self> {
        let mut list = Self::new();
        list.nodes
            .try_reserve_exact(len)
            .map_err(|source| Error::Allocation { what: "list nodes", requested: len, source })?;
        for _ in 0..len {
            list.push(Node::empty());
        }
        Ok(list)
    }

    /// Link a new node holding `value` after the current tail and return it.
    pub fn append(&mut self, value: i32) -> Result<NodeId> {
        self.nodes
            .try_reserve(1)
            .map_err(|source| Error::Allocation { what: "list node", requested: 1, source })?;
        let node = Node::empty();
        node.slot().set(value);
        Ok(self.push(node))
    }

    fn push(&mut self, node: Node<L>) -> NodeId {
        let id = NodeId::new(self.nodes.len());
        self.nodes.push(node);
        let tail = self.tail;
        self.nodes[tail.index()].link(id);
        self.tail = id;
        id
    }

    pub fn head(&self) -> NodeId {
        NodeId::HEAD
    }

    pub fn tail(&self) -> NodeId {
        self.tail
    }

    /// Number of data nodes, not counting the head.
    pub fn len(&self) -> usize {
        self.nodes.len() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The `n`th data node, counting from zero.
    pub fn nth(&self, n: usize) -> Option<NodeId> {
        if n < self.len() {
            Some(NodeId::new(n + 1))
        } else {
            None
        }
    }

    /// A cursor standing on the head.
    pub fn cursor(&self) -> Cursor<'_, L> {
        Cursor::enter(self, NodeId::HEAD)
    }

    pub fn cursor_at(&self, at: NodeId) -> Option<Cursor<'_, L>> {
        if at.index() < self.nodes.len() {
            Some(Cursor::enter(self, at))
        } else {
            None
        }
    }

    /// Every data node's value, in list order. Each value is read under the discipline's lock.
    pub fn values(&self) -> Vec<i32> {
        let mut values = Vec::with_capacity(self.len());
        let mut cursor = self.cursor().advance();
        while let Some(here) = cursor {
            values.push(here.read());
            cursor = here.advance();
        }
        values
    }

    /// Number of data nodes nobody has inserted into. Values are read under the discipline's lock.
    pub fn unwritten(&self) -> usize {
        self.values().into_iter().filter(|&v| v == EMPTY).count()
    }

    pub(crate) fn node(&self, id: NodeId) -> &Node<L> {
        &self.nodes[id.index()]
    }

    pub(crate) fn latch(&self) -> &L::ListLatch {
        &self.latch
    }
}

impl<L: Locking> Default for List<L> {
    fn default() -> Self {
        Self::new()
    }
}

impl<L: Locking> fmt::Debug for List<L> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("List")
            .field("discipline", &L::NAME)
            .field("len", &self.len())
            .field("tail", &self.tail)
            .finish()
    }
}
