use std::fmt;
use std::sync::atomic::AtomicI32;
use std::sync::atomic::Ordering::Relaxed;

use crate::locking::Locking;

/// The value of a node nobody has inserted into yet.
pub const EMPTY: i32 = 0;

/// Index of a node in its list's arena. Stable for the lifetime of the list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(usize);

impl NodeId {
    /// The sentinel every list starts with. It never holds user data.
    pub const HEAD: NodeId = NodeId(0);

    pub(crate) fn new(index: usize) -> Self {
        NodeId(index)
    }

    pub fn index(self) -> usize {
        self.0
    }

    pub fn is_head(self) -> bool {
        self == NodeId::HEAD
    }
}

/// The value cell of a node.
///
/// Every access is made from inside a critical section of the list's locking discipline, so the
/// lock provides the ordering and the atomic only has to make the access itself well defined.
#[derive(Default)]
pub struct Slot(AtomicI32);

impl Slot {
    pub fn get(&self) -> i32 {
        self.0.load(Relaxed)
    }

    pub fn set(&self, value: i32) {
        self.0.store(value, Relaxed)
    }

    pub fn is_empty(&self) -> bool {
        self.get() == EMPTY
    }
}

impl fmt::Debug for Slot {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Slot({})", self.get())
    }
}

/// A link in the chain. `next` is written once, when the successor is appended, and never again.
pub struct Node<L: Locking> {
    slot: Slot,
    next: Option<NodeId>,
    latch: L::NodeLatch,
}

impl<L: Locking> Node<L> {
    /// A zero-valued node with no successor and a fresh latch.
    pub(crate) fn empty() -> Self {
        Node {
            slot: Slot::default(),
            next: None,
            latch: Default::default(),
        }
    }

    pub(crate) fn slot(&self) -> &Slot {
        &self.slot
    }

    pub(crate) fn latch(&self) -> &L::NodeLatch {
        &self.latch
    }

    pub fn next(&self) -> Option<NodeId> {
        self.next
    }

    pub(crate) fn link(&mut self, next: NodeId) {
        debug_assert!(self.next.is_none(), "node already has a successor");
        self.next = Some(next);
    }
}

impl<L: Locking> fmt::Debug for Node<L> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Node")
            .field("slot", &self.slot)
            .field("next", &self.next)
            .finish()
    }
}
