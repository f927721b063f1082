use std::fmt;

use crate::counter::ProgressCounter;
use crate::list::List;
use crate::locking::Locking;
use crate::node::{NodeId, Slot};

/// A position in a list, together with whatever the list's discipline says must be held there.
///
/// Moving forward goes through [`Cursor::advance`], which follows the discipline's stepping
/// protocol. Dropping a cursor releases what it holds. A cursor belongs to one thread; cursors
/// are not shared.
pub struct Cursor<'a, L: Locking> {
    list: &'a List<L>,
    at: NodeId,
    hold: L::Hold<'a>,
}

/// Outcome of trying to insert at the cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fill {
    /// The node was empty and now holds the value; one unit was counted.
    Written,
    /// Someone else already wrote this node.
    Occupied,
    /// The counter is at its limit; nothing was written.
    LimitReached,
}

impl<'a, L: Locking> Cursor<'a, L> {
    pub(crate) fn enter(list: &'a List<L>, at: NodeId) -> Self {
        let hold = L::enter(list, at);
        Cursor { list, at, hold }
    }

    pub fn position(&self) -> NodeId {
        self.at
    }

    /// Move to the successor, or return `None` (holding nothing) at the end of the chain.
    pub fn advance(self) -> Option<Self> {
        let Cursor { list, at, hold } = self;
        L::step(list, at, hold).map(|(at, hold)| Cursor { list, at, hold })
    }

    /// Step off the head sentinel if that is where the cursor stands.
    pub fn skip_head(self) -> Option<Self> {
        if self.at.is_head() {
            self.advance()
        } else {
            Some(self)
        }
    }

    pub fn read(&self) -> i32 {
        self.critical(Slot::get)
    }

    pub fn write(&self, value: i32) {
        self.critical(|slot| slot.set(value))
    }

    /// Write `value` if the node is still empty, counting the write against `counter`.
    /// The emptiness check, the count and the write happen in one critical section.
    pub fn fill(&self, value: i32, counter: &ProgressCounter, limit: usize) -> Fill {
        self.critical(|slot| {
            if !slot.is_empty() {
                Fill::Occupied
            } else if counter.try_claim(limit) {
                slot.set(value);
                Fill::Written
            } else {
                Fill::LimitReached
            }
        })
    }

    fn critical<R, F: FnOnce(&Slot) -> R>(&self, f: F) -> R {
        L::critical(self.list, self.at, &self.hold, f)
    }
}

impl<L: Locking> fmt::Debug for Cursor<'_, L> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Cursor")
            .field("discipline", &L::NAME)
            .field("at", &self.at)
            .finish()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::locking::{HandOverHand, SingleLock};

    #[test]
    fn fill_once() {
        let list: List<SingleLock> = List::with_len(2).unwrap();
        let counter = ProgressCounter::new();
        let c = list.cursor().skip_head().unwrap();
        assert_eq!(c.fill(5, &counter, 10), Fill::Written);
        assert_eq!(c.fill(6, &counter, 10), Fill::Occupied);
        assert_eq!(c.read(), 5);
        assert_eq!(counter.get(), 1);
        let c = c.advance().unwrap();
        assert_eq!(c.fill(9, &counter, 1), Fill::LimitReached);
        assert_eq!(c.read(), 0);
    }

    #[test]
    fn skip_head_keeps_data_position() {
        let list: List<HandOverHand> = List::with_len(3).unwrap();
        let second = list.nth(1).unwrap();
        {
            let c = list.cursor_at(second).unwrap().skip_head().unwrap();
            assert_eq!(c.position(), second);
        }
        let c = list.cursor().skip_head().unwrap();
        assert_eq!(Some(c.position()), list.nth(0));
    }

    #[test]
    fn second_cursor_after_first_is_dropped() {
        // One thread, two cursors in turn: the first must let go before the second walks.
        let list: List<HandOverHand> = List::with_len(3).unwrap();
        let first = list.cursor_at(list.tail()).unwrap();
        assert_eq!(crate::locking::held_by_this_thread(), 1);
        drop(first);
        let c = list.cursor().skip_head().unwrap();
        assert_eq!(crate::locking::held_by_this_thread(), 1);
        assert!(!list.node(list.head()).latch().is_held());
        drop(c);
        assert_eq!(crate::locking::held_by_this_thread(), 0);
    }

    #[test]
    fn step_holds_one_latch_between_hops() {
        let list: List<HandOverHand> = List::with_len(4).unwrap();
        let mut cursor = list.cursor();
        loop {
            assert_eq!(crate::locking::held_by_this_thread(), 1);
            cursor.write(1);
            match cursor.advance() {
                Some(c) => cursor = c,
                None => break,
            }
        }
        assert_eq!(crate::locking::held_by_this_thread(), 0);
    }

    #[test]
    fn end_of_chain_releases() {
        let list: List<HandOverHand> = List::with_len(1).unwrap();
        let tail = list.cursor_at(list.tail()).unwrap();
        assert!(tail.advance().is_none());
        assert!(!list.node(list.tail()).latch().is_held());
    }
}
