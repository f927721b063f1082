//! The two locking disciplines a list can be built with.
//!
//! A discipline decides what a cursor holds while it sits on a node, how it moves to the
//! successor, and what must be locked to look at or change a node's value.
//!
//! - [`HandOverHand`]: every node has its own latch. A cursor holds the latch of the node it is
//!   on, and to move it takes the successor's latch before letting go of the current one, so it
//!   holds at most two latches and only for the duration of one step.
//! - [`SingleLock`]: one mutex for the whole list. `next` pointers never change once the list is
//!   built, so moving along needs no lock; reading or writing a value happens under the list
//!   mutex.
use std::cell::Cell;
use std::fmt;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering::SeqCst;

use parking_lot::{Mutex, MutexGuard};

use crate::config::Config;
use crate::error::Result;
use crate::list::List;
use crate::node::{NodeId, Slot};
use crate::workload::{self, Report, Workload};

pub trait Locking: Sized + Send + Sync + fmt::Debug + 'static {
    /// Name used in reports and logs.
    const NAME: &'static str;

    /// Per-node lock state.
    type NodeLatch: Default + Send + Sync;
    /// List-wide lock state.
    type ListLatch: Default + Send + Sync;
    /// What a cursor keeps while it is positioned on a node.
    type Hold<'a>;

    /// Take whatever is needed to stand on `at`.
    fn enter(list: &List<Self>, at: NodeId) -> Self::Hold<'_>;

    /// Move from `from` to its successor. Consumes the old hold; returns `None` at the end of
    /// the chain, in which case nothing is held any more.
    fn step<'a>(
        list: &'a List<Self>,
        from: NodeId,
        hold: Self::Hold<'a>,
    ) -> Option<(NodeId, Self::Hold<'a>)>;

    /// Run `f` on the value of `at` with the value protected against every other cursor.
    fn critical<'a, R, F>(list: &'a List<Self>, at: NodeId, hold: &Self::Hold<'a>, f: F) -> R
    where
        F: FnOnce(&Slot) -> R;
}

/// Lock coupling over per-node latches.
#[derive(Debug, Clone, Copy, Default)]
pub struct HandOverHand;

/// One mutex serializes every value access on the list.
#[derive(Debug, Clone, Copy, Default)]
pub struct SingleLock;

impl Locking for HandOverHand {
    const NAME: &'static str = "hand-over-hand";

    type NodeLatch = Latch;
    type ListLatch = ();
    type Hold<'a> = LatchGuard<'a>;

    fn enter(list: &List<Self>, at: NodeId) -> LatchGuard<'_> {
        list.node(at).latch().lock()
    }

    fn step<'a>(
        list: &'a List<Self>,
        from: NodeId,
        hold: LatchGuard<'a>,
    ) -> Option<(NodeId, LatchGuard<'a>)> {
        match list.node(from).next() {
            Some(next) => {
                // Acquire before release.
                let next_hold = list.node(next).latch().lock();
                drop(hold);
                Some((next, next_hold))
            }
            None => {
                drop(hold);
                None
            }
        }
    }

    fn critical<'a, R, F>(list: &'a List<Self>, at: NodeId, hold: &LatchGuard<'a>, f: F) -> R
    where
        F: FnOnce(&Slot) -> R,
    {
        debug_assert!(std::ptr::eq(hold.latch, list.node(at).latch()), "cursor holds the wrong latch");
        f(list.node(at).slot())
    }
}

impl Locking for SingleLock {
    const NAME: &'static str = "single-lock";

    type NodeLatch = ();
    type ListLatch = Mutex<()>;
    type Hold<'a> = ();

    fn enter(_list: &List<Self>, _at: NodeId) -> Self::Hold<'_> {}

    fn step<'a>(list: &'a List<Self>, from: NodeId, _hold: ()) -> Option<(NodeId, ())> {
        list.node(from).next().map(|next| (next, ()))
    }

    fn critical<'a, R, F>(list: &'a List<Self>, at: NodeId, _hold: &(), f: F) -> R
    where
        F: FnOnce(&Slot) -> R,
    {
        let _guard = list.latch().lock();
        f(list.node(at).slot())
    }
}

/// A cursor never holds more than this many node latches.
pub const MAX_HELD: usize = 2;

thread_local! {
    static HELD: Cell<usize> = const { Cell::new(0) };
    static PEAK_HELD: Cell<usize> = const { Cell::new(0) };
}

/// Number of node latches the calling thread holds right now.
pub fn held_by_this_thread() -> usize {
    HELD.with(Cell::get)
}

/// The most node latches the calling thread has held at once since the last reset.
pub fn peak_held_by_this_thread() -> usize {
    PEAK_HELD.with(Cell::get)
}

pub fn reset_peak_held() {
    PEAK_HELD.with(|p| p.set(HELD.with(Cell::get)));
}

/// A node's mutex, instrumented: it knows whether it is held, and every acquisition is counted
/// against the acquiring thread.
#[derive(Default)]
pub struct Latch {
    mutex: Mutex<()>,
    held: AtomicBool,
}

impl Latch {
    pub fn lock(&self) -> LatchGuard<'_> {
        let guard = self.mutex.lock();
        let was_held = self.held.swap(true, SeqCst);
        debug_assert!(!was_held, "latch granted while another holder still has it");
        let n = HELD.with(|h| {
            let n = h.get() + 1;
            h.set(n);
            n
        });
        debug_assert!(n <= MAX_HELD, "thread holds {} latches", n);
        PEAK_HELD.with(|p| p.set(p.get().max(n)));
        LatchGuard { latch: self, _guard: guard }
    }

    pub fn is_held(&self) -> bool {
        self.held.load(SeqCst)
    }
}

impl fmt::Debug for Latch {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Latch {{ held: {} }}", self.is_held())
    }
}

pub struct LatchGuard<'a> {
    latch: &'a Latch,
    _guard: MutexGuard<'a, ()>,
}

impl Drop for LatchGuard<'_> {
    fn drop(&mut self) {
        // Runs before `_guard` is dropped, so the flag is cleared while the mutex is still ours.
        self.latch.held.store(false, SeqCst);
        HELD.with(|h| h.set(h.get() - 1));
    }
}

/// Runtime choice of discipline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    HandOverHand,
    SingleLock,
}

impl Strategy {
    pub const ALL: [Strategy; 2] = [Strategy::HandOverHand, Strategy::SingleLock];

    pub fn name(self) -> &'static str {
        match self {
            Strategy::HandOverHand => HandOverHand::NAME,
            Strategy::SingleLock => SingleLock::NAME,
        }
    }

    pub fn run(self, which: Workload, config: &Config) -> Result<Report> {
        match self {
            Strategy::HandOverHand => workload::run::<HandOverHand>(which, config),
            Strategy::SingleLock => workload::run::<SingleLock>(which, config),
        }
    }
}
