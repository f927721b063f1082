#[macro_use]
extern crate bencher;

use bencher::Bencher;

use linklock::workload::{self, worker_rng};
use linklock::{Config, HandOverHand, List, Locking, ProgressCounter, SingleLock, Task, Workload};

/// Kept small: every iteration builds a fresh list and starts its own threads.
const N: usize = 4 * 1024;

fn run_workload<L: Locking>(b: &mut Bencher, w: Workload) {
    let config = Config::with_limit(N).seeded(1);
    b.iter(|| {
        let report = workload::run::<L>(w, &config).unwrap();
        bench::black_box(report);
    });
}

/// Single-threaded cost of the locking protocol alone.
fn scan<L: Locking>(b: &mut Bencher) {
    let list: List<L> = List::with_len(N).unwrap();
    let counter = ProgressCounter::new();
    workload::insert_loop(Task::from_head(&list, &counter, N), &mut worker_rng(Some(1), 0));
    b.iter(|| {
        let counter = ProgressCounter::new();
        let stats = workload::lookup_loop(Task::from_head(&list, &counter, N), &mut worker_rng(Some(2), 0));
        bench::black_box(stats);
    });
}

mod hand_over_hand {
    use super::*;

    pub fn concurrent_insert(b: &mut Bencher) {
        run_workload::<HandOverHand>(b, Workload::ConcurrentInsert);
    }

    pub fn insert_and_lookup(b: &mut Bencher) {
        run_workload::<HandOverHand>(b, Workload::InsertAndLookup);
    }

    pub fn concurrent_lookup(b: &mut Bencher) {
        run_workload::<HandOverHand>(b, Workload::ConcurrentLookup);
    }

    pub fn scan(b: &mut Bencher) {
        super::scan::<HandOverHand>(b);
    }
}

mod single_lock {
    use super::*;

    pub fn concurrent_insert(b: &mut Bencher) {
        run_workload::<SingleLock>(b, Workload::ConcurrentInsert);
    }

    pub fn insert_and_lookup(b: &mut Bencher) {
        run_workload::<SingleLock>(b, Workload::InsertAndLookup);
    }

    pub fn concurrent_lookup(b: &mut Bencher) {
        run_workload::<SingleLock>(b, Workload::ConcurrentLookup);
    }

    pub fn scan(b: &mut Bencher) {
        super::scan::<SingleLock>(b);
    }
}

benchmark_group!(
    hand_over_hand_list,
    hand_over_hand::concurrent_insert,
    hand_over_hand::insert_and_lookup,
    hand_over_hand::concurrent_lookup,
    hand_over_hand::scan
);
benchmark_group!(
    single_lock_list,
    single_lock::concurrent_insert,
    single_lock::insert_and_lookup,
    single_lock::concurrent_lookup,
    single_lock::scan
);
benchmark_main!(hand_over_hand_list, single_lock_list);
