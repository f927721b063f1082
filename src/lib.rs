//! A fixed-length, append-only linked list of integers, built to compare two ways of locking it:
//! one mutex for the whole list, or one per node with hand-over-hand traversal.
//! The [`workload`] module runs the three insert/lookup workloads used to measure them.

pub mod config;
pub mod counter;
pub mod cursor;
pub mod error;
pub mod list;
pub mod locking;
pub mod node;
pub mod workload;

pub use config::{Config, LIMIT, LOOKUP_THREADS};
pub use counter::ProgressCounter;
pub use cursor::{Cursor, Fill};
pub use error::{Error, Result};
pub use list::List;
pub use locking::{HandOverHand, Locking, SingleLock, Strategy};
pub use node::{NodeId, EMPTY};
pub use workload::{insert_loop, lookup_loop, Report, Task, Workload};

#[cfg(test)]
mod test {
    use super::*;

    use rand::{rngs::StdRng, SeedableRng};

    macro_rules! correctness_list {($L:ty) => {
        let mut list: List<$L> = List::new();
        assert!(list.is_empty());
        list.append(1).unwrap();
        assert!(!list.is_empty());
        assert_eq!(list.values(), vec![1]);
        for i in 2..200 {
            list.append(i).unwrap();
        }
        assert_eq!(list.len(), 199);
        assert_eq!(list.values(), (1..200).collect::<Vec<_>>());

        let list: List<$L> = List::with_len(200).unwrap();
        let counter = ProgressCounter::new();
        let mut rng = StdRng::seed_from_u64(200);
        let stats = insert_loop(Task::from_head(&list, &counter, 200), &mut rng);
        assert_eq!(stats.written, 200);
        assert!(!stats.exhausted);
        assert!(list.values().iter().all(|&v| v != EMPTY));

        let counter = ProgressCounter::new();
        let stats = lookup_loop(Task::from_head(&list, &counter, 200), &mut rng);
        assert_eq!(stats.compared, 200);
        assert_eq!(counter.get(), 200);
    }}

    #[test]
    fn correct_list_hand_over_hand() {
        correctness_list!(HandOverHand);
    }

    #[test]
    fn correct_list_single_lock() {
        correctness_list!(SingleLock);
    }

    #[test]
    fn default_config() {
        let c = Config::default();
        assert_eq!(c.limit, LIMIT);
        assert_eq!(c.seed, None);
        assert_eq!(Config::with_limit(10).seeded(3), Config { limit: 10, seed: Some(3) });
        assert_eq!(LOOKUP_THREADS, 2);
    }
}
