//! The three workloads and the loops they are made of.
//!
//! Each workload builds its own list and counters, starts its workers, joins them and reports
//! what the counters say. Workers are scoped threads, so they borrow the list and counters
//! directly and none of them can outlive the workload that started it.
use std::fmt;
use std::time::Duration;

use bench::{fmt_thousands_sep, secs, timed, Stopwatch};
use crossbeam::thread::{Scope, ScopedJoinHandle};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, trace};

use crate::config::{Config, LOOKUP_THREADS};
use crate::counter::ProgressCounter;
use crate::cursor::Fill;
use crate::error::{Error, Result};
use crate::list::List;
use crate::locking::Locking;
use crate::node::NodeId;

/// Everything a worker needs. Handed over by value when the worker starts.
pub struct Task<'a, L: Locking> {
    pub list: &'a List<L>,
    pub start: NodeId,
    pub counter: &'a ProgressCounter,
    pub limit: usize,
}

impl<'a, L: Locking> Task<'a, L> {
    pub fn from_head(list: &'a List<L>, counter: &'a ProgressCounter, limit: usize) -> Self {
        Task { list, start: list.head(), counter, limit }
    }
}

impl<L: Locking> Clone for Task<'_, L> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<L: Locking> Copy for Task<'_, L> {}

impl<L: Locking> fmt::Debug for Task<'_, L> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Task")
            .field("list", self.list)
            .field("start", &self.start)
            .field("counter", &self.counter.get())
            .field("limit", &self.limit)
            .finish()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InsertStats {
    /// Nodes this worker wrote (and counted).
    pub written: usize,
    /// Nodes it found already written by someone else.
    pub passed_over: usize,
    /// The chain ran out before the counter reached the limit.
    pub exhausted: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LookupStats {
    /// Comparisons completed and counted.
    pub compared: usize,
    /// Comparisons that found the target.
    pub hits: usize,
    /// The chain ran out before the counter reached the limit.
    pub exhausted: bool,
}

/// Values written by inserts. Never `EMPTY`.
pub fn random_value<R: Rng + ?Sized>(rng: &mut R) -> i32 {
    rng.gen_range(1..=i32::MAX)
}

/// Walk forward from `task.start`, writing a fresh random value into every empty node, until the
/// counter reaches the limit or the chain ends. Each write is one unit on the counter.
pub fn insert_loop<L: Locking, R: Rng + ?Sized>(task: Task<'_, L>, rng: &mut R) -> InsertStats {
    let Task { list, start, counter, limit } = task;
    let mut stats = InsertStats::default();
    let mut cursor = list.cursor_at(start).and_then(|c| c.skip_head());
    loop {
        if counter.reached(limit) {
            break;
        }
        let Some(here) = cursor else {
            stats.exhausted = true;
            break;
        };
        match here.fill(random_value(rng), counter, limit) {
            Fill::Written => stats.written += 1,
            Fill::Occupied => stats.passed_over += 1,
            Fill::LimitReached => break,
        }
        cursor = here.advance();
    }
    stats
}

/// Look up random values, scanning forward from `task.start`.
///
/// A target stays the same until a node matching it is found; then a new one is drawn. The scan
/// never goes back to the head, so the loop also stops when the chain ends. Each comparison is one
/// unit on the counter, match or not.
pub fn lookup_loop<L: Locking, R: Rng + ?Sized>(task: Task<'_, L>, rng: &mut R) -> LookupStats {
    let Task { list, start, counter, limit } = task;
    let mut stats = LookupStats::default();
    let mut target = random_value(rng);
    let mut cursor = list.cursor_at(start).and_then(|c| c.skip_head());
    loop {
        if counter.reached(limit) {
            break;
        }
        let Some(here) = cursor else {
            stats.exhausted = true;
            break;
        };
        let value = here.read();
        if !counter.try_claim(limit) {
            break;
        }
        stats.compared += 1;
        if value == target {
            stats.hits += 1;
            target = random_value(rng);
        }
        cursor = here.advance();
    }
    stats
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Workload {
    /// Two threads insert into the same pre-sized list, sharing one counter.
    ConcurrentInsert,
    /// One thread inserts while another looks up, each with its own counter.
    InsertAndLookup,
    /// A populated list is searched by `LOOKUP_THREADS` threads, each with its own counter.
    ConcurrentLookup,
}

impl Workload {
    pub const ALL: [Workload; 3] = [
        Workload::ConcurrentInsert,
        Workload::InsertAndLookup,
        Workload::ConcurrentLookup,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Workload::ConcurrentInsert => "concurrent-insert",
            Workload::InsertAndLookup => "insert-and-lookup",
            Workload::ConcurrentLookup => "concurrent-lookup",
        }
    }

    pub fn number(self) -> usize {
        match self {
            Workload::ConcurrentInsert => 1,
            Workload::InsertAndLookup => 2,
            Workload::ConcurrentLookup => 3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CounterReading {
    pub role: String,
    pub value: usize,
}

#[derive(Debug, Clone)]
pub struct Report {
    pub workload: Workload,
    pub discipline: &'static str,
    pub counters: Vec<CounterReading>,
    /// From right before the workers were spawned to right after the last was joined.
    pub elapsed: Duration,
    /// Data nodes left empty when the workers were done.
    pub unwritten: usize,
    pub lookup_hits: usize,
}

impl Report {
    pub fn counter(&self, role: &str) -> Option<usize> {
        self.counters.iter().find(|c| c.role == role).map(|c| c.value)
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for c in &self.counters {
            writeln!(
                f,
                "Test {} [{}] - final {} counter: {}",
                self.workload.number(),
                self.discipline,
                c.role,
                fmt_thousands_sep(c.value as u64)
            )?;
        }
        write!(
            f,
            "Test {} [{}] - took {:.6}s",
            self.workload.number(),
            self.discipline,
            secs(self.elapsed)
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Phase {
    Building,
    Running,
    Joined,
    Reported,
}

/// Where a workload is in its `Building -> Running -> Joined -> Reported` sequence.
struct Phases {
    workload: Workload,
    discipline: &'static str,
    phase: Phase,
}

impl Phases {
    fn begin(workload: Workload, discipline: &'static str) -> Self {
        debug!(workload = workload.name(), discipline, phase = ?Phase::Building, "workload phase");
        Phases { workload, discipline, phase: Phase::Building }
    }

    fn enter(&mut self, next: Phase) {
        debug_assert!(next > self.phase, "{:?} cannot follow {:?}", next, self.phase);
        self.phase = next;
        debug!(
            workload = self.workload.name(),
            discipline = self.discipline,
            phase = ?next,
            "workload phase"
        );
    }
}

/// Run one workload under discipline `L`.
pub fn run<L: Locking>(workload: Workload, config: &Config) -> Result<Report> {
    match workload {
        Workload::ConcurrentInsert => concurrent_insert::<L>(config),
        Workload::InsertAndLookup => insert_and_lookup::<L>(config),
        Workload::ConcurrentLookup => concurrent_lookup::<L>(config),
    }
}

/// Each worker gets its own generator; with a seed the whole run is reproducible.
pub fn worker_rng(seed: Option<u64>, worker: u64) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed ^ worker),
        None => StdRng::from_entropy(),
    }
}

fn spawn<'scope, 'env, T, F>(
    scope: &'scope Scope<'env>,
    role: &str,
    f: F,
) -> Result<ScopedJoinHandle<'scope, T>>
where
    T: Send + 'env,
    F: FnOnce() -> T + Send + 'env,
{
    scope
        .builder()
        .name(role.to_string())
        .spawn(move |_| f())
        .map_err(|source| Error::ThreadSpawn { role: role.to_string(), source })
}

pub(crate) fn join<T>(handle: ScopedJoinHandle<'_, T>, role: &str) -> Result<T> {
    let t = handle.join().map_err(|payload| Error::join(role, payload))?;
    trace!(role, "worker joined");
    Ok(t)
}

fn concurrent_insert<L: Locking>(config: &Config) -> Result<Report> {
    let workload = Workload::ConcurrentInsert;
    let mut phases = Phases::begin(workload, L::NAME);
    let list = List::<L>::with_len(config.limit)?;
    let counter = ProgressCounter::new();
    let task = Task::from_head(&list, &counter, config.limit);

    phases.enter(Phase::Running);
    let watch = Stopwatch::start();
    let (local, remote) = crossbeam::thread::scope(|s| -> Result<_> {
        let mut rng = worker_rng(config.seed, 1);
        let handle = spawn(s, "insert-2", move || insert_loop(task, &mut rng))?;
        let local = insert_loop(task, &mut worker_rng(config.seed, 0));
        Ok((local, join(handle, "insert-2")?))
    })
    .map_err(|payload| Error::join(workload.name(), payload))??;
    let elapsed = watch.elapsed();
    phases.enter(Phase::Joined);
    trace!(?local, ?remote, "inserters done");

    let report = Report {
        workload,
        discipline: L::NAME,
        counters: vec![CounterReading { role: "insert".into(), value: counter.get() }],
        elapsed,
        unwritten: list.unwritten(),
        lookup_hits: 0,
    };
    phases.enter(Phase::Reported);
    Ok(report)
}

fn insert_and_lookup<L: Locking>(config: &Config) -> Result<Report> {
    let workload = Workload::InsertAndLookup;
    let mut phases = Phases::begin(workload, L::NAME);
    let list = List::<L>::with_len(config.limit)?;
    let insert_counter = ProgressCounter::new();
    let lookup_counter = ProgressCounter::new();
    let insert_task = Task::from_head(&list, &insert_counter, config.limit);
    let lookup_task = Task::from_head(&list, &lookup_counter, config.limit);

    phases.enter(Phase::Running);
    let watch = Stopwatch::start();
    let (inserted, looked_up) = crossbeam::thread::scope(|s| -> Result<_> {
        let mut rng = worker_rng(config.seed, 1);
        let handle = spawn(s, "insert", move || insert_loop(insert_task, &mut rng))?;
        let looked_up = lookup_loop(lookup_task, &mut worker_rng(config.seed, 0));
        Ok((join(handle, "insert")?, looked_up))
    })
    .map_err(|payload| Error::join(workload.name(), payload))??;
    let elapsed = watch.elapsed();
    phases.enter(Phase::Joined);
    trace!(?inserted, ?looked_up, "workers done");

    let report = Report {
        workload,
        discipline: L::NAME,
        counters: vec![
            CounterReading { role: "insert".into(), value: insert_counter.get() },
            CounterReading { role: "lookup".into(), value: lookup_counter.get() },
        ],
        elapsed,
        unwritten: list.unwritten(),
        lookup_hits: looked_up.hits,
    };
    phases.enter(Phase::Reported);
    Ok(report)
}

fn concurrent_lookup<L: Locking>(config: &Config) -> Result<Report> {
    let workload = Workload::ConcurrentLookup;
    let mut phases = Phases::begin(workload, L::NAME);
    let list = List::<L>::with_len(config.limit)?;
    let populate_counter = ProgressCounter::new();
    let (populated, took) = timed(|| {
        insert_loop(
            Task::from_head(&list, &populate_counter, config.limit),
            &mut worker_rng(config.seed, 0),
        )
    });
    debug!(?populated, populate_secs = secs(took), "list populated");

    let counters: Vec<ProgressCounter> = (0..LOOKUP_THREADS).map(|_| ProgressCounter::new()).collect();

    phases.enter(Phase::Running);
    let watch = Stopwatch::start();
    let stats = crossbeam::thread::scope(|s| -> Result<Vec<LookupStats>> {
        let mut handles = Vec::with_capacity(LOOKUP_THREADS);
        for (i, counter) in counters.iter().enumerate() {
            let task = Task::from_head(&list, counter, config.limit);
            let mut rng = worker_rng(config.seed, i as u64 + 1);
            let role = format!("lookup-{}", i + 1);
            handles.push((spawn(s, &role, move || lookup_loop(task, &mut rng))?, role));
        }
        handles.into_iter().map(|(handle, role)| join(handle, &role)).collect()
    })
    .map_err(|payload| Error::join(workload.name(), payload))??;
    let elapsed = watch.elapsed();
    phases.enter(Phase::Joined);

    let report = Report {
        workload,
        discipline: L::NAME,
        counters: counters
            .iter()
            .enumerate()
            .map(|(i, c)| CounterReading { role: format!("lookup-{}", i + 1), value: c.get() })
            .collect(),
        elapsed,
        unwritten: list.unwritten(),
        lookup_hits: stats.iter().map(|s| s.hits).sum(),
    };
    phases.enter(Phase::Reported);
    Ok(report)
}
