//! Run parameters. The defaults are the compile-time constants the workloads were designed
//! around; the runner can override `limit` and `seed` from the command line.

/// Number of data nodes in every list, and the number of operations each workload aims for.
pub const LIMIT: usize = 1_000_000;

/// Number of lookup workers in the concurrent lookup workload.
pub const LOOKUP_THREADS: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    pub limit: usize,
    /// Seed for the workers' random number generators. `None` seeds from entropy.
    pub seed: Option<u64>,
}

impl Config {
    pub fn with_limit(limit: usize) -> Self {
        Config { limit, ..Config::default() }
    }

    pub fn seeded(self, seed: u64) -> Self {
        Config { seed: Some(seed), ..self }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config { limit: LIMIT, seed: None }
    }
}
