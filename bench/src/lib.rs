//! Timing helpers shared by the workload driver and the runner.
//!
//! The workloads need one wall-clock sample right before the workers are spawned and one right
//! after they are joined, so this is a stopwatch rather than a sampling bencher.

use std::fmt::Write;
use std::time::{Duration, Instant};

/// A monotonic stopwatch.
#[derive(Debug, Clone, Copy)]
pub struct Stopwatch {
    started: Instant,
}

impl Stopwatch {
    pub fn start() -> Self {
        Stopwatch { started: Instant::now() }
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }
}

/// Run `f` and return its result together with the time it took.
pub fn timed<T, F: FnOnce() -> T>(f: F) -> (T, Duration) {
    let watch = Stopwatch::start();
    let t = f();
    (t, watch.elapsed())
}

pub fn black_box<T>(dummy: T) -> T {
    std::hint::black_box(dummy)
}

/// Seconds as a float, for printing.
pub fn secs(d: Duration) -> f64 {
    d.as_secs() as f64 + f64::from(d.subsec_nanos()) / 1e9
}

pub fn fmt_thousands_sep(mut n: u64) -> String {
    let sep = ',';
    let mut output = String::new();
    let mut trailing = false;
    for &pow in &[18, 15, 12, 9, 6, 3, 0] {
        let base = 10u64.pow(pow);
        if pow == 0 || trailing || n / base != 0 {
            // Writing into a `String` cannot fail.
            let _ = if !trailing {
                write!(output, "{}", n / base)
            } else {
                write!(output, "{:03}", n / base)
            };
            if pow != 0 {
                output.push(sep);
            }
            trailing = true;
        }
        n %= base;
    }

    output
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn thousands() {
        assert_eq!(fmt_thousands_sep(0), "0");
        assert_eq!(fmt_thousands_sep(999), "999");
        assert_eq!(fmt_thousands_sep(1000), "1,000");
        assert_eq!(fmt_thousands_sep(1_000_000), "1,000,000");
        assert_eq!(fmt_thousands_sep(12_003_045), "12,003,045");
    }

    #[test]
    fn timed_returns_value() {
        let (v, _) = timed(|| 40 + 2);
        assert_eq!(v, 42);
    }

    #[test]
    fn secs_of_duration() {
        assert_eq!(secs(Duration::from_millis(1500)), 1.5);
    }
}
