use std::process;

use clap::{Parser, ValueEnum};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use linklock::{Config, Report, Strategy, Workload, LIMIT};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Discipline {
    HandOverHand,
    SingleLock,
    Both,
}

impl Discipline {
    fn strategies(self) -> Vec<Strategy> {
        match self {
            Discipline::HandOverHand => vec![Strategy::HandOverHand],
            Discipline::SingleLock => vec![Strategy::SingleLock],
            Discipline::Both => Strategy::ALL.to_vec(),
        }
    }
}

/// Run the insert/lookup workloads against each list locking discipline.
#[derive(Debug, Parser)]
#[command(name = "benchmark-runner", version = "1.0", author = "Martin Hafskjold Thoresen <martinhath@gmail.com>")]
struct Args {
    /// Number of nodes in each list, and the number of operations each workload aims for
    #[arg(short = 'n', long, default_value_t = LIMIT)]
    limit: usize,
    /// Which locking discipline to measure
    #[arg(short, long, value_enum, default_value_t = Discipline::Both)]
    strategy: Discipline,
    /// Seed for the workers' random number generators
    #[arg(long)]
    seed: Option<u64>,
    /// Only run workloads whose name contains this
    #[arg(default_value = "")]
    name: String,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let workloads = select(&args.name);
    if workloads.is_empty() {
        error!("No workloads were left after matching with the pattern '{}'", args.name);
        process::exit(1);
    }
    if let Err(e) = run(&args, &workloads) {
        error!(error = %e, "workload failed");
        process::exit(1);
    }
}

/// The workloads whose name contains `filter`.
fn select(filter: &str) -> Vec<Workload> {
    Workload::ALL
        .iter()
        .cloned()
        .filter(|w| w.name().contains(filter))
        .collect()
}

fn run(args: &Args, workloads: &[Workload]) -> linklock::Result<()> {
    let config = Config { limit: args.limit, seed: args.seed };
    for strategy in args.strategy.strategies() {
        for &workload in workloads {
            let report = strategy.run(workload, &config)?;
            print(&report);
        }
    }
    Ok(())
}

fn print(report: &Report) {
    info!(
        workload = report.workload.name(),
        discipline = report.discipline,
        elapsed_ms = report.elapsed.as_millis() as u64,
        unwritten = report.unwritten,
        hits = report.lookup_hits,
        "workload finished"
    );
    println!("{}", report);
    if report.unwritten > 0 {
        println!(
            "Test {} [{}] - {} nodes left unwritten",
            report.workload.number(),
            report.discipline,
            bench::fmt_thousands_sep(report.unwritten as u64)
        );
    }
}
