use std::{
    fs::File,
    io::{BufWriter, Write},
    path::PathBuf,
    time::Duration,
};

use anyhow::Result;
use clap::{Parser, ValueEnum};
use queue_balance_rs::{
    CsvReadingWriter, DEFAULT_BATCH_SIZE, DEFAULT_SOURCE_PATH, DEFAULT_WORKERS_PER_QUEUE, Error,
    Policy, RunConfig, run, setup_logging,
};

#[derive(Parser)]
#[command(name = "queue-balance-rs")]
#[command(about = "Dispatch temperature readings from a CSV file to balanced worker queues")]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Cli {
    /// Path to the CSV file
    #[arg(short, long, env = "QB_FILE", default_value = DEFAULT_SOURCE_PATH)]
    file: PathBuf,

    /// Number of records per batch
    #[arg(short, long, env = "QB_BATCH_SIZE", default_value_t = DEFAULT_BATCH_SIZE)]
    batch_size: usize,

    /// How jobs are spread over the queues
    #[arg(long, env = "QB_POLICY", value_enum, default_value_t = PolicyArg::Tiered)]
    policy: PolicyArg,

    /// Workers started for every queue the policy routes to
    #[arg(long, env = "QB_WORKERS", default_value_t = DEFAULT_WORKERS_PER_QUEUE)]
    workers: usize,

    /// Simulated processing time per record, in milliseconds
    #[arg(long, env = "QB_RECORD_COST_MS", default_value_t = 1000)]
    record_cost_ms: u64,

    /// Where to write the persisted readings (stdout if omitted)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(Clone, Copy, ValueEnum)]
enum PolicyArg {
    /// high-priority / default / low-priority by batch size
    Tiered,
    /// a single shared queue
    AutoBalanced,
}

impl Cli {
    fn run_config(&self) -> RunConfig {
        RunConfig {
            source_path: self.file.clone(),
            batch_size: self.batch_size,
            policy: match self.policy {
                PolicyArg::Tiered => Policy::tiered(),
                PolicyArg::AutoBalanced => Policy::auto_balanced(),
            },
            workers_per_queue: self.workers,
            record_cost: Duration::from_millis(self.record_cost_ms),
        }
    }
}

fn main() -> Result<()> {
    setup_logging()?;
    let cli = Cli::parse();

    let repository = CsvReadingWriter::new(get_writer(cli.output.as_ref())?);
    let mut skipped = 0usize;
    let summary = run(&cli.run_config(), &repository, |_: Error| skipped += 1).inspect_err(|e| {
        tracing::error!(error = %e, "run failed");
    })?;
    repository.into_inner()?.flush()?;

    eprintln!("{}", summary.report);
    eprintln!(
        "persisted {} of {} readings, {skipped} skipped",
        summary.persisted(),
        summary.attempted()
    );
    Ok(())
}

fn get_writer(path: Option<&PathBuf>) -> Result<Box<dyn Write + Send>> {
    Ok(match path {
        Some(path) => Box::new(BufWriter::new(File::create(path)?)),
        None => Box::new(std::io::stdout()),
    })
}
