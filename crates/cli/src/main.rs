// ABOUTME: nyaya CLI: fetch case records, update daily status counts, normalize the store, or run the scheduler.
// ABOUTME: Options come from an optional JSON config file with command-line overrides.

mod config;
mod logging;
mod pipeline;
mod schedule;

use std::path::PathBuf;

use anyhow::Result;
use chrono::Local;
use clap::{Parser, Subcommand};
use nyaya_records::Store;

use crate::config::PipelineOptions;
use crate::schedule::{JobKind, Scheduler};

/// Scrape case records from the Supreme Court portal into a JSON store.
#[derive(Parser, Debug)]
#[command(name = "nyaya")]
#[command(about = "Fetch, normalize and store Supreme Court case records", long_about = None)]
struct Args {
    /// JSON config file (all fields optional).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Override the case store path.
    #[arg(long, global = true)]
    store: Option<PathBuf>,

    /// Override the daily status CSV path.
    #[arg(long, global = true)]
    status_table: Option<PathBuf>,

    /// Override the log file path.
    #[arg(long, global = true)]
    log: Option<PathBuf>,

    /// Validate the portal's TLS certificate.
    #[arg(long, global = true, default_value_t = false)]
    tls_verify: bool,

    /// Case numbers to fetch instead of the configured source.
    #[arg(long = "case", global = true)]
    cases: Vec<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch every configured case once and merge into the store.
    Run,
    /// Update the daily status counts table once.
    Status,
    /// Run both jobs at the configured times until interrupted.
    Schedule,
    /// Clean whitespace and convert dates in an existing store.
    Normalize,
}

impl Args {
    fn pipeline_options(&self) -> Result<PipelineOptions> {
        let mut opts = match &self.config {
            Some(path) => PipelineOptions::load(path)?,
            None => PipelineOptions::default(),
        };
        if let Some(store) = &self.store {
            opts.store_path = store.clone();
        }
        if let Some(status) = &self.status_table {
            opts.status_path = status.clone();
        }
        if let Some(log) = &self.log {
            opts.log_path = log.clone();
        }
        if self.tls_verify {
            opts.tls_verification = true;
        }
        if !self.cases.is_empty() {
            opts.case_source = config::CaseSource::List(self.cases.clone());
        }
        opts.validate()?;
        Ok(opts)
    }
}

async fn run_job(opts: &PipelineOptions, kind: JobKind) {
    let result = match kind {
        JobKind::DailyStatus => pipeline::run_daily_status(opts).await.map(|_| ()),
        JobKind::CaseDetails => pipeline::run_case_details(opts).await.map(|_| ()),
    };
    if let Err(e) = result {
        tracing::error!(job = kind.name(), error = %format!("{:#}", e), "job failed");
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let opts = args.pipeline_options()?;
    logging::init(&opts.log_path)?;

    match args.command {
        Command::Run => {
            let summary = pipeline::run_case_details(&opts).await?;
            println!(
                "fetched {} of {} cases ({} not found, {} failed)",
                summary.fetched, summary.attempted, summary.not_found, summary.failed
            );
        }
        Command::Status => {
            let summary = pipeline::run_daily_status(&opts).await?;
            println!(
                "status table: {} updated, {} appended",
                summary.updated, summary.appended
            );
        }
        Command::Schedule => {
            let times = opts.trigger_times()?;
            let scheduler = Scheduler::new(&times, Local::now().naive_local());
            tracing::info!(
                times = %opts.schedule_times.join(", "),
                "scheduler started"
            );
            let opts = &opts;
            schedule::run_forever(scheduler, move |kind| run_job(opts, kind)).await;
        }
        Command::Normalize => {
            let store = Store::new(&opts.store_path);
            let records = pipeline::normalize_store(&store)?;
            println!("normalized {} records in {}", records, store.path().display());
        }
    }

    Ok(())
}
