// ABOUTME: Pipeline jobs: fetch-and-merge case records, update daily status counts, re-normalize a store.
// ABOUTME: Per-case failures are logged and skipped; store failures end the run with an error.

use std::time::Instant;

use anyhow::{Context, Result};
use nyaya_records::{normalize, MergeSummary, StatusTable, Store, Tree, UpsertSummary};
use serde_json::Value;

use crate::config::PipelineOptions;

/// Outcome of one case-details run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub attempted: usize,
    pub fetched: usize,
    pub not_found: usize,
    pub failed: usize,
    /// `None` when nothing was fetched and the store was left alone.
    pub merge: Option<MergeSummary>,
}

/// Fetches every configured case, normalizes the records and merges them into the store.
pub async fn run_case_details(opts: &PipelineOptions) -> Result<RunSummary> {
    let start = Instant::now();
    let cases = opts.case_numbers()?;
    tracing::info!(cases = cases.len(), "case-details run started");

    let client = opts.client();
    let mut summary = RunSummary {
        attempted: cases.len(),
        ..Default::default()
    };
    let mut batch: Vec<(String, Value)> = Vec::with_capacity(cases.len());

    {
        let session = client.open_session()?;
        for (i, case_number) in cases.iter().enumerate() {
            match session.fetch_record(case_number).await {
                Ok(Some(record)) => {
                    let tree = normalize(&record.to_tree());
                    batch.push((case_number.clone(), tree.into()));
                    summary.fetched += 1;
                    tracing::info!(case_number = %case_number, progress = %format!("{}/{}", i + 1, cases.len()), "case fetched");
                }
                Ok(None) => summary.not_found += 1,
                Err(e) => {
                    summary.failed += 1;
                    tracing::warn!(case_number = %case_number, error = %e, "case skipped");
                }
            }
        }
    }

    if batch.is_empty() {
        tracing::warn!("no records fetched, store left unchanged");
    } else {
        let store = Store::new(&opts.store_path);
        let merged = store.merge(batch).map_err(|e| {
            tracing::error!(error = %e, "store update failed");
            e
        })?;
        summary.merge = Some(merged);
    }

    tracing::info!(
        fetched = summary.fetched,
        not_found = summary.not_found,
        failed = summary.failed,
        elapsed_ms = start.elapsed().as_millis() as u64,
        "case-details run finished"
    );
    Ok(summary)
}

/// Reads the portal's daily case-type counts and upserts them into the CSV table.
pub async fn run_daily_status(opts: &PipelineOptions) -> Result<UpsertSummary> {
    let start = Instant::now();
    tracing::info!("daily-status run started");

    let client = opts.client();
    let counts = {
        let session = client.open_session()?;
        session.fetch_status_counts().await?
    };
    if counts.is_empty() {
        tracing::warn!("status page had no counts");
    }

    let summary = StatusTable::merge_counts(&opts.status_path, &counts).map_err(|e| {
        tracing::error!(error = %e, "status table update failed");
        e
    })?;

    tracing::info!(
        updated = summary.updated,
        appended = summary.appended,
        elapsed_ms = start.elapsed().as_millis() as u64,
        "daily-status run finished"
    );
    Ok(summary)
}

/// Cleans and date-normalizes every record already in the store, then writes it back.
pub fn normalize_store(store: &Store) -> Result<usize> {
    let data = store.load()?;
    let records = data.len();

    let tree: Tree = Value::Object(data).into();
    let normalized = match Value::from(normalize(&tree)) {
        Value::Object(map) => map,
        _ => anyhow::bail!("normalized store is not an object"),
    };

    store
        .save(&normalized)
        .with_context(|| format!("writing {}", store.path().display()))?;
    tracing::info!(records, path = %store.path().display(), "store normalized");
    Ok(records)
}
