//! Phishing Feature Pipeline - Main Entry Point
//!
//! Reads raw account and transaction batches from JSONL files, runs the
//! six-stage transformation, and materializes the relations under the
//! configured data directory.

use anyhow::{Context, Result};
use phishing_feature_pipeline::{
    config::AppConfig, store::JsonlStore, Pipeline, RawAccountRecord, RawTransactionRecord,
};
use serde::de::DeserializeOwned;
use std::fs::File;
use std::io::{BufRead, BufReader};
use tracing::info;

fn main() -> Result<()> {
    // Load configuration
    let config = AppConfig::load()?;

    // Initialize logging
    let filter = tracing_subscriber::EnvFilter::from_default_env().add_directive(
        format!("phishing_feature_pipeline={}", config.logging.level).parse()?,
    );
    if config.logging.format == "json" {
        tracing_subscriber::fmt().with_env_filter(filter).json().init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }

    info!("Starting Phishing Feature Pipeline");
    info!(
        data_dir = %config.storage.data_dir,
        refresh_window_days = config.aggregation.refresh_window_days,
        "Configuration loaded"
    );

    // Read raw input batches
    let raw_accounts: Vec<RawAccountRecord> = read_jsonl(&config.ingest.accounts_path)?;
    info!(
        path = %config.ingest.accounts_path,
        records = raw_accounts.len(),
        "Loaded raw accounts"
    );

    let raw_transactions: Vec<RawTransactionRecord> =
        read_jsonl(&config.ingest.transactions_path)?;
    info!(
        path = %config.ingest.transactions_path,
        records = raw_transactions.len(),
        "Loaded raw transactions"
    );

    // Run the pipeline against the file-backed store
    let store = JsonlStore::new(&config.storage.data_dir);
    let mut pipeline =
        Pipeline::new(store).with_refresh_window_days(config.aggregation.refresh_window_days);
    if let Some(as_of) = config.aggregation.as_of {
        pipeline = pipeline.with_as_of(as_of);
    }

    let metrics = pipeline.run(&raw_accounts, &raw_transactions)?;
    metrics.print_summary();

    Ok(())
}

/// Read a batch of JSON-line records, skipping blank lines.
fn read_jsonl<T: DeserializeOwned>(path: &str) -> Result<Vec<T>> {
    let file = File::open(path).with_context(|| format!("Failed to open {path}"))?;
    let reader = BufReader::new(file);

    let mut records = Vec::new();
    for (line_no, line) in reader.lines().enumerate() {
        let line = line.with_context(|| format!("Failed to read {path}"))?;
        if line.trim().is_empty() {
            continue;
        }
        let record = serde_json::from_str(&line)
            .with_context(|| format!("Malformed record at {path}:{}", line_no + 1))?;
        records.push(record);
    }
    Ok(records)
}
