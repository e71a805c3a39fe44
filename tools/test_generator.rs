//! Test Data Generator
//!
//! Generates a synthetic labeled transaction graph and writes it as JSONL
//! batches for pipeline testing.

use anyhow::{Context, Result};
use chrono::Utc;
use rand::Rng;
use serde::Serialize;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::info;

const DAY_SECS: f64 = 86_400.0;

/// Raw account record matching the pipeline's ingest format
#[derive(Debug, Clone, Serialize)]
struct RawAccount {
    account_id: String,
    is_phishing: bool,
    data_ts: f64,
}

/// Raw transaction record matching the pipeline's ingest format
#[derive(Debug, Clone, Serialize)]
struct RawTransaction {
    from_account: String,
    to_account: String,
    amount: f64,
    transaction_ts: f64,
    data_ts: f64,
}

/// Synthetic transaction network generator
struct NetworkGenerator {
    rng: rand::rngs::ThreadRng,
    accounts: Vec<String>,
    labels: Vec<bool>,
    phishing_ids: Vec<usize>,
    span_start: f64,
    span_secs: f64,
    data_ts: f64,
}

impl NetworkGenerator {
    fn new(num_accounts: usize, phishing_rate: f64, span_days: f64) -> Self {
        let mut rng = rand::thread_rng();

        let accounts: Vec<String> = (0..num_accounts)
            .map(|_| format!("0x{:040x}", rng.gen::<u128>()))
            .collect();
        let labels: Vec<bool> = (0..num_accounts)
            .map(|_| rng.gen_bool(phishing_rate))
            .collect();
        let phishing_ids: Vec<usize> = labels
            .iter()
            .enumerate()
            .filter(|(_, &is_phishing)| is_phishing)
            .map(|(i, _)| i)
            .collect();

        // The span ends at generation time; data_ts marks the capture.
        let span_end = Utc::now().timestamp() as f64;

        Self {
            rng,
            accounts,
            labels,
            phishing_ids,
            span_start: span_end - span_days * DAY_SECS,
            span_secs: span_days * DAY_SECS,
            data_ts: span_end,
        }
    }

    fn phishing_count(&self) -> usize {
        self.phishing_ids.len()
    }

    fn account_records(&self) -> Vec<RawAccount> {
        self.accounts
            .iter()
            .zip(&self.labels)
            .map(|(id, &is_phishing)| RawAccount {
                account_id: id.clone(),
                is_phishing,
                data_ts: self.data_ts,
            })
            .collect()
    }

    /// Generate an ordinary transfer at a random time in the span
    fn generate_transfer(&mut self) -> RawTransaction {
        let from = self.rng.gen_range(0..self.accounts.len());
        let mut to = self.rng.gen_range(0..self.accounts.len());
        while to == from {
            to = self.rng.gen_range(0..self.accounts.len());
        }

        RawTransaction {
            from_account: self.accounts[from].clone(),
            to_account: self.accounts[to].clone(),
            amount: self.rng.gen_range(0.01..50.0),
            transaction_ts: self.span_start + self.rng.gen_range(0.0..self.span_secs),
            data_ts: self.data_ts,
        }
    }

    /// Generate a tight burst of small transfers into one phishing account
    fn generate_phishing_burst(&mut self) -> Vec<RawTransaction> {
        let pick = self.rng.gen_range(0..self.phishing_ids.len());
        let receiver = self.phishing_ids[pick];
        let burst_len: usize = self.rng.gen_range(3..8);

        let mut burst = Vec::with_capacity(burst_len);
        let mut ts = self.span_start + self.rng.gen_range(0.0..self.span_secs);
        for _ in 0..burst_len {
            let from = self.rng.gen_range(0..self.accounts.len());
            burst.push(RawTransaction {
                from_account: self.accounts[from].clone(),
                to_account: self.accounts[receiver].clone(),
                amount: self.rng.gen_range(0.05..2.0),
                transaction_ts: ts,
                data_ts: self.data_ts,
            });
            ts += self.rng.gen_range(5.0..120.0); // seconds apart
        }
        burst
    }
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("test_generator=info".parse()?),
        )
        .init();

    info!("Starting Test Data Generator");

    // Parse arguments
    let args: Vec<String> = std::env::args().collect();
    let out_dir = args.get(1).map(|s| s.as_str()).unwrap_or("data/raw");
    let num_accounts: usize = args.get(2).and_then(|s| s.parse().ok()).unwrap_or(1000);
    let num_transactions: usize = args.get(3).and_then(|s| s.parse().ok()).unwrap_or(10000);
    let phishing_rate: f64 = args.get(4).and_then(|s| s.parse().ok()).unwrap_or(0.05);
    let span_days: f64 = args.get(5).and_then(|s| s.parse().ok()).unwrap_or(10.0);

    anyhow::ensure!(num_accounts >= 2, "need at least two accounts to form an edge");

    info!(
        out_dir = %out_dir,
        accounts = num_accounts,
        transactions = num_transactions,
        phishing_rate = phishing_rate,
        span_days = span_days,
        "Configuration loaded"
    );

    let mut generator = NetworkGenerator::new(num_accounts, phishing_rate, span_days);
    let mut rng = rand::thread_rng();

    let mut transactions = Vec::with_capacity(num_transactions);
    let mut burst_count = 0;
    while transactions.len() < num_transactions {
        if generator.phishing_count() > 0 && rng.gen_bool(0.05) {
            burst_count += 1;
            transactions.extend(generator.generate_phishing_burst());
        } else {
            transactions.push(generator.generate_transfer());
        }
    }
    transactions.truncate(num_transactions);

    fs::create_dir_all(out_dir).with_context(|| format!("Failed to create {out_dir}"))?;

    let accounts = generator.account_records();
    let accounts_path = Path::new(out_dir).join("accounts.jsonl");
    write_jsonl(&accounts_path, &accounts)?;
    info!(
        path = %accounts_path.display(),
        records = accounts.len(),
        "Wrote account batch"
    );

    let transactions_path = Path::new(out_dir).join("transactions.jsonl");
    write_jsonl(&transactions_path, &transactions)?;
    info!(
        path = %transactions_path.display(),
        records = transactions.len(),
        bursts = burst_count,
        "Wrote transaction batch"
    );

    info!(
        "Completed! Generated {} accounts ({} phishing) and {} transactions",
        num_accounts,
        generator.phishing_count(),
        num_transactions
    );

    Ok(())
}

/// Write records as one JSON document per line
fn write_jsonl<T: Serialize>(path: &Path, records: &[T]) -> Result<()> {
    let file =
        File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
    let mut writer = BufWriter::new(file);

    for record in records {
        serde_json::to_writer(&mut writer, record)?;
        writer.write_all(b"\n")?;
    }
    writer.flush()?;

    Ok(())
}
