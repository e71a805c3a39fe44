//! Six-stage batch pipeline over materialized relations.
//!
//! Stages run strictly in sequence; each reads its upstream relations back
//! from the store and materializes exactly one relation. A failed stage
//! aborts the run and leaves every previously committed relation in place.

use crate::metrics::RunMetrics;
use crate::stages::{
    build_account_profiles, build_hourly_metrics, build_window_features, enrich_transactions,
    normalize_accounts, normalize_transactions,
};
use crate::store::{relation, RelationStore};
use crate::types::{
    Account, AccountProfile, EnrichedTransaction, HourlyNetworkMetric, RawAccountRecord,
    RawTransactionRecord, Transaction,
};
use anyhow::{Context, Result};
use chrono::{NaiveDate, Utc};
use serde::Serialize;
use std::time::Instant;
use tracing::{debug, info};

pub const STAGE_NORMALIZE_ACCOUNTS: &str = "normalize_accounts";
pub const STAGE_NORMALIZE_TRANSACTIONS: &str = "normalize_transactions";
pub const STAGE_ACCOUNT_PROFILES: &str = "account_profiles";
pub const STAGE_ENRICH_TRANSACTIONS: &str = "enrich_transactions";
pub const STAGE_WINDOW_FEATURES: &str = "window_features";
pub const STAGE_HOURLY_METRICS: &str = "hourly_metrics";

/// Default trailing refresh window for the hourly aggregate, in days.
pub const DEFAULT_REFRESH_WINDOW_DAYS: u32 = 7;

/// Batch feature pipeline bound to a relation store.
pub struct Pipeline<S: RelationStore> {
    store: S,
    refresh_window_days: u32,
    as_of: Option<NaiveDate>,
}

impl<S: RelationStore> Pipeline<S> {
    /// Create a pipeline with the default refresh window. `as_of` defaults
    /// to the current UTC date at run time.
    pub fn new(store: S) -> Self {
        Self {
            store,
            refresh_window_days: DEFAULT_REFRESH_WINDOW_DAYS,
            as_of: None,
        }
    }

    /// Override the trailing refresh window of the hourly aggregate.
    pub fn with_refresh_window_days(mut self, days: u32) -> Self {
        self.refresh_window_days = days;
        self
    }

    /// Pin the reference date for the refresh window, for reproducible runs
    /// over historical data.
    pub fn with_as_of(mut self, as_of: NaiveDate) -> Self {
        self.as_of = Some(as_of);
        self
    }

    /// The underlying relation store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Run all six stages over a raw batch.
    ///
    /// Returns per-stage cardinalities and timings. On error the run stops
    /// at the failed stage; relations committed by earlier stages remain
    /// readable.
    pub fn run(
        &self,
        raw_accounts: &[RawAccountRecord],
        raw_transactions: &[RawTransactionRecord],
    ) -> Result<RunMetrics> {
        let mut metrics = RunMetrics::new();
        info!(
            run_id = %metrics.run_id(),
            raw_accounts = raw_accounts.len(),
            raw_transactions = raw_transactions.len(),
            "Starting pipeline run"
        );

        // Stage 1: normalize accounts
        let started = Instant::now();
        let accounts = normalize_accounts(raw_accounts)
            .with_context(|| format!("stage '{STAGE_NORMALIZE_ACCOUNTS}' failed"))?;
        self.finish_stage(
            &mut metrics,
            STAGE_NORMALIZE_ACCOUNTS,
            relation::STG_ETH_ACCOUNT,
            raw_accounts.len(),
            &accounts,
            started,
        )?;

        // Stage 2: normalize transactions
        let started = Instant::now();
        let transactions = normalize_transactions(raw_transactions)
            .with_context(|| format!("stage '{STAGE_NORMALIZE_TRANSACTIONS}' failed"))?;
        self.finish_stage(
            &mut metrics,
            STAGE_NORMALIZE_TRANSACTIONS,
            relation::STG_ETH_TRANSACTION,
            raw_transactions.len(),
            &transactions,
            started,
        )?;

        // Stage 3: account profiles
        let started = Instant::now();
        let accounts: Vec<Account> =
            self.read_relation(relation::STG_ETH_ACCOUNT, STAGE_ACCOUNT_PROFILES)?;
        let transactions: Vec<Transaction> =
            self.read_relation(relation::STG_ETH_TRANSACTION, STAGE_ACCOUNT_PROFILES)?;
        let profiles = build_account_profiles(&accounts, &transactions);
        self.finish_stage(
            &mut metrics,
            STAGE_ACCOUNT_PROFILES,
            relation::INT_ACCOUNT_PROFILE,
            accounts.len(),
            &profiles,
            started,
        )?;

        // Stage 4: enrich transactions with both account profiles
        let started = Instant::now();
        let profiles: Vec<AccountProfile> =
            self.read_relation(relation::INT_ACCOUNT_PROFILE, STAGE_ENRICH_TRANSACTIONS)?;
        let enriched = enrich_transactions(&transactions, &profiles);
        self.finish_stage(
            &mut metrics,
            STAGE_ENRICH_TRANSACTIONS,
            relation::INT_ENRICHED_TRANSACTION,
            transactions.len(),
            &enriched,
            started,
        )?;

        // Stage 5: trailing-window features
        let started = Instant::now();
        let window_rows = build_window_features(&transactions);
        self.finish_stage(
            &mut metrics,
            STAGE_WINDOW_FEATURES,
            relation::INT_TRANSACTION_WINDOW,
            transactions.len(),
            &window_rows,
            started,
        )?;

        // Stage 6: hourly network aggregate, incrementally refreshed
        let started = Instant::now();
        let enriched: Vec<EnrichedTransaction> =
            self.read_relation(relation::INT_ENRICHED_TRANSACTION, STAGE_HOURLY_METRICS)?;
        let existing: Vec<HourlyNetworkMetric> = if self.store.exists(relation::AGG_HOURLY_NETWORK)
        {
            self.read_relation(relation::AGG_HOURLY_NETWORK, STAGE_HOURLY_METRICS)?
        } else {
            Vec::new()
        };
        let as_of = self.as_of.unwrap_or_else(|| Utc::now().date_naive());
        debug!(
            %as_of,
            refresh_window_days = self.refresh_window_days,
            existing_buckets = existing.len(),
            "Refreshing hourly aggregate"
        );
        let hourly = build_hourly_metrics(&enriched, &existing, as_of, self.refresh_window_days);
        self.finish_stage(
            &mut metrics,
            STAGE_HOURLY_METRICS,
            relation::AGG_HOURLY_NETWORK,
            enriched.len(),
            &hourly,
            started,
        )?;

        info!(
            run_id = %metrics.run_id(),
            stages = metrics.stages().len(),
            total_rows = metrics.total_rows_out(),
            elapsed_ms = metrics.elapsed().as_millis() as u64,
            "Pipeline run complete"
        );
        Ok(metrics)
    }

    fn read_relation<T: serde::de::DeserializeOwned>(
        &self,
        relation: &str,
        stage: &'static str,
    ) -> Result<Vec<T>> {
        self.store
            .read(relation)
            .with_context(|| format!("stage '{stage}' failed"))
    }

    fn finish_stage<T: Serialize>(
        &self,
        metrics: &mut RunMetrics,
        stage: &'static str,
        relation: &'static str,
        rows_in: usize,
        rows: &[T],
        started: Instant,
    ) -> Result<()> {
        self.store
            .write(relation, rows)
            .with_context(|| format!("stage '{stage}' failed"))?;

        let duration = started.elapsed();
        metrics.record_stage(stage, rows_in, rows.len(), duration);
        info!(
            stage,
            relation,
            rows = rows.len(),
            elapsed_ms = duration.as_millis() as u64,
            "Created relation"
        );
        Ok(())
    }
}
