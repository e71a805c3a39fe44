//! Hourly network aggregate row

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Hourly network summary (`agg_hourly_network`), keyed by `(txn_date, hour_ts)`.
///
/// `active_accounts` is the sum of the two distinct-counts, NOT a union
/// distinct-count: an account that both sends and receives within the hour
/// is counted twice. This is the metric's intended definition, kept exactly
/// as the upstream reports consume it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HourlyNetworkMetric {
    /// Calendar date of the bucket
    pub txn_date: NaiveDate,

    /// Start of the containing hour
    pub hour_ts: DateTime<Utc>,

    /// Transactions in the bucket
    pub txn_count: u64,

    /// Distinct sending accounts
    pub distinct_senders: u64,

    /// Distinct receiving accounts
    pub distinct_receivers: u64,

    /// `distinct_senders + distinct_receivers` (role-wise double count)
    pub active_accounts: u64,

    /// Sum of transaction amounts
    pub total_volume: f64,

    /// Mean transaction amount
    pub avg_amount: f64,

    /// Population standard deviation of amounts
    pub std_amount: f64,

    /// Median amount (midpoint of the two middle values for even counts)
    pub median_amount: f64,

    /// 95th percentile of amounts, nearest-rank
    pub p95_amount: f64,

    /// Maximum single amount
    pub max_amount: f64,

    /// Transactions whose sender is a labeled phishing account
    pub sender_phishing_count: u64,

    /// Volume of transactions whose sender is a labeled phishing account
    pub sender_phishing_volume: f64,

    /// Transactions whose receiver is a labeled phishing account
    pub receiver_phishing_count: u64,

    /// Volume of transactions whose receiver is a labeled phishing account
    pub receiver_phishing_volume: f64,
}

impl HourlyNetworkMetric {
    /// Bucket key: `(txn_date, hour_ts)`.
    pub fn key(&self) -> (NaiveDate, DateTime<Utc>) {
        (self.txn_date, self.hour_ts)
    }
}
