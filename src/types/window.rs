//! Trailing-window feature row

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Per-transaction trailing-window features (`int_transaction_window`).
///
/// The sender-side and receiver-side columns are computed over the two role
/// partitions independently; a row's counts never mix the partitions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowFeatureRow {
    pub from_account: String,
    pub to_account: String,
    pub amount: f64,
    pub transaction_ts: DateTime<Utc>,
    pub transaction_dt: NaiveDate,
    pub data_dt: NaiveDate,

    /// Transactions by the same sender with a timestamp in the inclusive
    /// trailing hour `[ts - 1h, ts]`, this row included
    pub sender_txn_last_1hr: u64,

    /// Amount of the sender's immediately preceding transaction, `None` for
    /// the sender's first
    pub sender_prev_amount: Option<f64>,

    /// Transactions to the same receiver with a timestamp in the inclusive
    /// trailing hour `[ts - 1h, ts]`, this row included
    pub receiver_txn_last_1hr: u64,

    /// Amount of the receiver's immediately preceding transaction, `None`
    /// for the receiver's first
    pub receiver_prev_amount: Option<f64>,
}
