//! Trailing-window feature computation per account role.
//!
//! Reimplements the rolling window features as explicit per-partition
//! sweeps rather than query-engine window functions: partition by the
//! role's account, stable-sort each partition by timestamp (ties keep
//! ingestion order), then one two-pointer pass per partition computes the
//! inclusive trailing 1-hour count and the previous amount in O(n).
//!
//! Window membership is pure timestamp distance, so rows sharing a
//! timestamp count each other regardless of sort position. The sender-side
//! and receiver-side computations never consult each other's partitions.

use crate::types::{Transaction, WindowFeatureRow};
use chrono::Duration;
use std::collections::HashMap;

/// Per-role feature columns, indexed by input transaction position.
struct RoleFeatures {
    txn_last_1hr: Vec<u64>,
    prev_amount: Vec<Option<f64>>,
}

/// Compute the trailing 1-hour count and previous amount for one role.
///
/// `role_account` selects the partitioning account of a transaction
/// (sender or receiver).
fn role_features<F>(transactions: &[Transaction], role_account: F) -> RoleFeatures
where
    F: Fn(&Transaction) -> &str,
{
    let mut partitions: HashMap<&str, Vec<usize>> = HashMap::new();
    for (idx, tx) in transactions.iter().enumerate() {
        partitions.entry(role_account(tx)).or_default().push(idx);
    }

    let mut txn_last_1hr = vec![0u64; transactions.len()];
    let mut prev_amount = vec![None; transactions.len()];
    let window = Duration::hours(1);

    for indices in partitions.values_mut() {
        // Stable sort: rows with equal timestamps keep ingestion order.
        indices.sort_by_key(|&idx| transactions[idx].transaction_ts);

        // lo = first row inside [ts - 1h, ts]; hi = one past the last row
        // with timestamp <= ts. Both only move forward across the sweep.
        let mut lo = 0;
        let mut hi = 0;
        for pos in 0..indices.len() {
            let ts = transactions[indices[pos]].transaction_ts;
            let window_start = ts - window;

            while transactions[indices[lo]].transaction_ts < window_start {
                lo += 1;
            }
            if hi < pos + 1 {
                hi = pos + 1;
            }
            while hi < indices.len() && transactions[indices[hi]].transaction_ts <= ts {
                hi += 1;
            }

            txn_last_1hr[indices[pos]] = (hi - lo) as u64;
            if pos > 0 {
                prev_amount[indices[pos]] = Some(transactions[indices[pos - 1]].amount);
            }
        }
    }

    RoleFeatures {
        txn_last_1hr,
        prev_amount,
    }
}

/// Build `int_transaction_window` rows, in input transaction order.
pub fn build_window_features(transactions: &[Transaction]) -> Vec<WindowFeatureRow> {
    let sender = role_features(transactions, |tx| tx.from_account.as_str());
    let receiver = role_features(transactions, |tx| tx.to_account.as_str());

    transactions
        .iter()
        .enumerate()
        .map(|(idx, tx)| WindowFeatureRow {
            from_account: tx.from_account.clone(),
            to_account: tx.to_account.clone(),
            amount: tx.amount,
            transaction_ts: tx.transaction_ts,
            transaction_dt: tx.transaction_dt,
            data_dt: tx.data_dt,
            sender_txn_last_1hr: sender.txn_last_1hr[idx],
            sender_prev_amount: sender.prev_amount[idx],
            receiver_txn_last_1hr: receiver.txn_last_1hr[idx],
            receiver_prev_amount: receiver.prev_amount[idx],
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;

    // 2020-09-01 00:00:00 UTC
    const BASE_SECS: i64 = 1_598_918_400;

    fn txn_at(from: &str, to: &str, amount: f64, offset_secs: i64) -> Transaction {
        let ts = DateTime::from_timestamp(BASE_SECS + offset_secs, 0).unwrap();
        Transaction::new(from, to, amount, ts, ts.date_naive())
    }

    #[test]
    fn test_trailing_hour_count_is_inclusive_on_both_bounds() {
        // One sender, five transactions to distinct receivers. At t=7200
        // the window [3600, 7200] contains the rows at 3600 and 3601.
        let transactions = vec![
            txn_at("0xs", "0xr1", 10.0, 0),
            txn_at("0xs", "0xr2", 20.0, 1800),
            txn_at("0xs", "0xr3", 30.0, 3600),
            txn_at("0xs", "0xr4", 40.0, 3601),
            txn_at("0xs", "0xr5", 50.0, 7200),
        ];

        let rows = build_window_features(&transactions);

        let counts: Vec<u64> = rows.iter().map(|r| r.sender_txn_last_1hr).collect();
        assert_eq!(counts, vec![1, 2, 3, 3, 3]);

        // Each receiver sees exactly one transaction.
        assert!(rows.iter().all(|r| r.receiver_txn_last_1hr == 1));
        assert!(rows.iter().all(|r| r.receiver_prev_amount.is_none()));
    }

    #[test]
    fn test_prev_amount_follows_sorted_partition_order() {
        let transactions = vec![
            txn_at("0xs", "0xr1", 10.0, 0),
            txn_at("0xs", "0xr2", 20.0, 1800),
            txn_at("0xs", "0xr3", 30.0, 3600),
        ];

        let rows = build_window_features(&transactions);

        let prev: Vec<Option<f64>> = rows.iter().map(|r| r.sender_prev_amount).collect();
        assert_eq!(prev, vec![None, Some(10.0), Some(20.0)]);
    }

    #[test]
    fn test_out_of_order_input_is_sorted_by_timestamp() {
        // Arrival order differs from timestamp order; features follow the
        // timestamp order while output rows stay in arrival order.
        let transactions = vec![
            txn_at("0xs", "0xr1", 30.0, 3600),
            txn_at("0xs", "0xr2", 10.0, 0),
            txn_at("0xs", "0xr3", 20.0, 1800),
        ];

        let rows = build_window_features(&transactions);

        assert_eq!(rows[0].sender_prev_amount, Some(20.0));
        assert_eq!(rows[1].sender_prev_amount, None);
        assert_eq!(rows[2].sender_prev_amount, Some(10.0));
        assert_eq!(rows[0].sender_txn_last_1hr, 3);
        assert_eq!(rows[1].sender_txn_last_1hr, 1);
        assert_eq!(rows[2].sender_txn_last_1hr, 2);
    }

    #[test]
    fn test_identical_timestamps_all_count_each_other() {
        let transactions = vec![
            txn_at("0xs", "0xr1", 1.0, 0),
            txn_at("0xs", "0xr2", 2.0, 0),
            txn_at("0xs", "0xr3", 3.0, 0),
        ];

        let rows = build_window_features(&transactions);

        let counts: Vec<u64> = rows.iter().map(|r| r.sender_txn_last_1hr).collect();
        assert_eq!(counts, vec![3, 3, 3]);

        // Ties resolve by ingestion order for the previous-amount lookup.
        let prev: Vec<Option<f64>> = rows.iter().map(|r| r.sender_prev_amount).collect();
        assert_eq!(prev, vec![None, Some(1.0), Some(2.0)]);
    }

    #[test]
    fn test_partition_of_one() {
        let rows = build_window_features(&[txn_at("0xs", "0xr", 5.0, 0)]);

        assert_eq!(rows[0].sender_txn_last_1hr, 1);
        assert_eq!(rows[0].sender_prev_amount, None);
        assert_eq!(rows[0].receiver_txn_last_1hr, 1);
        assert_eq!(rows[0].receiver_prev_amount, None);
    }

    #[test]
    fn test_exactly_one_hour_apart_is_inside_the_window() {
        let transactions = vec![
            txn_at("0xs", "0xr1", 1.0, 0),
            txn_at("0xs", "0xr2", 2.0, 3600),
        ];

        let rows = build_window_features(&transactions);

        assert_eq!(rows[1].sender_txn_last_1hr, 2);
    }

    #[test]
    fn test_roles_partition_independently() {
        // 0xa takes part in both transactions, once per role; neither role
        // partition sees the other's row.
        let transactions = vec![
            txn_at("0xa", "0xb", 1.0, 0),
            txn_at("0xb", "0xa", 2.0, 60),
        ];

        let rows = build_window_features(&transactions);

        assert_eq!(rows[0].sender_txn_last_1hr, 1);
        assert_eq!(rows[1].sender_txn_last_1hr, 1);
        assert_eq!(rows[0].receiver_txn_last_1hr, 1);
        assert_eq!(rows[1].receiver_txn_last_1hr, 1);
    }

    #[test]
    fn test_receiver_side_mirrors_sender_logic() {
        let transactions = vec![
            txn_at("0xa", "0xsink", 7.0, 0),
            txn_at("0xb", "0xsink", 8.0, 60),
            txn_at("0xc", "0xsink", 9.0, 7200),
        ];

        let rows = build_window_features(&transactions);

        let counts: Vec<u64> = rows.iter().map(|r| r.receiver_txn_last_1hr).collect();
        assert_eq!(counts, vec![1, 2, 1]);
        let prev: Vec<Option<f64>> = rows.iter().map(|r| r.receiver_prev_amount).collect();
        assert_eq!(prev, vec![None, Some(7.0), Some(8.0)]);
    }
}
