//! Ingestion normalizer: raw records to typed, canonical rows.
//!
//! A direct type-preserving projection with no filtering and no
//! deduplication. Epoch fields convert to UTC timestamps at millisecond
//! precision and the calendar date columns derive from the UTC date
//! portion. A malformed value fails the whole batch: it signals a broken
//! ingestion contract, not a skippable row.

use crate::types::{Account, RawAccountRecord, RawTransactionRecord, Transaction};
use anyhow::{bail, ensure, Result};
use chrono::{DateTime, Utc};

/// Convert epoch seconds to a UTC timestamp, rejecting non-finite and
/// out-of-range values.
fn timestamp_from_epoch(epoch_secs: f64, field: &str, row: usize) -> Result<DateTime<Utc>> {
    if !epoch_secs.is_finite() {
        bail!("row {row}: {field} is not a finite number ({epoch_secs})");
    }
    let millis = epoch_secs * 1000.0;
    if millis < i64::MIN as f64 || millis > i64::MAX as f64 {
        bail!("row {row}: {field} out of range ({epoch_secs})");
    }
    match DateTime::from_timestamp_millis(millis as i64) {
        Some(ts) => Ok(ts),
        None => bail!("row {row}: {field} is not a representable timestamp ({epoch_secs})"),
    }
}

/// Normalize raw account records into `stg_eth_account` rows.
///
/// Input order is preserved; output cardinality equals input cardinality.
pub fn normalize_accounts(raw: &[RawAccountRecord]) -> Result<Vec<Account>> {
    let mut accounts = Vec::with_capacity(raw.len());

    for (row, record) in raw.iter().enumerate() {
        let data_ts = timestamp_from_epoch(record.data_ts, "data_ts", row)?;
        accounts.push(Account {
            account_id: record.account_id.clone(),
            is_phishing: record.is_phishing,
            data_dt: data_ts.date_naive(),
        });
    }

    Ok(accounts)
}

/// Normalize raw transaction records into `stg_eth_transaction` rows.
///
/// Input order is preserved; output cardinality equals input cardinality.
/// Negative or non-finite amounts violate the ingestion contract and abort
/// the batch.
pub fn normalize_transactions(raw: &[RawTransactionRecord]) -> Result<Vec<Transaction>> {
    let mut transactions = Vec::with_capacity(raw.len());

    for (row, record) in raw.iter().enumerate() {
        ensure!(
            record.amount.is_finite() && record.amount >= 0.0,
            "row {row}: amount must be a non-negative number ({})",
            record.amount
        );

        let transaction_ts = timestamp_from_epoch(record.transaction_ts, "transaction_ts", row)?;
        let data_ts = timestamp_from_epoch(record.data_ts, "data_ts", row)?;

        transactions.push(Transaction {
            from_account: record.from_account.clone(),
            to_account: record.to_account.clone(),
            amount: record.amount,
            transaction_dt: transaction_ts.date_naive(),
            transaction_ts,
            data_dt: data_ts.date_naive(),
        });
    }

    Ok(transactions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn raw_txn(ts: f64) -> RawTransactionRecord {
        RawTransactionRecord {
            from_account: "0xa".to_string(),
            to_account: "0xb".to_string(),
            amount: 1.0,
            transaction_ts: ts,
            data_ts: 1598918400.0,
        }
    }

    #[test]
    fn test_normalize_accounts_derives_date() {
        let raw = vec![RawAccountRecord {
            account_id: "0xabc".to_string(),
            is_phishing: true,
            data_ts: 1598918400.0, // 2020-09-01 00:00:00 UTC
        }];

        let accounts = normalize_accounts(&raw).unwrap();

        assert_eq!(accounts.len(), 1);
        assert_eq!(
            accounts[0].data_dt,
            NaiveDate::from_ymd_opt(2020, 9, 1).unwrap()
        );
        assert!(accounts[0].is_phishing);
    }

    #[test]
    fn test_normalize_transactions_derives_timestamp_and_date() {
        let transactions = normalize_transactions(&[raw_txn(1598961599.5)]).unwrap();

        let tx = &transactions[0];
        assert_eq!(tx.transaction_ts.timestamp(), 1598961599);
        assert_eq!(tx.transaction_ts.timestamp_subsec_millis(), 500);
        assert_eq!(
            tx.transaction_dt,
            NaiveDate::from_ymd_opt(2020, 9, 1).unwrap()
        );
    }

    #[test]
    fn test_malformed_timestamp_fails_whole_batch() {
        let raw = vec![raw_txn(1598918400.0), raw_txn(f64::NAN)];

        let err = normalize_transactions(&raw).unwrap_err();
        assert!(err.to_string().contains("transaction_ts"));
        assert!(err.to_string().contains("row 1"));
    }

    #[test]
    fn test_out_of_range_timestamp_fails() {
        assert!(normalize_transactions(&[raw_txn(1e30)]).is_err());
        assert!(normalize_transactions(&[raw_txn(f64::INFINITY)]).is_err());
    }

    #[test]
    fn test_negative_amount_fails() {
        let mut record = raw_txn(1598918400.0);
        record.amount = -0.5;

        let err = normalize_transactions(&[record]).unwrap_err();
        assert!(err.to_string().contains("amount"));
    }

    #[test]
    fn test_no_deduplication() {
        // Multi-edge semantics: identical records stay as separate rows.
        let raw = vec![raw_txn(1598918400.0), raw_txn(1598918400.0)];

        let transactions = normalize_transactions(&raw).unwrap();
        assert_eq!(transactions.len(), 2);
        assert_eq!(transactions[0], transactions[1]);
    }
}
