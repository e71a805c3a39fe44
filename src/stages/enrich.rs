//! Transaction enricher: attach sender and receiver profile columns.
//!
//! Two independent left-outer hash lookups, one per role. A transaction
//! referencing an account with no profile keeps `None` flags; it is never
//! dropped, so output cardinality always equals input cardinality.

use crate::types::{AccountProfile, EnrichedTransaction, Transaction};
use std::collections::HashMap;

/// Build `int_enriched_transaction` rows, in input transaction order.
pub fn enrich_transactions(
    transactions: &[Transaction],
    profiles: &[AccountProfile],
) -> Vec<EnrichedTransaction> {
    let by_id: HashMap<&str, &AccountProfile> = profiles
        .iter()
        .map(|profile| (profile.account_id.as_str(), profile))
        .collect();

    transactions
        .iter()
        .map(|tx| {
            let sender = by_id.get(tx.from_account.as_str()).copied();
            let receiver = by_id.get(tx.to_account.as_str()).copied();

            let sender_is_phishing = sender.map(|p| p.is_phishing);
            let receiver_is_phishing = receiver.map(|p| p.is_phishing);
            // Null-safe OR: an unknown side never suppresses the other
            // side's flag.
            let involves_phishing =
                sender_is_phishing == Some(true) || receiver_is_phishing == Some(true);

            EnrichedTransaction {
                from_account: tx.from_account.clone(),
                to_account: tx.to_account.clone(),
                amount: tx.amount,
                transaction_ts: tx.transaction_ts,
                transaction_dt: tx.transaction_dt,
                data_dt: tx.data_dt,
                sender_is_phishing,
                sender_first_seen: sender.and_then(|p| p.first_seen_dt),
                receiver_is_phishing,
                receiver_first_seen: receiver.and_then(|p| p.first_seen_dt),
                involves_phishing,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, NaiveDate};

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2020, 9, day).unwrap()
    }

    fn txn(from: &str, to: &str) -> Transaction {
        let ts = DateTime::from_timestamp(1_598_918_400, 0).unwrap();
        Transaction::new(from, to, 2.5, ts, ts.date_naive())
    }

    fn profile(id: &str, is_phishing: bool) -> AccountProfile {
        AccountProfile {
            account_id: id.to_string(),
            is_phishing,
            first_seen_dt: Some(date(1)),
            last_seen_dt: Some(date(3)),
            data_dt: date(5),
        }
    }

    #[test]
    fn test_enrichment_attaches_both_sides() {
        let transactions = vec![txn("0xa", "0xb")];
        let profiles = vec![profile("0xa", false), profile("0xb", true)];

        let enriched = enrich_transactions(&transactions, &profiles);

        let row = &enriched[0];
        assert_eq!(row.sender_is_phishing, Some(false));
        assert_eq!(row.sender_first_seen, Some(date(1)));
        assert_eq!(row.receiver_is_phishing, Some(true));
        assert_eq!(row.receiver_first_seen, Some(date(1)));
        assert!(row.involves_phishing);
    }

    #[test]
    fn test_unknown_sender_propagates_none() {
        let transactions = vec![txn("0xghost", "0xb")];
        let profiles = vec![profile("0xb", true)];

        let enriched = enrich_transactions(&transactions, &profiles);

        let row = &enriched[0];
        assert_eq!(row.sender_is_phishing, None);
        assert_eq!(row.sender_first_seen, None);
        // The receiver's flag alone decides.
        assert!(row.involves_phishing);
    }

    #[test]
    fn test_unknown_receiver_propagates_none() {
        let transactions = vec![txn("0xa", "0xghost")];
        let profiles = vec![profile("0xa", false)];

        let enriched = enrich_transactions(&transactions, &profiles);

        let row = &enriched[0];
        assert_eq!(row.receiver_is_phishing, None);
        assert!(!row.involves_phishing);
    }

    #[test]
    fn test_both_sides_unknown_is_not_phishing() {
        let enriched = enrich_transactions(&[txn("0xghost1", "0xghost2")], &[]);

        assert_eq!(enriched[0].sender_is_phishing, None);
        assert_eq!(enriched[0].receiver_is_phishing, None);
        assert!(!enriched[0].involves_phishing);
    }

    #[test]
    fn test_cardinality_and_order_preserved() {
        let transactions = vec![txn("0xa", "0xb"), txn("0xb", "0xc"), txn("0xghost", "0xa")];
        let profiles = vec![profile("0xa", false), profile("0xb", false)];

        let enriched = enrich_transactions(&transactions, &profiles);

        assert_eq!(enriched.len(), transactions.len());
        let senders: Vec<&str> = enriched.iter().map(|e| e.from_account.as_str()).collect();
        assert_eq!(senders, vec!["0xa", "0xb", "0xghost"]);
    }

    #[test]
    fn test_inputs_are_not_mutated() {
        let transactions = vec![txn("0xa", "0xb")];
        let profiles = vec![profile("0xa", true)];
        let transactions_before = transactions.clone();
        let profiles_before = profiles.clone();

        let _ = enrich_transactions(&transactions, &profiles);

        assert_eq!(transactions, transactions_before);
        assert_eq!(profiles, profiles_before);
    }
}
