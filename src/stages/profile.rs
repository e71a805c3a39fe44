//! Account profile builder: first/last activity per account.
//!
//! Unions the sender-role and receiver-role projections of every
//! transaction into (account, date) activity pairs, takes MIN/MAX per
//! account, and left-joins the result onto the full account list so that
//! never-transacting accounts are retained with empty activity.

use crate::types::{Account, AccountProfile, Transaction};
use chrono::NaiveDate;
use std::collections::HashMap;

/// Build `int_account_profile` rows from normalized accounts and transactions.
///
/// Output cardinality equals input account cardinality, in input account
/// order. Transactions referencing accounts missing from the account list
/// contribute nothing to the output.
pub fn build_account_profiles(
    accounts: &[Account],
    transactions: &[Transaction],
) -> Vec<AccountProfile> {
    // (first_seen, last_seen) per account over both roles.
    let mut activity: HashMap<&str, (NaiveDate, NaiveDate)> = HashMap::new();
    for tx in transactions {
        for account_id in [tx.from_account.as_str(), tx.to_account.as_str()] {
            activity
                .entry(account_id)
                .and_modify(|(first, last)| {
                    *first = (*first).min(tx.transaction_dt);
                    *last = (*last).max(tx.transaction_dt);
                })
                .or_insert((tx.transaction_dt, tx.transaction_dt));
        }
    }

    accounts
        .iter()
        .map(|account| {
            let seen = activity.get(account.account_id.as_str());
            AccountProfile {
                account_id: account.account_id.clone(),
                is_phishing: account.is_phishing,
                first_seen_dt: seen.map(|(first, _)| *first),
                last_seen_dt: seen.map(|(_, last)| *last),
                data_dt: account.data_dt,
            }
        })
        .collect()
}
