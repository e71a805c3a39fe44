//! Transaction data structures for the Ethereum phishing network

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Raw transaction record as emitted by the upstream graph loader.
///
/// `transaction_ts` and `data_ts` arrive as epoch seconds (the upstream
/// edge attribute is a double); conversion to typed timestamps happens in
/// the ingestion normalizer and is fatal on malformed values.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawTransactionRecord {
    /// Sending account address
    pub from_account: String,

    /// Receiving account address
    pub to_account: String,

    /// Transferred amount, non-negative
    pub amount: f64,

    /// Transaction time, epoch seconds
    #[serde(alias = "timestamp")]
    pub transaction_ts: f64,

    /// Capture time of the record, epoch seconds
    pub data_ts: f64,
}

/// Normalized transaction row (`stg_eth_transaction`).
///
/// Multi-edge semantics: the same (from, to) pair may repeat, even with an
/// identical timestamp. There is no uniqueness constraint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Sending account address
    pub from_account: String,

    /// Receiving account address
    pub to_account: String,

    /// Transferred amount, non-negative
    pub amount: f64,

    /// Transaction time
    pub transaction_ts: DateTime<Utc>,

    /// Date portion of `transaction_ts`
    pub transaction_dt: NaiveDate,

    /// Date the record was captured
    pub data_dt: NaiveDate,
}

/// Transaction joined against both account profiles (`int_enriched_transaction`).
///
/// The sender and receiver lookups are independent left-outer joins: a
/// transaction referencing an unknown account keeps `None` flags rather than
/// being dropped. `involves_phishing` is a null-safe OR: `Some(true)` on
/// either side wins, and an unknown side never suppresses the other.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedTransaction {
    pub from_account: String,
    pub to_account: String,
    pub amount: f64,
    pub transaction_ts: DateTime<Utc>,
    pub transaction_dt: NaiveDate,
    pub data_dt: NaiveDate,

    /// Phishing flag of the sending account, `None` if unknown
    pub sender_is_phishing: Option<bool>,

    /// First activity date of the sending account
    pub sender_first_seen: Option<NaiveDate>,

    /// Phishing flag of the receiving account, `None` if unknown
    pub receiver_is_phishing: Option<bool>,

    /// First activity date of the receiving account
    pub receiver_first_seen: Option<NaiveDate>,

    /// True when either side carries a `Some(true)` phishing flag
    pub involves_phishing: bool,
}

impl Transaction {
    /// Create a transaction row, deriving the date columns from the timestamp.
    pub fn new(
        from_account: impl Into<String>,
        to_account: impl Into<String>,
        amount: f64,
        transaction_ts: DateTime<Utc>,
        data_dt: NaiveDate,
    ) -> Self {
        Self {
            from_account: from_account.into(),
            to_account: to_account.into(),
            amount,
            transaction_dt: transaction_ts.date_naive(),
            transaction_ts,
            data_dt,
        }
    }
}
