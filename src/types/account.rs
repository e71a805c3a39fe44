//! Account data structures for the Ethereum phishing network

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Raw account record as emitted by the upstream graph loader.
///
/// Timestamp fields arrive as epoch seconds; the ingestion normalizer
/// converts them to calendar values.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawAccountRecord {
    /// Account address (unique key)
    pub account_id: String,

    /// Phishing label from the upstream dataset
    #[serde(alias = "isp")]
    pub is_phishing: bool,

    /// Capture time of the record, epoch seconds
    pub data_ts: f64,
}

/// Normalized account row (`stg_eth_account`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    /// Account address (unique key)
    pub account_id: String,

    /// Phishing label from the upstream dataset
    pub is_phishing: bool,

    /// Date the record was captured
    pub data_dt: NaiveDate,
}

/// Per-account activity profile (`int_account_profile`).
///
/// `first_seen_dt`/`last_seen_dt` are the earliest and latest dates the
/// account appears in any transaction, in either role. Accounts that never
/// transact keep `None` for both (left-join semantics).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountProfile {
    pub account_id: String,
    pub is_phishing: bool,
    pub first_seen_dt: Option<NaiveDate>,
    pub last_seen_dt: Option<NaiveDate>,
    pub data_dt: NaiveDate,
}

impl Account {
    /// Create a new account row
    pub fn new(account_id: impl Into<String>, is_phishing: bool, data_dt: NaiveDate) -> Self {
        Self {
            account_id: account_id.into(),
            is_phishing,
            data_dt,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_account_accepts_upstream_field_name() {
        // The graph loader labels phishing nodes with `isp`.
        let raw: RawAccountRecord =
            serde_json::from_str(r#"{"account_id":"0xabc","isp":true,"data_ts":1598918400.0}"#)
                .unwrap();
        assert!(raw.is_phishing);
    }

    #[test]
    fn test_account_serialization_round_trip() {
        let account = Account::new("0xabc", true, NaiveDate::from_ymd_opt(2020, 9, 1).unwrap());

        let json = serde_json::to_string(&account).unwrap();
        let deserialized: Account = serde_json::from_str(&json).unwrap();

        assert_eq!(account, deserialized);
    }
}
