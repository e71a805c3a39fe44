//! Type definitions for the phishing feature pipeline

pub mod account;
pub mod hourly;
pub mod transaction;
pub mod window;

pub use account::{Account, AccountProfile, RawAccountRecord};
pub use hourly::HourlyNetworkMetric;
pub use transaction::{EnrichedTransaction, RawTransactionRecord, Transaction};
pub use window::WindowFeatureRow;
