//! Phishing Feature Pipeline Library
//!
//! A batch feature-engineering pipeline over an Ethereum transaction graph
//! labeled for phishing, staged as materialized relations: normalized
//! inputs, per-account profiles, enriched and windowed transactions, and an
//! incrementally refreshed hourly network aggregate.

pub mod config;
pub mod metrics;
pub mod pipeline;
pub mod stages;
pub mod store;
pub mod types;

pub use config::AppConfig;
pub use metrics::RunMetrics;
pub use pipeline::Pipeline;
pub use store::{JsonlStore, MemoryStore, RelationStore};
pub use types::{
    Account, AccountProfile, EnrichedTransaction, HourlyNetworkMetric, RawAccountRecord,
    RawTransactionRecord, Transaction, WindowFeatureRow,
};
