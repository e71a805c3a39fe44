//! Pipeline stages
//!
//! Each stage is a pure function from fully materialized input relation(s)
//! to one output relation; the pipeline runner handles reading, writing and
//! stage ordering.

pub mod enrich;
pub mod hourly;
pub mod normalize;
pub mod profile;
pub mod window;

pub use enrich::enrich_transactions;
pub use hourly::build_hourly_metrics;
pub use normalize::{normalize_accounts, normalize_transactions};
pub use profile::build_account_profiles;
pub use window::build_window_features;
