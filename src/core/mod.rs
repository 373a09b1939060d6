//! Core domain: observations, the rate engine and the views derived from
//! an entry collection.

pub mod config;
pub mod log;
pub mod observation;
pub mod rate;
pub mod transfer;
pub mod volume;

// Re-export main types for cleaner imports
pub use observation::Observation;
pub use rate::{PairingMode, RatePoint, RatePolicy, compute_rate_series};
pub use volume::{AmountPoint, BagLevel};
