//! @ai:module:intent Session result recording and aggregation
//! @ai:module:layer application
//! @ai:module:public_api SessionResults, KeyResults, FailureRecord, KeySummary, MetricsAggregator

pub mod aggregator;
pub mod types;

pub use aggregator::{MetricsAggregator, MetricsAggregatorTrait};
pub use types::{FailureRecord, KeyResults, KeySummary, SessionResults};
