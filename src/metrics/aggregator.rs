//! @ai:module:intent Statistical summaries of recorded session results
//! @ai:module:layer application
//! @ai:module:public_api MetricsAggregator, MetricsAggregatorTrait
//! @ai:module:stateless true

use crate::metrics::types::{KeyResults, KeySummary, SessionResults};

/// @ai:intent Trait for metrics aggregation
pub trait MetricsAggregatorTrait: Send + Sync {
    /// @ai:intent Summarize every key that has recorded data or was planned
    fn summarize(&self, results: &SessionResults) -> Vec<KeySummary>;
}

/// @ai:intent Aggregates per-key timings into summaries
pub struct MetricsAggregator;

impl MetricsAggregator {
    /// @ai:intent Create a new metrics aggregator
    /// @ai:effects pure
    pub fn new() -> Self {
        Self
    }

    /// @ai:intent Calculate summary stats for one key's results
    /// @ai:effects pure
    fn summarize_key(key: &crate::key::Key, data: &KeyResults) -> KeySummary {
        let timings: Vec<f64> = data.executions.iter().flatten().copied().collect();

        let min = timings.iter().copied().reduce(f64::min);
        let max = timings.iter().copied().reduce(f64::max);
        let mean = average(timings.iter().copied());

        KeySummary {
            key: key.clone(),
            executions: data.executions.len(),
            failures: data.failures.len(),
            iterations: timings.len(),
            mean,
            min,
            max,
        }
    }
}

impl Default for MetricsAggregator {
    fn default() -> Self {
        Self::new()
    }
}

/// @ai:intent Calculate average of an iterator of f64, None when empty
/// @ai:effects pure
fn average<I: Iterator<Item = f64>>(iter: I) -> Option<f64> {
    let (sum, count) = iter.fold((0.0, 0u32), |(s, c), v| (s + v, c + 1));

    if count == 0 {
        None
    } else {
        Some(sum / count as f64)
    }
}

impl MetricsAggregatorTrait for MetricsAggregator {
    /// @ai:intent Summaries for all non-skipped keys, in key order
    /// @ai:post keys that never produced data are listed with zero counts
    /// @ai:effects pure
    fn summarize(&self, results: &SessionResults) -> Vec<KeySummary> {
        let empty = KeyResults::default();

        results
            .session
            .non_skipped_keys
            .iter()
            .chain(
                results
                    .data
                    .keys()
                    .filter(|k| !results.session.non_skipped_keys.contains(*k)),
            )
            .map(|key| Self::summarize_key(key, results.data.get(key).unwrap_or(&empty)))
            .collect()
    }
}
