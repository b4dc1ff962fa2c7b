//! @ai:module:intent Expand the session cross-product into keys, counts and a schedule
//! @ai:module:layer application
//! @ai:module:public_api SessionInfo, Job, get_session_info, build_schedule
//! @ai:module:stateless true

use crate::config::SessionConfig;
use crate::error::Result;
use crate::key::Key;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// @ai:intent Aggregate counts and key partition for a session
/// @ai:post skipped_keys and non_skipped_keys are disjoint
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionInfo {
    /// Subprocess invocations across all non-skipped keys
    pub n_proc_execs: u64,
    /// In-process iterations across all non-skipped keys
    pub n_in_proc_iters: u64,
    pub skipped_keys: BTreeSet<Key>,
    pub non_skipped_keys: BTreeSet<Key>,
}

impl SessionInfo {
    /// @ai:intent Size of the full cross-product
    /// @ai:effects pure
    pub fn total_keys(&self) -> usize {
        self.skipped_keys.len() + self.non_skipped_keys.len()
    }
}

/// @ai:intent One scheduled process execution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    pub key: Key,
    /// 0-based execution index for this key
    pub execution: u32,
    /// Total executions planned for this key
    pub of: u32,
    pub iterations: u32,
}

/// @ai:intent Enumerate every (benchmark, vm, variant) the configuration declares
/// @ai:post each VM contributes only its own variants
/// @ai:effects pure
pub fn all_keys(config: &SessionConfig) -> BTreeSet<Key> {
    let mut keys = BTreeSet::new();

    for bench_name in config.benchmarks.keys() {
        for (vm_name, vm) in &config.vms {
            for variant_name in vm.variants.keys() {
                keys.insert(Key::new(bench_name, vm_name, variant_name));
            }
        }
    }

    keys
}

/// @ai:intent Partition keys through the skip rules and total the work
/// @ai:pre config has been validated
/// @ai:post zero-execution keys are still counted in a key set
/// @ai:example (2 benchmarks x 2 VMs, P=2, I=5, no skips) -> n_proc_execs 8, n_in_proc_iters 40
/// @ai:effects pure
pub fn get_session_info(config: &SessionConfig) -> Result<SessionInfo> {
    let matcher = config.skip_matcher()?;
    let mut info = SessionInfo::default();

    for key in all_keys(config) {
        if matcher.should_skip(&key) {
            info.skipped_keys.insert(key);
            continue;
        }

        let executions = u64::from(config.executions_for(key.benchmark())?);
        let iterations = u64::from(config.iterations_for(&key)?);

        info.n_proc_execs += executions;
        info.n_in_proc_iters += executions * iterations;
        info.non_skipped_keys.insert(key);
    }

    tracing::debug!(
        "Planned {} keys ({} skipped), {} process executions",
        info.total_keys(),
        info.skipped_keys.len(),
        info.n_proc_execs
    );

    Ok(info)
}

/// @ai:intent Order process executions round by round across non-skipped keys
/// @ai:post round r holds every key with more than r executions, in key order
/// @ai:post keys with zero executions never appear
/// @ai:effects pure
pub fn build_schedule(config: &SessionConfig, info: &SessionInfo) -> Result<Vec<Job>> {
    let mut planned = Vec::with_capacity(info.non_skipped_keys.len());

    for key in &info.non_skipped_keys {
        let executions = config.executions_for(key.benchmark())?;
        let iterations = config.iterations_for(key)?;
        planned.push((key, executions, iterations));
    }

    let rounds = planned.iter().map(|(_, n, _)| *n).max().unwrap_or(0);
    let mut jobs = Vec::new();

    for round in 0..rounds {
        for (key, executions, iterations) in &planned {
            if round < *executions {
                jobs.push(Job {
                    key: (*key).clone(),
                    execution: round,
                    of: *executions,
                    iterations: *iterations,
                });
            }
        }
    }

    Ok(jobs)
}
