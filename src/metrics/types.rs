//! @ai:module:intent Result types recorded for a benchmark session
//! @ai:module:layer domain
//! @ai:module:public_api SessionResults, KeyResults, FailureRecord, KeySummary
//! @ai:module:stateless true

use crate::error::Result;
use crate::key::Key;
use crate::planner::SessionInfo;
use crate::results::{ExecutionFailed, FailureKind};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// @ai:intent A failed process execution kept for later diagnosis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailureRecord {
    /// 0-based execution index within the key
    pub execution: u32,
    pub kind: FailureKind,
    pub return_code: i32,
    /// Full diagnostic including verbatim stdout and stderr
    pub message: String,
}

impl FailureRecord {
    /// @ai:intent Capture a parser failure for one execution
    /// @ai:effects pure
    pub fn from_failure(execution: u32, failure: &ExecutionFailed) -> Self {
        Self {
            execution,
            kind: failure.kind,
            return_code: failure.return_code,
            message: failure.message(),
        }
    }
}

/// @ai:intent Everything recorded for one key
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KeyResults {
    /// One entry per successful execution, each the rounded iteration timings
    pub executions: Vec<Vec<f64>>,
    #[serde(default)]
    pub failures: Vec<FailureRecord>,
}

/// @ai:intent Complete results of a session, written to the results file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionResults {
    pub started_at: String,
    #[serde(default)]
    pub finished_at: Option<String>,
    #[serde(default)]
    pub dry_run: bool,
    pub session: SessionInfo,
    /// Output of the configured audit commands
    #[serde(default)]
    pub audit: BTreeMap<String, String>,
    pub data: BTreeMap<Key, KeyResults>,
}

impl SessionResults {
    /// @ai:intent Start an empty results record for a planned session
    /// @ai:effects time:read
    pub fn new(session: SessionInfo) -> Self {
        Self {
            started_at: chrono::Utc::now().to_rfc3339(),
            finished_at: None,
            dry_run: false,
            session,
            audit: BTreeMap::new(),
            data: BTreeMap::new(),
        }
    }

    /// @ai:intent Read a results file written by a previous run
    /// @ai:effects fs:read
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// @ai:intent Record the timings of a successful execution
    /// @ai:effects state:write
    pub fn record_success(&mut self, key: &Key, timings: Vec<f64>) {
        self.data.entry(key.clone()).or_default().executions.push(timings);
    }

    /// @ai:intent Record a failed execution
    /// @ai:effects state:write
    pub fn record_failure(&mut self, key: &Key, record: FailureRecord) {
        self.data.entry(key.clone()).or_default().failures.push(record);
    }

    /// @ai:intent Mark the session as complete
    /// @ai:effects time:read
    pub fn finish(&mut self) {
        self.finished_at = Some(chrono::Utc::now().to_rfc3339());
    }

    /// @ai:effects pure
    pub fn total_failures(&self) -> usize {
        self.data.values().map(|r| r.failures.len()).sum()
    }

    /// @ai:effects pure
    pub fn total_executions(&self) -> usize {
        self.data.values().map(|r| r.executions.len()).sum()
    }
}

/// @ai:intent Per-key statistics over all recorded iterations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeySummary {
    pub key: Key,
    pub executions: usize,
    pub failures: usize,
    pub iterations: usize,
    pub mean: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
}
