//! JSON build files read by the CLI.

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::Path;

use culprit_core::{BuildOutcome, BuildRecord, TestResultData};

/// One build of a job, as exported by the CI server.
///
/// `testResults` is kept as raw JSON so that a payload in the wrong shape
/// degrades to an empty analysis instead of rejecting the whole file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildFile {
    pub job: String,
    pub number: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outcome: Option<BuildOutcome>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test_results: Option<serde_json::Value>,
}

impl BuildRecord for BuildFile {
    fn test_results(&self) -> TestResultData {
        TestResultData::from_json(self.test_results.as_ref())
    }
}

pub fn load_build(path: &Path) -> anyhow::Result<BuildFile> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read build file {}", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse build file {}", path.display()))
}

/// Load a view: the last build of each job.
pub fn load_view(path: &Path) -> anyhow::Result<Vec<BuildFile>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read view file {}", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse view file {}", path.display()))
}
