//! View-level statistics over the last build of many jobs.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::aggregate::AggregatedAnalysis;
use crate::category::FailureCategory;
use crate::result::FailureAnalysisResult;

/// Final outcome of a completed build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BuildOutcome {
    Success,
    Failure,
    Unstable,
    Aborted,
    NotBuilt,
}

impl BuildOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            BuildOutcome::Success => "success",
            BuildOutcome::Failure => "failure",
            BuildOutcome::Unstable => "unstable",
            BuildOutcome::Aborted => "aborted",
            BuildOutcome::NotBuilt => "not-built",
        }
    }
}

impl std::fmt::Display for BuildOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A job's most recent build as seen by a view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobSnapshot {
    pub name: String,
    /// `None` while the build is still running.
    pub last_outcome: Option<BuildOutcome>,
    /// Stored analysis of the last build, if any.
    pub analysis: Option<FailureAnalysisResult>,
}

/// Counts shown on a view's dashboard.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewStats {
    pub total_jobs: usize,
    pub successful_jobs: usize,
    pub failed_jobs: usize,
    pub unstable_jobs: usize,
    pub aborted_jobs: usize,
    pub total_failures: u64,
    /// Categories with at least one failure, in declaration order.
    pub category_counts: BTreeMap<FailureCategory, u64>,
    pub top_category: FailureCategory,
    pub top_category_count: u64,
    pub has_failures: bool,
}

impl ViewStats {
    pub fn collect<'a, I>(jobs: I) -> Self
    where
        I: IntoIterator<Item = &'a JobSnapshot>,
    {
        let mut stats = ViewStats::default();
        let mut aggregate = AggregatedAnalysis::new();

        for job in jobs {
            stats.total_jobs += 1;
            match job.last_outcome {
                Some(BuildOutcome::Success) => stats.successful_jobs += 1,
                Some(BuildOutcome::Failure) => stats.failed_jobs += 1,
                Some(BuildOutcome::Unstable) => stats.unstable_jobs += 1,
                Some(BuildOutcome::Aborted) => stats.aborted_jobs += 1,
                Some(BuildOutcome::NotBuilt) | None => {}
            }

            if let Some(analysis) = &job.analysis
                && analysis.failed_tests() > 0
            {
                aggregate.merge(analysis);
            }
        }

        stats.total_failures = aggregate.total_failures();
        stats.category_counts = aggregate
            .category_counts()
            .iter()
            .filter(|(_, count)| **count > 0)
            .map(|(category, count)| (*category, *count))
            .collect();
        if let Some((category, count)) = aggregate.top_category_with_count() {
            stats.top_category = category;
            stats.top_category_count = count;
        }
        stats.has_failures = stats.total_failures > 0;
        stats
    }
}
