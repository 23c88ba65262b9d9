//! Serializable reports for per-build and cross-build analysis.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::aggregate::{AggregatedAnalysis, rank_by_count};
use crate::category::FailureCategory;
use crate::config::ReportConfig;
use crate::result::FailureAnalysisResult;

/// Failure count of one API endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiFailureCount {
    pub endpoint: String,
    pub count: u64,
}

/// Occurrence count of one short error message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommonErrorCount {
    pub error: String,
    pub count: u64,
}

/// Report for a single build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildReport {
    pub total_tests: u32,
    pub passed_tests: u32,
    pub failed_tests: u32,
    pub skipped_tests: u32,
    /// Categories with at least one failure, in declaration order.
    pub categories: BTreeMap<FailureCategory, u64>,
    /// Every failing endpoint, most frequent first.
    pub failed_apis: Vec<ApiFailureCount>,
}

impl From<&FailureAnalysisResult> for BuildReport {
    fn from(result: &FailureAnalysisResult) -> Self {
        let categories = result
            .failures_by_category()
            .iter()
            .filter(|(_, failures)| !failures.is_empty())
            .map(|(category, failures)| (*category, failures.len() as u64))
            .collect();

        let failed_apis = rank_by_count(result.failed_api_endpoints(), usize::MAX)
            .into_iter()
            .map(|(endpoint, count)| ApiFailureCount {
                endpoint: endpoint.to_string(),
                count: count as u64,
            })
            .collect();

        Self {
            total_tests: result.total_tests(),
            passed_tests: result.passed_tests(),
            failed_tests: result.failed_tests(),
            skipped_tests: result.skipped_tests(),
            categories,
            failed_apis,
        }
    }
}

/// Report across many builds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateReport {
    pub total_failures: u64,
    pub categories_with_failures: usize,
    pub top_category: FailureCategory,
    /// Categories with at least one failure, in declaration order.
    pub categories: BTreeMap<FailureCategory, u64>,
    pub top_failed_apis: Vec<ApiFailureCount>,
    pub top_common_errors: Vec<CommonErrorCount>,
}

impl AggregateReport {
    pub fn new(aggregate: &AggregatedAnalysis, limits: &ReportConfig) -> Self {
        let categories = aggregate
            .category_counts()
            .iter()
            .filter(|(_, count)| **count > 0)
            .map(|(category, count)| (*category, *count))
            .collect();

        Self {
            total_failures: aggregate.total_failures(),
            categories_with_failures: aggregate.categories_with_failures(),
            top_category: aggregate.top_category(),
            categories,
            top_failed_apis: aggregate
                .top_failed_apis(limits.top_failed_apis)
                .into_iter()
                .map(|(endpoint, count)| ApiFailureCount {
                    endpoint: endpoint.to_string(),
                    count,
                })
                .collect(),
            top_common_errors: aggregate
                .top_common_errors(limits.top_common_errors)
                .into_iter()
                .map(|(error, count)| CommonErrorCount {
                    error: error.to_string(),
                    count,
                })
                .collect(),
        }
    }
}

/// One-line summary of a build's analysis.
///
/// `"All tests passing"` when nothing failed, otherwise the failure count
/// followed by the dominant category, e.g. `"3 failures (2 Timeouts)"`.
pub fn build_summary(result: &FailureAnalysisResult) -> String {
    if result.failed_tests() == 0 {
        return "All tests passing".to_string();
    }

    let mut summary = format!("{} failures", result.failed_tests());
    if let Some((category, count)) = result.top_category() {
        summary.push_str(&format!(" ({} {})", count, category.label()));
    }
    summary
}
