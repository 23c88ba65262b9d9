//! Per-build analysis result.

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::{BTreeMap, HashMap};

use crate::aggregate::AggregatedAnalysis;
use crate::category::FailureCategory;
use crate::input::CaseOutcome;

/// Maximum characters kept in a short error.
pub const SHORT_ERROR_MAX_CHARS: usize = 100;

/// A failed test case, as recorded in a result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestFailureInfo {
    class_name: String,
    test_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    error_details: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    stack_trace: Option<String>,
    #[serde(default)]
    age: u32,
}

impl TestFailureInfo {
    pub fn new(
        class_name: impl Into<String>,
        test_name: impl Into<String>,
        error_details: Option<String>,
        stack_trace: Option<String>,
        age: u32,
    ) -> Self {
        Self {
            class_name: class_name.into(),
            test_name: test_name.into(),
            error_details,
            stack_trace,
            age,
        }
    }

    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    pub fn test_name(&self) -> &str {
        &self.test_name
    }

    pub fn error_details(&self) -> Option<&str> {
        self.error_details.as_deref()
    }

    pub fn stack_trace(&self) -> Option<&str> {
        self.stack_trace.as_deref()
    }

    /// Consecutive failing builds.
    pub fn age(&self) -> u32 {
        self.age
    }

    /// First line of the error details, cut to 100 characters.
    ///
    /// Empty when the failure carried no error details.
    pub fn short_error(&self) -> String {
        let Some(details) = self.error_details.as_deref() else {
            return String::new();
        };
        let first_line = details.split('\n').next().unwrap_or("");
        first_line.chars().take(SHORT_ERROR_MAX_CHARS).collect()
    }
}

impl From<&CaseOutcome> for TestFailureInfo {
    fn from(case: &CaseOutcome) -> Self {
        Self::new(
            case.class_name.clone(),
            case.name.clone(),
            case.error_details.clone(),
            case.error_stack_trace.clone(),
            case.age,
        )
    }
}

/// Classification of one build's failed tests.
///
/// Every category is always present in [`failures_by_category`], possibly
/// with an empty list. Results are populated by the analyzer and read-only
/// afterwards.
///
/// [`failures_by_category`]: FailureAnalysisResult::failures_by_category
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FailureAnalysisResult {
    total_tests: u32,
    passed_tests: u32,
    failed_tests: u32,
    skipped_tests: u32,
    #[serde(deserialize_with = "deserialize_all_categories")]
    failures_by_category: BTreeMap<FailureCategory, Vec<TestFailureInfo>>,
    #[serde(default)]
    failed_api_endpoints: HashMap<String, usize>,
}

fn empty_category_map() -> BTreeMap<FailureCategory, Vec<TestFailureInfo>> {
    FailureCategory::ALL
        .into_iter()
        .map(|category| (category, Vec::new()))
        .collect()
}

fn deserialize_all_categories<'de, D>(
    deserializer: D,
) -> Result<BTreeMap<FailureCategory, Vec<TestFailureInfo>>, D::Error>
where
    D: Deserializer<'de>,
{
    let mut stored = BTreeMap::<FailureCategory, Vec<TestFailureInfo>>::deserialize(deserializer)?;
    let mut map = empty_category_map();
    for (category, failures) in map.iter_mut() {
        if let Some(found) = stored.remove(category) {
            *failures = found;
        }
    }
    Ok(map)
}

impl Default for FailureAnalysisResult {
    fn default() -> Self {
        Self::empty()
    }
}

impl FailureAnalysisResult {
    /// All-zero result with every category list empty.
    pub fn empty() -> Self {
        Self::with_counts(0, 0, 0, 0)
    }

    pub(crate) fn with_counts(total: u32, passed: u32, failed: u32, skipped: u32) -> Self {
        Self {
            total_tests: total,
            passed_tests: passed,
            failed_tests: failed,
            skipped_tests: skipped,
            failures_by_category: empty_category_map(),
            failed_api_endpoints: HashMap::new(),
        }
    }

    pub(crate) fn add_failure(&mut self, category: FailureCategory, failure: TestFailureInfo) {
        self.failures_by_category
            .entry(category)
            .or_default()
            .push(failure);
    }

    pub(crate) fn add_failed_api(&mut self, endpoint: String) {
        *self.failed_api_endpoints.entry(endpoint).or_insert(0) += 1;
    }

    pub fn total_tests(&self) -> u32 {
        self.total_tests
    }

    pub fn passed_tests(&self) -> u32 {
        self.passed_tests
    }

    pub fn failed_tests(&self) -> u32 {
        self.failed_tests
    }

    pub fn skipped_tests(&self) -> u32 {
        self.skipped_tests
    }

    pub fn failures_by_category(&self) -> &BTreeMap<FailureCategory, Vec<TestFailureInfo>> {
        &self.failures_by_category
    }

    /// Failures recorded under `category`, in analysis order.
    pub fn failures(&self, category: FailureCategory) -> &[TestFailureInfo] {
        self.failures_by_category
            .get(&category)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn failure_count(&self, category: FailureCategory) -> usize {
        self.failures(category).len()
    }

    /// Number of failures that were classified (sum over all categories).
    pub fn classified_failures(&self) -> usize {
        self.failures_by_category.values().map(Vec::len).sum()
    }

    pub fn failed_api_endpoints(&self) -> &HashMap<String, usize> {
        &self.failed_api_endpoints
    }

    /// Number of categories holding at least one failure.
    pub fn categories_with_failures(&self) -> usize {
        self.failures_by_category
            .values()
            .filter(|failures| !failures.is_empty())
            .count()
    }

    /// The category with the most failures; ties go to the earlier category.
    pub fn top_category(&self) -> Option<(FailureCategory, usize)> {
        let mut top: Option<(FailureCategory, usize)> = None;
        for (category, failures) in &self.failures_by_category {
            let count = failures.len();
            if count > top.map_or(0, |(_, best)| best) {
                top = Some((*category, count));
            }
        }
        top
    }

    /// An aggregate built from this result alone.
    pub fn to_aggregate(&self) -> AggregatedAnalysis {
        let mut aggregate = AggregatedAnalysis::new();
        aggregate.merge(self);
        aggregate
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn failure(details: Option<&str>) -> TestFailureInfo {
        TestFailureInfo::new("com.acme.T", "t", details.map(String::from), None, 0)
    }

    #[test]
    fn test_short_error_first_line() {
        let f = failure(Some("first line\nsecond line"));
        assert_eq!(f.short_error(), "first line");
    }

    #[test]
    fn test_short_error_truncates_to_100_chars() {
        let long = "x".repeat(150);
        assert_eq!(failure(Some(&long)).short_error().chars().count(), 100);
        let exact = "y".repeat(100);
        assert_eq!(failure(Some(&exact)).short_error(), exact);
    }

    #[test]
    fn test_short_error_counts_characters_not_bytes() {
        let accented = "é".repeat(120);
        let short = failure(Some(&accented)).short_error();
        assert_eq!(short.chars().count(), 100);
    }

    #[test]
    fn test_short_error_without_details_is_empty() {
        assert_eq!(failure(None).short_error(), "");
        assert_eq!(failure(Some("")).short_error(), "");
        assert_eq!(failure(Some("\nafter")).short_error(), "");
    }

    #[test]
    fn test_empty_result_has_every_category() {
        let result = FailureAnalysisResult::empty();
        assert_eq!(result.failures_by_category().len(), FailureCategory::ALL.len());
        assert!(result.failures_by_category().values().all(Vec::is_empty));
        assert!(result.failed_api_endpoints().is_empty());
        assert_eq!(result.top_category(), None);
        assert_eq!(result.categories_with_failures(), 0);
    }

    #[test]
    fn test_add_failure_and_api() {
        let mut result = FailureAnalysisResult::with_counts(3, 1, 2, 0);
        result.add_failure(FailureCategory::Api, failure(Some("HTTP 500")));
        result.add_failure(FailureCategory::Timeout, failure(Some("timeout")));
        result.add_failed_api("/api/x".into());
        result.add_failed_api("/api/x".into());

        assert_eq!(result.failure_count(FailureCategory::Api), 1);
        assert_eq!(result.classified_failures(), 2);
        assert_eq!(result.categories_with_failures(), 2);
        assert_eq!(result.failed_api_endpoints()["/api/x"], 2);
    }

    #[test]
    fn test_top_category_prefers_earlier_category_on_tie() {
        let mut result = FailureAnalysisResult::with_counts(2, 0, 2, 0);
        result.add_failure(FailureCategory::Network, failure(None));
        result.add_failure(FailureCategory::Database, failure(None));
        assert_eq!(result.top_category(), Some((FailureCategory::Database, 1)));

        result.add_failure(FailureCategory::Network, failure(None));
        assert_eq!(result.top_category(), Some((FailureCategory::Network, 2)));
    }

    #[test]
    fn test_deserialize_fills_missing_categories() {
        let json = serde_json::json!({
            "totalTests": 1,
            "passedTests": 0,
            "failedTests": 1,
            "skippedTests": 0,
            "failuresByCategory": {
                "timeout": [{ "className": "T", "testName": "t", "errorDetails": "timeout" }]
            }
        });
        let result: FailureAnalysisResult = serde_json::from_value(json).unwrap();
        assert_eq!(result.failures_by_category().len(), FailureCategory::ALL.len());
        assert_eq!(result.failure_count(FailureCategory::Timeout), 1);
        assert!(result.failed_api_endpoints().is_empty());
    }

    #[test]
    fn test_serde_roundtrip_preserves_result() {
        let mut result = FailureAnalysisResult::with_counts(5, 3, 2, 0);
        result.add_failure(FailureCategory::Assertion, failure(Some("expected 1 but was 2")));
        result.add_failed_api("/v1/ping".into());
        let json = serde_json::to_string(&result).unwrap();
        let back: FailureAnalysisResult = serde_json::from_str(&json).unwrap();
        assert_eq!(back, result);
    }
}
