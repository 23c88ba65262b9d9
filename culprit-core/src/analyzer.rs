//! Per-build failure analysis.
//!
//! The analyzer turns a build's test outcomes into a [`FailureAnalysisResult`].
//! It never fails: missing or malformed test data yields an empty result.

use std::fmt::Display;

use crate::category::FailureCategory;
use crate::classifier::{Classifier, failure_text};
use crate::endpoints::EndpointExtractor;
use crate::error::RuleError;
use crate::input::{BuildRecord, TestResultData, TestRun};
use crate::result::{FailureAnalysisResult, TestFailureInfo};

/// Classifies every failed test of a build.
#[derive(Debug, Clone)]
pub struct FailureAnalyzer {
    classifier: Classifier,
    extractor: EndpointExtractor,
}

impl FailureAnalyzer {
    pub fn new(classifier: Classifier, extractor: EndpointExtractor) -> Self {
        Self {
            classifier,
            extractor,
        }
    }

    /// Analyzer over the built-in rules.
    pub fn with_builtin_rules() -> Result<Self, RuleError> {
        Ok(Self::new(
            Classifier::with_builtin_rules()?,
            EndpointExtractor::new()?,
        ))
    }

    pub fn classifier(&self) -> &Classifier {
        &self.classifier
    }

    /// Analyze a build's test results.
    pub fn analyze<B: BuildRecord + ?Sized>(&self, build: &B) -> FailureAnalysisResult {
        self.analyze_data(build.test_results())
    }

    /// Analyze results fetched from a collaborator that may fail.
    ///
    /// Any error is logged and replaced by an empty result.
    pub fn analyze_best_effort<F, E>(&self, fetch: F) -> FailureAnalysisResult
    where
        F: FnOnce() -> Result<TestRun, E>,
        E: Display,
    {
        match fetch() {
            Ok(run) => self.analyze_run(&run),
            Err(e) => {
                tracing::warn!("Failed to read test results, skipping analysis: {}", e);
                FailureAnalysisResult::empty()
            }
        }
    }

    fn analyze_data(&self, data: TestResultData) -> FailureAnalysisResult {
        match data {
            TestResultData::Absent => FailureAnalysisResult::empty(),
            TestResultData::Malformed(reason) => {
                tracing::warn!("Malformed test results, skipping analysis: {}", reason);
                FailureAnalysisResult::empty()
            }
            TestResultData::Present(run) => self.analyze_run(&run),
        }
    }

    /// Classify each failed case of a test run.
    pub fn analyze_run(&self, run: &TestRun) -> FailureAnalysisResult {
        let mut result = FailureAnalysisResult::with_counts(
            run.total_count,
            run.pass_count,
            run.fail_count,
            run.skip_count,
        );

        for case in &run.failed_cases {
            let text = failure_text(
                case.error_details.as_deref(),
                case.error_stack_trace.as_deref(),
            );
            let category = match self.classifier.classify_with_rule(&text) {
                Some(hit) => {
                    tracing::debug!(
                        test = %case.name,
                        class = %case.class_name,
                        category = %hit.category,
                        rule = hit.rule_index,
                        pattern = hit.pattern,
                        "Classified failed test"
                    );
                    hit.category
                }
                None => {
                    tracing::debug!(
                        test = %case.name,
                        class = %case.class_name,
                        "No rule matched failed test"
                    );
                    FailureCategory::Unknown
                }
            };

            if category == FailureCategory::Api {
                for endpoint in self.extractor.extract(&text) {
                    result.add_failed_api(endpoint);
                }
            }
            result.add_failure(category, TestFailureInfo::from(case));
        }

        result
    }
}

/// Build-completion hook for hosts.
///
/// Returns `None` when the build has no test results at all; otherwise the
/// analysis, after logging a short summary of it.
pub fn on_build_completed<B: BuildRecord + ?Sized>(
    analyzer: &FailureAnalyzer,
    build: &B,
) -> Option<FailureAnalysisResult> {
    let data = build.test_results();
    if matches!(data, TestResultData::Absent) {
        tracing::debug!("Build has no test results, skipping analysis");
        return None;
    }

    let result = analyzer.analyze_data(data);
    if result.failed_tests() == 0 {
        tracing::info!("Failure analysis: all tests passed");
    } else {
        tracing::info!(
            "Failure analysis: found {} failed tests across {} categories",
            result.failed_tests(),
            result.categories_with_failures()
        );
        if let Some((category, count)) = result.top_category() {
            tracing::info!(
                "Top failure category: {} ({} failures)",
                category.label(),
                count
            );
        }
    }
    Some(result)
}
