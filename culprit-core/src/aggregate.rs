//! Cross-build aggregation of analysis results.
//!
//! [`AggregatedAnalysis`] is a single-writer accumulator: results are folded
//! in with [`merge`](AggregatedAnalysis::merge). Independently built
//! aggregates over consecutive runs of results can be joined with
//! [`combine`](AggregatedAnalysis::combine), which gives the same answer as
//! folding everything in one pass.

use std::collections::{BTreeMap, HashMap};

use crate::category::FailureCategory;
use crate::result::{FailureAnalysisResult, TestFailureInfo};

/// Default number of example failures kept per category.
pub const DEFAULT_MAX_EXAMPLES: usize = 5;

/// Running totals over any number of per-build results.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregatedAnalysis {
    total_failures: u64,
    category_counts: BTreeMap<FailureCategory, u64>,
    category_examples: BTreeMap<FailureCategory, Vec<TestFailureInfo>>,
    all_failed_apis: HashMap<String, u64>,
    common_errors: HashMap<String, u64>,
    max_examples: usize,
}

impl Default for AggregatedAnalysis {
    fn default() -> Self {
        Self::new()
    }
}

impl AggregatedAnalysis {
    pub fn new() -> Self {
        Self::with_example_limit(DEFAULT_MAX_EXAMPLES)
    }

    /// Empty aggregate keeping at most `max_examples` examples per category.
    pub fn with_example_limit(max_examples: usize) -> Self {
        Self {
            total_failures: 0,
            category_counts: FailureCategory::ALL.into_iter().map(|c| (c, 0)).collect(),
            category_examples: FailureCategory::ALL
                .into_iter()
                .map(|c| (c, Vec::new()))
                .collect(),
            all_failed_apis: HashMap::new(),
            common_errors: HashMap::new(),
            max_examples,
        }
    }

    /// Fold results in sequence order into a fresh aggregate.
    pub fn aggregate_many<'a, I>(results: I) -> Self
    where
        I: IntoIterator<Item = &'a FailureAnalysisResult>,
    {
        let mut aggregate = Self::new();
        aggregate.merge_all(results);
        aggregate
    }

    /// Merge every result, in order.
    pub fn merge_all<'a, I>(&mut self, results: I)
    where
        I: IntoIterator<Item = &'a FailureAnalysisResult>,
    {
        for result in results {
            self.merge(result);
        }
    }

    /// Fold one build's result into the totals.
    pub fn merge(&mut self, result: &FailureAnalysisResult) {
        self.total_failures += u64::from(result.failed_tests());

        for (category, failures) in result.failures_by_category() {
            *self.category_counts.entry(*category).or_insert(0) += failures.len() as u64;

            let examples = self.category_examples.entry(*category).or_default();
            for failure in failures {
                if examples.len() < self.max_examples {
                    examples.push(failure.clone());
                }
                *self.common_errors.entry(failure.short_error()).or_insert(0) += 1;
            }
        }

        for (endpoint, count) in result.failed_api_endpoints() {
            *self.all_failed_apis.entry(endpoint.clone()).or_insert(0) += *count as u64;
        }
    }

    /// Join an aggregate built from the results that follow this one's.
    ///
    /// Both sides are expected to share the same example limit; the result
    /// keeps `self`'s.
    pub fn combine(mut self, other: AggregatedAnalysis) -> Self {
        self.total_failures += other.total_failures;

        for (category, count) in other.category_counts {
            *self.category_counts.entry(category).or_insert(0) += count;
        }
        for (category, failures) in other.category_examples {
            let examples = self.category_examples.entry(category).or_default();
            let room = self.max_examples.saturating_sub(examples.len());
            examples.extend(failures.into_iter().take(room));
        }
        for (endpoint, count) in other.all_failed_apis {
            *self.all_failed_apis.entry(endpoint).or_insert(0) += count;
        }
        for (error, count) in other.common_errors {
            *self.common_errors.entry(error).or_insert(0) += count;
        }

        self
    }

    pub fn total_failures(&self) -> u64 {
        self.total_failures
    }

    pub fn max_examples(&self) -> usize {
        self.max_examples
    }

    pub fn category_counts(&self) -> &BTreeMap<FailureCategory, u64> {
        &self.category_counts
    }

    pub fn category_count(&self, category: FailureCategory) -> u64 {
        self.category_counts.get(&category).copied().unwrap_or(0)
    }

    /// The first failures seen for `category`, oldest first.
    pub fn category_examples(&self, category: FailureCategory) -> &[TestFailureInfo] {
        self.category_examples
            .get(&category)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn all_failed_apis(&self) -> &HashMap<String, u64> {
        &self.all_failed_apis
    }

    /// Occurrences of each short error message.
    pub fn common_errors(&self) -> &HashMap<String, u64> {
        &self.common_errors
    }

    /// Most frequently failing endpoints, at most `limit` of them.
    pub fn top_failed_apis(&self, limit: usize) -> Vec<(&str, u64)> {
        rank_by_count(&self.all_failed_apis, limit)
    }

    /// Most frequent short error messages, at most `limit` of them.
    pub fn top_common_errors(&self, limit: usize) -> Vec<(&str, u64)> {
        rank_by_count(&self.common_errors, limit)
    }

    /// Category with the highest positive count, `Unknown` if there is none.
    ///
    /// Ties go to the category declared first.
    pub fn top_category(&self) -> FailureCategory {
        self.top_category_with_count()
            .map_or(FailureCategory::Unknown, |(category, _)| category)
    }

    pub fn top_category_with_count(&self) -> Option<(FailureCategory, u64)> {
        let mut top: Option<(FailureCategory, u64)> = None;
        for (category, count) in &self.category_counts {
            if *count > top.map_or(0, |(_, best)| best) {
                top = Some((*category, *count));
            }
        }
        top
    }

    /// Number of categories with at least one failure.
    pub fn categories_with_failures(&self) -> usize {
        self.category_counts.values().filter(|count| **count > 0).count()
    }
}

/// Sort a count table by count descending, then key ascending, and keep the
/// first `limit` entries.
pub fn rank_by_count<N: Copy + Ord>(
    counts: &HashMap<String, N>,
    limit: usize,
) -> Vec<(&str, N)> {
    let mut ranked: Vec<(&str, N)> = counts.iter().map(|(k, v)| (k.as_str(), *v)).collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    ranked.truncate(limit);
    ranked
}
