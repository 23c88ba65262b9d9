//! Property-based tests for analysis and aggregation using proptest.

use proptest::prelude::*;

use culprit_core::{
    AggregatedAnalysis, CaseOutcome, FailureAnalysisResult, FailureAnalyzer, FailureCategory,
    TestRun,
};

const MESSAGES: &[Option<&str>] = &[
    None,
    Some("Operation timed out after 30s"),
    Some("Connection to database failed: SQLException: timeout"),
    Some("404 Not Found: endpoint: /api/users/123 unreachable"),
    Some("HTTP 500 from /v1/orders"),
    Some("Request sent to: /login failed with 401"),
    Some("Transaction deadlock detected"),
    Some("Connection refused"),
    Some("expected:<1> but was:<2>"),
    Some("Invalid credentials\nat LoginTest"),
    Some("NullPointerException"),
    Some("precondition violated"),
];

fn analyzer() -> FailureAnalyzer {
    FailureAnalyzer::with_builtin_rules().unwrap()
}

fn build(analyzer: &FailureAnalyzer, picks: &[usize]) -> FailureAnalysisResult {
    let cases = picks
        .iter()
        .enumerate()
        .map(|(i, pick)| {
            let case = CaseOutcome::new("com.acme.Suite", format!("case{i}"));
            match MESSAGES[*pick % MESSAGES.len()] {
                Some(message) => case.with_error(message),
                None => case,
            }
        })
        .collect();
    analyzer.analyze(&TestRun::from_failures(3, 1, cases))
}

fn builds() -> impl Strategy<Value = Vec<Vec<usize>>> {
    prop::collection::vec(prop::collection::vec(0usize..64, 0..12), 0..8)
}

// --- Per-build properties ---

proptest! {
    #[test]
    fn category_counts_sum_to_failed_tests(picks in prop::collection::vec(0usize..64, 0..20)) {
        let result = build(&analyzer(), &picks);
        prop_assert_eq!(result.classified_failures() as u32, result.failed_tests());
        prop_assert_eq!(result.failures_by_category().len(), FailureCategory::ALL.len());
    }

    #[test]
    fn arbitrary_text_always_classifies(text in ".{0,200}") {
        let analyzer = analyzer();
        let category = analyzer.classifier().classify(&text);
        prop_assert!(FailureCategory::ALL.contains(&category));
    }

    #[test]
    fn extracted_endpoints_start_with_slash(text in "[a-z /:0-9]{0,120}") {
        let extractor = culprit_core::EndpointExtractor::new().unwrap();
        for endpoint in extractor.extract(&text) {
            prop_assert!(endpoint.starts_with('/'));
        }
    }
}

// --- Aggregation properties ---

proptest! {
    #[test]
    fn examples_never_exceed_cap(all in builds(), cap in 0usize..7) {
        let analyzer = analyzer();
        let mut aggregate = AggregatedAnalysis::with_example_limit(cap);
        for picks in &all {
            aggregate.merge(&build(&analyzer, picks));
            for category in FailureCategory::ALL {
                prop_assert!(aggregate.category_examples(category).len() <= cap);
            }
        }
    }

    #[test]
    fn common_errors_sum_to_merged_failures(all in builds()) {
        let analyzer = analyzer();
        let results: Vec<_> = all.iter().map(|picks| build(&analyzer, picks)).collect();
        let aggregate = AggregatedAnalysis::aggregate_many(&results);

        let merged: u64 = all.iter().map(|picks| picks.len() as u64).sum();
        prop_assert_eq!(aggregate.common_errors().values().sum::<u64>(), merged);
        prop_assert_eq!(aggregate.total_failures(), merged);
        prop_assert_eq!(aggregate.category_counts().values().sum::<u64>(), merged);
    }

    #[test]
    fn rankings_are_bounded_and_non_increasing(all in builds(), limit in 0usize..6) {
        let analyzer = analyzer();
        let results: Vec<_> = all.iter().map(|picks| build(&analyzer, picks)).collect();
        let aggregate = AggregatedAnalysis::aggregate_many(&results);

        for ranking in [aggregate.top_failed_apis(limit), aggregate.top_common_errors(limit)] {
            prop_assert!(ranking.len() <= limit);
            for pair in ranking.windows(2) {
                prop_assert!(pair[0].1 >= pair[1].1);
                if pair[0].1 == pair[1].1 {
                    prop_assert!(pair[0].0 < pair[1].0);
                }
            }
        }
    }

    #[test]
    fn combine_equals_sequential_fold(all in builds(), split in 0usize..8, cap in 0usize..7) {
        let analyzer = analyzer();
        let results: Vec<_> = all.iter().map(|picks| build(&analyzer, picks)).collect();
        let split = split.min(results.len());

        let mut whole = AggregatedAnalysis::with_example_limit(cap);
        whole.merge_all(&results);
        let mut left = AggregatedAnalysis::with_example_limit(cap);
        left.merge_all(&results[..split]);
        let mut right = AggregatedAnalysis::with_example_limit(cap);
        right.merge_all(&results[split..]);

        prop_assert_eq!(left.combine(right), whole);
    }

    #[test]
    fn top_category_has_the_highest_count(all in builds()) {
        let analyzer = analyzer();
        let results: Vec<_> = all.iter().map(|picks| build(&analyzer, picks)).collect();
        let aggregate = AggregatedAnalysis::aggregate_many(&results);

        match aggregate.top_category_with_count() {
            None => {
                prop_assert_eq!(aggregate.top_category(), FailureCategory::Unknown);
                prop_assert_eq!(aggregate.categories_with_failures(), 0);
            }
            Some((top, count)) => {
                prop_assert_eq!(aggregate.top_category(), top);
                for (category, other) in aggregate.category_counts() {
                    prop_assert!(*other <= count);
                    if *other == count {
                        prop_assert!(top <= *category);
                    }
                }
            }
        }
    }
}
