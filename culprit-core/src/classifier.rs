//! First-match-wins failure classifier.

use std::sync::Arc;

use crate::category::FailureCategory;
use crate::error::RuleError;
use crate::rules::{RuleMatch, RuleSet};

/// Join error details and stack trace into the text the rules run against.
///
/// Missing parts become empty strings and the two halves are always joined
/// by a single space, so a pattern may span the message and the trace.
pub fn failure_text(error_details: Option<&str>, stack_trace: Option<&str>) -> String {
    let details = error_details.unwrap_or("");
    let trace = stack_trace.unwrap_or("");
    let mut text = String::with_capacity(details.len() + trace.len() + 1);
    text.push_str(details);
    text.push(' ');
    text.push_str(trace);
    text
}

/// Maps failure text onto a [`FailureCategory`] using a shared [`RuleSet`].
#[derive(Debug, Clone)]
pub struct Classifier {
    rules: Arc<RuleSet>,
}

impl Classifier {
    pub fn new(rules: Arc<RuleSet>) -> Self {
        Self { rules }
    }

    /// Classifier over the built-in rule table.
    pub fn with_builtin_rules() -> Result<Self, RuleError> {
        Ok(Self::new(Arc::new(RuleSet::builtin()?)))
    }

    pub fn rules(&self) -> &Arc<RuleSet> {
        &self.rules
    }

    /// Category of the first matching rule, or `Unknown`.
    pub fn classify(&self, text: &str) -> FailureCategory {
        self.rules
            .first_match(text)
            .map_or(FailureCategory::Unknown, |hit| hit.category)
    }

    /// Like [`classify`](Self::classify) but also reports the deciding rule.
    pub fn classify_with_rule(&self, text: &str) -> Option<RuleMatch<'_>> {
        self.rules.first_match(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classifier() -> Classifier {
        Classifier::with_builtin_rules().unwrap()
    }

    #[test]
    fn test_failure_text_joins_with_single_space() {
        assert_eq!(failure_text(Some("boom"), Some("at x")), "boom at x");
        assert_eq!(failure_text(None, Some("at x")), " at x");
        assert_eq!(failure_text(Some("boom"), None), "boom ");
        assert_eq!(failure_text(None, None), " ");
    }

    #[test]
    fn test_database_and_timeout_vocabulary_resolves_to_timeout() {
        let text = "Connection to database failed: SQLException: timeout";
        assert_eq!(classifier().classify(text), FailureCategory::Timeout);
    }

    #[test]
    fn test_not_found_with_endpoint_is_api() {
        let text = "404 Not Found: endpoint: /api/users/123 unreachable";
        assert_eq!(classifier().classify(text), FailureCategory::Api);
    }

    #[test]
    fn test_status_codes_claimed_by_api_before_auth() {
        // 401/403 appear in the auth rules too, but api is scanned first.
        assert_eq!(
            classifier().classify("Server answered 403 for user bob"),
            FailureCategory::Api
        );
        assert_eq!(
            classifier().classify("Unauthorized"),
            FailureCategory::Api
        );
    }

    #[test]
    fn test_one_example_per_category() {
        let c = classifier();
        let cases = [
            ("setUp threw IllegalStateException", FailureCategory::Setup),
            ("Precondition violated: user exists", FailureCategory::Setup),
            ("Received status code 502 from gateway", FailureCategory::Api),
            ("Operation timed out after 30s", FailureCategory::Timeout),
            ("Variable ENV_VARIABLE_X is not defined", FailureCategory::Environment),
            ("Property db.url not found", FailureCategory::Environment),
            ("java.lang.NoClassDefFoundError: com/acme/Widget", FailureCategory::BuildConfig),
            ("Transaction deadlock detected", FailureCategory::Database),
            ("Invalid credentials supplied", FailureCategory::Auth),
            ("Access denied for user", FailureCategory::Auth),
            ("java.net.UnknownHostException: db.internal", FailureCategory::Network),
            ("Connection refused (os error 111)", FailureCategory::Network),
            ("Could not load test data for scenario", FailureCategory::TestData),
            ("expected:<1> but was:<2>", FailureCategory::Assertion),
            ("java.lang.AssertionError", FailureCategory::Assertion),
        ];
        for (text, expected) in cases {
            assert_eq!(c.classify(text), expected, "text: {text}");
        }
    }

    #[test]
    fn test_unmatched_text_is_unknown() {
        let c = classifier();
        assert_eq!(c.classify(""), FailureCategory::Unknown);
        assert_eq!(c.classify(" "), FailureCategory::Unknown);
        assert_eq!(c.classify("NullPointerException"), FailureCategory::Unknown);
    }

    #[test]
    fn test_pattern_can_span_message_and_trace() {
        // "setup" lives in the message, "fail" only in the trace.
        let text = failure_text(Some("during setup"), Some("listener did fail"));
        assert_eq!(classifier().classify(&text), FailureCategory::Setup);
    }

    #[test]
    fn test_classify_with_rule_names_the_pattern() {
        let c = classifier();
        let hit = c.classify_with_rule("Read deadlock victim").unwrap();
        assert_eq!(hit.category, FailureCategory::Database);
        assert_eq!(hit.pattern, "deadlock");
        assert!(c.classify_with_rule("NullPointerException").is_none());
    }

    #[test]
    fn test_classifiers_share_one_rule_set() {
        let a = classifier();
        let b = Classifier::new(Arc::clone(a.rules()));
        assert!(Arc::ptr_eq(a.rules(), b.rules()));
        assert_eq!(b.classify("timeout"), FailureCategory::Timeout);
    }
}
