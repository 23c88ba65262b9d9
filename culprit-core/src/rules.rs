//! Ordered, case-insensitive regex rules behind the classifier.
//!
//! The table is compiled once into an immutable [`RuleSet`] and shared by
//! reference. Evaluation walks categories in table order and rules in list
//! order; the first rule that matches anywhere in the text wins. Several
//! categories overlap (`auth` repeats status-code fragments that `api`
//! already claims), so the order below is part of the contract.

use regex::{Regex, RegexBuilder};

use crate::category::FailureCategory;
use crate::error::RuleError;

/// Built-in rule table, in evaluation order.
pub const BUILTIN_RULES: &[(FailureCategory, &[&str])] = &[
    (
        FailureCategory::Setup,
        &[
            r"setup.*fail",
            r"before.*fail",
            r"initialization.*error",
            r"precondition",
            r"@Before",
            r"BeforeClass.*fail",
            r"setUp.*exception",
        ],
    ),
    (
        FailureCategory::Api,
        &[
            r"API|REST|HTTP",
            r"status.*code.*[4-5]\d{2}",
            r"endpoint",
            r"40[0-9]|50[0-9]",
            r"unauthorized|forbidden",
            r"not.*found.*404",
            r"internal.*server.*error",
        ],
    ),
    (
        FailureCategory::Timeout,
        &[
            r"timeout",
            r"timed.*out",
            r"TimeoutException",
            r"SocketTimeout",
            r"ReadTimeout",
            r"time.*limit.*exceed",
        ],
    ),
    (
        FailureCategory::Environment,
        &[
            r"environment|env.*variable",
            r"configuration.*missing",
            r"property.*not.*found",
            r"missing.*config",
            r"base.*url.*not.*set",
        ],
    ),
    (
        FailureCategory::BuildConfig,
        &[
            r"workspace|maven|gradle",
            r"build.*fail",
            r"compilation",
            r"ClassNotFound",
            r"NoClassDefFound",
        ],
    ),
    (
        FailureCategory::Database,
        &[
            r"database|SQL|query",
            r"SQLException",
            r"connection.*pool",
            r"database.*connection.*fail",
            r"deadlock",
        ],
    ),
    (
        FailureCategory::Auth,
        &[
            r"auth|403|401",
            r"unauthorized|forbidden",
            r"credentials|token",
            r"authentication.*fail",
            r"access.*denied",
        ],
    ),
    (
        FailureCategory::Network,
        &[
            r"network|connection.*refused",
            r"ConnectException",
            r"UnknownHost",
            r"no.*route.*to.*host",
            r"SocketException",
        ],
    ),
    (
        FailureCategory::TestData,
        &[
            r"test.*data",
            r"missing.*data",
            r"fixture.*data.*missing",
            r"test.*file.*not.*found",
        ],
    ),
    (
        FailureCategory::Assertion,
        &[
            r"assertion|AssertionError",
            r"expected.*but.*was",
            r"verify.*fail",
            r"assert.*fail",
        ],
    ),
];

/// A category together with its ordered, compiled patterns.
#[derive(Debug, Clone)]
pub struct PatternRule {
    category: FailureCategory,
    patterns: Vec<Regex>,
}

impl PatternRule {
    /// Compile a rule from pattern source text. All patterns are case-insensitive.
    pub fn new<S: AsRef<str>>(
        category: FailureCategory,
        patterns: &[S],
    ) -> Result<Self, RuleError> {
        if category == FailureCategory::Unknown {
            return Err(RuleError::UnclassifiableCategory(category));
        }
        if patterns.is_empty() {
            return Err(RuleError::EmptyCategory(category));
        }

        let patterns = patterns
            .iter()
            .map(|pattern| {
                let pattern = pattern.as_ref();
                RegexBuilder::new(pattern)
                    .case_insensitive(true)
                    .build()
                    .map_err(|source| RuleError::InvalidPattern {
                        category,
                        pattern: pattern.to_string(),
                        source,
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { category, patterns })
    }

    pub fn category(&self) -> FailureCategory {
        self.category
    }

    pub fn patterns(&self) -> &[Regex] {
        &self.patterns
    }

    /// Index of the first pattern that matches `text`.
    pub fn first_match(&self, text: &str) -> Option<usize> {
        self.patterns.iter().position(|re| re.is_match(text))
    }
}

/// Which rule decided a classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuleMatch<'a> {
    pub category: FailureCategory,
    /// Position of the pattern within its category's list.
    pub rule_index: usize,
    /// Source text of the matching pattern.
    pub pattern: &'a str,
}

/// Immutable, ordered rule table.
#[derive(Debug, Clone)]
pub struct RuleSet {
    rules: Vec<PatternRule>,
}

impl RuleSet {
    /// Compile the built-in rule table.
    pub fn builtin() -> Result<Self, RuleError> {
        Self::from_table(BUILTIN_RULES)
    }

    /// Compile a rule table. Categories are evaluated in table order.
    pub fn from_table<S: AsRef<str>>(
        table: &[(FailureCategory, &[S])],
    ) -> Result<Self, RuleError> {
        let rules = table
            .iter()
            .map(|(category, patterns)| PatternRule::new(*category, patterns))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { rules })
    }

    /// Build from already compiled rules, keeping their order.
    pub fn from_rules(rules: Vec<PatternRule>) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &[PatternRule] {
        &self.rules
    }

    /// Total number of compiled patterns across all categories.
    pub fn pattern_count(&self) -> usize {
        self.rules.iter().map(|rule| rule.patterns.len()).sum()
    }

    /// The first rule, in evaluation order, that matches `text`.
    pub fn first_match(&self, text: &str) -> Option<RuleMatch<'_>> {
        self.rules.iter().find_map(|rule| {
            rule.first_match(text).map(|rule_index| RuleMatch {
                category: rule.category,
                rule_index,
                pattern: rule.patterns[rule_index].as_str(),
            })
        })
    }
}
