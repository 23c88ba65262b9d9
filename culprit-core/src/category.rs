//! Failure category taxonomy.
//!
//! The set is closed: every failed test case lands in exactly one of these
//! categories. Variant order is the classifier's evaluation order, so the
//! derived `Ord` doubles as the priority order used for tie-breaks.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::UnknownCategory;

/// Root-cause category of a failed test case.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum FailureCategory {
    /// Fixture setup, `@Before` hooks, preconditions.
    Setup,
    /// HTTP status codes and REST vocabulary.
    Api,
    /// Anything that ran out of time.
    Timeout,
    /// Missing environment variables or configuration.
    Environment,
    /// Build tooling and classpath/compilation problems.
    BuildConfig,
    /// SQL, connection pools, deadlocks.
    Database,
    /// Credentials, tokens, 401/403.
    Auth,
    /// Sockets, refused connections, host resolution.
    Network,
    /// Missing or broken fixture data.
    TestData,
    /// Plain assertion failures.
    Assertion,
    /// Nothing matched.
    #[default]
    Unknown,
}

impl FailureCategory {
    /// Every category, in evaluation order.
    pub const ALL: [FailureCategory; 11] = [
        FailureCategory::Setup,
        FailureCategory::Api,
        FailureCategory::Timeout,
        FailureCategory::Environment,
        FailureCategory::BuildConfig,
        FailureCategory::Database,
        FailureCategory::Auth,
        FailureCategory::Network,
        FailureCategory::TestData,
        FailureCategory::Assertion,
        FailureCategory::Unknown,
    ];

    /// Stable identifier used in reports and configuration.
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureCategory::Setup => "setup",
            FailureCategory::Api => "api",
            FailureCategory::Timeout => "timeout",
            FailureCategory::Environment => "environment",
            FailureCategory::BuildConfig => "build-config",
            FailureCategory::Database => "database",
            FailureCategory::Auth => "auth",
            FailureCategory::Network => "network",
            FailureCategory::TestData => "test-data",
            FailureCategory::Assertion => "assertion",
            FailureCategory::Unknown => "unknown",
        }
    }

    /// Human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            FailureCategory::Setup => "Setup Issues",
            FailureCategory::Api => "API Failures",
            FailureCategory::Timeout => "Timeouts",
            FailureCategory::Environment => "Environment Issues",
            FailureCategory::BuildConfig => "Build Configuration",
            FailureCategory::Database => "Database Issues",
            FailureCategory::Auth => "Authentication/Authorization",
            FailureCategory::Network => "Network Issues",
            FailureCategory::TestData => "Test Data Issues",
            FailureCategory::Assertion => "Assertion Failures",
            FailureCategory::Unknown => "Unknown",
        }
    }

    /// Categories that carry pattern rules (everything except `Unknown`).
    pub fn classifiable() -> impl Iterator<Item = FailureCategory> {
        Self::ALL
            .into_iter()
            .filter(|category| *category != FailureCategory::Unknown)
    }
}

impl std::fmt::Display for FailureCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FailureCategory {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        Self::ALL
            .into_iter()
            .find(|category| category.as_str().eq_ignore_ascii_case(needle))
            .ok_or_else(|| UnknownCategory(s.to_string()))
    }
}
