//! Culprit Core: root-cause classification of failed test cases.
//!
//! Given the failed cases of a build, this crate:
//!
//! - **Classifies** each failure into a [`FailureCategory`] with an ordered,
//!   first-match-wins regex [`RuleSet`]
//! - **Extracts** API endpoints from failures classified as `api`
//! - **Aggregates** per-build results across builds into category counts,
//!   capped example lists, and endpoint and error-message rankings
//! - **Reports** the results as serializable JSON structures
//!
//! Analysis is advisory: it never returns an error for bad input data.

pub mod aggregate;
pub mod analyzer;
pub mod category;
pub mod classifier;
pub mod config;
pub mod dashboard;
pub mod endpoints;
pub mod error;
pub mod input;
pub mod report;
pub mod result;
pub mod rules;

// Re-exports for convenience
pub use aggregate::AggregatedAnalysis;
pub use analyzer::{FailureAnalyzer, on_build_completed};
pub use category::FailureCategory;
pub use classifier::{Classifier, failure_text};
pub use config::{CulpritConfig, load_config};
pub use dashboard::{BuildOutcome, JobSnapshot, ViewStats};
pub use endpoints::EndpointExtractor;
pub use error::{ConfigError, CulpritError, RuleError, UnknownCategory};
pub use input::{BuildRecord, CaseOutcome, TestResultData, TestRun};
pub use report::{AggregateReport, BuildReport, build_summary};
pub use result::{FailureAnalysisResult, TestFailureInfo};
pub use rules::{PatternRule, RuleMatch, RuleSet};
