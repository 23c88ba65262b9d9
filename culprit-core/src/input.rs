//! Input contract: the test outcomes a host hands to the analyzer.

use serde::{Deserialize, Serialize};

/// One failed test case as reported by the build system.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseOutcome {
    pub class_name: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_details: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_stack_trace: Option<String>,
    /// Number of consecutive builds this case has been failing.
    #[serde(default)]
    pub age: u32,
}

impl CaseOutcome {
    pub fn new(class_name: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            class_name: class_name.into(),
            name: name.into(),
            error_details: None,
            error_stack_trace: None,
            age: 0,
        }
    }

    pub fn with_error(mut self, details: impl Into<String>) -> Self {
        self.error_details = Some(details.into());
        self
    }

    pub fn with_stack_trace(mut self, trace: impl Into<String>) -> Self {
        self.error_stack_trace = Some(trace.into());
        self
    }

    pub fn with_age(mut self, age: u32) -> Self {
        self.age = age;
        self
    }
}

/// Summary counts and failed cases of one build's test run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestRun {
    pub total_count: u32,
    pub pass_count: u32,
    pub fail_count: u32,
    pub skip_count: u32,
    #[serde(default)]
    pub failed_cases: Vec<CaseOutcome>,
}

impl TestRun {
    /// A run whose counts are derived from the supplied failures.
    pub fn from_failures(passed: u32, skipped: u32, failed_cases: Vec<CaseOutcome>) -> Self {
        let failed = u32::try_from(failed_cases.len()).unwrap_or(u32::MAX);
        Self {
            total_count: passed.saturating_add(skipped).saturating_add(failed),
            pass_count: passed,
            fail_count: failed,
            skip_count: skipped,
            failed_cases,
        }
    }
}

/// What a build has to offer in terms of test results.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TestResultData {
    /// The build recorded no test results.
    Absent,
    /// Results exist but are not in a shape the analyzer understands.
    Malformed(String),
    Present(TestRun),
}

impl TestResultData {
    /// Decode a raw JSON payload, mapping decode failures to `Malformed`.
    pub fn from_json(value: Option<&serde_json::Value>) -> Self {
        match value {
            None | Some(serde_json::Value::Null) => TestResultData::Absent,
            Some(raw) => match serde_json::from_value::<TestRun>(raw.clone()) {
                Ok(run) => TestResultData::Present(run),
                Err(e) => TestResultData::Malformed(e.to_string()),
            },
        }
    }
}

/// A build the analyzer can inspect.
pub trait BuildRecord {
    fn test_results(&self) -> TestResultData;
}

impl BuildRecord for TestRun {
    fn test_results(&self) -> TestResultData {
        TestResultData::Present(self.clone())
    }
}

impl BuildRecord for Option<TestRun> {
    fn test_results(&self) -> TestResultData {
        match self {
            Some(run) => TestResultData::Present(run.clone()),
            None => TestResultData::Absent,
        }
    }
}

impl BuildRecord for TestResultData {
    fn test_results(&self) -> TestResultData {
        self.clone()
    }
}
